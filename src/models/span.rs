// file: src/models/span.rs
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::BridgeError;

/// Which occurrences of a recurring event a save or remove applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanSelector {
    #[default]
    ThisEventOnly,
    FutureEvents,
}

impl SpanSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanSelector::ThisEventOnly => "this_event_only",
            SpanSelector::FutureEvents => "future_events",
        }
    }
}

impl FromStr for SpanSelector {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "this_event_only" | "this" => Ok(SpanSelector::ThisEventOnly),
            "future_events" | "future" => Ok(SpanSelector::FutureEvents),
            other => Err(BridgeError::config(format!("Unknown span: {}", other))),
        }
    }
}
