//! Bridge configuration
//!
//! Settings are fixed when a bridge is constructed. They come from
//! defaults, from `CALBRIDGE_*` environment variables, or from a JSON file
//! shipped with a test suite.

use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{BridgeError, BridgeResult};
use crate::models::{DateWindow, ItemCategory, SpanSelector};

pub const ENV_CATEGORY: &str = "CALBRIDGE_CATEGORY";
pub const ENV_SPAN: &str = "CALBRIDGE_SPAN";
pub const ENV_WINDOW_DAYS: &str = "CALBRIDGE_WINDOW_DAYS";
pub const ENV_WINDOW_REMINDERS: &str = "CALBRIDGE_WINDOW_REMINDERS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Category used by `seed` and `teardown`.
    pub category: ItemCategory,
    pub event_span: SpanSelector,
    pub date_window: DateWindow,
    /// Also bound reminder removal by the window (by due date).
    pub window_reminders: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            category: ItemCategory::Event,
            event_span: SpanSelector::ThisEventOnly,
            date_window: DateWindow::default(),
            window_reminders: false,
        }
    }
}

impl BridgeConfig {
    /// Defaults overridden by any `CALBRIDGE_*` variables that are set.
    pub fn from_env() -> BridgeResult<Self> {
        let mut config = Self::default();

        if let Ok(value) = env::var(ENV_CATEGORY) {
            config.category = value.parse()?;
        }
        if let Ok(value) = env::var(ENV_SPAN) {
            config.event_span = value.parse()?;
        }
        if let Ok(value) = env::var(ENV_WINDOW_DAYS) {
            let days: i64 = value
                .trim()
                .parse()
                .map_err(|_| BridgeError::config(format!("{} must be a whole number of days, got '{}'", ENV_WINDOW_DAYS, value)))?;
            if days <= 0 {
                return Err(BridgeError::config(format!("{} must be positive", ENV_WINDOW_DAYS)));
            }
            config.date_window = DateWindow::around(Utc::now(), days)?;
        }
        if let Ok(value) = env::var(ENV_WINDOW_REMINDERS) {
            config.window_reminders = matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> BridgeResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BridgeError::config(format!("Invalid bridge config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> BridgeResult<()> {
        self.date_window.validate()?;
        info!(
            "Bridge config: category={}, span={}, window={}..{}, window_reminders={}",
            self.category,
            self.event_span.as_str(),
            self.date_window.start.to_rfc3339(),
            self.date_window.end.to_rfc3339(),
            self.window_reminders
        );
        Ok(())
    }
}
