//! Seams to the device calendar/reminder store.
//!
//! The bridge never owns calendar data. It talks to the host through two
//! traits: a [`StoreConnector`] that answers authorization questions and
//! hands out fresh store handles, and the [`CalendarStore`] handle itself,
//! which stages saves and removals until an explicit commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use crate::error::BridgeResult;
use crate::models::{AuthorizationStatus, CalendarItem, EventItem, ItemCategory, ReminderItem, SpanSelector};

pub mod memory;

pub use memory::{MemoryConnector, MemoryStore};

/// Range query over events. Matches events whose start lies in `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPredicate {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub calendars: Option<Vec<String>>,
}

impl EventPredicate {
    pub fn matches(&self, event: &EventItem) -> bool {
        event.start >= self.start && event.start < self.end && in_calendars(&self.calendars, &event.calendar)
    }
}

/// Reminder query. Reminders carry no inherent range, so only the calendar
/// filter applies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReminderPredicate {
    pub calendars: Option<Vec<String>>,
}

impl ReminderPredicate {
    pub fn matches(&self, reminder: &ReminderItem) -> bool {
        in_calendars(&self.calendars, &reminder.calendar)
    }
}

fn in_calendars(filter: &Option<Vec<String>>, calendar: &Option<String>) -> bool {
    match (filter, calendar) {
        (None, _) => true,
        (Some(names), Some(name)) => names.iter().any(|n| n == name),
        (Some(_), None) => false,
    }
}

/// Handle to the underlying store.
///
/// `save` and `remove` with `commit = false` only stage the change; nothing
/// is visible until [`CalendarStore::commit`]. [`CalendarStore::rollback`]
/// discards everything staged since the last commit.
#[async_trait]
pub trait CalendarStore: Send + Sync + fmt::Debug {
    fn save(&self, item: &CalendarItem, span: Option<SpanSelector>, commit: bool) -> BridgeResult<()>;

    fn remove(&self, item: &CalendarItem, span: Option<SpanSelector>, commit: bool) -> BridgeResult<()>;

    fn commit(&self) -> BridgeResult<()>;

    fn rollback(&self);

    fn predicate_for_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: Option<&[String]>,
    ) -> EventPredicate {
        EventPredicate {
            start,
            end,
            calendars: calendars.map(|c| c.to_vec()),
        }
    }

    fn predicate_for_reminders(&self, calendars: Option<&[String]>) -> ReminderPredicate {
        ReminderPredicate {
            calendars: calendars.map(|c| c.to_vec()),
        }
    }

    /// Visits every committed event matching `predicate`, synchronously.
    fn enumerate_events(&self, predicate: &EventPredicate, visitor: &mut dyn FnMut(&EventItem)) -> BridgeResult<()>;

    async fn fetch_reminders(&self, predicate: ReminderPredicate) -> BridgeResult<Vec<ReminderItem>>;
}

/// Host-side access to the store: authorization plus handle creation.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    fn authorization_status(&self, category: ItemCategory) -> AuthorizationStatus;

    /// Prompts for access. The answer may be produced on any thread.
    async fn request_access(&self, category: ItemCategory) -> BridgeResult<bool>;

    /// Returns a fresh store handle.
    fn open(&self) -> Arc<dyn CalendarStore>;
}
