//! Synthetic calendar data for seeding test runs.

use chrono::{DateTime, Duration, Utc};
use std::path::Path;

use crate::error::{BridgeError, BridgeResult};
use crate::models::{CalendarItem, EventItem, ReminderItem};

/// `count` one-hour events, one per day starting at `anchor`.
pub fn synthetic_events(count: usize, anchor: DateTime<Utc>) -> Vec<CalendarItem> {
    (0..count)
        .map(|i| {
            let start = anchor + Duration::days(i as i64);
            let mut event = EventItem::new(format!("Synthetic Event {}", i + 1), start, Duration::hours(1));
            event.notes = Some("Seeded by calendar-bridge".to_string());
            CalendarItem::Event(event)
        })
        .collect()
}

/// `count` reminders, due one day apart starting at `anchor`.
pub fn synthetic_reminders(count: usize, anchor: DateTime<Utc>) -> Vec<CalendarItem> {
    (0..count)
        .map(|i| {
            let due = anchor + Duration::days(i as i64);
            CalendarItem::Reminder(ReminderItem::new(format!("Synthetic Reminder {}", i + 1), Some(due)))
        })
        .collect()
}

/// Reads a JSON array of items, e.g. `[{"kind": "event", ...}]`.
pub fn load_items(path: impl AsRef<Path>) -> BridgeResult<Vec<CalendarItem>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| BridgeError::config(format!("Cannot read fixtures {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| BridgeError::config(format!("Invalid fixtures in {}: {}", path.display(), e)))
}
