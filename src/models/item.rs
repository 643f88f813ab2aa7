// file: src/models/item.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BridgeError, BridgeResult};

/// Store partition an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Event,
    Reminder,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Event => "event",
            ItemCategory::Reminder => "reminder",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "event" | "events" => Ok(ItemCategory::Event),
            "reminder" | "reminders" => Ok(ItemCategory::Reminder),
            other => Err(BridgeError::config(format!("Unknown item category: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    pub identifier: String,
    pub title: String,
    pub notes: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    pub calendar: Option<String>,
}

impl EventItem {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            identifier: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            notes: None,
            start,
            end: start + duration,
            all_day: false,
            calendar: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderItem {
    pub identifier: String,
    pub title: String,
    pub notes: Option<String>,
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub calendar: Option<String>,
}

impl ReminderItem {
    pub fn new(title: impl Into<String>, due: Option<DateTime<Utc>>) -> Self {
        Self {
            identifier: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            notes: None,
            due,
            completed: false,
            calendar: None,
        }
    }
}

/// A single schedulable record. The variant decides which partition it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CalendarItem {
    Event(EventItem),
    Reminder(ReminderItem),
}

impl CalendarItem {
    pub fn category(&self) -> ItemCategory {
        match self {
            CalendarItem::Event(_) => ItemCategory::Event,
            CalendarItem::Reminder(_) => ItemCategory::Reminder,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            CalendarItem::Event(event) => &event.identifier,
            CalendarItem::Reminder(reminder) => &reminder.identifier,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            CalendarItem::Event(event) => &event.title,
            CalendarItem::Reminder(reminder) => &reminder.title,
        }
    }

    /// Fails with the generic unsupported-item error when the variant does
    /// not belong to `category`.
    pub fn ensure_category(&self, category: ItemCategory) -> BridgeResult<()> {
        match (self, category) {
            (CalendarItem::Event(_), ItemCategory::Event) => Ok(()),
            (CalendarItem::Reminder(_), ItemCategory::Reminder) => Ok(()),
            _ => Err(BridgeError::UnsupportedItemForCategory),
        }
    }
}

impl From<EventItem> for CalendarItem {
    fn from(event: EventItem) -> Self {
        CalendarItem::Event(event)
    }
}

impl From<ReminderItem> for CalendarItem {
    fn from(reminder: ReminderItem) -> Self {
        CalendarItem::Reminder(reminder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_of_item() {
        let event: CalendarItem = EventItem::new("Standup", Utc::now(), Duration::minutes(15)).into();
        let reminder: CalendarItem = ReminderItem::new("Buy milk", None).into();

        assert_eq!(event.category(), ItemCategory::Event);
        assert_eq!(reminder.category(), ItemCategory::Reminder);
    }

    #[test]
    fn test_ensure_category_rejects_mismatch() {
        let reminder: CalendarItem = ReminderItem::new("Buy milk", None).into();

        assert!(reminder.ensure_category(ItemCategory::Reminder).is_ok());
        let err = reminder.ensure_category(ItemCategory::Event).unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedItemForCategory));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Events".parse::<ItemCategory>().unwrap(), ItemCategory::Event);
        assert_eq!(" reminder ".parse::<ItemCategory>().unwrap(), ItemCategory::Reminder);
        assert!("todo".parse::<ItemCategory>().is_err());
    }

    #[test]
    fn test_item_json_is_tagged_by_kind() {
        let json = r#"{
            "kind": "reminder",
            "identifier": "r-1",
            "title": "Water plants",
            "notes": null,
            "due": null,
            "calendar": null
        }"#;

        let item: CalendarItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.category(), ItemCategory::Reminder);
        assert_eq!(item.identifier(), "r-1");
        assert_eq!(item.title(), "Water plants");
    }

    #[test]
    fn test_event_end_follows_duration() {
        let start = Utc::now();
        let event = EventItem::new("Review", start, Duration::hours(2));
        assert_eq!(event.end - event.start, Duration::hours(2));
        assert!(!event.identifier.is_empty());
    }
}
