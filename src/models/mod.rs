// Declare modules
pub mod authorization;
pub mod item;
pub mod outcome;
pub mod span;
pub mod window;

// Flattened so callers can `use crate::models::CalendarItem`.
pub use authorization::AuthorizationStatus;
pub use item::{CalendarItem, EventItem, ItemCategory, ReminderItem};
pub use outcome::{AccessOutcome, BatchOutcome};
pub use span::SpanSelector;
pub use window::{DateWindow, DEFAULT_WINDOW_DAYS};
