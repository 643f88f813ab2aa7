// file: src/models/window.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

pub const DEFAULT_WINDOW_DAYS: i64 = 365;

/// Half-open `[start, end)` range that bounds removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Default for DateWindow {
    /// One year either side of now.
    fn default() -> Self {
        let now = Utc::now();
        let span = Duration::days(DEFAULT_WINDOW_DAYS);
        Self {
            start: now - span,
            end: now + span,
        }
    }
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> BridgeResult<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// `days` either side of `anchor`. Fails if the bounds fall outside
    /// the representable date range.
    pub fn around(anchor: DateTime<Utc>, days: i64) -> BridgeResult<Self> {
        let out_of_range = || {
            BridgeError::config(format!(
                "Window of {} days around {} is out of range",
                days,
                anchor.to_rfc3339()
            ))
        };
        let span = Duration::try_days(days).ok_or_else(out_of_range)?;
        let start = anchor.checked_sub_signed(span).ok_or_else(out_of_range)?;
        let end = anchor.checked_add_signed(span).ok_or_else(out_of_range)?;
        Self::new(start, end)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if self.start >= self.end {
            return Err(BridgeError::config(format!(
                "Date window start {} must be before end {}",
                self.start.to_rfc3339(),
                self.end.to_rfc3339()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_spans_two_years() {
        let window = DateWindow::default();
        let span = window.end - window.start;
        assert_eq!(span.num_days(), 2 * DEFAULT_WINDOW_DAYS);
        assert!(window.contains(Utc::now()));
    }

    #[test]
    fn test_window_is_half_open() {
        let now = Utc::now();
        let window = DateWindow::new(now, now + Duration::hours(1)).unwrap();

        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
        assert!(!window.contains(window.start - Duration::seconds(1)));
    }

    #[test]
    fn test_around_rejects_unrepresentable_span() {
        let now = Utc::now();
        assert!(matches!(DateWindow::around(now, 1_000_000_000), Err(BridgeError::Config(_))));
        assert!(matches!(DateWindow::around(now, i64::MAX), Err(BridgeError::Config(_))));
        assert!(DateWindow::around(now, 0).is_err());

        let window = DateWindow::around(now, 7).unwrap();
        assert_eq!((window.end - window.start).num_days(), 14);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let now = Utc::now();
        assert!(DateWindow::new(now, now).is_err());
        assert!(DateWindow::new(now, now - Duration::days(1)).is_err());
    }
}
