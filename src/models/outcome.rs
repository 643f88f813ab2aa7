// file: src/models/outcome.rs
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::ItemCategory;
use crate::error::{BridgeError, BridgeResult};
use crate::store::CalendarStore;

/// Completion of `CalendarBridge::request_access`.
#[derive(Debug)]
pub struct AccessOutcome {
    pub granted: bool,
    pub error: Option<BridgeError>,
    pub store: Option<Arc<dyn CalendarStore>>,
}

impl AccessOutcome {
    pub fn granted(store: Arc<dyn CalendarStore>) -> Self {
        Self {
            granted: true,
            error: None,
            store: Some(store),
        }
    }

    pub fn denied(error: BridgeError) -> Self {
        Self {
            granted: false,
            error: Some(error),
            store: None,
        }
    }
}

/// Completion of a batch add or remove.
#[derive(Debug)]
pub struct BatchOutcome {
    pub category: ItemCategory,
    pub success: bool,
    pub items: usize,
    pub error: Option<BridgeError>,
    pub completed_at: DateTime<Utc>,
}

impl BatchOutcome {
    pub fn success(category: ItemCategory, items: usize) -> Self {
        Self {
            category,
            success: true,
            items,
            error: None,
            completed_at: Utc::now(),
        }
    }

    pub fn with_error(category: ItemCategory, error: BridgeError) -> Self {
        Self {
            category,
            success: false,
            items: 0,
            error: Some(error),
            completed_at: Utc::now(),
        }
    }

    pub fn from_result(category: ItemCategory, result: BridgeResult<usize>) -> Self {
        match result {
            Ok(items) => Self::success(category, items),
            Err(e) => Self::with_error(category, e),
        }
    }

    /// Number of committed items, or the error that aborted the batch.
    pub fn into_result(self) -> BridgeResult<usize> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_outcome_success() {
        let outcome = BatchOutcome::success(ItemCategory::Event, 4);
        assert!(outcome.success);
        assert_eq!(outcome.items, 4);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.into_result().unwrap(), 4);
    }

    #[test]
    fn test_batch_outcome_with_error() {
        let outcome = BatchOutcome::with_error(ItemCategory::Reminder, BridgeError::store_commit("locked"));
        assert!(!outcome.success);
        assert_eq!(outcome.items, 0);
        assert!(matches!(outcome.into_result(), Err(BridgeError::StoreCommit(_))));
    }

    #[test]
    fn test_access_outcome_denied_has_no_store() {
        let outcome = AccessOutcome::denied(BridgeError::AuthorizationDenied(ItemCategory::Event));
        assert!(!outcome.granted);
        assert!(outcome.store.is_none());
        assert!(outcome.error.is_some());
    }
}
