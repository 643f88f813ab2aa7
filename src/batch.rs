//! Collect-then-commit staging.
//!
//! A [`Transaction`] stages every change with `commit = false` and issues a
//! single store commit at the end. If it is dropped before committing,
//! whatever it staged is rolled back.

use log::{debug, warn};
use std::sync::Arc;

use crate::error::BridgeResult;
use crate::models::{CalendarItem, SpanSelector};
use crate::store::CalendarStore;

pub struct Transaction {
    store: Arc<dyn CalendarStore>,
    span: SpanSelector,
    staged: usize,
    finished: bool,
}

impl Transaction {
    pub fn begin(store: Arc<dyn CalendarStore>, span: SpanSelector) -> Self {
        Self {
            store,
            span,
            staged: 0,
            finished: false,
        }
    }

    // Span only means something for events.
    fn span_for(&self, item: &CalendarItem) -> Option<SpanSelector> {
        match item {
            CalendarItem::Event(_) => Some(self.span),
            CalendarItem::Reminder(_) => None,
        }
    }

    pub fn stage_save(&mut self, item: &CalendarItem) -> BridgeResult<()> {
        self.store.save(item, self.span_for(item), false)?;
        self.staged += 1;
        Ok(())
    }

    pub fn stage_remove(&mut self, item: &CalendarItem) -> BridgeResult<()> {
        self.store.remove(item, self.span_for(item), false)?;
        self.staged += 1;
        Ok(())
    }

    /// Issues exactly one store commit. Returns the number of changes applied.
    pub fn commit(mut self) -> BridgeResult<usize> {
        self.finished = true;
        match self.store.commit() {
            Ok(()) => {
                debug!("Committed {} staged changes", self.staged);
                Ok(self.staged)
            }
            Err(e) => {
                self.store.rollback();
                Err(e)
            }
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.finished && self.staged > 0 {
            warn!("Transaction dropped with {} uncommitted changes, rolling back", self.staged);
            self.store.rollback();
        }
    }
}
