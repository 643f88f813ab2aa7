//! The calendar bridge.
//!
//! Negotiates access to the host's calendar store, then seeds and tears
//! down items in all-or-nothing batches. Every public operation is an
//! `async fn` that completes exactly once.

use log::{debug, error};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{oneshot, RwLock};

use crate::batch::Transaction;
use crate::config::BridgeConfig;
use crate::dispatch::Dispatcher;
use crate::error::{BridgeError, BridgeResult};
use crate::models::{AccessOutcome, BatchOutcome, CalendarItem, EventItem, ItemCategory};
use crate::store::{CalendarStore, StoreConnector};
use crate::utils::{self, logging};

type StoreSlot = Arc<RwLock<Option<Arc<dyn CalendarStore>>>>;

#[derive(Clone)]
pub struct CalendarBridge {
    connector: Arc<dyn StoreConnector>,
    dispatcher: Dispatcher,
    config: Arc<BridgeConfig>,
    store: StoreSlot,
}

impl CalendarBridge {
    /// Creates a bridge with its own dispatcher on the current runtime.
    ///
    /// Panics when called outside a runtime. Use [`Self::with_dispatcher`]
    /// with [`Dispatcher::on`] to bind to an explicit runtime handle.
    pub fn new(connector: Arc<dyn StoreConnector>, config: BridgeConfig) -> Self {
        Self::with_dispatcher(connector, config, Dispatcher::new("calendar-bridge"))
    }

    pub fn with_dispatcher(connector: Arc<dyn StoreConnector>, config: BridgeConfig, dispatcher: Dispatcher) -> Self {
        Self {
            connector,
            dispatcher,
            config: Arc::new(config),
            store: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The handle installed by the last successful authorization, if any.
    pub async fn current_store(&self) -> Option<Arc<dyn CalendarStore>> {
        self.store.read().await.clone()
    }

    /// Pure query against the host's authorization status.
    pub fn authorized(&self, category: ItemCategory) -> bool {
        self.connector.authorization_status(category).is_authorized()
    }

    /// Obtains access to `category` and installs a fresh store handle.
    ///
    /// When the category is already authorized this completes on the first
    /// poll without prompting. Otherwise the host is prompted; its answer is
    /// handed to the dispatcher, which installs the new handle before the
    /// outcome is returned. A denial leaves the current handle alone.
    ///
    /// The fast path writes the handle directly and does not queue behind
    /// pending prompts. A prompt that resolves later still installs its own
    /// handle, so the last writer wins. Every handle written is valid for
    /// `category`.
    pub async fn request_access(&self, category: ItemCategory) -> AccessOutcome {
        if self.authorized(category) {
            let store = self.connector.open();
            *self.store.write().await = Some(Arc::clone(&store));
            logging::log_access_decision(category, true, false);
            return AccessOutcome::granted(store);
        }

        let answer = self.connector.request_access(category).await;
        let fresh = match answer {
            Ok(true) => Some(self.connector.open()),
            _ => None,
        };

        let slot = Arc::clone(&self.store);
        let job = async move {
            match (answer, fresh) {
                (Ok(true), Some(store)) => {
                    *slot.write().await = Some(Arc::clone(&store));
                    AccessOutcome::granted(store)
                }
                (Err(e), _) => AccessOutcome::denied(e),
                _ => AccessOutcome::denied(BridgeError::AuthorizationDenied(category)),
            }
        };

        let outcome = match self.dispatcher.dispatch(job).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Could not deliver {} access result: {}", category, e);
                AccessOutcome::denied(e)
            }
        };
        logging::log_access_decision(category, outcome.granted, true);
        outcome
    }

    /// Stages every item then commits once. The first mismatched or refused
    /// item aborts the batch and nothing is committed.
    pub async fn add_all(&self, items: &[CalendarItem], category: ItemCategory) -> BatchOutcome {
        let started = Instant::now();
        let result = self.save_items(items, category).await;
        Self::finish("add", category, started, result)
    }

    /// Removes every item of `category` inside the configured window in one
    /// commit. Reminders are only bounded by the window when
    /// `window_reminders` is set.
    pub async fn remove_all(&self, category: ItemCategory) -> BatchOutcome {
        let started = Instant::now();
        let result = self.remove_items(category).await;
        Self::finish("remove", category, started, result)
    }

    /// Requests access to the configured category and adds `items`.
    pub async fn seed(&self, items: &[CalendarItem]) -> BatchOutcome {
        let category = self.config.category;
        let access = self.request_access(category).await;
        if !access.granted {
            let e = access.error.unwrap_or(BridgeError::AuthorizationDenied(category));
            return BatchOutcome::with_error(category, e);
        }
        self.add_all(items, category).await
    }

    /// Removes everything of the configured category inside the window.
    pub async fn teardown(&self) -> BatchOutcome {
        self.remove_all(self.config.category).await
    }

    /// Runs `add_all` on its own task. Dropping the receiver discards the
    /// outcome but does not stop the store mutation.
    pub fn add_all_detached(&self, items: Vec<CalendarItem>, category: ItemCategory) -> oneshot::Receiver<BatchOutcome> {
        let (tx, rx) = oneshot::channel();
        let bridge = self.clone();
        tokio::spawn(async move {
            let outcome = bridge.add_all(&items, category).await;
            if tx.send(outcome).is_err() {
                debug!("Add outcome for {} discarded, receiver dropped", category);
            }
        });
        rx
    }

    pub fn remove_all_detached(&self, category: ItemCategory) -> oneshot::Receiver<BatchOutcome> {
        let (tx, rx) = oneshot::channel();
        let bridge = self.clone();
        tokio::spawn(async move {
            let outcome = bridge.remove_all(category).await;
            if tx.send(outcome).is_err() {
                debug!("Remove outcome for {} discarded, receiver dropped", category);
            }
        });
        rx
    }

    pub fn shutdown(&self) {
        self.dispatcher.shutdown();
    }

    async fn require_store(&self, category: ItemCategory) -> BridgeResult<Arc<dyn CalendarStore>> {
        self.store
            .read()
            .await
            .clone()
            .ok_or(BridgeError::NotAuthorized(category))
    }

    async fn save_items(&self, items: &[CalendarItem], category: ItemCategory) -> BridgeResult<usize> {
        let store = self.require_store(category).await?;
        let mut tx = Transaction::begin(store, self.config.event_span);

        // Dropping `tx` on an early return rolls back what was staged.
        for item in items {
            item.ensure_category(category)?;
            tx.stage_save(item)?;
        }
        tx.commit()
    }

    async fn remove_items(&self, category: ItemCategory) -> BridgeResult<usize> {
        let store = self.require_store(category).await?;
        let items = self.fetch_in_window(&store, category).await?;

        if items.is_empty() {
            debug!("No {} items in window, nothing to remove", category);
            return Ok(0);
        }

        let mut tx = Transaction::begin(store, self.config.event_span);
        for item in &items {
            tx.stage_remove(item)?;
        }
        tx.commit()
    }

    async fn fetch_in_window(&self, store: &Arc<dyn CalendarStore>, category: ItemCategory) -> BridgeResult<Vec<CalendarItem>> {
        let window = self.config.date_window;

        match category {
            ItemCategory::Event => {
                let predicate = store.predicate_for_events(window.start, window.end, None);
                let mut found = Vec::new();
                store.enumerate_events(&predicate, &mut |event: &EventItem| {
                    if window.contains(event.start) {
                        found.push(CalendarItem::Event(event.clone()));
                    }
                })?;
                Ok(found)
            }
            ItemCategory::Reminder => {
                let predicate = store.predicate_for_reminders(None);
                let reminders = store.fetch_reminders(predicate).await?;
                let windowed = self.config.window_reminders;
                Ok(reminders
                    .into_iter()
                    .filter(|r| !windowed || r.due.is_some_and(|due| window.contains(due)))
                    .map(CalendarItem::Reminder)
                    .collect())
            }
        }
    }

    fn finish(operation: &str, category: ItemCategory, started: Instant, result: BridgeResult<usize>) -> BatchOutcome {
        match &result {
            Ok(items) => logging::log_batch_committed(operation, category, *items, utils::elapsed_ms(started)),
            Err(e) => logging::log_batch_aborted(operation, category, e),
        }
        BatchOutcome::from_result(category, result)
    }
}
