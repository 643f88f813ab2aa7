// file: src/store/memory.rs
//! In-process calendar store.
//!
//! Behaves like a device store: every handle returned by
//! [`MemoryConnector::open`] sees the same committed data but keeps its own
//! staged changes until it commits. Faults can be injected per item title
//! so batch failure paths can be driven deterministically.

use async_trait::async_trait;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{CalendarStore, EventPredicate, ReminderPredicate, StoreConnector};
use crate::error::{BridgeError, BridgeResult};
use crate::models::{AuthorizationStatus, CalendarItem, EventItem, ItemCategory, ReminderItem, SpanSelector};

#[derive(Debug, Default)]
struct Faults {
    save_titles: HashSet<String>,
    remove_titles: HashSet<String>,
    next_commit: Option<String>,
    fetch: Option<String>,
}

#[derive(Debug, Default)]
struct Backing {
    events: Vec<EventItem>,
    reminders: Vec<ReminderItem>,
    commits: usize,
    rollbacks: usize,
    last_span: Option<SpanSelector>,
    faults: Faults,
}

impl Backing {
    fn contains(&self, item: &CalendarItem) -> bool {
        match item {
            CalendarItem::Event(e) => self.events.iter().any(|x| x.identifier == e.identifier),
            CalendarItem::Reminder(r) => self.reminders.iter().any(|x| x.identifier == r.identifier),
        }
    }

    fn upsert(&mut self, item: CalendarItem) {
        match item {
            CalendarItem::Event(event) => {
                self.events.retain(|x| x.identifier != event.identifier);
                self.events.push(event);
            }
            CalendarItem::Reminder(reminder) => {
                self.reminders.retain(|x| x.identifier != reminder.identifier);
                self.reminders.push(reminder);
            }
        }
    }

    fn delete(&mut self, item: &CalendarItem) {
        match item {
            CalendarItem::Event(e) => self.events.retain(|x| x.identifier != e.identifier),
            CalendarItem::Reminder(r) => self.reminders.retain(|x| x.identifier != r.identifier),
        }
    }
}

#[derive(Debug, Clone)]
enum PendingChange {
    Save(CalendarItem),
    Remove(CalendarItem),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One handle onto the shared in-memory data.
#[derive(Debug)]
pub struct MemoryStore {
    backing: Arc<Mutex<Backing>>,
    pending: Mutex<Vec<PendingChange>>,
}

impl MemoryStore {
    /// A standalone store with no connector in front of it.
    pub fn new() -> Self {
        Self::with_backing(Arc::new(Mutex::new(Backing::default())))
    }

    fn with_backing(backing: Arc<Mutex<Backing>>) -> Self {
        Self {
            backing,
            pending: Mutex::new(Vec::new()),
        }
    }

    // --- Inspection ---

    pub fn events(&self) -> Vec<EventItem> {
        lock(&self.backing).events.clone()
    }

    pub fn reminders(&self) -> Vec<ReminderItem> {
        lock(&self.backing).reminders.clone()
    }

    pub fn contains(&self, item: &CalendarItem) -> bool {
        lock(&self.backing).contains(item)
    }

    pub fn commit_count(&self) -> usize {
        lock(&self.backing).commits
    }

    pub fn rollback_count(&self) -> usize {
        lock(&self.backing).rollbacks
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Span passed with the most recent staged change.
    pub fn last_span(&self) -> Option<SpanSelector> {
        lock(&self.backing).last_span
    }

    /// Commits `items` directly, bypassing staging.
    pub fn insert_committed<I>(&self, items: I)
    where
        I: IntoIterator<Item = CalendarItem>,
    {
        let mut backing = lock(&self.backing);
        for item in items {
            backing.upsert(item);
        }
    }

    // --- Fault injection ---

    pub fn fail_save_for(&self, title: impl Into<String>) {
        lock(&self.backing).faults.save_titles.insert(title.into());
    }

    pub fn fail_remove_for(&self, title: impl Into<String>) {
        lock(&self.backing).faults.remove_titles.insert(title.into());
    }

    pub fn fail_next_commit(&self, reason: impl Into<String>) {
        lock(&self.backing).faults.next_commit = Some(reason.into());
    }

    pub fn fail_fetch(&self, reason: impl Into<String>) {
        lock(&self.backing).faults.fetch = Some(reason.into());
    }

    pub fn clear_faults(&self) {
        lock(&self.backing).faults = Faults::default();
    }

    fn stage(&self, change: PendingChange, commit: bool) -> BridgeResult<()> {
        lock(&self.pending).push(change);
        if commit {
            self.commit()?;
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarStore for MemoryStore {
    fn save(&self, item: &CalendarItem, span: Option<SpanSelector>, commit: bool) -> BridgeResult<()> {
        {
            let mut backing = lock(&self.backing);
            if backing.faults.save_titles.contains(item.title()) {
                return Err(BridgeError::store_save(format!("store refused '{}'", item.title())));
            }
            backing.last_span = span;
        }
        debug!("Staged save of {} '{}'", item.category(), item.identifier());
        self.stage(PendingChange::Save(item.clone()), commit)
    }

    fn remove(&self, item: &CalendarItem, span: Option<SpanSelector>, commit: bool) -> BridgeResult<()> {
        {
            let mut backing = lock(&self.backing);
            if backing.faults.remove_titles.contains(item.title()) {
                return Err(BridgeError::store_remove(format!("store refused '{}'", item.title())));
            }
            if !backing.contains(item) {
                return Err(BridgeError::store_remove(format!(
                    "{} '{}' not found",
                    item.category(),
                    item.identifier()
                )));
            }
            backing.last_span = span;
        }
        debug!("Staged removal of {} '{}'", item.category(), item.identifier());
        self.stage(PendingChange::Remove(item.clone()), commit)
    }

    fn commit(&self) -> BridgeResult<()> {
        let changes: Vec<PendingChange> = lock(&self.pending).drain(..).collect();
        let mut backing = lock(&self.backing);

        if let Some(reason) = backing.faults.next_commit.take() {
            warn!("Commit rejected, dropping {} staged changes", changes.len());
            return Err(BridgeError::store_commit(reason));
        }

        for change in changes {
            match change {
                PendingChange::Save(item) => backing.upsert(item),
                PendingChange::Remove(item) => backing.delete(&item),
            }
        }
        backing.commits += 1;
        Ok(())
    }

    fn rollback(&self) {
        let discarded = {
            let mut pending = lock(&self.pending);
            let n = pending.len();
            pending.clear();
            n
        };
        lock(&self.backing).rollbacks += 1;
        debug!("Rolled back {} staged changes", discarded);
    }

    fn enumerate_events(&self, predicate: &EventPredicate, visitor: &mut dyn FnMut(&EventItem)) -> BridgeResult<()> {
        let matching: Vec<EventItem> = {
            let backing = lock(&self.backing);
            if let Some(reason) = &backing.faults.fetch {
                return Err(BridgeError::store_fetch(reason.clone()));
            }
            backing.events.iter().filter(|e| predicate.matches(e)).cloned().collect()
        };
        for event in &matching {
            visitor(event);
        }
        Ok(())
    }

    async fn fetch_reminders(&self, predicate: ReminderPredicate) -> BridgeResult<Vec<ReminderItem>> {
        let backing = Arc::clone(&self.backing);
        // Reminder queries complete off the caller's thread.
        tokio::task::spawn_blocking(move || {
            let backing = lock(&backing);
            if let Some(reason) = &backing.faults.fetch {
                return Err(BridgeError::store_fetch(reason.clone()));
            }
            Ok(backing
                .reminders
                .iter()
                .filter(|r| predicate.matches(r))
                .cloned()
                .collect())
        })
        .await
        .map_err(|e| BridgeError::store_fetch(format!("reminder fetch task failed: {}", e)))?
    }
}

/// Authorization front for [`MemoryStore`].
///
/// Each category starts `NotDetermined`. A prompt for an undetermined
/// category resolves to `Authorized` or `Denied` depending on
/// [`MemoryConnector::set_grant_on_prompt`]; the answer is computed on a
/// blocking worker thread.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    backing: Arc<Mutex<Backing>>,
    statuses: Arc<Mutex<HashMap<ItemCategory, AuthorizationStatus>>>,
    grant_on_prompt: Arc<Mutex<bool>>,
    prompts: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self {
            backing: Arc::new(Mutex::new(Backing::default())),
            statuses: Arc::new(Mutex::new(HashMap::new())),
            grant_on_prompt: Arc::new(Mutex::new(true)),
            prompts: Arc::new(AtomicUsize::new(0)),
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Connector with both categories already authorized.
    pub fn authorized() -> Self {
        let connector = Self::new();
        connector.set_status(ItemCategory::Event, AuthorizationStatus::Authorized);
        connector.set_status(ItemCategory::Reminder, AuthorizationStatus::Authorized);
        connector
    }

    pub fn set_status(&self, category: ItemCategory, status: AuthorizationStatus) {
        lock(&self.statuses).insert(category, status);
    }

    pub fn set_grant_on_prompt(&self, grant: bool) {
        *lock(&self.grant_on_prompt) = grant;
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Concrete handle for inspecting data and injecting faults.
    pub fn inspect(&self) -> MemoryStore {
        MemoryStore::with_backing(Arc::clone(&self.backing))
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    fn authorization_status(&self, category: ItemCategory) -> AuthorizationStatus {
        lock(&self.statuses).get(&category).copied().unwrap_or_default()
    }

    async fn request_access(&self, category: ItemCategory) -> BridgeResult<bool> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        let statuses = Arc::clone(&self.statuses);
        let grant_on_prompt = Arc::clone(&self.grant_on_prompt);

        tokio::task::spawn_blocking(move || {
            let mut statuses = lock(&statuses);
            let current = statuses.get(&category).copied().unwrap_or_default();
            match current {
                AuthorizationStatus::Authorized => true,
                AuthorizationStatus::Denied | AuthorizationStatus::Restricted => false,
                AuthorizationStatus::NotDetermined => {
                    let grant = *lock(&grant_on_prompt);
                    let next = if grant {
                        AuthorizationStatus::Authorized
                    } else {
                        AuthorizationStatus::Denied
                    };
                    statuses.insert(category, next);
                    grant
                }
            }
        })
        .await
        .map_err(|e| BridgeError::Other(anyhow::anyhow!("access prompt task failed: {}", e)))
    }

    fn open(&self) -> Arc<dyn CalendarStore> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Arc::new(MemoryStore::with_backing(Arc::clone(&self.backing)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn event(title: &str) -> CalendarItem {
        EventItem::new(title, Utc::now(), Duration::hours(1)).into()
    }

    #[test]
    fn test_staged_save_invisible_until_commit() {
        let store = MemoryStore::new();
        let item = event("Planning");

        store.save(&item, Some(SpanSelector::ThisEventOnly), false).unwrap();
        assert!(!store.contains(&item));
        assert_eq!(store.pending_count(), 1);

        store.commit().unwrap();
        assert!(store.contains(&item));
        assert_eq!(store.commit_count(), 1);
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn test_rollback_discards_pending() {
        let store = MemoryStore::new();
        store.save(&event("Retro"), None, false).unwrap();

        store.rollback();
        store.commit().unwrap();

        assert!(store.events().is_empty());
        assert_eq!(store.rollback_count(), 1);
    }

    #[test]
    fn test_save_fault_by_title() {
        let store = MemoryStore::new();
        store.fail_save_for("Broken");

        let err = store.save(&event("Broken"), None, false).unwrap_err();
        assert!(matches!(err, BridgeError::StoreSave(_)));
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn test_remove_unknown_item_fails() {
        let store = MemoryStore::new();
        let err = store.remove(&event("Ghost"), None, false).unwrap_err();
        assert!(matches!(err, BridgeError::StoreRemove(_)));
    }

    #[test]
    fn test_commit_fault_is_one_shot() {
        let store = MemoryStore::new();
        store.fail_next_commit("locked");
        store.save(&event("Demo"), None, false).unwrap();

        assert!(matches!(store.commit(), Err(BridgeError::StoreCommit(_))));
        assert!(store.events().is_empty());
        assert!(store.commit().is_ok());
    }

    #[test]
    fn test_handles_share_committed_data_not_pending() {
        let connector = MemoryConnector::authorized();
        let first = connector.open();
        let second = connector.open();
        let item = event("Shared");

        first.save(&item, None, false).unwrap();
        second.commit().unwrap();
        assert!(!connector.inspect().contains(&item));

        first.commit().unwrap();
        assert!(connector.inspect().contains(&item));
        assert_eq!(connector.open_count(), 2);
    }

    #[tokio::test]
    async fn test_prompt_resolves_undetermined_status() {
        let connector = MemoryConnector::new();
        assert_eq!(
            connector.authorization_status(ItemCategory::Reminder),
            AuthorizationStatus::NotDetermined
        );

        assert!(connector.request_access(ItemCategory::Reminder).await.unwrap());
        assert_eq!(
            connector.authorization_status(ItemCategory::Reminder),
            AuthorizationStatus::Authorized
        );
        assert_eq!(connector.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_prompt_denied() {
        let connector = MemoryConnector::new();
        connector.set_grant_on_prompt(false);

        assert!(!connector.request_access(ItemCategory::Event).await.unwrap());
        assert_eq!(
            connector.authorization_status(ItemCategory::Event),
            AuthorizationStatus::Denied
        );
    }

    #[tokio::test]
    async fn test_restricted_never_granted() {
        let connector = MemoryConnector::new();
        connector.set_status(ItemCategory::Event, AuthorizationStatus::Restricted);

        assert!(!connector.request_access(ItemCategory::Event).await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_reminders_honours_fault() {
        let store = MemoryStore::new();
        store.insert_committed(vec![ReminderItem::new("Call mom", None).into()]);

        let all = store.fetch_reminders(ReminderPredicate::default()).await.unwrap();
        assert_eq!(all.len(), 1);

        store.fail_fetch("offline");
        let err = store.fetch_reminders(ReminderPredicate::default()).await.unwrap_err();
        assert!(matches!(err, BridgeError::StoreFetch(_)));
    }
}
