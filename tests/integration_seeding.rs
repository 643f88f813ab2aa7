use calendar_bridge::fixtures::{load_items, synthetic_events, synthetic_reminders};
use calendar_bridge::{BridgeConfig, CalendarBridge, Dispatcher, ItemCategory, MemoryConnector, SpanSelector};
use chrono::{Duration, Utc};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_seed_and_teardown_reminders_from_config_file() {
    let config_file = write_temp(r#"{ "category": "reminder", "window_reminders": false }"#);
    let config = BridgeConfig::from_file(config_file.path()).unwrap();
    assert_eq!(config.category, ItemCategory::Reminder);

    let connector = MemoryConnector::new();
    let bridge = CalendarBridge::new(Arc::new(connector.clone()), config);

    // 1. Seed prompts for access, then commits the batch once
    let items = synthetic_reminders(5, Utc::now());
    let seeded = bridge.seed(&items).await;
    assert!(seeded.success);
    assert_eq!(seeded.items, 5);
    assert_eq!(connector.prompt_count(), 1);
    assert_eq!(connector.inspect().reminders().len(), 5);

    // 2. Seeding again takes the authorized fast path
    let more = synthetic_reminders(2, Utc::now());
    assert!(bridge.seed(&more).await.success);
    assert_eq!(connector.prompt_count(), 1);

    // 3. Teardown clears the partition
    let cleared = bridge.teardown().await;
    assert!(cleared.success);
    assert_eq!(cleared.items, 7);
    assert!(connector.inspect().reminders().is_empty());
}

#[tokio::test]
async fn test_seed_events_from_fixture_file() {
    let fixtures = write_temp(
        r#"[
            {"kind": "event", "identifier": "kickoff", "title": "Kickoff", "notes": null,
             "start": "2026-10-20T09:00:00Z", "end": "2026-10-20T10:00:00Z", "calendar": "QA"},
            {"kind": "event", "identifier": "demo", "title": "Demo", "notes": "bring laptop",
             "start": "2026-10-21T15:00:00Z", "end": "2026-10-21T16:00:00Z", "all_day": false, "calendar": "QA"}
        ]"#,
    );
    let items = load_items(fixtures.path()).unwrap();

    let connector = MemoryConnector::authorized();
    let config = BridgeConfig {
        event_span: SpanSelector::FutureEvents,
        ..BridgeConfig::default()
    };
    let bridge = CalendarBridge::new(Arc::new(connector.clone()), config);

    let outcome = bridge.seed(&items).await;

    assert!(outcome.success);
    let events = connector.inspect().events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.calendar.as_deref() == Some("QA")));
    assert_eq!(connector.inspect().last_span(), Some(SpanSelector::FutureEvents));
}

#[tokio::test]
async fn test_teardown_leaves_events_outside_default_window() {
    let connector = MemoryConnector::authorized();
    let bridge = CalendarBridge::new(Arc::new(connector.clone()), BridgeConfig::default());
    bridge.request_access(ItemCategory::Event).await;

    let near = synthetic_events(3, Utc::now());
    let far = synthetic_events(1, Utc::now() + Duration::days(800));
    connector.inspect().insert_committed(near.into_iter().chain(far.clone()));

    let outcome = bridge.teardown().await;

    assert!(outcome.success);
    assert_eq!(outcome.items, 3);
    let left = connector.inspect();
    assert_eq!(left.events().len(), 1);
    assert!(left.contains(&far[0]));
}

#[tokio::test]
async fn test_bridge_on_explicit_dispatcher() {
    let dispatcher = Dispatcher::on(&tokio::runtime::Handle::current(), "ui-tests");
    let connector = MemoryConnector::new();
    let bridge = CalendarBridge::with_dispatcher(Arc::new(connector.clone()), BridgeConfig::default(), dispatcher);
    assert_eq!(bridge.dispatcher().label(), "ui-tests");

    let access = bridge.request_access(ItemCategory::Event).await;
    assert!(access.granted);

    let outcome = bridge.add_all(&synthetic_events(4, Utc::now()), ItemCategory::Event).await;
    assert!(outcome.success);
    assert_eq!(connector.inspect().commit_count(), 1);
}
