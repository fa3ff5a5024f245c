//! RecordStore integration tests: persistence, retention and recovery.

mod common;

use std::sync::Arc;

use chrono::TimeDelta;
use proptest::prelude::*;
use worry_core::{
    Feeling, FileBackend, JournalConfig, KeyValueBackend, MemoryBackend, RecordStore, StoreNotice,
    Worry, DEFAULT_STORAGE_KEY,
};

use common::{clock, epoch, store, titled};

// === Round-trip ===

fn feeling() -> impl Strategy<Value = Option<Feeling>> {
    prop_oneof![
        Just(None),
        Just(Some(Feeling::StillReal)),
        Just(Some(Feeling::Resolved)),
    ]
}

proptest! {
    #[test]
    fn test_upsert_then_load_round_trips(
        title in "[a-zA-Z0-9 ,.'!?]{0,40}",
        reasons_for in prop::collection::vec("[a-z ]{0,20}", 1..4),
        reasons_against in prop::collection::vec("[a-z ]{0,20}", 1..4),
        feeling in feeling(),
        later in 0i64..10_000,
    ) {
        let (store, _, clock) = store();
        let mut worry = Worry::blank("w1");
        prop_assert!(store.upsert(&mut worry));
        let created = worry.created_at;

        clock.advance(TimeDelta::seconds(later));
        worry.title = title.clone();
        worry.reasons_for = reasons_for.clone();
        worry.reasons_against = reasons_against.clone();
        worry.feeling = feeling;
        prop_assert!(store.upsert(&mut worry));

        let loaded = store.load_all();
        prop_assert_eq!(loaded.len(), 1);
        let stored = &loaded[0];
        prop_assert_eq!(&stored.title, &title);
        prop_assert_eq!(&stored.reasons_for, &reasons_for);
        prop_assert_eq!(&stored.reasons_against, &reasons_against);
        prop_assert_eq!(stored.feeling, feeling);
        prop_assert_eq!(stored.created_at, created);
        prop_assert_eq!(stored.updated_at, Some(epoch() + TimeDelta::seconds(later)));
    }
}

#[test]
fn test_upsert_sets_created_at_on_first_save() {
    let (store, _, _) = store();
    let mut worry = titled("w1", "exam");
    assert!(worry.created_at.is_none());
    assert!(store.upsert(&mut worry));
    assert_eq!(worry.created_at, Some(epoch()));
    assert_eq!(store.find("w1").unwrap().created_at, Some(epoch()));
}

#[test]
fn test_remove_reports_missing_ids() {
    let (store, _, _) = store();
    store.upsert(&mut titled("a", "one"));
    store.upsert(&mut titled("b", "two"));

    assert!(store.remove("a"));
    assert!(!store.remove("a"));
    let ids: Vec<String> = store.load_all().into_iter().map(|w| w.id).collect();
    assert_eq!(ids, vec!["b".to_string()]);
}

// === Retention ===

#[test]
fn test_cleanup_respects_retention_and_content() {
    let backend = Arc::new(MemoryBackend::new());
    let clock = clock();
    let store = RecordStore::new(backend, clock.clone(), &JournalConfig::default());
    let now = epoch() + TimeDelta::hours(200);

    clock.set(now - TimeDelta::hours(25));
    store.upsert(&mut Worry::blank("stale-empty"));
    clock.set(now - TimeDelta::hours(1));
    store.upsert(&mut Worry::blank("fresh-empty"));
    clock.set(now - TimeDelta::hours(100));
    let mut old = Worry::blank("old-with-reason");
    old.reasons_against[0] = "it went fine last time".to_string();
    store.upsert(&mut old);

    clock.set(now);
    assert_eq!(store.cleanup_empty_worries(), 1);

    let mut ids: Vec<String> = store.load_all().into_iter().map(|w| w.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["fresh-empty".to_string(), "old-with-reason".to_string()]);
    assert_eq!(store.cleanup_empty_worries(), 0);
}

#[test]
fn test_cleanup_window_is_configurable() {
    let clock = clock();
    let config = JournalConfig {
        retention_hours: 1,
        ..JournalConfig::default()
    };
    let store = RecordStore::new(MemoryBackend::new(), clock.clone(), &config);
    store.upsert(&mut Worry::blank("a"));

    clock.advance(TimeDelta::minutes(61));
    assert_eq!(store.cleanup_empty_worries(), 1);
    assert!(store.load_all().is_empty());
}

// === Corruption recovery ===

#[test]
fn test_invalid_json_recovers_with_one_notice() {
    let backend = Arc::new(MemoryBackend::with_value(DEFAULT_STORAGE_KEY, "{\"schemaVersion\": 1, \"entr"));
    let store = RecordStore::new(backend.clone(), clock(), &JournalConfig::default());
    let notices = store.subscribe();

    assert!(store.load_all().is_empty());
    assert!(matches!(notices.try_recv(), Ok(StoreNotice::Corrupted { .. })));
    assert!(notices.try_recv().is_err());

    assert!(store.load_all().is_empty());
    assert!(notices.try_recv().is_err());
    assert!(backend.raw(DEFAULT_STORAGE_KEY).is_none());
}

#[test]
fn test_wrong_shape_counts_as_corruption() {
    let raw = r#"{"schemaVersion":1,"entries":[{"title":"no id"}]}"#;
    let backend = Arc::new(MemoryBackend::with_value(DEFAULT_STORAGE_KEY, raw));
    let store = RecordStore::new(backend.clone(), clock(), &JournalConfig::default());
    let notices = store.subscribe();

    assert!(store.load_all().is_empty());
    assert!(matches!(notices.try_recv(), Ok(StoreNotice::Corrupted { .. })));
    assert!(backend.raw(DEFAULT_STORAGE_KEY).is_none());
}

#[test]
fn test_store_keeps_working_after_recovery() {
    let backend = Arc::new(MemoryBackend::with_value(DEFAULT_STORAGE_KEY, "garbage"));
    let store = RecordStore::new(backend, clock(), &JournalConfig::default());

    assert!(store.load_all().is_empty());
    assert!(store.upsert(&mut titled("a", "fresh start")));
    assert_eq!(store.load_all().len(), 1);
}

// === Failed writes ===

#[test]
fn test_quota_exceeded_keeps_previous_document() {
    let (store, backend, _) = store();
    store.upsert(&mut titled("a", "kept"));
    let notices = store.subscribe();

    backend.set_reject_writes(true);
    assert!(!store.upsert(&mut titled("b", "lost")));
    assert!(!store.remove("a"));
    backend.set_reject_writes(false);

    let ids: Vec<String> = store.load_all().into_iter().map(|w| w.id).collect();
    assert_eq!(ids, vec!["a".to_string()]);
    let reported: Vec<StoreNotice> = notices.try_iter().collect();
    assert_eq!(
        reported,
        vec![
            StoreNotice::WriteFailed { operation: "upsert" },
            StoreNotice::WriteFailed { operation: "remove" },
        ]
    );
}

#[test]
fn test_unreadable_document_is_never_overwritten() {
    let (store, backend, _) = store();
    store.upsert(&mut titled("a", "kept"));
    let notices = store.subscribe();

    backend.set_reject_reads(true);
    assert!(store.load_all().is_empty());
    assert!(!store.upsert(&mut titled("b", "would replace everything")));
    assert!(!store.remove("a"));
    assert_eq!(store.cleanup_empty_worries(), 0);
    backend.set_reject_reads(false);

    let ids: Vec<String> = store.load_all().into_iter().map(|w| w.id).collect();
    assert_eq!(ids, vec!["a".to_string()]);
    let reported: Vec<StoreNotice> = notices.try_iter().collect();
    assert_eq!(
        reported,
        vec![
            StoreNotice::WriteFailed { operation: "upsert" },
            StoreNotice::WriteFailed { operation: "remove" },
        ]
    );
}

// === File backend ===

#[test]
fn test_file_backend_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = RecordStore::new(FileBackend::new(dir.path()), clock(), &JournalConfig::default());
        assert!(store.is_available());
        store.upsert(&mut titled("a", "persisted"));
    }

    let store = RecordStore::new(FileBackend::new(dir.path()), clock(), &JournalConfig::default());
    let loaded = store.load_all();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "persisted");
    assert!(dir.path().join("worryJournal.store.json").exists());
    assert!(!dir.path().join("worryJournal.store.json.tmp").exists());
}

#[test]
fn test_file_backend_reads_legacy_array() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(dir.path());
    backend
        .set(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"old","title":"from before","reasonsFor":["a"],"reasonsAgainst":["b"],"feeling":"still"}]"#,
        )
        .unwrap();

    let store = RecordStore::new(backend, clock(), &JournalConfig::default());
    let loaded = store.load_all();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].feeling, Some(Feeling::StillReal));
}

#[test]
fn test_file_with_invalid_utf8_is_treated_as_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worryJournal.store.json");
    let mut bytes = br#"{"schemaVersion":1,"entries":[{"id":"old","title":"caf"#.to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(br#""}]}"#);
    std::fs::write(&path, bytes).unwrap();

    let store = RecordStore::new(FileBackend::new(dir.path()), clock(), &JournalConfig::default());
    let notices = store.subscribe();

    assert!(store.load_all().is_empty());
    assert!(matches!(notices.try_recv(), Ok(StoreNotice::Corrupted { .. })));
    assert!(!path.exists());

    assert!(store.upsert(&mut titled("new", "fresh")));
    assert!(notices.try_recv().is_err());
    assert_eq!(store.load_all().len(), 1);
}

#[test]
fn test_cleanup_with_longest_retention_does_not_panic() {
    let config = JournalConfig {
        retention_hours: u32::MAX,
        ..JournalConfig::default()
    };
    let store = RecordStore::new(MemoryBackend::new(), clock(), &config);
    store.upsert(&mut Worry::blank("a"));
    assert_eq!(store.cleanup_empty_worries(), 0);
    assert_eq!(store.load_all().len(), 1);
}
