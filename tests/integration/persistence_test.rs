//! Integration tests for the persistence layer on a real state database.

use askdb::persistence::{
    Favorites, KeyValueStore, QueryHistory, QueryStatus, SessionTracker, SettingsStore, StateDb,
    UserSettings, FAVORITES_KEY, HISTORY_KEY, MAX_HISTORY_ENTRIES,
};
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tempfile::tempdir;

async fn create_test_db() -> (Arc<StateDb>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test_state.db");
    let db = StateDb::open(&path).await.unwrap();
    (Arc::new(db), dir)
}

fn store(db: &Arc<StateDb>) -> Arc<dyn KeyValueStore> {
    db.clone()
}

#[tokio::test]
async fn test_state_db_creation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");

    let db = StateDb::open(&path).await.unwrap();
    assert!(path.exists());
    assert_eq!(db.path(), path.as_path());
    db.close().await;
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let db = Arc::new(StateDb::open(&path).await.unwrap());
        let mut history = QueryHistory::open(store(&db)).await;
        history
            .add("nike shirts", QueryStatus::Success, 12, 3, "SELECT 1")
            .await;
        history
            .add("broken", QueryStatus::Error, 4, 0, "")
            .await;
        db.close().await;
    }

    let db = Arc::new(StateDb::open(&path).await.unwrap());
    let history = QueryHistory::open(store(&db)).await;
    let queries: Vec<&str> = history.entries().iter().map(|e| e.query.as_str()).collect();
    assert_eq!(queries, vec!["broken", "nike shirts"]);
    assert_eq!(history.entries()[1].rows, 3);
    db.close().await;
}

#[tokio::test]
async fn test_history_is_capped() {
    let (db, _dir) = create_test_db().await;
    let mut history = QueryHistory::open(store(&db)).await;
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    for i in 0..(MAX_HISTORY_ENTRIES + 5) {
        history
            .add_at(&format!("q{i}"), QueryStatus::Success, 1, 0, "", at)
            .await;
    }

    assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
    assert_eq!(history.entries()[0].query, format!("q{}", MAX_HISTORY_ENTRIES + 4));

    // Same timestamp for every entry; ids stay unique and descending.
    let ids: Vec<i64> = history.entries().iter().map(|e| e.id).collect();
    assert!(ids.windows(2).all(|w| w[0] > w[1]));

    let reopened = QueryHistory::open(store(&db)).await;
    assert_eq!(reopened.len(), MAX_HISTORY_ENTRIES);
}

#[tokio::test]
async fn test_history_clear_removes_key() {
    let (db, _dir) = create_test_db().await;
    let mut history = QueryHistory::open(store(&db)).await;
    history.add("q", QueryStatus::Success, 1, 0, "").await;
    assert!(db.load(HISTORY_KEY).await.unwrap().is_some());

    assert_eq!(history.clear().await, 1);
    assert_eq!(db.load(HISTORY_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_favorites_stored_as_json() {
    let (db, _dir) = create_test_db().await;
    let mut favorites = Favorites::open(store(&db)).await;
    let saved = favorites.save("revenue this month", None).await;
    assert_eq!(saved.name, "revenue this month");

    let raw = db.load(FAVORITES_KEY).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["query"], "revenue this month");
    assert!(value[0].get("savedAt").is_some());

    assert!(favorites.remove(saved.id).await);
    assert!(!favorites.remove(saved.id).await);
    assert!(Favorites::open(store(&db)).await.list().is_empty());
}

#[tokio::test]
async fn test_corrupt_value_falls_back_to_default() {
    let (db, _dir) = create_test_db().await;
    db.save(HISTORY_KEY, "not json").await.unwrap();

    let mut history = QueryHistory::open(store(&db)).await;
    assert!(history.is_empty());

    // The next write replaces the unreadable value.
    history.add("q", QueryStatus::Success, 1, 0, "").await;
    assert_eq!(QueryHistory::open(store(&db)).await.len(), 1);
}

#[tokio::test]
async fn test_settings_roundtrip() {
    let (db, _dir) = create_test_db().await;
    let mut settings = SettingsStore::open(store(&db)).await;
    assert_eq!(settings.settings(), &UserSettings::default());

    let updated = UserSettings {
        display_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        notifications: false,
    };
    assert!(settings.save(updated.clone()).await);

    let reopened = SettingsStore::open(store(&db)).await;
    assert_eq!(reopened.settings(), &updated);
    assert_eq!(reopened.settings().initials(), "AL");
}

#[tokio::test]
async fn test_session_metrics() {
    let (db, _dir) = create_test_db().await;
    let mut tracker = SessionTracker::open(store(&db)).await;

    tracker.record(true, 100).await;
    tracker.record(false, 201).await;
    tracker.record(true, 300).await;

    let metrics = tracker.metrics();
    assert_eq!(metrics.total_queries, 3);
    assert_eq!(metrics.successful_queries, 2);
    assert_eq!(metrics.average_time(), 200);

    tracker.reset().await;
    assert_eq!(SessionTracker::open(store(&db)).await.metrics().total_queries, 0);
}
