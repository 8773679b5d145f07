use chrono::{Duration, Utc};
use std::sync::Arc;

use symptom_expert::session::{SessionStore, SESSION_TIMEOUT_SECS};

#[tokio::test]
async fn test_session_store_lifecycle() {
    let store = SessionStore::new();
    assert_eq!(store.timeout(), Duration::seconds(SESSION_TIMEOUT_SECS as i64));

    // Create and mutate a session
    let handle = store.get_or_create(None).await;
    let session_id = {
        let mut session = handle.lock().await;
        session.add_symptoms(["cough", "fever"]);
        session.session_id.clone()
    };

    // Fetch returns the same state
    let fetched = store.get(&session_id).await.unwrap();
    assert!(Arc::ptr_eq(&handle, &fetched));
    assert_eq!(fetched.lock().await.symptom_count(), 2);

    // Idle past the timeout: the next lookup sweeps it away
    fetched.lock().await.last_active = Utc::now() - Duration::minutes(45);
    let swept = store.sweep_expired().await;
    assert_eq!(swept.sessions_evicted, 1);
    assert!(store.get(&session_id).await.is_none());
    assert_eq!(store.session_count().await, 0);
}

#[tokio::test]
async fn test_lazy_sweep_on_create() {
    let store = SessionStore::new();

    let idle = store.get_or_create(Some("idle")).await;
    idle.lock().await.last_active = Utc::now() - Duration::hours(1);
    let active = store.get_or_create(Some("active")).await;
    active.lock().await.touch();

    // The lookup of "active" above already swept the idle session
    store.get_or_create(Some("newcomer")).await;

    assert_eq!(store.session_count().await, 2);
    assert!(store.get("idle").await.is_none());
    assert!(store.get("active").await.is_some());
}

#[tokio::test]
async fn test_custom_timeout() {
    let store = SessionStore::with_timeout(std::time::Duration::from_secs(60));

    let handle = store.get_or_create(Some("short")).await;
    handle.lock().await.last_active = Utc::now() - Duration::seconds(61);

    assert!(store.get("short").await.is_none());
}

#[tokio::test]
async fn test_background_cleanup_task() {
    let store = SessionStore::new();
    let handle = store.get_or_create(Some("stale")).await;
    handle.lock().await.last_active = Utc::now() - Duration::hours(2);

    let (task, shutdown_tx) = store.start_cleanup_task(std::time::Duration::from_millis(10));
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(store.session_count().await, 0);

    shutdown_tx.send(()).await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_many_sessions_are_independent() {
    let store = SessionStore::new();

    for i in 0..10 {
        let handle = store.get_or_create(Some(&format!("user_{}", i))).await;
        handle.lock().await.add_symptoms([format!("symptom_{}", i)]);
    }

    assert_eq!(store.session_count().await, 10);
    let handle = store.get("user_3").await.unwrap();
    let session = handle.lock().await;
    assert_eq!(session.symptom_count(), 1);
    assert!(session.symptoms.contains("symptom_3"));
}
