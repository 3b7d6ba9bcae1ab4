use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use sitecms::{UpdateOutcome, Value, auth::Role, backend::Backend};

use crate::helpers::{FaultyBackend, remote_content, test_store};

#[tokio::test]
async fn test_failed_write_keeps_local_edit_and_skips_history() {
    let backend = FaultyBackend::new();
    let store = test_store(backend.clone());
    store.initialize().await;
    backend.fail_update.store(true, Ordering::SeqCst);

    let outcome = store.update(Role::Admin, "about.title", "Local only", "Text Update");
    assert_eq!(outcome, UpdateOutcome::Applied { persisting: true });
    store.flush().await;

    assert_eq!(store.resolve("about.title"), Some(Value::from("Local only")));
    assert_eq!(backend.update_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        remote_content(backend.as_ref()).await.get_path("about.title"),
        Some(&Value::from("About Us"))
    );
    assert!(store.history().list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_no_remote_row_keeps_edits_in_memory() {
    let backend = FaultyBackend::new();
    backend.fail_insert.store(true, Ordering::SeqCst);
    let store = test_store(backend.clone());
    store.initialize().await;

    let outcome = store.update(Role::Admin, "about.title", "Offline", "Text Update");
    assert_eq!(outcome, UpdateOutcome::Applied { persisting: false });
    store.flush().await;

    assert_eq!(store.resolve("about.title"), Some(Value::from("Offline")));
    assert_eq!(backend.update_calls.load(Ordering::SeqCst), 0);
    assert!(backend.inner().list_history(None).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_out_of_order_writes_settle_on_latest_snapshot() {
    let backend = FaultyBackend::new();
    let store = test_store(backend.clone());
    store.initialize().await;

    // Earlier writes take longer than later ones
    backend.delay_updates([
        Duration::from_millis(60),
        Duration::from_millis(40),
        Duration::from_millis(20),
        Duration::from_millis(0),
    ]);

    let edits = [
        ("about.title", "First"),
        ("about.intro", "Second"),
        ("contact.phone", "Third"),
        ("about.title", "Fourth"),
    ];
    for (path, value) in edits {
        assert!(store.update(Role::Admin, path, value, "Text Update").is_applied());
    }
    store.flush().await;

    let remote = remote_content(backend.as_ref()).await;
    assert_eq!(remote, store.snapshot());
    assert_eq!(remote.get_path("about.title"), Some(&Value::from("Fourth")));
    assert_eq!(remote.get_path("about.intro"), Some(&Value::from("Second")));
    assert_eq!(remote.get_path("contact.phone"), Some(&Value::from("Third")));

    assert!(backend.update_calls.load(Ordering::SeqCst) <= edits.len());
    let history = store.history().list(None).await.unwrap();
    assert_eq!(history.len(), edits.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_editors_converge() {
    let backend = FaultyBackend::new();
    let store = test_store(backend.clone());
    store.initialize().await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store.update(Role::Hr, "careers.jobs[0].title", format!("Role {i}"), "Text Update");
            let path = format!("home.stats[{}].label", i % 4);
            store.update(Role::Admin, &path, format!("Stat {i}"), "Text Update");
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    store.flush().await;

    assert_eq!(remote_content(backend.as_ref()).await, store.snapshot());
    assert_eq!(store.history().list(None).await.unwrap().len(), 16);
}

#[tokio::test]
async fn test_edits_survive_restart() {
    let backend = FaultyBackend::new();
    let store = test_store(backend.clone());
    store.initialize().await;
    store.update(Role::Admin, "footer.tagline", "Here for you", "Text Update");
    store.flush().await;

    let restarted = test_store(Arc::clone(&backend) as Arc<dyn Backend>);
    restarted.initialize().await;
    assert_eq!(
        restarted.resolve("footer.tagline"),
        Some(Value::from("Here for you"))
    );
}
