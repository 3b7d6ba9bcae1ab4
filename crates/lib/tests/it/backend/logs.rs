use sitecms::history::AuditAction;

use super::{audit_entry, history_entry};
use crate::helpers::test_backend;

#[tokio::test]
async fn test_history_is_newest_first() {
    let backend = test_backend().await;
    backend.append_history(&history_entry(1_000, "about.title")).await.unwrap();
    backend.append_history(&history_entry(3_000, "about.intro")).await.unwrap();
    backend.append_history(&history_entry(2_000, "about.image")).await.unwrap();

    let sections: Vec<_> = backend
        .list_history(None)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.section)
        .collect();
    assert_eq!(sections, ["about.intro", "about.image", "about.title"]);

    let capped = backend.list_history(Some(2)).await.unwrap();
    assert_eq!(capped.len(), 2);
    assert_eq!(capped[0].section, "about.intro");
}

#[tokio::test]
async fn test_history_entry_fields_round_trip() {
    let backend = test_backend().await;
    let entry = history_entry(1_700_000_000_123, "contact.faq.questions[0].answer");
    backend.append_history(&entry).await.unwrap();

    let stored = backend.list_history(None).await.unwrap();
    assert_eq!(stored, vec![entry]);
}

#[tokio::test]
async fn test_equal_timestamps_keep_append_order_reversed() {
    let backend = test_backend().await;
    backend.append_history(&history_entry(5_000, "first")).await.unwrap();
    backend.append_history(&history_entry(5_000, "second")).await.unwrap();

    let listed = backend.list_history(None).await.unwrap();
    assert_eq!(listed[0].section, "second");
    assert_eq!(listed[1].section, "first");
}

#[tokio::test]
async fn test_clear_history_reports_count() {
    let backend = test_backend().await;
    assert_eq!(backend.clear_history().await.unwrap(), 0);

    for i in 0..3 {
        backend.append_history(&history_entry(i, "about.title")).await.unwrap();
    }
    assert_eq!(backend.clear_history().await.unwrap(), 3);
    assert!(backend.list_history(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_audit_is_capped_newest_first() {
    let backend = test_backend().await;
    for i in 0..120 {
        let action = if i % 2 == 0 {
            AuditAction::Login
        } else {
            AuditAction::Logout
        };
        backend
            .append_audit(&audit_entry(10_000 + i, &format!("user{i}"), action))
            .await
            .unwrap();
    }

    let recent = backend.list_audit(100).await.unwrap();
    assert_eq!(recent.len(), 100);
    assert_eq!(recent[0].username, "user119");
    assert_eq!(recent[0].action, AuditAction::Logout);
    assert_eq!(recent[99].username, "user20");
    assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}
