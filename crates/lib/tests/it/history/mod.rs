use std::str::FromStr;
use std::sync::Arc;

use sitecms::{
    FixedClock, PathBuf,
    auth::{AccessPolicy, Role},
    history::{AUDIT_LOG_WINDOW, AuditAction, AuditLog, HistoryRecorder, UNKNOWN_PAGE, page_label},
};

use crate::helpers::test_backend;

#[tokio::test]
async fn test_recorder_labels_entries_by_page() {
    let backend = test_backend().await;
    let recorder = HistoryRecorder::new(backend, Arc::new(FixedClock::default()));

    for (raw, page) in [
        ("meta.siteName", "Site Settings"),
        ("home.hero.title", "Home"),
        ("careers.jobs[0].title", "Careers"),
        ("imagePaths.hero.main", "Images"),
        ("promo.banner", UNKNOWN_PAGE),
    ] {
        let path = PathBuf::from_str(raw).unwrap();
        let entry = recorder.record(&path, "Text Update").await.unwrap();
        assert_eq!(entry.page, page, "label for {raw}");
        assert_eq!(entry.section, raw);
    }

    let listed = recorder.list(None).await.unwrap();
    assert_eq!(listed.len(), 5);
    assert_eq!(listed[0].section, "promo.banner");
    assert_eq!(recorder.list(Some(1)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_recorder_clear_checks_policy() {
    let backend = test_backend().await;
    let recorder = HistoryRecorder::new(backend, Arc::new(FixedClock::default()));
    let policy = AccessPolicy::default();

    recorder
        .record(&PathBuf::from_str("about.title").unwrap(), "Text Update")
        .await
        .unwrap();

    for role in [Role::Admin, Role::Hr, Role::Viewer] {
        let err = recorder.clear(role, &policy).await.unwrap_err();
        assert!(err.is_permission_denied(), "{role} cleared history");
    }
    assert_eq!(recorder.clear(Role::Master, &policy).await.unwrap(), 1);
}

#[tokio::test]
async fn test_audit_log_keeps_recent_window() {
    let backend = test_backend().await;
    let audit = AuditLog::new(backend, Arc::new(FixedClock::default()));

    for i in 0..(AUDIT_LOG_WINDOW + 5) {
        audit.record(&format!("op{i}"), AuditAction::Login).await.unwrap();
    }
    let last = audit.record("op-final", AuditAction::Logout).await.unwrap();

    let recent = audit.recent().await.unwrap();
    assert_eq!(recent.len(), AUDIT_LOG_WINDOW);
    assert_eq!(recent[0], last);
    assert!(recent.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    assert!(recent.iter().all(|e| e.username != "op0"));
}

#[test]
fn test_page_label_lookup() {
    assert_eq!(page_label("contact"), "Contact");
    assert_eq!(page_label("Contact"), UNKNOWN_PAGE);
    assert_eq!(page_label(""), UNKNOWN_PAGE);
}
