use std::sync::Arc;

use sitecms::{
    ContentStore, Edit, UpdateOutcome, Value,
    auth::{AccessPolicy, Resource, Role},
    history::UNKNOWN_PAGE,
};
use url::Url;

use crate::helpers::{ready_store, remote_content, test_backend};

#[tokio::test]
async fn test_edit_is_visible_then_persisted_with_history() {
    let (store, backend) = ready_store().await;

    let outcome = store.update(
        Role::Admin,
        "contact.faq.questions[0].answer",
        "New text",
        "Text Update",
    );
    assert_eq!(outcome, UpdateOutcome::Applied { persisting: true });
    // Visible before the background write completes
    assert_eq!(
        store.resolve("contact.faq.questions[0].answer"),
        Some(Value::from("New text"))
    );

    store.flush().await;

    let remote = remote_content(backend.as_ref()).await;
    assert_eq!(
        remote.get_path("contact.faq.questions[0].answer"),
        Some(&Value::from("New text"))
    );

    let history = store.history().list(None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].page, "Contact");
    assert_eq!(history[0].section, "contact.faq.questions[0].answer");
    assert_eq!(history[0].change_type, "Text Update");
}

#[tokio::test]
async fn test_unauthorized_edit_changes_nothing() {
    let (store, backend) = ready_store().await;
    let before = store.snapshot();

    let outcome = store.update(Role::Viewer, "about.title", "Hacked", "Text Update");
    assert_eq!(outcome, UpdateOutcome::Unauthorized);

    let outcome = store.update(Role::Hr, "home.hero.title", "Hiring!", "Text Update");
    assert_eq!(outcome, UpdateOutcome::Unauthorized);

    store.flush().await;
    assert_eq!(store.snapshot(), before);
    assert_eq!(remote_content(backend.as_ref()).await, before);
    assert!(store.history().list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_hr_edits_job_listings() {
    let (store, _backend) = ready_store().await;

    let outcome = store.update(
        Role::Hr,
        "careers.jobs[1].title",
        "Pharmacist",
        "Job Added",
    );
    assert!(outcome.is_applied());
    store.flush().await;

    assert_eq!(store.resolve("careers.jobs[1].title"), Some(Value::from("Pharmacist")));
    let history = store.history().list(None).await.unwrap();
    assert_eq!(history[0].page, "Careers");
}

#[tokio::test]
async fn test_invalid_paths_are_reported() {
    let (store, _backend) = ready_store().await;
    let before = store.snapshot();

    let outcome = store.update(Role::Master, "about.values[x]", "x", "Text Update");
    assert!(matches!(outcome, UpdateOutcome::InvalidPath(e) if e.is_parse_error()));

    // about.title is text and cannot hold children
    let outcome = store.update(Role::Master, "about.title.sub", "x", "Text Update");
    assert!(matches!(outcome, UpdateOutcome::InvalidPath(e) if e.is_type_conflict()));

    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn test_delete_list_item_and_history() {
    let (store, backend) = ready_store().await;

    let outcome = store.update(
        Role::Admin,
        "about.values[0]",
        Edit::Delete,
        "Item Removed",
    );
    assert!(outcome.is_applied());
    store.flush().await;

    assert_eq!(store.resolve("about.values[0].title"), Some(Value::from("Excellence")));
    let remote = remote_content(backend.as_ref()).await;
    assert_eq!(remote.get_path("about.values").and_then(Value::as_list).map(<[_]>::len), Some(2));
}

#[tokio::test]
async fn test_image_edit_writes_through_reference() {
    let backend = test_backend().await;
    let store = ContentStore::builder(Arc::clone(&backend))
        .site_origin(Url::parse("https://staurelia.example").unwrap())
        .build()
        .unwrap();
    store.initialize().await;

    let outcome = store.update_display(
        Role::Admin,
        "home.hero.image",
        "https://staurelia.example/uploads/hero.jpg",
        "Image Update",
    );
    assert!(outcome.is_applied());
    store.flush().await;

    // Every field using the shared asset shows the new image
    assert_eq!(
        store.resolve_display("home.slides[0].image"),
        Some(Value::from("/uploads/hero.jpg"))
    );
    assert_eq!(
        store.resolve("home.hero.image"),
        Some(Value::from("imagePaths.hero.main"))
    );

    let history = store.history().list(None).await.unwrap();
    assert_eq!(history[0].section, "imagePaths.hero.main");
    assert_eq!(history[0].page, "Images");
}

#[tokio::test]
async fn test_display_write_through_checks_asset_access() {
    let (store, backend) = ready_store().await;

    // Hr may point a careers field at a shared asset
    let outcome = store.update(Role::Hr, "careers.banner", "imagePaths.hero.main", "Text Update");
    assert!(outcome.is_applied());
    store.flush().await;
    let before = store.snapshot();

    let outcome = store.update_display(
        Role::Hr,
        "careers.banner",
        "https://elsewhere.example/x.png",
        "Image Update",
    );
    assert_eq!(outcome, UpdateOutcome::Unauthorized);
    assert_eq!(
        store.update(Role::Hr, "imagePaths.hero.main", "/x.png", "Image Update"),
        UpdateOutcome::Unauthorized
    );

    store.flush().await;
    assert_eq!(store.snapshot(), before);
    assert_eq!(
        store.resolve("imagePaths.hero.main"),
        Some(Value::from("/images/hero-main.jpg"))
    );
    assert_eq!(remote_content(backend.as_ref()).await, before);
    assert_eq!(store.history().list(None).await.unwrap().len(), 1);

    // A literal careers field is still Hr's to edit through the display path
    store.update(Role::Hr, "careers.banner", "/images/careers.jpg", "Text Update");
    let outcome = store.update_display(Role::Hr, "careers.banner", "/images/open-day.jpg", "Image Update");
    assert!(outcome.is_applied());
    assert_eq!(
        store.resolve("careers.banner"),
        Some(Value::from("/images/open-day.jpg"))
    );
}

#[tokio::test]
async fn test_out_of_range_index_is_rejected() {
    let (store, backend) = ready_store().await;
    let before = store.snapshot();

    for path in ["about.gallery[18446744073709551615].x", "home.slides[4000000000]"] {
        let outcome = store.update(Role::Admin, path, "v", "Text Update");
        assert!(
            matches!(&outcome, UpdateOutcome::InvalidPath(e) if e.is_out_of_range()),
            "{path}: {outcome:?}"
        );
    }

    store.flush().await;
    assert_eq!(store.snapshot(), before);
    assert_eq!(remote_content(backend.as_ref()).await, before);
    assert!(store.history().list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_section_uses_canonical_path() {
    let (store, _backend) = ready_store().await;

    store.update(Role::Admin, "home.slides.0.caption", "Welcome", "Text Update");
    store.flush().await;

    let history = store.history().list(None).await.unwrap();
    assert_eq!(history[0].section, "home.slides[0].caption");
}

#[tokio::test]
async fn test_unlabelled_page_history() {
    let (store, _backend) = ready_store().await;

    store.update(Role::Admin, "campaign.banner", "Flu shots", "Text Update");
    store.flush().await;

    let history = store.history().list(None).await.unwrap();
    assert_eq!(history[0].page, UNKNOWN_PAGE);
}

#[tokio::test]
async fn test_custom_policy_is_enforced() {
    let backend = test_backend().await;
    let policy = AccessPolicy::new().allow(Resource::Content, [Role::Viewer]);
    let store = ContentStore::builder(backend).policy(policy).build().unwrap();
    store.initialize().await;

    assert!(store.update(Role::Viewer, "about.title", "x", "Text Update").is_applied());
    assert_eq!(
        store.update(Role::Master, "about.title", "y", "Text Update"),
        UpdateOutcome::Unauthorized
    );
    store.flush().await;
}

#[tokio::test]
async fn test_clear_history_requires_history_access() {
    let (store, _backend) = ready_store().await;
    store.update(Role::Admin, "about.title", "A", "Text Update");
    store.update(Role::Admin, "about.intro", "B", "Text Update");
    store.flush().await;

    let err = store.clear_history(Role::Admin).await.unwrap_err();
    assert!(err.is_permission_denied());
    assert_eq!(store.history().list(None).await.unwrap().len(), 2);

    assert_eq!(store.clear_history(Role::SuperAdmin).await.unwrap(), 2);
    assert!(store.history().list(None).await.unwrap().is_empty());
}
