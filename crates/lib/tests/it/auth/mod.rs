use std::sync::Arc;

use sitecms::{
    FixedClock,
    auth::{AccessPolicy, CredentialStore, Role, Session},
    backend::Backend,
    history::{AuditAction, AuditLog},
};

use crate::helpers::test_backend;

async fn credentials() -> (CredentialStore, Arc<dyn Backend>) {
    let backend = test_backend().await;
    let audit = AuditLog::new(Arc::clone(&backend), Arc::new(FixedClock::default()));
    let store = CredentialStore::new(
        Arc::clone(&backend),
        audit,
        Arc::new(AccessPolicy::default()),
    );
    (store, backend)
}

#[tokio::test]
async fn test_bootstrap_master_only_once() {
    let (creds, _backend) = credentials().await;

    assert!(creds.bootstrap_master("root", "first-secret").await.unwrap());
    assert!(!creds.bootstrap_master("other", "second-secret").await.unwrap());

    let accounts = creds.list_accounts(Role::Master).await.unwrap();
    assert_eq!(accounts, [("root".to_string(), Role::Master)]);
}

#[tokio::test]
async fn test_login_logout_are_audited() {
    let (creds, _backend) = credentials().await;
    creds.bootstrap_master("root", "s3cret").await.unwrap();

    let session = creds.authenticate("root", "s3cret").await.unwrap().unwrap();
    assert_eq!(
        session,
        Session {
            username: "root".to_string(),
            role: Role::Master
        }
    );
    creds.logout(&session).await.unwrap();

    let recent = creds.audit().recent().await.unwrap();
    let actions: Vec<_> = recent.iter().map(|e| (e.username.as_str(), e.action)).collect();
    assert_eq!(
        actions,
        [("root", AuditAction::Logout), ("root", AuditAction::Login)]
    );
}

#[tokio::test]
async fn test_failed_login_is_not_audited() {
    let (creds, _backend) = credentials().await;
    creds.bootstrap_master("root", "s3cret").await.unwrap();

    assert!(creds.authenticate("root", "wrong").await.unwrap().is_none());
    assert!(creds.authenticate("nobody", "s3cret").await.unwrap().is_none());
    assert!(creds.audit().recent().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_account_management_requires_credentials_access() {
    let (creds, backend) = credentials().await;
    creds.bootstrap_master("root", "s3cret").await.unwrap();

    creds
        .create_account(Role::Master, "editor", "pw", Role::Admin)
        .await
        .unwrap();

    let err = creds
        .create_account(Role::Admin, "sneaky", "pw", Role::Master)
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert!(backend.get_account("sneaky").await.unwrap().is_none());

    let err = creds
        .create_account(Role::SuperAdmin, "editor", "pw", Role::Hr)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    assert!(creds.list_accounts(Role::Admin).await.unwrap_err().is_permission_denied());
}

#[tokio::test]
async fn test_change_password() {
    let (creds, _backend) = credentials().await;
    creds.bootstrap_master("root", "s3cret").await.unwrap();
    creds
        .create_account(Role::Master, "editor", "old", Role::Admin)
        .await
        .unwrap();
    let editor = creds.authenticate("editor", "old").await.unwrap().unwrap();

    // Own password
    creds.change_password(&editor, "editor", "new").await.unwrap();
    assert!(creds.authenticate("editor", "old").await.unwrap().is_none());
    assert!(creds.authenticate("editor", "new").await.unwrap().is_some());

    // Someone else's
    let err = creds.change_password(&editor, "root", "x").await.unwrap_err();
    assert!(err.is_permission_denied());

    let root = creds.authenticate("root", "s3cret").await.unwrap().unwrap();
    let err = creds.change_password(&root, "ghost", "x").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_invalid_accounts_are_rejected() {
    let (creds, _backend) = credentials().await;

    let err = creds.bootstrap_master("has space", "pw").await.unwrap_err();
    assert!(err.is_authentication_error());
    let err = creds.bootstrap_master("root", "").await.unwrap_err();
    assert!(err.is_authentication_error());
    assert!(creds.list_accounts(Role::Master).await.unwrap().is_empty());
}
