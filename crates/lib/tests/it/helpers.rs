use std::any::Any;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sitecms::{
    ContentStore, FixedClock, Result, Value,
    auth::Account,
    backend::{Backend, BackendError, ConfigRow, InMemory, RowId},
    history::{AuditLogEntry, HistoryEntry},
};

// ==========================
// CORE TEST FACTORIES
// ==========================

/// Creates a test backend based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory backend (default)
/// - "sqlite": SQLite in-memory backend (requires `sqlite` feature)
/// - "postgres": PostgreSQL backend (requires `postgres` feature and TEST_POSTGRES_URL)
///
/// # Example
/// ```bash
/// # Run tests with SQLite
/// TEST_BACKEND=sqlite cargo test --features sqlite
///
/// # Run tests with PostgreSQL
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/sitecms_test" \
///   cargo test --features postgres
/// ```
pub async fn test_backend() -> Arc<dyn Backend> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use sitecms::backend::database::Sqlite;
                Arc::new(
                    Sqlite::sqlite_in_memory()
                        .await
                        .expect("Failed to create SQLite backend"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use sitecms::backend::database::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/sitecms_test".to_string());
                Arc::new(
                    Postgres::connect_postgres_isolated(&url)
                        .await
                        .expect("Failed to connect to PostgreSQL"),
                )
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => Arc::new(InMemory::new()),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite, postgres")
        }
    }
}

/// Builds a store over `backend` with a [`FixedClock`], not yet initialized.
pub fn test_store(backend: Arc<dyn Backend>) -> ContentStore {
    ContentStore::builder(backend)
        .clock(Arc::new(FixedClock::default()))
        .build()
        .expect("Failed to build store")
}

/// Builds and initializes a store over a fresh test backend.
pub async fn ready_store() -> (ContentStore, Arc<dyn Backend>) {
    let backend = test_backend().await;
    let store = test_store(Arc::clone(&backend));
    store.initialize().await;
    (store, backend)
}

/// The content currently stored in the backend's configuration row.
pub async fn remote_content(backend: &dyn Backend) -> Value {
    backend
        .fetch_config()
        .await
        .expect("Failed to fetch config")
        .expect("No config row")
        .content
}

// ==========================
// FAULT INJECTION
// ==========================

/// InMemory wrapper that counts calls and fails or delays on demand.
#[derive(Default)]
pub struct FaultyBackend {
    inner: InMemory,
    pub fail_fetch: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_update: AtomicBool,
    pub insert_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    update_delays: Mutex<VecDeque<Duration>>,
}

impl FaultyBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Delays the next `update_config` calls by the given durations, in order.
    pub fn delay_updates(&self, delays: impl IntoIterator<Item = Duration>) {
        self.update_delays.lock().unwrap().extend(delays);
    }

    pub fn inner(&self) -> &InMemory {
        &self.inner
    }

    fn injected(what: &'static str) -> sitecms::Error {
        BackendError::InvalidRecord {
            table: what,
            reason: "injected failure".to_string(),
        }
        .into()
    }
}

#[async_trait]
impl Backend for FaultyBackend {
    async fn fetch_config(&self) -> Result<Option<ConfigRow>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Self::injected("site_config"));
        }
        self.inner.fetch_config().await
    }

    async fn insert_config(&self, content: &Value) -> Result<RowId> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(Self::injected("site_config"));
        }
        self.inner.insert_config(content).await
    }

    async fn update_config(&self, id: RowId, content: &Value) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.update_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Self::injected("site_config"));
        }
        self.inner.update_config(id, content).await
    }

    async fn append_history(&self, entry: &HistoryEntry) -> Result<()> {
        self.inner.append_history(entry).await
    }

    async fn list_history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        self.inner.list_history(limit).await
    }

    async fn clear_history(&self) -> Result<usize> {
        self.inner.clear_history().await
    }

    async fn append_audit(&self, entry: &AuditLogEntry) -> Result<()> {
        self.inner.append_audit(entry).await
    }

    async fn list_audit(&self, limit: usize) -> Result<Vec<AuditLogEntry>> {
        self.inner.list_audit(limit).await
    }

    async fn get_account(&self, username: &str) -> Result<Option<Account>> {
        self.inner.get_account(username).await
    }

    async fn put_account(&self, account: &Account) -> Result<()> {
        self.inner.put_account(account).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.inner.list_accounts().await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
