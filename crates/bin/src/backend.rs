//! Backend creation and utility functions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sitecms::backend::{
    Backend,
    database::{InMemory, Postgres, Sqlite},
};

use crate::cli::{Backend as BackendKind, ServeArgs};

/// File the in-memory backend is saved to inside the data directory.
pub const IN_MEMORY_FILE: &str = "sitecms.json";

/// File the SQLite backend opens inside the data directory.
pub const SQLITE_FILE: &str = "sitecms.db";

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// The configured data directory, defaulting to the working directory.
pub fn data_dir(args: &ServeArgs) -> PathBuf {
    args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

/// Create the appropriate backend based on configuration
pub async fn create_backend(
    args: &ServeArgs,
) -> Result<Arc<dyn Backend>, Box<dyn std::error::Error>> {
    let data_dir = data_dir(args);
    tokio::fs::create_dir_all(&data_dir).await?;

    match args.backend {
        BackendKind::Sqlite => {
            let db_path = data_dir.join(SQLITE_FILE);
            tracing::info!(path = %db_path.display(), "Using SQLite backend");
            Ok(Arc::new(Sqlite::open_sqlite(&db_path).await?))
        }
        BackendKind::Postgres => {
            let url = args
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or SITECMS_POSTGRES_URL")?;

            let display_url = redact_postgres_url(url);
            tracing::info!(url = %display_url, "Connecting to PostgreSQL backend");

            match Postgres::connect_postgres(url).await {
                Ok(backend) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Arc::new(backend))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {display_url}: {e}").into())
                }
            }
        }
        BackendKind::Inmemory => Ok(Arc::new(load_in_memory(&data_dir.join(IN_MEMORY_FILE)).await)),
    }
}

/// Loads a saved in-memory backend, starting empty if the file is unusable.
async fn load_in_memory(path: &Path) -> InMemory {
    tracing::info!(path = %path.display(), "Using in-memory backend with file persistence");
    match InMemory::load_from_file(path).await {
        Ok(backend) => backend,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load saved content; starting empty");
            InMemory::new()
        }
    }
}
