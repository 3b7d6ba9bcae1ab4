//! Builder for [`ContentStore`].

use std::path::Path;
use std::sync::Arc;

use url::Url;

use super::anchor::ViewportAnchor;
use super::errors::StoreError;
use super::ContentStore;
use crate::Result;
use crate::auth::AccessPolicy;
use crate::backend::Backend;
use crate::clock::{Clock, SystemClock};
use crate::content::{Value, default_content};

/// Configures a [`ContentStore`].
///
/// ```
/// # use std::sync::Arc;
/// # use sitecms::{ContentStore, backend::InMemory, auth::AccessPolicy};
/// let store = ContentStore::builder(Arc::new(InMemory::new()))
///     .policy(AccessPolicy::default())
///     .build()?;
/// assert!(!store.is_ready());
/// # Ok::<(), sitecms::Error>(())
/// ```
pub struct ContentStoreBuilder {
    backend: Arc<dyn Backend>,
    defaults: Option<Value>,
    policy: AccessPolicy,
    clock: Arc<dyn Clock>,
    anchor: Option<Arc<dyn ViewportAnchor>>,
    site_origin: Option<Url>,
}

impl ContentStoreBuilder {
    pub(crate) fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            defaults: None,
            policy: AccessPolicy::default(),
            clock: Arc::new(SystemClock),
            anchor: None,
            site_origin: None,
        }
    }

    /// Replaces the bundled defaults tree.
    pub fn defaults(mut self, defaults: Value) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Clock used to stamp history entries.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn viewport_anchor(mut self, anchor: Arc<dyn ViewportAnchor>) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Origin the site is served from; same-origin asset URLs are stored as
    /// paths.
    pub fn site_origin(mut self, origin: Url) -> Self {
        self.site_origin = Some(origin);
        self
    }

    /// Builds the store in the `Uninitialized` state.
    ///
    /// Fails if the defaults tree is not a map.
    pub fn build(self) -> Result<ContentStore> {
        let defaults = self.defaults.unwrap_or_else(default_content);
        if !defaults.is_map() {
            return Err(StoreError::InvalidDefaults {
                found: defaults.type_name(),
            }
            .into());
        }
        Ok(ContentStore::from_parts(
            self.backend,
            defaults,
            self.policy,
            self.clock,
            self.anchor,
            self.site_origin,
        ))
    }
}

/// Reads a defaults tree from a JSON file.
pub async fn load_defaults(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::DefaultsFile {
            path: path.display().to_string(),
            source,
        })?;
    let value: Value = serde_json::from_str(&json).map_err(|source| StoreError::DefaultsParse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(value)
}
