//! The live content store.
//!
//! [`ContentStore`] owns the content tree the site renders from. It is an
//! explicit context object: the composition root builds one, calls
//! [`initialize`](ContentStore::initialize) once, and hands clones to
//! whatever needs to read or edit content.
//!
//! Edits are applied to the in-memory tree synchronously and persisted in the
//! background. A failed remote write is logged; the local edit stays.

mod anchor;
mod builder;
mod errors;
mod persist;

pub use anchor::ViewportAnchor;
pub use builder::{ContentStoreBuilder, load_defaults};
pub use errors::StoreError;

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::Result;
use crate::auth::{AccessPolicy, Role};
use crate::backend::{Backend, RowId};
use crate::clock::Clock;
use crate::content::indirection::{normalize_asset_url, resolve_display, write_target};
use crate::content::merge::deep_merge;
use crate::content::path::{self, PathBuf, PathError};
use crate::content::{Edit, Value};
use crate::history::HistoryRecorder;
use persist::{PersistTask, WriteSequencer};

/// Lifecycle of a [`ContentStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Built but `initialize` has not run; the tree holds the defaults.
    Uninitialized,
    /// The remote row is being fetched.
    Fetching,
    /// Initialized. `remote` is the row edits are persisted to, if any.
    Ready { remote: Option<RowId> },
}

/// What happened to an edit.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The tree was updated. `persisting` is true if a background write
    /// was started.
    Applied { persisting: bool },
    /// The role may not edit the path; nothing changed.
    Unauthorized,
    /// The path is malformed or conflicts with the tree shape; nothing changed.
    InvalidPath(PathError),
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied { .. })
    }
}

/// Where an edit lands relative to the path it was made on.
#[derive(Debug, Clone, Copy)]
enum Target {
    /// The path itself.
    Field,
    /// The asset the path references, if it holds an image reference.
    Reference,
}

struct Inner {
    backend: Arc<dyn Backend>,
    defaults: Value,
    policy: AccessPolicy,
    history: HistoryRecorder,
    anchor: Option<Arc<dyn ViewportAnchor>>,
    site_origin: Option<Url>,
    tree: RwLock<Value>,
    state: RwLock<StoreState>,
    edit_mode: AtomicBool,
    sequencer: Arc<WriteSequencer>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

/// Path-addressed content store with background persistence.
///
/// Cloning is cheap; all clones share the same tree.
#[derive(Clone)]
pub struct ContentStore {
    inner: Arc<Inner>,
}

impl ContentStore {
    pub fn builder(backend: Arc<dyn Backend>) -> ContentStoreBuilder {
        ContentStoreBuilder::new(backend)
    }

    pub(crate) fn from_parts(
        backend: Arc<dyn Backend>,
        defaults: Value,
        policy: AccessPolicy,
        clock: Arc<dyn Clock>,
        anchor: Option<Arc<dyn ViewportAnchor>>,
        site_origin: Option<Url>,
    ) -> Self {
        let history = HistoryRecorder::new(Arc::clone(&backend), clock);
        Self {
            inner: Arc::new(Inner {
                backend,
                tree: RwLock::new(defaults.clone()),
                defaults,
                policy,
                history,
                anchor,
                site_origin,
                state: RwLock::new(StoreState::Uninitialized),
                edit_mode: AtomicBool::new(false),
                sequencer: Arc::new(WriteSequencer::default()),
                in_flight: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Fetches the remote row and builds the live tree from it.
    ///
    /// - remote row present: the tree is the defaults with the row merged over
    ///   them, and edits are persisted to that row
    /// - no row: the tree is the defaults, and one attempt is made to seed the
    ///   remote store with them
    /// - fetch error: the tree is the defaults and nothing is persisted
    ///
    /// Errors are logged, never returned; the store is always `Ready` after.
    pub async fn initialize(&self) {
        self.set_state(StoreState::Fetching);

        let (tree, remote) = match self.inner.backend.fetch_config().await {
            Ok(Some(row)) if row.content.is_map() => {
                info!(row = %row.id, "Loaded site content");
                (deep_merge(&self.inner.defaults, &row.content), Some(row.id))
            }
            Ok(Some(row)) => {
                // Overwritten with a full tree by the next edit
                warn!(
                    row = %row.id,
                    found = row.content.type_name(),
                    "Stored site content is not a map; rendering defaults"
                );
                (self.inner.defaults.clone(), Some(row.id))
            }
            Ok(None) => {
                let remote = match self.inner.backend.insert_config(&self.inner.defaults).await {
                    Ok(id) => {
                        info!(row = %id, "Seeded site content with defaults");
                        Some(id)
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to seed site content; edits will not be persisted");
                        None
                    }
                };
                (self.inner.defaults.clone(), remote)
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch site content; rendering defaults");
                (self.inner.defaults.clone(), None)
            }
        };

        *self.write_tree() = tree;
        self.set_state(StoreState::Ready { remote });
    }

    pub fn state(&self) -> StoreState {
        *self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), StoreState::Ready { .. })
    }

    /// The row edits are persisted to, once known.
    pub fn remote_row(&self) -> Option<RowId> {
        match self.state() {
            StoreState::Ready { remote } => remote,
            _ => None,
        }
    }

    /// Current value at `path`, falling back to the defaults tree.
    ///
    /// Malformed paths read as absent. The fallback is per path, so deleting
    /// a field that also exists in the defaults does not hide it from reads:
    /// after deleting `about.values[2]` this still returns the default third
    /// value whenever the live list is shorter. [`snapshot`](Self::snapshot)
    /// shows the deletion.
    pub fn resolve(&self, path: &str) -> Option<Value> {
        let path = PathBuf::from_str(path).ok()?;
        let tree = self.read_tree();
        path::get(&tree, &path)
            .or_else(|| path::get(&self.inner.defaults, &path))
            .cloned()
    }

    /// Like [`resolve`](Self::resolve) but follows an image reference to the
    /// asset URL it names.
    pub fn resolve_display(&self, path: &str) -> Option<Value> {
        let path = PathBuf::from_str(path).ok()?;
        let tree = self.read_tree();
        resolve_display(&tree, &path)
            .or_else(|| resolve_display(&self.inner.defaults, &path))
            .cloned()
    }

    /// A copy of the whole live tree.
    pub fn snapshot(&self) -> Value {
        self.read_tree().clone()
    }

    pub fn defaults(&self) -> &Value {
        &self.inner.defaults
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.inner.policy
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }

    /// The content history recorder.
    pub fn history(&self) -> &HistoryRecorder {
        &self.inner.history
    }

    /// Clears the content history if `role` may.
    pub async fn clear_history(&self, role: Role) -> Result<usize> {
        self.inner.history.clear(role, &self.inner.policy).await
    }

    pub fn is_edit_mode(&self) -> bool {
        self.inner.edit_mode.load(Ordering::SeqCst)
    }

    pub fn set_edit_mode(&self, enabled: bool) {
        let was = self.inner.edit_mode.swap(enabled, Ordering::SeqCst);
        if was != enabled {
            debug!(enabled, "Edit mode changed");
        }
    }

    /// Applies an edit as `role`.
    ///
    /// Unauthorized edits and bad paths change nothing and are reported in
    /// the outcome only. An applied edit is visible to readers as soon as this
    /// returns; when the remote row is known, a background task persists the
    /// new tree and then appends a history entry. Must be called from within
    /// a tokio runtime for the background write to start.
    pub fn update(
        &self,
        role: Role,
        path: &str,
        edit: impl Into<Edit>,
        change_type: &str,
    ) -> UpdateOutcome {
        let path = match PathBuf::from_str(path) {
            Ok(path) => path,
            Err(e) => {
                warn!(path, error = %e, "Rejected edit with malformed path");
                return UpdateOutcome::InvalidPath(e);
            }
        };
        if !self.authorized(role, &path) {
            return UpdateOutcome::Unauthorized;
        }
        self.apply(role, path, edit.into(), change_type, Target::Field)
    }

    /// Applies an edit to a field that may hold an image reference.
    ///
    /// When the field currently holds `imagePaths.*`, the edit is written to
    /// the referenced asset instead so every page using it picks up the
    /// change. `role` must be allowed to edit both the field and the asset.
    /// The reference is read under the same lock the edit is applied with. Text values are normalized with
    /// [`normalize_asset_url`] against the configured site origin.
    pub fn update_display(
        &self,
        role: Role,
        path: &str,
        edit: impl Into<Edit>,
        change_type: &str,
    ) -> UpdateOutcome {
        let field = match PathBuf::from_str(path) {
            Ok(path) => path,
            Err(e) => {
                warn!(path, error = %e, "Rejected edit with malformed path");
                return UpdateOutcome::InvalidPath(e);
            }
        };
        if !self.authorized(role, &field) {
            return UpdateOutcome::Unauthorized;
        }

        let edit: Edit = edit.into();
        let edit = match edit {
            Edit::Set(Value::Text(raw)) => Edit::Set(Value::Text(normalize_asset_url(
                &raw,
                self.inner.site_origin.as_ref(),
            ))),
            other => other,
        };
        self.apply(role, field, edit, change_type, Target::Reference)
    }

    /// Waits for every background write started so far, including any
    /// started while waiting.
    pub async fn flush(&self) {
        loop {
            let pending = std::mem::take(
                &mut *self
                    .inner
                    .in_flight
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    error!(error = %e, "Persistence task panicked");
                }
            }
        }
    }

    fn authorized(&self, role: Role, path: &PathBuf) -> bool {
        let resource = AccessPolicy::resource_for_path(path);
        let allowed = self.inner.policy.can_edit(resource, role);
        if !allowed {
            debug!(%role, %resource, path = %path, "Ignoring edit from unauthorized role");
        }
        allowed
    }

    fn apply(
        &self,
        role: Role,
        field: PathBuf,
        edit: Edit,
        change_type: &str,
        target: Target,
    ) -> UpdateOutcome {
        let offset = self.inner.anchor.as_ref().and_then(|anchor| anchor.capture());

        let (path, snapshot, seq) = {
            let mut tree = self.write_tree();
            let path = match target {
                Target::Field => field,
                Target::Reference => {
                    let asset = write_target(&tree, &field);
                    if asset != field {
                        if !self.authorized(role, &asset) {
                            return UpdateOutcome::Unauthorized;
                        }
                        debug!(field = %field, target = %asset, "Writing through image reference");
                    }
                    asset
                }
            };
            let next = match path::set(&tree, &path, edit) {
                Ok(next) => next,
                Err(e) => {
                    warn!(path = %path, error = %e, "Edit conflicts with content shape");
                    return UpdateOutcome::InvalidPath(e);
                }
            };
            *tree = next;
            (path, tree.clone(), self.inner.sequencer.next())
        };

        if let (Some(anchor), Some(offset)) = (&self.inner.anchor, offset) {
            anchor.restore(offset);
        }

        let Some(row) = self.remote_row() else {
            debug!(path = %path, "No remote row; edit kept in memory only");
            return UpdateOutcome::Applied { persisting: false };
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(path = %path, "No tokio runtime; edit kept in memory only");
            return UpdateOutcome::Applied { persisting: false };
        };

        let task = PersistTask {
            backend: Arc::clone(&self.inner.backend),
            history: self.inner.history.clone(),
            sequencer: Arc::clone(&self.inner.sequencer),
            row,
            seq,
            snapshot,
            path,
            change_type: change_type.to_string(),
        };
        let handle = runtime.spawn(task.run());

        let mut in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|handle| !handle.is_finished());
        in_flight.push(handle);

        UpdateOutcome::Applied { persisting: true }
    }

    fn read_tree(&self) -> RwLockReadGuard<'_, Value> {
        self.inner.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tree(&self) -> RwLockWriteGuard<'_, Value> {
        self.inner.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: StoreState) {
        *self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }
}
