//! Background persistence of edits.
//!
//! Every applied edit gets a sequence number while the tree write lock is
//! still held, so sequence order is mutation order. The task for an edit
//! writes its snapshot only if no later snapshot has been written yet; a
//! later snapshot already contains the earlier edit. The remote row
//! therefore never moves backwards, whatever order the tasks run in.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::backend::{Backend, RowId};
use crate::content::{PathBuf, Value};
use crate::history::HistoryRecorder;

/// Issues write sequence numbers and remembers the newest one persisted.
#[derive(Debug, Default)]
pub(crate) struct WriteSequencer {
    issued: AtomicU64,
    persisted: Mutex<u64>,
}

impl WriteSequencer {
    /// Next sequence number. Call with the tree write lock held.
    pub(crate) fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// One edit's remote leg.
pub(crate) struct PersistTask {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) history: HistoryRecorder,
    pub(crate) sequencer: Arc<WriteSequencer>,
    pub(crate) row: RowId,
    pub(crate) seq: u64,
    pub(crate) snapshot: Value,
    pub(crate) path: PathBuf,
    pub(crate) change_type: String,
}

impl PersistTask {
    /// Writes the snapshot (unless superseded) and appends the history entry.
    ///
    /// Failures are logged only. There is no retry and the in-memory tree is
    /// not rolled back.
    pub(crate) async fn run(self) {
        {
            let mut persisted = self.sequencer.persisted.lock().await;
            if self.seq <= *persisted {
                debug!(
                    seq = self.seq,
                    persisted = *persisted,
                    path = %self.path,
                    "Snapshot superseded by a newer write; skipping remote update"
                );
            } else {
                match self.backend.update_config(self.row, &self.snapshot).await {
                    Ok(()) => *persisted = self.seq,
                    Err(e) => {
                        error!(
                            seq = self.seq,
                            row = %self.row,
                            path = %self.path,
                            error = %e,
                            "Failed to persist content edit"
                        );
                        return;
                    }
                }
            }
        }

        if let Err(e) = self.history.record(&self.path, &self.change_type).await {
            error!(path = %self.path, error = %e, "Failed to record content history");
        }
    }
}
