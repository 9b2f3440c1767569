//! Atomic corpus snapshot handle.
//!
//! Readers clone an `Arc<Corpus>` out of the handle and answer queries
//! against that snapshot; a rebuild constructs the next snapshot aside and
//! installs it with a single write-lock swap. No reader ever observes a
//! half-built index, and queries in flight keep the prior snapshot alive
//! until they finish.

use crate::corpus::Corpus;
use crate::error::RetrievalError;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum SnapshotState {
    /// No snapshot has been installed yet.
    NotReady,
    Ready(Arc<Corpus>),
    /// A build failed fatally (inconsistent embedding dimensionality). The
    /// handle refuses to serve until a successful rebuild replaces it —
    /// never silently wrong results.
    Poisoned(RetrievalError),
}

/// Shared handle to the current corpus snapshot.
#[derive(Debug, Default)]
pub struct CorpusHandle {
    state: RwLock<SnapshotState>,
}

impl Default for SnapshotState {
    fn default() -> Self {
        SnapshotState::NotReady
    }
}

impl CorpusHandle {
    /// Creates a handle with no snapshot installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot.
    ///
    /// `Err(NotReady)` before the first install; after a failed install the
    /// build error itself (e.g. `DimensionMismatch`) is returned on every
    /// call until a successful rebuild.
    pub fn current(&self) -> Result<Arc<Corpus>, RetrievalError> {
        match &*self.state.read() {
            SnapshotState::NotReady => Err(RetrievalError::NotReady),
            SnapshotState::Ready(corpus) => Ok(Arc::clone(corpus)),
            SnapshotState::Poisoned(err) => Err(err.clone()),
        }
    }

    /// Atomically installs the outcome of a corpus build.
    ///
    /// A successful build becomes the snapshot all subsequent queries see; a
    /// failed build poisons the handle instead.
    pub fn install(&self, built: Result<Corpus, RetrievalError>) {
        let next = match built {
            Ok(corpus) => SnapshotState::Ready(Arc::new(corpus)),
            Err(err) => SnapshotState::Poisoned(err),
        };
        *self.state.write() = next;
    }

    /// Document count of the current snapshot (0 when not ready).
    pub fn corpus_size(&self) -> usize {
        match &*self.state.read() {
            SnapshotState::Ready(corpus) => corpus.len(),
            _ => 0,
        }
    }

    /// Returns `true` once a snapshot is installed and serving.
    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.read(), SnapshotState::Ready(_))
    }
}
