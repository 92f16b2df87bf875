//! Cache write serialization.
//!
//! Provides `CacheWriter`, the only component that mutates the browse cache.
//! Sessions and the account service hold a clonable [`CacheWriterHandle`];
//! operations are queued on a channel and applied one at a time, so an
//! import never interleaves with a reset.
//!
//! ## Generations
//!
//! Every path has a generation counter that grows each time the path is
//! reset. A session captures the generation before it starts a network
//! request and hands it back with the page. If the path was reset in the
//! meantime the page is discarded with [`SyncError::StaleGeneration`]
//! instead of repopulating the freshly cleared cache with old data.

use std::collections::HashMap;
use std::sync::Arc;

use matchbox_core::domain::{BrowsePath, PaginationState};
use matchbox_core::ports::{IBrowseRepository, ListingPage, RemoteEntry};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use crate::import::prepare_batch;
use crate::SyncError;

/// Result type for write operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Capacity of the operation queue
const QUEUE_CAPACITY: usize = 100;

/// Counts reported by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Entries written to the cache
    pub imported: usize,
    /// Raw entries dropped for missing or unsupported fields
    pub skipped: usize,
}

// ============================================================================
// WriteOp enum
// ============================================================================

/// Operations processed by the CacheWriter
///
/// Each variant carries its data plus a oneshot sender for the result.
#[derive(Debug)]
pub enum WriteOp {
    /// Import raw entries listed under `path`
    Import {
        path: BrowsePath,
        entries: Vec<RemoteEntry>,
        reply: oneshot::Sender<Result<ImportOutcome>>,
    },

    /// Import a listing page and record its cursor in one transaction,
    /// provided `path` is still at `generation`
    CommitPage {
        path: BrowsePath,
        generation: u64,
        page: ListingPage,
        reply: oneshot::Sender<Result<ImportOutcome>>,
    },

    /// Record pagination state for a path
    SavePagination {
        path: BrowsePath,
        state: PaginationState,
        reply: oneshot::Sender<Result<()>>,
    },

    /// Delete a path's entries and pagination state
    ResetPath {
        path: BrowsePath,
        reply: oneshot::Sender<Result<u64>>,
    },

    /// Delete everything
    ResetAll { reply: oneshot::Sender<Result<()>> },

    /// Read the current generation of a path
    Generation {
        path: BrowsePath,
        reply: oneshot::Sender<Result<u64>>,
    },
}

// ============================================================================
// CacheWriterHandle
// ============================================================================

/// Handle for sending operations to the CacheWriter
///
/// This handle can be cloned and shared across tasks. Every method returns
/// once the writer has applied the operation.
#[derive(Clone)]
pub struct CacheWriterHandle {
    tx: mpsc::Sender<WriteOp>,
}

impl CacheWriterHandle {
    async fn request<T>(&self, op: WriteOp, rx: oneshot::Receiver<Result<T>>) -> Result<T> {
        self.tx
            .send(op)
            .await
            .map_err(|_| SyncError::WriterStopped("CacheWriter task has stopped".to_string()))?;

        rx.await
            .map_err(|_| SyncError::WriterStopped("CacheWriter response lost".to_string()))?
    }

    /// Imports raw entries under `path` without touching pagination state
    pub async fn import(&self, path: BrowsePath, entries: Vec<RemoteEntry>) -> Result<ImportOutcome> {
        let (tx, rx) = oneshot::channel();
        let op = WriteOp::Import {
            path,
            entries,
            reply: tx,
        };
        self.request(op, rx).await
    }

    /// Imports a page and stores its cursor and has-more flag atomically
    ///
    /// # Errors
    /// [`SyncError::StaleGeneration`] if `path` was reset after `generation`
    /// was read; nothing is written in that case.
    pub async fn commit_page(
        &self,
        path: BrowsePath,
        generation: u64,
        page: ListingPage,
    ) -> Result<ImportOutcome> {
        let (tx, rx) = oneshot::channel();
        let op = WriteOp::CommitPage {
            path,
            generation,
            page,
            reply: tx,
        };
        self.request(op, rx).await
    }

    /// Records pagination state; an empty state clears the record
    pub async fn save_pagination(&self, path: BrowsePath, state: PaginationState) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let op = WriteOp::SavePagination {
            path,
            state,
            reply: tx,
        };
        self.request(op, rx).await
    }

    /// Deletes the entries and pagination state of `path` in one transaction
    ///
    /// Returns the number of entries removed.
    pub async fn reset_path(&self, path: BrowsePath) -> Result<u64> {
        let (tx, rx) = oneshot::channel();
        self.request(WriteOp::ResetPath { path, reply: tx }, rx).await
    }

    /// Deletes all cached entries and pagination state
    pub async fn reset_all(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(WriteOp::ResetAll { reply: tx }, rx).await
    }

    /// Current generation of `path`
    pub async fn generation(&self, path: BrowsePath) -> Result<u64> {
        let (tx, rx) = oneshot::channel();
        self.request(WriteOp::Generation { path, reply: tx }, rx).await
    }
}

// ============================================================================
// CacheWriter
// ============================================================================

/// Applies cache mutations sequentially
///
/// Run [`CacheWriter::run`] on its own task; it stops when every handle has
/// been dropped.
pub struct CacheWriter {
    rx: mpsc::Receiver<WriteOp>,
    repository: Arc<dyn IBrowseRepository>,
    /// Bumped by `ResetAll`; added to every path's own counter
    epoch: u64,
    /// One counter per path ever reset, kept for the life of the writer.
    /// Entries are never pruned: a dropped counter would restart at zero and
    /// accept a page fetched before the reset.
    generations: HashMap<BrowsePath, u64>,
}

impl CacheWriter {
    /// Creates a writer over `repository` and returns it with its handle
    pub fn new(repository: Arc<dyn IBrowseRepository>) -> (Self, CacheWriterHandle) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);

        let writer = Self {
            rx,
            repository,
            epoch: 0,
            generations: HashMap::new(),
        };

        (writer, CacheWriterHandle { tx })
    }

    /// Creates a writer and runs it on a new tokio task
    pub fn spawn(repository: Arc<dyn IBrowseRepository>) -> CacheWriterHandle {
        let (writer, handle) = Self::new(repository);
        tokio::spawn(writer.run());
        handle
    }

    /// Processes operations until all handles are dropped
    pub async fn run(mut self) {
        info!("CacheWriter started");

        while let Some(op) = self.rx.recv().await {
            self.process_operation(op).await;
        }

        info!("CacheWriter stopped");
    }

    fn generation_of(&self, path: &BrowsePath) -> u64 {
        self.epoch + self.generations.get(path).copied().unwrap_or(0)
    }

    async fn process_operation(&mut self, op: WriteOp) {
        match op {
            WriteOp::Import {
                path,
                entries,
                reply,
            } => {
                trace!(path = %path, count = entries.len(), "Processing Import");
                let result = self.import(&path, &entries).await;
                let _ = reply.send(result);
            }

            WriteOp::CommitPage {
                path,
                generation,
                page,
                reply,
            } => {
                trace!(path = %path, generation, "Processing CommitPage");
                let result = self.commit_page(&path, generation, page).await;
                let _ = reply.send(result);
            }

            WriteOp::SavePagination { path, state, reply } => {
                trace!(path = %path, "Processing SavePagination");
                let result = self
                    .repository
                    .save_pagination(&path, &state)
                    .await
                    .map_err(|e| SyncError::persistence(&e));
                let _ = reply.send(result);
            }

            WriteOp::ResetPath { path, reply } => {
                trace!(path = %path, "Processing ResetPath");
                // Later commits for this path are fenced off even if the
                // delete fails
                *self.generations.entry(path.clone()).or_insert(0) += 1;
                let result = self
                    .repository
                    .reset_path(&path)
                    .await
                    .map_err(|e| SyncError::persistence(&e));
                if let Ok(removed) = &result {
                    debug!(path = %path, removed, "Path reset");
                }
                let _ = reply.send(result);
            }

            WriteOp::ResetAll { reply } => {
                trace!("Processing ResetAll");
                self.epoch += 1;
                let result = self
                    .repository
                    .reset_all()
                    .await
                    .map_err(|e| SyncError::persistence(&e));
                let _ = reply.send(result);
            }

            WriteOp::Generation { path, reply } => {
                let _ = reply.send(Ok(self.generation_of(&path)));
            }
        }
    }

    async fn import(&self, path: &BrowsePath, raw: &[RemoteEntry]) -> Result<ImportOutcome> {
        let batch = prepare_batch(path, raw);

        self.repository
            .upsert_entries(&batch.entries)
            .await
            .map_err(|e| SyncError::persistence(&e))?;

        Ok(ImportOutcome {
            imported: batch.entries.len(),
            skipped: batch.skipped,
        })
    }

    async fn commit_page(
        &self,
        path: &BrowsePath,
        generation: u64,
        page: ListingPage,
    ) -> Result<ImportOutcome> {
        let current = self.generation_of(path);
        if generation != current {
            warn!(
                path = %path,
                expected = generation,
                current,
                "Discarding page fetched before a reset"
            );
            return Err(SyncError::StaleGeneration(path.clone()));
        }

        let batch = prepare_batch(path, &page.entries);
        let state = PaginationState::from_page(page.cursor, page.has_more);

        self.repository
            .commit_page(path, &batch.entries, &state)
            .await
            .map_err(|e| SyncError::persistence(&e))?;

        debug!(
            path = %path,
            imported = batch.entries.len(),
            skipped = batch.skipped,
            has_more = page.has_more,
            "Page committed"
        );

        Ok(ImportOutcome {
            imported: batch.entries.len(),
            skipped: batch.skipped,
        })
    }
}
