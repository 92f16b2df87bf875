//! Browse sessions
//!
//! A [`BrowseSession`] shows one remote folder. It reads what the cache
//! already holds, fetches pages on demand and exposes the rows the
//! presentation layer renders.
//!
//! ## Lifecycle
//!
//! ```text
//! open ──► saved cursor? ──yes──► Idle (resumed, no request)
//!                │
//!                no ──► Loading(fresh) ──► Idle
//!
//! Idle ──load_more──► Loading(continue) ──► Idle
//! Idle ──force_refresh──► reset path ──► Loading(fresh) ──► Idle
//! ```
//!
//! At most one load runs per session. A failed load leaves the pagination
//! state untouched, so the next attempt retries from the same cursor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use matchbox_core::config::BrowseConfig;
use matchbox_core::domain::{BrowsePath, DirectoryEntry, PaginationState};
use matchbox_core::ports::{IBrowseRepository, IListingProvider};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::events::{BrowseEvent, EVENT_CHANNEL_CAPACITY};
use crate::writer::{CacheWriterHandle, ImportOutcome};
use crate::SyncError;

// ============================================================================
// BrowseContext
// ============================================================================

/// Dependencies shared by every session
///
/// Cloning is cheap; all clones publish on the same event channel.
#[derive(Clone)]
pub struct BrowseContext {
    provider: Arc<dyn IListingProvider>,
    repository: Arc<dyn IBrowseRepository>,
    writer: CacheWriterHandle,
    events: broadcast::Sender<BrowseEvent>,
    browse: BrowseConfig,
}

impl BrowseContext {
    /// Creates a context
    ///
    /// `repository` is used for reads only; all writes go through `writer`.
    pub fn new(
        provider: Arc<dyn IListingProvider>,
        repository: Arc<dyn IBrowseRepository>,
        writer: CacheWriterHandle,
        browse: BrowseConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            provider,
            repository,
            writer,
            events,
            browse,
        }
    }

    /// Subscribes to events of every session opened from this context
    pub fn subscribe(&self) -> broadcast::Receiver<BrowseEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: BrowseEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

// ============================================================================
// Rows and selection
// ============================================================================

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Entry(DirectoryEntry),
    /// Trailing row shown while the server reports more pages
    LoadMore,
}

/// What selecting a row resulted in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A folder was selected; browse this path next
    OpenFolder(BrowsePath),
    /// An image small enough for a thumbnail was selected
    Thumbnail(DirectoryEntry),
    /// A file with no preview
    Unsupported(DirectoryEntry),
    /// The load-more row was selected and the next page was imported
    LoadedMore(ImportOutcome),
}

// ============================================================================
// BrowseSession
// ============================================================================

struct LoadGuard<'a>(&'a AtomicBool);

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Listing state of one remote folder
pub struct BrowseSession {
    path: BrowsePath,
    context: BrowseContext,
    loading: AtomicBool,
    resumed: bool,
}

impl BrowseSession {
    /// Opens a session for `path`
    ///
    /// If a cursor and has-more flag are saved for the path the session
    /// resumes from the cache without contacting the server. Otherwise a
    /// fresh load runs before this returns; its failure is reported through
    /// [`BrowseEvent::DataError`] and the session is still returned.
    ///
    /// # Errors
    /// Only if the saved pagination state cannot be read.
    pub async fn open(context: BrowseContext, path: BrowsePath) -> Result<Self, SyncError> {
        let mut session = Self {
            path,
            context,
            loading: AtomicBool::new(false),
            resumed: false,
        };

        let state = session.pagination().await?;
        if state.is_resumable() {
            debug!(path = %session.path, "Resuming from cached listing");
            session.resumed = true;
            return Ok(session);
        }

        info!(path = %session.path, "No saved listing, loading");
        session.context.publish(BrowseEvent::LoadingStarted {
            path: session.path.clone(),
        });
        if let Ok(guard) = session.begin_load() {
            // Reported through events
            let _ = session.load_locked(&guard, true).await;
        }

        Ok(session)
    }

    /// Path this session shows
    pub fn path(&self) -> &BrowsePath {
        &self.path
    }

    /// True if `open` found a saved listing and made no request
    pub fn was_resumed(&self) -> bool {
        self.resumed
    }

    /// Whether a load is in progress
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Subscribes to events (of all sessions sharing this context)
    pub fn subscribe(&self) -> broadcast::Receiver<BrowseEvent> {
        self.context.subscribe()
    }

    fn begin_load(&self) -> Result<LoadGuard<'_>, SyncError> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| LoadGuard(&self.loading))
            .map_err(|_| SyncError::LoadInProgress(self.path.clone()))
    }

    /// Fetches one page and imports it
    ///
    /// With `fresh` the listing starts over from the first page; otherwise it
    /// continues from the saved cursor, falling back to the first page when
    /// none is saved.
    ///
    /// # Errors
    /// [`SyncError::LoadInProgress`] if another load is running. Remote and
    /// persistence failures are also published as [`BrowseEvent::DataError`].
    pub async fn load_more(&self, fresh: bool) -> Result<ImportOutcome, SyncError> {
        let guard = self.begin_load()?;
        self.load_locked(&guard, fresh).await
    }

    /// Clears the cached listing of this path and loads it from scratch
    ///
    /// The clear is atomic: entries and pagination state go together. If it
    /// fails, [`BrowseEvent::RefreshError`] is published and nothing is
    /// fetched.
    pub async fn force_refresh(&self) -> Result<ImportOutcome, SyncError> {
        let guard = self.begin_load()?;

        let removed = match self.context.writer.reset_path(self.path.clone()).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(path = %self.path, error = %e, "Refresh could not clear cache");
                self.context.publish(BrowseEvent::RefreshError {
                    path: self.path.clone(),
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        info!(path = %self.path, removed, "Refreshing listing");
        self.context.publish(BrowseEvent::LoadingStarted {
            path: self.path.clone(),
        });
        self.load_locked(&guard, true).await
    }

    async fn load_locked(
        &self,
        _guard: &LoadGuard<'_>,
        fresh: bool,
    ) -> Result<ImportOutcome, SyncError> {
        let result = self.fetch_and_commit(fresh).await;

        self.context.publish(BrowseEvent::LoadingFinished {
            path: self.path.clone(),
        });

        match &result {
            Ok(outcome) => {
                debug!(
                    path = %self.path,
                    imported = outcome.imported,
                    skipped = outcome.skipped,
                    "Load finished"
                );
                self.context.publish(BrowseEvent::DataUpdated {
                    path: self.path.clone(),
                });
            }
            Err(SyncError::StaleGeneration(_)) => {
                debug!(path = %self.path, "Load superseded by a refresh");
            }
            Err(e) => {
                self.context.publish(BrowseEvent::DataError {
                    path: self.path.clone(),
                    message: e.to_string(),
                });
            }
        }

        result
    }

    async fn fetch_and_commit(&self, fresh: bool) -> Result<ImportOutcome, SyncError> {
        // Generation first: a reset landing before the state read then fails
        // the commit instead of pairing an old cursor with a new generation
        let generation = self.context.writer.generation(self.path.clone()).await?;
        let state = self.pagination().await?;

        let page = match state.continuation_cursor(fresh) {
            Some(cursor) => self
                .context
                .provider
                .list_continue(&self.path, cursor)
                .await
                .map_err(|e| {
                    // The cursor is kept, so a cursor the server keeps
                    // rejecting fails the same way on every retry
                    warn!(
                        path = %self.path,
                        continuing = true,
                        error = %e,
                        "Listing failed"
                    );
                    SyncError::from_remote(&e)
                })?,
            None => self
                .context
                .provider
                .list_initial(&self.path)
                .await
                .map_err(|e| {
                    warn!(
                        path = %self.path,
                        continuing = false,
                        error = %e,
                        "Listing failed"
                    );
                    SyncError::from_remote(&e)
                })?,
        };

        self.context
            .writer
            .commit_page(self.path.clone(), generation, page)
            .await
    }

    // --- queries ---

    async fn pagination(&self) -> Result<PaginationState, SyncError> {
        self.context
            .repository
            .get_pagination(&self.path)
            .await
            .map_err(|e| SyncError::persistence(&e))
    }

    /// Number of cached entries under this path
    pub async fn entry_count(&self) -> Result<u64, SyncError> {
        self.context
            .repository
            .count_children(&self.path)
            .await
            .map_err(|e| SyncError::persistence(&e))
    }

    /// Entry at `index` in name order
    pub async fn entry_at(&self, index: u64) -> Result<Option<DirectoryEntry>, SyncError> {
        self.context
            .repository
            .child_at(&self.path, index)
            .await
            .map_err(|e| SyncError::persistence(&e))
    }

    /// Whether the trailing load-more row is shown
    pub async fn has_load_more(&self) -> Result<bool, SyncError> {
        Ok(self.pagination().await?.shows_load_more())
    }

    /// All rows: entries in name order, then the load-more row if shown
    pub async fn rows(&self) -> Result<Vec<Row>, SyncError> {
        let entries = self
            .context
            .repository
            .list_children(&self.path)
            .await
            .map_err(|e| SyncError::persistence(&e))?;

        let mut rows: Vec<Row> = entries.into_iter().map(Row::Entry).collect();
        if self.has_load_more().await? {
            rows.push(Row::LoadMore);
        }
        Ok(rows)
    }

    /// Whether `entry` may be previewed as a thumbnail
    pub fn is_thumbnail_eligible(&self, entry: &DirectoryEntry) -> bool {
        entry.is_thumbnail_eligible(
            self.context.browse.thumbnail_max_bytes,
            &self.context.browse.thumbnail_extensions,
        )
    }

    /// Acts on the row at `index`
    ///
    /// Selecting the load-more row continues the listing.
    ///
    /// # Errors
    /// [`SyncError::InvalidSelection`] if no row exists at `index`.
    pub async fn select(&self, index: u64) -> Result<Selection, SyncError> {
        if let Some(entry) = self.entry_at(index).await? {
            return self.classify(entry);
        }

        let count = self.entry_count().await?;
        if index == count && self.has_load_more().await? {
            return self.load_more(false).await.map(Selection::LoadedMore);
        }

        Err(SyncError::InvalidSelection(format!(
            "no row {index} in {}",
            self.path
        )))
    }

    fn classify(&self, entry: DirectoryEntry) -> Result<Selection, SyncError> {
        if entry.is_folder() {
            let path = BrowsePath::new(entry.display_path)?;
            return Ok(Selection::OpenFolder(path));
        }

        if self.is_thumbnail_eligible(&entry) {
            Ok(Selection::Thumbnail(entry))
        } else {
            Ok(Selection::Unsupported(entry))
        }
    }

    /// Downloads the thumbnail of an eligible file
    pub async fn fetch_thumbnail(&self, entry: &DirectoryEntry) -> Result<Vec<u8>, SyncError> {
        if !self.is_thumbnail_eligible(entry) {
            return Err(SyncError::InvalidSelection(format!(
                "{} has no thumbnail",
                entry.name
            )));
        }

        self.context
            .provider
            .get_thumbnail(&entry.item_id)
            .await
            .map_err(|e| SyncError::from_remote(&e))
    }
}
