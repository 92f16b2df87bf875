//! Shared test helpers for matchbox-sync
//!
//! Provides a scripted listing provider, a repository wrapper that can be
//! told to fail, and a harness wiring both to a running CacheWriter over an
//! in-memory cache.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use matchbox_cache::{DatabasePool, SqliteBrowseRepository};
use matchbox_core::config::BrowseConfig;
use matchbox_core::domain::{
    BrowsePath, Cursor, DirectoryEntry, ItemId, PaginationState,
};
use matchbox_core::ports::{
    IBrowseRepository, IListingProvider, ListingError, ListingPage, RemoteEntry,
};
use matchbox_sync::events::BrowseEvent;
use matchbox_sync::session::BrowseContext;
use matchbox_sync::writer::{CacheWriter, CacheWriterHandle};
use tokio::sync::{broadcast, oneshot};

// ============================================================================
// ScriptedProvider
// ============================================================================

/// A recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Initial(BrowsePath),
    Continue(BrowsePath, Cursor),
    Thumbnail(ItemId),
    Revoke,
}

/// Listing provider that replays queued responses in call order
#[derive(Default)]
pub struct ScriptedProvider {
    calls: Mutex<Vec<Call>>,
    pages: Mutex<VecDeque<Result<ListingPage, ListingError>>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    revoke_failure: Mutex<Option<ListingError>>,
}

impl ScriptedProvider {
    pub fn push_page(&self, page: ListingPage) {
        self.pages.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_error(&self, error: ListingError) {
        self.pages.lock().unwrap().push_back(Err(error));
    }

    pub fn fail_revoke(&self, error: ListingError) {
        *self.revoke_failure.lock().unwrap() = Some(error);
    }

    /// The next listing call takes its response, then waits until the
    /// returned sender fires (or is dropped)
    pub fn hold_next_call(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub async fn wait_for_calls(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.calls.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("provider was not called in time");
    }

    async fn respond(&self, call: Call) -> anyhow::Result<ListingPage> {
        self.calls.lock().unwrap().push(call);
        let response = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ListingError::Network("no scripted response".into())));

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        response.map_err(anyhow::Error::new)
    }
}

#[async_trait::async_trait]
impl IListingProvider for ScriptedProvider {
    async fn list_initial(&self, path: &BrowsePath) -> anyhow::Result<ListingPage> {
        self.respond(Call::Initial(path.clone())).await
    }

    async fn list_continue(
        &self,
        path: &BrowsePath,
        cursor: &Cursor,
    ) -> anyhow::Result<ListingPage> {
        self.respond(Call::Continue(path.clone(), cursor.clone())).await
    }

    async fn get_thumbnail(&self, item_id: &ItemId) -> anyhow::Result<Vec<u8>> {
        self.calls.lock().unwrap().push(Call::Thumbnail(item_id.clone()));
        Ok(b"\x89PNG".to_vec())
    }

    async fn revoke_token(&self) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(Call::Revoke);
        match self.revoke_failure.lock().unwrap().clone() {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

// ============================================================================
// FlakyRepository
// ============================================================================

/// Delegates to a real repository unless told to fail a write
pub struct FlakyRepository {
    inner: SqliteBrowseRepository,
    pub fail_reset: AtomicBool,
    pub fail_commit: AtomicBool,
    pagination_gate: Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
}

impl FlakyRepository {
    pub fn new(inner: SqliteBrowseRepository) -> Self {
        Self {
            inner,
            fail_reset: AtomicBool::new(false),
            fail_commit: AtomicBool::new(false),
            pagination_gate: Mutex::new(None),
        }
    }

    /// The next pagination read completes, signals the first returned
    /// receiver, then waits until the returned sender fires (or is dropped)
    pub fn hold_next_pagination_read(&self) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (reached_tx, reached_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.pagination_gate.lock().unwrap() = Some((reached_tx, release_rx));
        (reached_rx, release_tx)
    }
}

#[async_trait::async_trait]
impl IBrowseRepository for FlakyRepository {
    async fn upsert_entries(&self, entries: &[DirectoryEntry]) -> anyhow::Result<()> {
        self.inner.upsert_entries(entries).await
    }

    async fn commit_page(
        &self,
        path: &BrowsePath,
        entries: &[DirectoryEntry],
        state: &PaginationState,
    ) -> anyhow::Result<()> {
        if self.fail_commit.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.inner.commit_page(path, entries, state).await
    }

    async fn save_pagination(
        &self,
        path: &BrowsePath,
        state: &PaginationState,
    ) -> anyhow::Result<()> {
        self.inner.save_pagination(path, state).await
    }

    async fn reset_path(&self, path: &BrowsePath) -> anyhow::Result<u64> {
        if self.fail_reset.load(Ordering::SeqCst) {
            anyhow::bail!("database is locked");
        }
        self.inner.reset_path(path).await
    }

    async fn reset_all(&self) -> anyhow::Result<()> {
        self.inner.reset_all().await
    }

    async fn get_entry(&self, item_id: &ItemId) -> anyhow::Result<Option<DirectoryEntry>> {
        self.inner.get_entry(item_id).await
    }

    async fn list_children(&self, path: &BrowsePath) -> anyhow::Result<Vec<DirectoryEntry>> {
        self.inner.list_children(path).await
    }

    async fn count_children(&self, path: &BrowsePath) -> anyhow::Result<u64> {
        self.inner.count_children(path).await
    }

    async fn child_at(
        &self,
        path: &BrowsePath,
        index: u64,
    ) -> anyhow::Result<Option<DirectoryEntry>> {
        self.inner.child_at(path, index).await
    }

    async fn get_pagination(&self, path: &BrowsePath) -> anyhow::Result<PaginationState> {
        let state = self.inner.get_pagination(path).await;

        let gate = self.pagination_gate.lock().unwrap().take();
        if let Some((reached, release)) = gate {
            let _ = reached.send(());
            let _ = release.await;
        }

        state
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub context: BrowseContext,
    pub provider: Arc<ScriptedProvider>,
    pub repository: Arc<FlakyRepository>,
    pub writer: CacheWriterHandle,
}

/// Context over a fresh in-memory cache and a running writer
pub async fn harness() -> Harness {
    let pool = DatabasePool::in_memory()
        .await
        .expect("Failed to create in-memory database");
    let repository = Arc::new(FlakyRepository::new(SqliteBrowseRepository::new(
        pool.pool().clone(),
    )));
    let provider = Arc::new(ScriptedProvider::default());
    let writer = CacheWriter::spawn(repository.clone());

    let context = BrowseContext::new(
        provider.clone(),
        repository.clone(),
        writer.clone(),
        BrowseConfig::default(),
    );

    Harness {
        context,
        provider,
        repository,
        writer,
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn path(p: &str) -> BrowsePath {
    BrowsePath::new(p.to_string()).unwrap()
}

pub fn raw(tag: &str, id: &str, name: &str, parent: &BrowsePath) -> RemoteEntry {
    RemoteEntry {
        tag: Some(tag.to_string()),
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        path_display: Some(format!("{}/{}", parent.api_arg(), name)),
        size: if tag == "file" { Some(1024) } else { None },
    }
}

pub fn page(entries: Vec<RemoteEntry>, cursor: &str, has_more: bool) -> ListingPage {
    ListingPage {
        entries,
        cursor: Cursor::new(cursor),
        has_more,
    }
}

/// Files named `prefix0`, `prefix1`, ... under `parent`
pub fn files(prefix: &str, count: usize, parent: &BrowsePath) -> Vec<RemoteEntry> {
    (0..count)
        .map(|i| raw("file", &format!("id:{prefix}{i}"), &format!("{prefix}{i}"), parent))
        .collect()
}

pub fn resumable(cursor: &str, has_more: bool) -> PaginationState {
    PaginationState::from_page(Cursor::new(cursor), has_more)
}

/// Collects every event already delivered to `rx`
pub fn drain(rx: &mut broadcast::Receiver<BrowseEvent>) -> Vec<BrowseEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub async fn names(repository: &FlakyRepository, parent: &BrowsePath) -> Vec<String> {
    repository
        .list_children(parent)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect()
}
