//! Browse repository port (driven/secondary port)
//!
//! This module defines the interface for the local cache: directory entries
//! keyed by item id and the pagination state recorded per browse path.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific.
//! - Methods that touch more than one row run in a single transaction, so a
//!   reader never sees half a page or half a reset.
//! - Only the cache writer task calls the mutating methods; readers may call
//!   the query methods from anywhere.

use crate::domain::{BrowsePath, DirectoryEntry, ItemId, PaginationState};

/// Port for the local cache
#[async_trait::async_trait]
pub trait IBrowseRepository: Send + Sync {
    // --- mutations ---

    /// Upsert entries by `item_id` in one transaction
    ///
    /// Existing rows have every field overwritten, including `parent_path`.
    async fn upsert_entries(&self, entries: &[DirectoryEntry]) -> anyhow::Result<()>;

    /// Upsert a page of entries and record the pagination state of `path`,
    /// atomically
    async fn commit_page(
        &self,
        path: &BrowsePath,
        entries: &[DirectoryEntry],
        state: &PaginationState,
    ) -> anyhow::Result<()>;

    /// Record the pagination state of `path`
    ///
    /// An empty state removes the record.
    async fn save_pagination(&self, path: &BrowsePath, state: &PaginationState)
        -> anyhow::Result<()>;

    /// Delete every entry listed under `path` together with its pagination
    /// state; returns the number of entries removed
    async fn reset_path(&self, path: &BrowsePath) -> anyhow::Result<u64>;

    /// Delete all entries and all pagination state
    async fn reset_all(&self) -> anyhow::Result<()>;

    // --- queries ---

    /// Look up one entry by id
    async fn get_entry(&self, item_id: &ItemId) -> anyhow::Result<Option<DirectoryEntry>>;

    /// Entries listed under `path`, ordered by name ascending
    async fn list_children(&self, path: &BrowsePath) -> anyhow::Result<Vec<DirectoryEntry>>;

    /// Number of entries listed under `path`
    async fn count_children(&self, path: &BrowsePath) -> anyhow::Result<u64>;

    /// The entry at `index` in name order, if any
    async fn child_at(&self, path: &BrowsePath, index: u64)
        -> anyhow::Result<Option<DirectoryEntry>>;

    /// Pagination state of `path`; empty if nothing is recorded
    async fn get_pagination(&self, path: &BrowsePath) -> anyhow::Result<PaginationState>;
}
