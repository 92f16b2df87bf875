//! Listing provider port (driven/secondary port)
//!
//! This module defines the interface to the remote file service: paginated
//! folder listings, thumbnails and token revocation.
//!
//! ## Design Notes
//!
//! - Methods return `anyhow::Result`. Adapters wrap a [`ListingError`] so the
//!   sync layer can classify a failure with `downcast_ref`; anything else is
//!   treated as a network failure.
//! - [`RemoteEntry`] is a port-level DTO with every field optional. Validation
//!   happens at import time, where incomplete entries are skipped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::newtypes::{BrowsePath, Cursor, ItemId};

// ============================================================================
// DTOs
// ============================================================================

/// One raw entry of a `list_folder` page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// `file`, `folder` or `deleted`
    #[serde(rename = ".tag", default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
    /// Present for files only
    #[serde(default)]
    pub size: Option<u64>,
}

impl RemoteEntry {
    /// Read an entry leniently from a JSON value
    ///
    /// Fields of the wrong type are treated as absent rather than failing the
    /// whole page.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Self {
        let text = |key: &str| value.get(key).and_then(|v| v.as_str()).map(str::to_string);

        Self {
            tag: text(".tag"),
            id: text("id"),
            name: text("name"),
            path_display: text("path_display"),
            size: value.get("size").and_then(serde_json::Value::as_u64),
        }
    }
}

/// One page of a folder listing
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub entries: Vec<RemoteEntry>,
    /// Continuation token for the next page
    pub cursor: Cursor,
    pub has_more: bool,
}

/// Classified listing failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingError {
    /// No credential, or the server rejected it
    #[error("Not authorized")]
    Unauthorized,

    /// Transport failure or non-success status
    #[error("Network failure: {0}")]
    Network(String),

    /// Body was not the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

// ============================================================================
// IListingProvider trait
// ============================================================================

/// Port for the remote file service
///
/// Every call requires a stored credential and fails with
/// [`ListingError::Unauthorized`] before any network contact when there is
/// none. No method retries.
#[async_trait::async_trait]
pub trait IListingProvider: Send + Sync {
    /// Fetch the first page of `path`
    ///
    /// The root is sent as the empty string.
    async fn list_initial(&self, path: &BrowsePath) -> anyhow::Result<ListingPage>;

    /// Fetch the page following `cursor`
    ///
    /// `path` is informational; the cursor alone identifies the listing.
    async fn list_continue(&self, path: &BrowsePath, cursor: &Cursor)
        -> anyhow::Result<ListingPage>;

    /// Fetch a PNG thumbnail for a file
    async fn get_thumbnail(&self, item_id: &ItemId) -> anyhow::Result<Vec<u8>>;

    /// Revoke the current credential on the server
    async fn revoke_token(&self) -> anyhow::Result<()>;
}
