//! DropboxProvider - IListingProvider implementation for the Dropbox API
//!
//! Wraps the [`DropboxClient`] and delegates to the listing and thumbnail
//! modules. Every [`DropboxError`] leaves this module as a [`ListingError`]
//! inside `anyhow`, so callers classify failures with `downcast_ref`.

use anyhow::Result;
use tracing::warn;

use matchbox_core::domain::{BrowsePath, Cursor, ItemId};
use matchbox_core::ports::{IListingProvider, ListingError, ListingPage};

use crate::client::DropboxClient;
use crate::{listing, thumbnail, DropboxError};

/// Dropbox implementation of the listing provider port
#[derive(Clone)]
pub struct DropboxProvider {
    client: DropboxClient,
}

impl DropboxProvider {
    /// Creates a provider over an existing client
    pub fn new(client: DropboxClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client
    pub fn client(&self) -> &DropboxClient {
        &self.client
    }
}

fn classify(operation: &'static str, e: DropboxError) -> anyhow::Error {
    warn!(operation, error = %e, "Dropbox call failed");
    anyhow::Error::new(ListingError::from(e))
}

#[async_trait::async_trait]
impl IListingProvider for DropboxProvider {
    async fn list_initial(&self, path: &BrowsePath) -> Result<ListingPage> {
        listing::list_folder(&self.client, path)
            .await
            .map_err(|e| classify("list_folder", e))
    }

    async fn list_continue(&self, path: &BrowsePath, cursor: &Cursor) -> Result<ListingPage> {
        tracing::debug!(path = %path, "Continuing listing");
        listing::list_folder_continue(&self.client, cursor)
            .await
            .map_err(|e| classify("list_folder/continue", e))
    }

    async fn get_thumbnail(&self, item_id: &ItemId) -> Result<Vec<u8>> {
        thumbnail::get_thumbnail(&self.client, item_id)
            .await
            .map_err(|e| classify("get_thumbnail", e))
    }

    async fn revoke_token(&self) -> Result<()> {
        self.client
            .revoke_token()
            .await
            .map_err(|e| classify("token/revoke", e))
    }
}
