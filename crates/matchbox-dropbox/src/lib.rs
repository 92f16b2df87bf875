//! Matchbox Dropbox - Dropbox HTTP API client
//!
//! Provides an async client for:
//! - Implicit-grant OAuth2 authorization URLs and token storage
//! - Paginated folder listings (`list_folder` and `list_folder/continue`)
//! - PNG thumbnails
//! - Token revocation
//!
//! ## Modules
//!
//! - [`auth`] - Authorization URL, keyring and in-memory token stores
//! - [`client`] - Authenticated HTTP client shared by all endpoints
//! - [`listing`] - Folder listing requests and page parsing
//! - [`thumbnail`] - Thumbnail download
//! - [`provider`] - `IListingProvider` implementation

pub mod auth;
pub mod client;
pub mod listing;
pub mod provider;
pub mod thumbnail;

use matchbox_core::ports::ListingError;
use thiserror::Error;

/// Errors that can occur when communicating with the Dropbox API
#[derive(Debug, Error)]
pub enum DropboxError {
    /// No credential is stored; nothing was sent
    #[error("Not signed in")]
    NotSignedIn,

    /// The server rejected the credential (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code
        status: u16,
        /// Response body, usually a Dropbox error summary
        body: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response could not be parsed or lacked a required field
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The token store could not be read
    #[error("Credential store error: {0}")]
    CredentialStore(String),
}

impl From<DropboxError> for ListingError {
    fn from(e: DropboxError) -> Self {
        match e {
            DropboxError::NotSignedIn | DropboxError::Unauthorized(_) => ListingError::Unauthorized,
            DropboxError::InvalidResponse(msg) => ListingError::MalformedResponse(msg),
            other => ListingError::Network(other.to_string()),
        }
    }
}
