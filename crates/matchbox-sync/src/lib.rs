//! Matchbox Sync - Listing synchronization
//!
//! Provides:
//! - Per-path browse sessions that decide between resuming and fetching fresh
//! - A single-writer queue that owns every cache mutation
//! - Import of raw listing entries into cached directory entries
//! - Sign-in and sign-out
//!
//! ## Modules
//!
//! - [`session`] - `BrowseSession` state machine, query and selection surface
//! - [`writer`] - `CacheWriter` task and its clonable handle
//! - [`import`] - Validation of raw entries
//! - [`account`] - Authorization callback handling and sign-out
//! - [`events`] - Notifications published to the presentation layer

pub mod account;
pub mod events;
pub mod import;
pub mod session;
pub mod writer;

use matchbox_core::domain::{BrowsePath, DomainError};
use matchbox_core::ports::ListingError;
use thiserror::Error;

/// Errors that can occur during synchronization operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// No credential, or the server rejected it
    #[error("Not authorized")]
    Unauthorized,

    /// Transport failure or non-success status
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The server answered with something that is not a listing page
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The local cache could not be read or written
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// The credential store could not be read or written
    #[error("Credential store failure: {0}")]
    CredentialFailure(String),

    /// A load is already running for this session
    #[error("A load is already in progress for {0}")]
    LoadInProgress(BrowsePath),

    /// The path was reset while this page was being fetched; the page was discarded
    #[error("Discarded stale page for {0}")]
    StaleGeneration(BrowsePath),

    /// The cache writer task is gone
    #[error("Cache writer unavailable: {0}")]
    WriterStopped(String),

    /// The selected row does not exist or does not support the action
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// A domain-level error propagated from matchbox-core
    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),
}

impl SyncError {
    /// Classifies an error returned by an `IListingProvider`
    ///
    /// Anything that is not a [`ListingError`] counts as a network failure.
    pub fn from_remote(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ListingError>() {
            Some(ListingError::Unauthorized) => SyncError::Unauthorized,
            Some(ListingError::MalformedResponse(msg)) => SyncError::MalformedResponse(msg.clone()),
            Some(ListingError::Network(msg)) => SyncError::NetworkFailure(msg.clone()),
            None => SyncError::NetworkFailure(format!("{err:#}")),
        }
    }

    /// Wraps a repository error
    pub fn persistence(err: &anyhow::Error) -> Self {
        SyncError::PersistenceFailure(format!("{err:#}"))
    }
}
