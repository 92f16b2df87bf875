//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the traits the sync layer depends on; their implementations live
//! in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IListingProvider`] - Remote folder listing, thumbnails and token revocation (Dropbox)
//! - [`IBrowseRepository`] - Persistent cache of entries and per-path pagination state
//! - [`ITokenStore`] - Storage of the single bearer credential

pub mod browse_repository;
pub mod listing_provider;
pub mod token_store;

pub use browse_repository::IBrowseRepository;
pub use listing_provider::{IListingProvider, ListingError, ListingPage, RemoteEntry};
pub use token_store::ITokenStore;
