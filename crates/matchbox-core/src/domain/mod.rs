//! Domain entities and business logic
//!
//! This module contains the core domain types for Matchbox:
//! - Newtypes for validated identifiers and paths
//! - Directory entries as stored in the local cache
//! - Per-path pagination state
//! - Credentials and the OAuth redirect parsing that produces them
//! - Domain-specific error types

pub mod credential;
pub mod entry;
pub mod errors;
pub mod newtypes;
pub mod pagination;

// Re-export commonly used types
pub use credential::{access_token_from_callback, parse_fragment, StoredCredential};
pub use entry::{DirectoryEntry, EntryKind};
pub use errors::DomainError;
pub use newtypes::*;
pub use pagination::PaginationState;
