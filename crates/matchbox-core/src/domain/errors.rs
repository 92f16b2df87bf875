//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures of identifiers, paths and OAuth callbacks.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid browse path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid remote item identifier
    #[error("Invalid item ID: {0}")]
    InvalidItemId(String),

    /// Invalid bearer token
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    /// OAuth redirect could not be turned into a credential
    #[error("Invalid authorization callback: {0}")]
    InvalidCallback(String),

    /// A remote entry lacks a field required for import
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A remote entry carries a `.tag` other than `file` or `folder`
    #[error("Unsupported entry kind: {0}")]
    UnsupportedKind(String),
}
