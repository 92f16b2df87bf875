//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for remote identifiers,
//! browse paths, pagination cursors and bearer tokens. Each newtype ensures
//! data validity at construction time.

use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Path types
// ============================================================================

/// A Dropbox folder path as browsed by the user (must start with /)
///
/// The root folder is `/`. Dropbox itself encodes the root as the empty
/// string on the wire; [`BrowsePath::api_arg`] performs that normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BrowsePath(String);

impl BrowsePath {
    /// Create a new BrowsePath
    ///
    /// A single trailing slash is dropped so `/Photos/` and `/Photos` key the
    /// same cache rows.
    ///
    /// # Errors
    /// Returns error if the path doesn't start with /, contains empty
    /// components or a `..` component
    pub fn new(path: String) -> Result<Self, DomainError> {
        if !path.starts_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "Path must start with '/': {path}"
            )));
        }

        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
            _ => path,
        };

        if path.len() > 1 && path.contains("//") {
            return Err(DomainError::InvalidPath(format!(
                "Path contains invalid double slashes: {path}"
            )));
        }

        if path.split('/').any(|component| component == "..") {
            return Err(DomainError::InvalidPath(format!(
                "Path contains invalid traversal: {path}"
            )));
        }

        Ok(Self(path))
    }

    /// Create the root path "/"
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Returns true for the root folder
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value sent as `path` to `list_folder`
    ///
    /// Dropbox requires the root to be the empty string.
    #[must_use]
    pub fn api_arg(&self) -> &str {
        if self.is_root() {
            ""
        } else {
            &self.0
        }
    }
}

impl Default for BrowsePath {
    fn default() -> Self {
        Self::root()
    }
}

impl Display for BrowsePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BrowsePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for BrowsePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BrowsePath> for String {
    fn from(path: BrowsePath) -> Self {
        path.0
    }
}

// ============================================================================
// Dropbox-specific types
// ============================================================================

/// Dropbox item ID
///
/// Format: an opaque string, typically like `id:a4ayc_80_OEAAAAAAAAAXw`.
/// Dropbox accepts it anywhere a path is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Create a new ItemId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidItemId(
                "Item ID cannot be empty".to_string(),
            ));
        }

        if id.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidItemId(format!(
                "Item ID contains whitespace: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for ItemId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// Opaque `list_folder` continuation token
///
/// Not validated: the server owns the format, and an empty cursor is a
/// legitimate stored value distinct from "no cursor".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a cursor string returned by the server
    #[must_use]
    pub fn new(cursor: impl Into<String>) -> Self {
        Self(cursor.into())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Cursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

/// OAuth2 bearer token
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new AccessToken
    ///
    /// # Errors
    /// Returns error if the token is empty or contains whitespace
    pub fn new(token: String) -> Result<Self, DomainError> {
        if token.is_empty() {
            return Err(DomainError::InvalidToken(
                "Access token cannot be empty".to_string(),
            ));
        }

        if token.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidToken(
                "Access token contains whitespace".to_string(),
            ));
        }

        Ok(Self(token))
    }

    /// Get the secret value, e.g. for an `Authorization` header
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl TryFrom<String> for AccessToken {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccessToken> for String {
    fn from(token: AccessToken) -> Self {
        token.0
    }
}
