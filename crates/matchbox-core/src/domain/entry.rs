//! Cached directory entries
//!
//! A [`DirectoryEntry`] is the local representation of one file or folder
//! returned by a `list_folder` call. Entries are keyed by [`ItemId`]; the
//! same remote item is never stored twice, whatever path it was listed under.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{BrowsePath, ItemId};

/// Kind of a directory entry, mirroring the Dropbox `.tag` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    /// Wire/storage form (`"file"` or `"folder"`)
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
        }
    }

    /// Parse a `.tag` value
    ///
    /// # Errors
    /// Returns [`DomainError::UnsupportedKind`] for anything except
    /// `file` and `folder` (e.g. `deleted`)
    pub fn parse(tag: &str) -> Result<Self, DomainError> {
        match tag {
            "file" => Ok(EntryKind::File),
            "folder" => Ok(EntryKind::Folder),
            other => Err(DomainError::UnsupportedKind(other.to_string())),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cached file or folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Stable remote identifier, the sole upsert key
    pub item_id: ItemId,
    /// Display name
    pub name: String,
    /// Full remote path; for folders this is where a child session browses
    pub display_path: String,
    /// Path under which the entry was listed
    pub parent_path: BrowsePath,
    pub kind: EntryKind,
    /// Size in bytes, 0 for folders
    pub size_bytes: u64,
}

impl DirectoryEntry {
    /// Returns true if this entry is a folder
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Lower-cased extension of `name`, if any
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Whether a thumbnail may be requested for this entry
    ///
    /// Files only, with an allowed extension (compared case-insensitively)
    /// and strictly smaller than `max_bytes`.
    #[must_use]
    pub fn is_thumbnail_eligible<S: AsRef<str>>(&self, max_bytes: u64, extensions: &[S]) -> bool {
        if self.kind != EntryKind::File || self.size_bytes >= max_bytes {
            return false;
        }

        match self.extension() {
            Some(ext) => extensions
                .iter()
                .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(&ext)),
            None => false,
        }
    }
}
