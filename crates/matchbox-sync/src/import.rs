//! Import of raw listing entries
//!
//! Turns the lenient [`RemoteEntry`] DTOs of a listing page into
//! [`DirectoryEntry`] values. Entries lacking an id, name, display path or a
//! `file`/`folder` tag are skipped; the rest of the batch carries on.

use matchbox_core::domain::{BrowsePath, DirectoryEntry, DomainError, EntryKind, ItemId};
use matchbox_core::ports::RemoteEntry;

/// Result of preparing a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedBatch {
    pub entries: Vec<DirectoryEntry>,
    /// Raw entries dropped for missing or unsupported fields
    pub skipped: usize,
}

/// Converts one raw entry listed under `parent`
///
/// # Errors
/// [`DomainError::MissingField`] or [`DomainError::UnsupportedKind`] when the
/// entry cannot be imported, [`DomainError::InvalidItemId`] for a malformed id.
pub fn entry_from_remote(
    parent: &BrowsePath,
    remote: &RemoteEntry,
) -> Result<DirectoryEntry, DomainError> {
    let id = remote.id.as_ref().ok_or(DomainError::MissingField("id"))?;
    let name = remote.name.as_ref().ok_or(DomainError::MissingField("name"))?;
    let display_path = remote
        .path_display
        .as_ref()
        .ok_or(DomainError::MissingField("path_display"))?;
    let tag = remote.tag.as_deref().ok_or(DomainError::MissingField(".tag"))?;

    Ok(DirectoryEntry {
        item_id: ItemId::new(id.clone())?,
        name: name.clone(),
        display_path: display_path.clone(),
        parent_path: parent.clone(),
        kind: EntryKind::parse(tag)?,
        size_bytes: remote.size.unwrap_or(0),
    })
}

/// Converts a whole page, skipping entries that cannot be imported
pub fn prepare_batch(parent: &BrowsePath, remotes: &[RemoteEntry]) -> PreparedBatch {
    let mut batch = PreparedBatch::default();

    for remote in remotes {
        match entry_from_remote(parent, remote) {
            Ok(entry) => batch.entries.push(entry),
            Err(reason) => {
                tracing::trace!(path = %parent, %reason, "Skipping entry");
                batch.skipped += 1;
            }
        }
    }

    batch
}
