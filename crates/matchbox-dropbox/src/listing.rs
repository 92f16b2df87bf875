//! Dropbox folder listing
//!
//! ## Listing Flow
//!
//! 1. **First page**: [`list_folder`] posts `{"path": ...}`; the root is sent
//!    as the empty string.
//! 2. **Next pages**: while `has_more` is true, [`list_folder_continue`]
//!    posts `{"cursor": ...}` with the cursor of the previous page.
//!
//! Both calls return exactly one page; following pages is the caller's job.
//! A page must carry `entries`, `cursor` and `has_more`, otherwise the whole
//! response is rejected. Individual entries are read leniently and validated
//! at import time.

use matchbox_core::domain::{BrowsePath, Cursor};
use matchbox_core::ports::{ListingPage, RemoteEntry};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::DropboxClient;
use crate::DropboxError;

const LIST_FOLDER_PATH: &str = "/2/files/list_folder";
const LIST_FOLDER_CONTINUE_PATH: &str = "/2/files/list_folder/continue";

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Serialize)]
struct ListFolderArg<'a> {
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct ListFolderContinueArg<'a> {
    cursor: &'a str,
}

// ============================================================================
// Requests
// ============================================================================

/// Fetches the first page of `path`
pub async fn list_folder(
    client: &DropboxClient,
    path: &BrowsePath,
) -> Result<ListingPage, DropboxError> {
    debug!(path = %path, "list_folder");

    let request = client
        .rpc(LIST_FOLDER_PATH)?
        .json(&ListFolderArg {
            path: path.api_arg(),
        });
    let page = parse_page(&read_body(client, request).await?)?;
    debug!(
        path = %path,
        entries = page.entries.len(),
        has_more = page.has_more,
        "list_folder page received"
    );
    Ok(page)
}

/// Fetches the page following `cursor`
pub async fn list_folder_continue(
    client: &DropboxClient,
    cursor: &Cursor,
) -> Result<ListingPage, DropboxError> {
    debug!("list_folder/continue");

    let request = client
        .rpc(LIST_FOLDER_CONTINUE_PATH)?
        .json(&ListFolderContinueArg {
            cursor: cursor.as_str(),
        });
    let page = parse_page(&read_body(client, request).await?)?;
    debug!(
        entries = page.entries.len(),
        has_more = page.has_more,
        "list_folder/continue page received"
    );
    Ok(page)
}

// ============================================================================
// Parsing
// ============================================================================

async fn read_body(
    client: &DropboxClient,
    request: reqwest::RequestBuilder,
) -> Result<Value, DropboxError> {
    let bytes = client.send(request).await?.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| DropboxError::InvalidResponse(format!("body is not JSON: {e}")))
}

/// Turns a `list_folder` response body into a page
///
/// # Errors
/// [`DropboxError::InvalidResponse`] if `entries` is not an array, `cursor`
/// is not a string or `has_more` is not a boolean.
pub fn parse_page(body: &Value) -> Result<ListingPage, DropboxError> {
    let entries = body
        .get("entries")
        .and_then(Value::as_array)
        .ok_or_else(|| DropboxError::InvalidResponse("missing 'entries' array".to_string()))?;

    let cursor = body
        .get("cursor")
        .and_then(Value::as_str)
        .ok_or_else(|| DropboxError::InvalidResponse("missing 'cursor'".to_string()))?;

    let has_more = body
        .get("has_more")
        .and_then(Value::as_bool)
        .ok_or_else(|| DropboxError::InvalidResponse("missing 'has_more'".to_string()))?;

    Ok(ListingPage {
        entries: entries.iter().map(RemoteEntry::from_value).collect(),
        cursor: Cursor::new(cursor),
        has_more,
    })
}
