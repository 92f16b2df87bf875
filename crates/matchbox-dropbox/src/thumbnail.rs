//! Thumbnail download
//!
//! `get_thumbnail` is a content endpoint: its argument travels in the
//! `Dropbox-API-Arg` header and the body of the response is the image.

use matchbox_core::domain::ItemId;
use serde::Serialize;
use tracing::debug;

use crate::client::DropboxClient;
use crate::DropboxError;

const GET_THUMBNAIL_PATH: &str = "/2/files/get_thumbnail";

/// Header carrying the JSON argument of content endpoints
pub const API_ARG_HEADER: &str = "Dropbox-API-Arg";

#[derive(Debug, Serialize)]
struct ThumbnailArg<'a> {
    path: &'a str,
    format: &'a str,
    size: &'a str,
}

/// Serialized `Dropbox-API-Arg` value for a 128x128 PNG of `item_id`
pub fn thumbnail_arg(item_id: &ItemId) -> Result<String, DropboxError> {
    serde_json::to_string(&ThumbnailArg {
        path: item_id.as_str(),
        format: "png",
        size: "w128h128",
    })
    .map_err(|e| DropboxError::InvalidResponse(format!("cannot encode thumbnail argument: {e}")))
}

/// Downloads a 128x128 PNG thumbnail of a file
pub async fn get_thumbnail(
    client: &DropboxClient,
    item_id: &ItemId,
) -> Result<Vec<u8>, DropboxError> {
    let request = client
        .content(GET_THUMBNAIL_PATH)?
        .header(API_ARG_HEADER, thumbnail_arg(item_id)?);

    let bytes = client.send(request).await?.bytes().await?;

    debug!(item_id = %item_id, bytes = bytes.len(), "Downloaded thumbnail");
    Ok(bytes.to_vec())
}
