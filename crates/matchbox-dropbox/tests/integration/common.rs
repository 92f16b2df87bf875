//! Shared test helpers for Dropbox API integration tests
//!
//! Each helper returns a client pointing at a wiremock server for both the
//! RPC and the content host.

use std::sync::Arc;

use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use matchbox_core::domain::{AccessToken, StoredCredential};
use matchbox_dropbox::auth::MemoryTokenStore;
use matchbox_dropbox::client::DropboxClient;

/// Token stored by [`setup_dropbox_mock`]
pub const TEST_TOKEN: &str = "test-access-token";

/// Starts a mock server and returns a signed-in client for it
pub async fn setup_dropbox_mock() -> (MockServer, DropboxClient) {
    let server = MockServer::start().await;
    let store = MemoryTokenStore::with_credential(StoredCredential::new(
        AccessToken::new(TEST_TOKEN.to_string()).unwrap(),
    ));
    let client = DropboxClient::with_base_urls(Arc::new(store), server.uri(), server.uri());
    (server, client)
}

/// Starts a mock server and returns a client with no stored credential
pub async fn setup_signed_out() -> (MockServer, DropboxClient) {
    let server = MockServer::start().await;
    let client = DropboxClient::with_base_urls(
        Arc::new(MemoryTokenStore::new()),
        server.uri(),
        server.uri(),
    );
    (server, client)
}

/// Mounts a mock that fails the test if any request reaches the server
pub async fn expect_no_requests(server: &MockServer) {
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

/// Mounts `list_folder` returning one page
pub async fn mount_list_folder(
    server: &MockServer,
    entries: serde_json::Value,
    cursor: &str,
    has_more: bool,
) {
    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .and(bearer_token(TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": entries,
            "cursor": cursor,
            "has_more": has_more
        })))
        .mount(server)
        .await;
}

/// Sample page content: one folder, one image, one deleted entry
pub fn sample_entries() -> serde_json::Value {
    serde_json::json!([
        {
            ".tag": "folder",
            "id": "id:folder-1",
            "name": "Photos",
            "path_display": "/Photos"
        },
        {
            ".tag": "file",
            "id": "id:file-1",
            "name": "beach.jpg",
            "path_display": "/beach.jpg",
            "size": 2048
        },
        {
            ".tag": "deleted",
            "name": "gone.txt",
            "path_display": "/gone.txt"
        }
    ])
}
