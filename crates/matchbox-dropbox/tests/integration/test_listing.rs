//! Integration tests for list_folder and list_folder/continue

use matchbox_core::domain::{BrowsePath, Cursor};
use matchbox_dropbox::listing;
use matchbox_dropbox::DropboxError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_list_root_sends_empty_path() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "path": "" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": common::sample_entries(),
            "cursor": "c1",
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = listing::list_folder(&client, &BrowsePath::root())
        .await
        .expect("list_folder failed");

    assert_eq!(page.entries.len(), 3);
    assert_eq!(page.cursor, Cursor::new("c1"));
    assert!(page.has_more);

    let folder = &page.entries[0];
    assert_eq!(folder.tag.as_deref(), Some("folder"));
    assert_eq!(folder.path_display.as_deref(), Some("/Photos"));
    assert!(folder.size.is_none());

    // Deleted entries come through untouched; import drops them
    assert!(page.entries[2].id.is_none());
}

#[tokio::test]
async fn test_list_nested_path_is_sent_verbatim() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .and(body_json(json!({ "path": "/Photos/2017" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [],
            "cursor": "c-photos",
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let target = BrowsePath::new("/Photos/2017".to_string()).unwrap();
    let page = listing::list_folder(&client, &target).await.unwrap();
    assert!(page.entries.is_empty());
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_continue_sends_only_cursor() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder/continue"))
        .and(body_json(json!({ "cursor": "c1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [
                { ".tag": "file", "id": "id:2", "name": "b.txt", "path_display": "/b.txt", "size": 3 }
            ],
            "cursor": "c2",
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = listing::list_folder_continue(&client, &Cursor::new("c1"))
        .await
        .unwrap();
    assert_eq!(page.cursor, Cursor::new("c2"));
    assert_eq!(page.entries[0].size, Some(3));
}

#[tokio::test]
async fn test_missing_has_more_is_invalid_response() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [],
            "cursor": "c1"
        })))
        .mount(&server)
        .await;

    let result = listing::list_folder(&client, &BrowsePath::root()).await;
    assert!(matches!(result, Err(DropboxError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_non_json_body_is_invalid_response() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = listing::list_folder(&client, &BrowsePath::root()).await;
    assert!(matches!(result, Err(DropboxError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_server_error_carries_status() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder/continue"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_string(r#"{"error_summary": "reset/..."}"#),
        )
        .mount(&server)
        .await;

    let result = listing::list_folder_continue(&client, &Cursor::new("stale")).await;
    match result {
        Err(DropboxError::Status { status, body }) => {
            assert_eq!(status, 409);
            assert!(body.contains("reset"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired_access_token"))
        .mount(&server)
        .await;

    let result = listing::list_folder(&client, &BrowsePath::root()).await;
    assert!(matches!(result, Err(DropboxError::Unauthorized(_))));
}

#[tokio::test]
async fn test_signed_out_fails_without_network_contact() {
    let (server, client) = common::setup_signed_out().await;
    common::expect_no_requests(&server).await;

    let initial = listing::list_folder(&client, &BrowsePath::root()).await;
    let more = listing::list_folder_continue(&client, &Cursor::new("c1")).await;

    assert!(matches!(initial, Err(DropboxError::NotSignedIn)));
    assert!(matches!(more, Err(DropboxError::NotSignedIn)));
    server.verify().await;
}
