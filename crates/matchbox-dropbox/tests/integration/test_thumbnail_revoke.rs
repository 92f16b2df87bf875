//! Integration tests for get_thumbnail and token/revoke

use matchbox_core::domain::ItemId;
use matchbox_dropbox::{thumbnail, DropboxError};
use wiremock::matchers::{bearer_token, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[tokio::test]
async fn test_thumbnail_uses_api_arg_header() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/get_thumbnail"))
        .and(bearer_token(common::TEST_TOKEN))
        .and(header(
            "Dropbox-API-Arg",
            r#"{"path":"id:file-1","format":"png","size":"w128h128"}"#,
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PNG_MAGIC.to_vec())
                .append_header("Content-Type", "application/octet-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let id = ItemId::new("id:file-1".to_string()).unwrap();
    let bytes = thumbnail::get_thumbnail(&client, &id).await.unwrap();
    assert_eq!(bytes, PNG_MAGIC);
}

#[tokio::test]
async fn test_thumbnail_not_found() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/get_thumbnail"))
        .respond_with(ResponseTemplate::new(409).set_body_string("path/not_found/"))
        .mount(&server)
        .await;

    let id = ItemId::new("id:missing".to_string()).unwrap();
    let result = thumbnail::get_thumbnail(&client, &id).await;
    assert!(matches!(result, Err(DropboxError::Status { status: 409, .. })));
}

#[tokio::test]
async fn test_revoke_posts_with_bearer() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/auth/token/revoke"))
        .and(bearer_token(common::TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.revoke_token().await.expect("revoke failed");
}

#[tokio::test]
async fn test_revoke_failure_is_reported() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/auth/token/revoke"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(client.revoke_token().await.is_err());
}

#[tokio::test]
async fn test_revoke_signed_out_sends_nothing() {
    let (server, client) = common::setup_signed_out().await;
    common::expect_no_requests(&server).await;

    assert!(matches!(
        client.revoke_token().await,
        Err(DropboxError::NotSignedIn)
    ));
}
