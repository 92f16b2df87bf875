//! Integration tests for DropboxProvider error classification

use matchbox_core::domain::{BrowsePath, Cursor};
use matchbox_core::ports::{IListingProvider, ListingError};
use matchbox_dropbox::provider::DropboxProvider;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn classify(err: &anyhow::Error) -> Option<&ListingError> {
    err.downcast_ref::<ListingError>()
}

#[tokio::test]
async fn test_provider_lists_pages() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_list_folder(&server, common::sample_entries(), "c1", true).await;

    let provider = DropboxProvider::new(client);
    let page = provider.list_initial(&BrowsePath::root()).await.unwrap();

    assert_eq!(page.entries.len(), 3);
    assert!(page.has_more);
}

#[tokio::test]
async fn test_provider_signed_out_is_unauthorized() {
    let (server, client) = common::setup_signed_out().await;
    common::expect_no_requests(&server).await;

    let provider = DropboxProvider::new(client);
    let err = provider
        .list_continue(&BrowsePath::root(), &Cursor::new("c1"))
        .await
        .unwrap_err();

    assert_eq!(classify(&err), Some(&ListingError::Unauthorized));
}

#[tokio::test]
async fn test_provider_malformed_page() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "entries": [] })))
        .mount(&server)
        .await;

    let provider = DropboxProvider::new(client);
    let err = provider.list_initial(&BrowsePath::root()).await.unwrap_err();

    assert!(matches!(
        classify(&err),
        Some(ListingError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_provider_server_error_is_network_failure() {
    let (server, client) = common::setup_dropbox_mock().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = DropboxProvider::new(client);
    let err = provider.list_initial(&BrowsePath::root()).await.unwrap_err();

    assert!(matches!(classify(&err), Some(ListingError::Network(_))));
}
