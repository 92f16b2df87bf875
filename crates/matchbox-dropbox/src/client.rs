//! Dropbox API client
//!
//! Provides an authenticated HTTP client for the Dropbox v2 API. The token is
//! read from the [`ITokenStore`] on every request, so signing in or out takes
//! effect immediately and a missing token fails before anything is sent.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use matchbox_dropbox::auth::KeyringTokenStore;
//! use matchbox_dropbox::client::DropboxClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DropboxClient::new(Arc::new(KeyringTokenStore::new()));
//! client.revoke_token().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use matchbox_core::config::{ApiConfig, DEFAULT_API_URL, DEFAULT_CONTENT_URL};
use matchbox_core::domain::AccessToken;
use matchbox_core::ports::ITokenStore;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, info};

use crate::DropboxError;

/// Path of the token revocation endpoint
const REVOKE_PATH: &str = "/2/auth/token/revoke";

// ============================================================================
// DropboxClient
// ============================================================================

/// HTTP client for Dropbox API calls
///
/// Wraps `reqwest::Client` with bearer authentication and the two Dropbox
/// hosts (RPC and content). Cloning is cheap.
#[derive(Clone)]
pub struct DropboxClient {
    client: Client,
    api_url: String,
    content_url: String,
    tokens: Arc<dyn ITokenStore>,
}

impl DropboxClient {
    /// Creates a client against the production Dropbox hosts
    pub fn new(tokens: Arc<dyn ITokenStore>) -> Self {
        Self::with_base_urls(tokens, DEFAULT_API_URL, DEFAULT_CONTENT_URL)
    }

    /// Creates a client with custom hosts (useful for testing)
    pub fn with_base_urls(
        tokens: Arc<dyn ITokenStore>,
        api_url: impl Into<String>,
        content_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url: trim_trailing_slash(api_url.into()),
            content_url: trim_trailing_slash(content_url.into()),
            tokens,
        }
    }

    /// Creates a client from the `api` configuration section
    pub fn from_config(tokens: Arc<dyn ITokenStore>, config: &ApiConfig) -> Self {
        Self::with_base_urls(tokens, &config.base_url, &config.content_url)
    }

    /// Returns the RPC host
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the content host
    pub fn content_url(&self) -> &str {
        &self.content_url
    }

    /// Loads the current token from the store
    ///
    /// # Errors
    /// [`DropboxError::NotSignedIn`] when no credential is stored.
    pub fn access_token(&self) -> Result<AccessToken, DropboxError> {
        let credential = self
            .tokens
            .load()
            .map_err(|e| DropboxError::CredentialStore(format!("{e:#}")))?;

        credential
            .map(|c| c.access_token)
            .ok_or(DropboxError::NotSignedIn)
    }

    /// Creates an authenticated POST to an RPC endpoint
    pub fn rpc(&self, path: &str) -> Result<RequestBuilder, DropboxError> {
        let token = self.access_token()?;
        let url = format!("{}{}", self.api_url, path);
        Ok(self
            .client
            .request(Method::POST, &url)
            .bearer_auth(token.secret()))
    }

    /// Creates an authenticated POST to a content endpoint
    pub fn content(&self, path: &str) -> Result<RequestBuilder, DropboxError> {
        let token = self.access_token()?;
        let url = format!("{}{}", self.content_url, path);
        Ok(self
            .client
            .request(Method::POST, &url)
            .bearer_auth(token.secret()))
    }

    /// Sends a request and turns non-success statuses into errors
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, DropboxError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %body, "Dropbox request failed");

        if status == StatusCode::UNAUTHORIZED {
            return Err(DropboxError::Unauthorized(body));
        }

        Err(DropboxError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Revokes the current token on the server
    ///
    /// Local state is not touched; the caller clears it on success.
    pub async fn revoke_token(&self) -> Result<(), DropboxError> {
        let request = self.rpc(REVOKE_PATH)?;
        self.send(request).await?;
        info!("Revoked access token");
        Ok(())
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use matchbox_core::domain::StoredCredential;

    fn signed_in() -> Arc<dyn ITokenStore> {
        Arc::new(MemoryTokenStore::with_credential(StoredCredential::new(
            AccessToken::new("test-token".to_string()).unwrap(),
        )))
    }

    #[test]
    fn test_default_hosts() {
        let client = DropboxClient::new(signed_in());
        assert_eq!(client.api_url(), "https://api.dropboxapi.com");
        assert_eq!(client.content_url(), "https://content.dropboxapi.com");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = DropboxClient::with_base_urls(signed_in(), "http://a/", "http://b//");
        assert_eq!(client.api_url(), "http://a");
        assert_eq!(client.content_url(), "http://b");
    }

    #[test]
    fn test_request_builder_sets_bearer() {
        let client = DropboxClient::with_base_urls(signed_in(), "http://localhost", "http://c");
        let request = client.rpc("/2/files/list_folder").unwrap().build().unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost/2/files/list_folder");
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer test-token"
        );
    }

    #[test]
    fn test_no_token_fails_before_building() {
        let client = DropboxClient::new(Arc::new(MemoryTokenStore::new()));
        assert!(matches!(
            client.rpc("/2/files/list_folder"),
            Err(DropboxError::NotSignedIn)
        ));
        assert!(matches!(
            client.content("/2/files/get_thumbnail"),
            Err(DropboxError::NotSignedIn)
        ));
    }
}
