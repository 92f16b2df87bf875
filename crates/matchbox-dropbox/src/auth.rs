//! Dropbox authorization and credential storage
//!
//! Dropbox issues long-lived tokens through the OAuth2 implicit grant: the
//! user approves the app in a browser and Dropbox redirects to
//! `matchbox://redirect/#access_token=...`. Parsing that redirect lives in
//! `matchbox_core::domain::credential`; this module builds the authorization
//! URL and stores the resulting credential.
//!
//! ## Components
//!
//! - [`AuthorizeConfig`] - App key, redirect URI and authorization endpoint
//! - [`KeyringTokenStore`] - Credential storage in the system keyring
//! - [`MemoryTokenStore`] - Process-local credential storage

use std::sync::Mutex;

use anyhow::{Context, Result};
use matchbox_core::config::{AuthConfig, DEFAULT_AUTHORIZE_URL, DEFAULT_REDIRECT_URI};
use matchbox_core::domain::StoredCredential;
use matchbox_core::ports::ITokenStore;
use oauth2::{basic::BasicClient, AuthUrl, ClientId, CsrfToken, RedirectUrl};
use tracing::{debug, info, warn};

/// Keyring service name for storing the credential
const KEYRING_SERVICE: &str = "matchbox";

/// Keyring user under which the single credential is stored
const KEYRING_USER: &str = "default";

// ============================================================================
// AuthorizeConfig
// ============================================================================

/// Configuration for the implicit-grant authorization request
#[derive(Debug, Clone)]
pub struct AuthorizeConfig {
    /// Dropbox app key (OAuth client id)
    pub app_key: String,
    /// Redirect URI registered for the app
    pub redirect_uri: String,
    /// Authorization endpoint
    pub authorize_url: String,
}

impl AuthorizeConfig {
    /// Creates a config with the default redirect URI and endpoint
    pub fn new(app_key: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
        }
    }

    /// Creates a config from the `auth` configuration section
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            app_key: config.app_key.clone(),
            redirect_uri: config.redirect_uri.clone(),
            authorize_url: config.authorize_url.clone(),
        }
    }

    /// Overrides the authorization endpoint
    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    /// Builds the URL the user opens to approve the app
    ///
    /// The request asks for `response_type=token`. The returned CSRF token is
    /// echoed back as `state` in the redirect fragment.
    pub fn authorize_url(&self) -> Result<(String, CsrfToken)> {
        let client = BasicClient::new(ClientId::new(self.app_key.clone()))
            .set_auth_uri(
                AuthUrl::new(self.authorize_url.clone()).context("Invalid authorization URL")?,
            )
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_uri.clone()).context("Invalid redirect URI")?,
            );

        let (url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .use_implicit_flow()
            .url();

        debug!("Generated authorization URL");
        Ok((url.to_string(), csrf_token))
    }

    /// Opens the authorization URL in the user's browser
    ///
    /// Returns the URL so it can be printed when no browser is available.
    pub fn open_in_browser(&self) -> Result<String> {
        let (url, _csrf) = self.authorize_url()?;

        if let Err(e) = webbrowser::open(&url) {
            warn!(error = %e, "Could not open browser");
        } else {
            info!("Opened browser for authorization");
        }

        Ok(url)
    }
}

// ============================================================================
// KeyringTokenStore
// ============================================================================

/// Stores the credential in the system keyring
///
/// Uses the `keyring` crate (GNOME Keyring, KDE Wallet, macOS Keychain).
/// The credential is serialized as JSON under service `matchbox`.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    user: String,
}

impl KeyringTokenStore {
    /// Store under the default keyring user
    pub fn new() -> Self {
        Self::for_user(KEYRING_USER)
    }

    /// Store under a specific keyring user
    pub fn for_user(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, &self.user).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ITokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<StoredCredential>> {
        match self.entry()?.get_password() {
            Ok(json) => {
                let credential: StoredCredential = serde_json::from_str(&json)
                    .context("Failed to deserialize credential from keyring")?;
                debug!(user = %self.user, "Loaded credential from keyring");
                Ok(Some(credential))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(user = %self.user, "No credential in keyring");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }

    fn store(&self, credential: &StoredCredential) -> Result<()> {
        let json = serde_json::to_string(credential).context("Failed to serialize credential")?;
        self.entry()?
            .set_password(&json)
            .context("Failed to store credential in keyring")?;
        debug!(user = %self.user, "Stored credential in keyring");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) => {
                info!(user = %self.user, "Cleared credential from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
        }
    }
}

// ============================================================================
// MemoryTokenStore
// ============================================================================

/// Keeps the credential in memory only
///
/// Used by tests and by callers that pass a token explicitly.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    credential: Mutex<Option<StoredCredential>>,
}

impl MemoryTokenStore {
    /// Empty store (signed out)
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `credential`
    pub fn with_credential(credential: StoredCredential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredCredential>>> {
        self.credential
            .lock()
            .map_err(|_| anyhow::anyhow!("Token store lock poisoned"))
    }
}

impl ITokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredCredential>> {
        Ok(self.lock()?.clone())
    }

    fn store(&self, credential: &StoredCredential) -> Result<()> {
        *self.lock()? = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
