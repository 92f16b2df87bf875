//! Sign-in and sign-out
//!
//! Signing in stores the token carried by the authorization redirect.
//! Signing out revokes the token on the server first; only after the server
//! confirms are the local token and the whole cache cleared. A failed
//! revocation leaves everything as it was.

use std::sync::Arc;

use matchbox_core::domain::{access_token_from_callback, StoredCredential};
use matchbox_core::ports::{IListingProvider, ITokenStore};
use tracing::{info, warn};

use crate::writer::CacheWriterHandle;
use crate::SyncError;

/// Manages the stored credential
#[derive(Clone)]
pub struct AccountService {
    tokens: Arc<dyn ITokenStore>,
    provider: Arc<dyn IListingProvider>,
    writer: CacheWriterHandle,
}

impl AccountService {
    pub fn new(
        tokens: Arc<dyn ITokenStore>,
        provider: Arc<dyn IListingProvider>,
        writer: CacheWriterHandle,
    ) -> Self {
        Self {
            tokens,
            provider,
            writer,
        }
    }

    /// Stores the token from a `matchbox://...#access_token=...` redirect
    ///
    /// # Errors
    /// [`SyncError::DomainError`] if the URL is not a valid callback.
    pub fn complete_authorization(&self, callback_url: &str) -> Result<StoredCredential, SyncError> {
        let token = access_token_from_callback(callback_url)?;
        let credential = StoredCredential::new(token);

        self.tokens
            .store(&credential)
            .map_err(|e| SyncError::CredentialFailure(format!("{e:#}")))?;

        info!("Signed in");
        Ok(credential)
    }

    /// Returns the stored credential, if any
    pub fn credential(&self) -> Result<Option<StoredCredential>, SyncError> {
        self.tokens
            .load()
            .map_err(|e| SyncError::CredentialFailure(format!("{e:#}")))
    }

    /// Returns true if a credential is stored
    pub fn is_signed_in(&self) -> Result<bool, SyncError> {
        Ok(self.credential()?.is_some())
    }

    /// Revokes the token, then clears the credential and the cache
    ///
    /// # Errors
    /// The classified revocation failure; the token and cache are kept.
    pub async fn sign_out(&self) -> Result<(), SyncError> {
        if let Err(e) = self.provider.revoke_token().await {
            let err = SyncError::from_remote(&e);
            warn!(error = %err, "Token revocation failed, staying signed in");
            return Err(err);
        }

        self.tokens
            .clear()
            .map_err(|e| SyncError::CredentialFailure(format!("{e:#}")))?;
        self.writer.reset_all().await?;

        info!("Signed out and cleared cache");
        Ok(())
    }
}
