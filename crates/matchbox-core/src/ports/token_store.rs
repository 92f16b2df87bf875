//! Token store port
//!
//! Holds at most one credential. Implementations are synchronous because the
//! OS keyring API is.

use crate::domain::credential::StoredCredential;

/// Persistent storage for the bearer credential
pub trait ITokenStore: Send + Sync {
    /// Load the stored credential, `None` if signed out
    fn load(&self) -> anyhow::Result<Option<StoredCredential>>;

    /// Store a credential, replacing any previous one
    fn store(&self, credential: &StoredCredential) -> anyhow::Result<()>;

    /// Remove the credential; succeeds if none was stored
    fn clear(&self) -> anyhow::Result<()>;
}
