//! Credential handling
//!
//! Dropbox returns the token of an implicit-grant authorization in the
//! fragment of the redirect URL:
//!
//! ```text
//! matchbox://redirect/#access_token=sl.ABC&token_type=bearer&uid=12345
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::DomainError;
use super::newtypes::AccessToken;

/// URL scheme the app registers for the OAuth redirect
pub const CALLBACK_SCHEME: &str = "matchbox";

/// Token as persisted by a token store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub access_token: AccessToken,
    pub stored_at: DateTime<Utc>,
}

impl StoredCredential {
    /// Wrap a freshly obtained token
    #[must_use]
    pub fn new(access_token: AccessToken) -> Self {
        Self {
            access_token,
            stored_at: Utc::now(),
        }
    }
}

/// Split a URL fragment into its `key=value` pairs
///
/// Pairs without `=` map to an empty value. Later duplicates win.
#[must_use]
pub fn parse_fragment(fragment: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(fragment.trim_start_matches('#').as_bytes())
        .into_owned()
        .collect()
}

/// Extract the access token from an authorization callback URL
///
/// The scheme must be `matchbox`. The token is the `access_token` value of
/// the fragment, wherever it appears among the pairs.
///
/// # Errors
/// Returns [`DomainError::InvalidCallback`] for an unparseable URL, a foreign
/// scheme or a fragment without `access_token`
pub fn access_token_from_callback(callback: &str) -> Result<AccessToken, DomainError> {
    let url = Url::parse(callback)
        .map_err(|e| DomainError::InvalidCallback(format!("not a URL: {e}")))?;

    if url.scheme() != CALLBACK_SCHEME {
        return Err(DomainError::InvalidCallback(format!(
            "unexpected scheme '{}'",
            url.scheme()
        )));
    }

    let fragment = url
        .fragment()
        .ok_or_else(|| DomainError::InvalidCallback("missing fragment".to_string()))?;

    let token = parse_fragment(fragment)
        .remove("access_token")
        .ok_or_else(|| DomainError::InvalidCallback("missing access_token".to_string()))?;

    AccessToken::new(token).map_err(|e| DomainError::InvalidCallback(e.to_string()))
}
