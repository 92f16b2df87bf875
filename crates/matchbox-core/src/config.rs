//! Configuration module for Matchbox.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Matchbox.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub browse: BrowseConfig,
    pub logging: LoggingConfig,
}

/// Dropbox HTTP endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// RPC endpoint host (`list_folder`, `token/revoke`).
    pub base_url: String,
    /// Content endpoint host (`get_thumbnail`).
    pub content_url: String,
}

/// OAuth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Dropbox app key (OAuth client id).
    pub app_key: String,
    /// Redirect URI registered for the app; its scheme must be `matchbox`.
    pub redirect_uri: String,
    /// Authorization endpoint.
    pub authorize_url: String,
}

/// Local cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite database holding entries and pagination state.
    pub database_path: PathBuf,
}

/// Browsing and selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Files of this size or larger never get a thumbnail.
    pub thumbnail_max_bytes: u64,
    /// Extensions (case-insensitive) eligible for thumbnails.
    pub thumbnail_extensions: Vec<String>,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/matchbox/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("matchbox")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default Dropbox RPC host.
pub const DEFAULT_API_URL: &str = "https://api.dropboxapi.com";

/// Default Dropbox content host.
pub const DEFAULT_CONTENT_URL: &str = "https://content.dropboxapi.com";

/// Default OAuth2 authorization endpoint.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.dropbox.com/oauth2/authorize";

/// Default redirect URI.
pub const DEFAULT_REDIRECT_URI: &str = "matchbox://redirect/";

/// 20 MiB.
pub const DEFAULT_THUMBNAIL_MAX_BYTES: u64 = 20_971_520;

/// Extensions Dropbox can render thumbnails for.
pub const DEFAULT_THUMBNAIL_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "tiff", "tif", "gif", "bmp"];

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            content_url: DEFAULT_CONTENT_URL.to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            app_key: "ma448cd8i69gdbn".to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("matchbox")
                .join("cache.db"),
        }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            thumbnail_max_bytes: DEFAULT_THUMBNAIL_MAX_BYTES,
            thumbnail_extensions: DEFAULT_THUMBNAIL_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"api.base_url"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn check_http_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError {
            field: field.into(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field: field.into(),
            message: format!("invalid URL '{value}': {e}"),
        }),
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- api ---
        check_http_url(&mut errors, "api.base_url", &self.api.base_url);
        check_http_url(&mut errors, "api.content_url", &self.api.content_url);

        // --- auth ---
        if self.auth.app_key.trim().is_empty() {
            errors.push(ValidationError {
                field: "auth.app_key".into(),
                message: "must not be empty".into(),
            });
        }
        match url::Url::parse(&self.auth.redirect_uri) {
            Ok(url) if url.scheme() == crate::domain::credential::CALLBACK_SCHEME => {}
            Ok(url) => errors.push(ValidationError {
                field: "auth.redirect_uri".into(),
                message: format!(
                    "scheme must be '{}', got '{}'",
                    crate::domain::credential::CALLBACK_SCHEME,
                    url.scheme()
                ),
            }),
            Err(e) => errors.push(ValidationError {
                field: "auth.redirect_uri".into(),
                message: format!("invalid URL: {e}"),
            }),
        }
        check_http_url(&mut errors, "auth.authorize_url", &self.auth.authorize_url);

        // --- cache ---
        if self.cache.database_path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "cache.database_path".into(),
                message: "must not be empty".into(),
            });
        }

        // --- browse ---
        if self.browse.thumbnail_max_bytes == 0 {
            errors.push(ValidationError {
                field: "browse.thumbnail_max_bytes".into(),
                message: "must be greater than 0".into(),
            });
        }
        if let Some(bad) = self
            .browse
            .thumbnail_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            errors.push(ValidationError {
                field: "browse.thumbnail_extensions".into(),
                message: format!("invalid extension '{bad}'; list extensions without a dot"),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use matchbox_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .api_base_url("http://127.0.0.1:8080")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- api ---

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.base_url = url.into();
        self
    }

    pub fn api_content_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.content_url = url.into();
        self
    }

    // --- auth ---

    pub fn auth_app_key(mut self, app_key: impl Into<String>) -> Self {
        self.config.auth.app_key = app_key.into();
        self
    }

    pub fn auth_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.config.auth.redirect_uri = uri.into();
        self
    }

    // --- cache ---

    pub fn cache_database_path(mut self, path: PathBuf) -> Self {
        self.config.cache.database_path = path;
        self
    }

    // --- browse ---

    pub fn browse_thumbnail_max_bytes(mut self, bytes: u64) -> Self {
        self.config.browse.thumbnail_max_bytes = bytes;
        self
    }

    pub fn browse_thumbnail_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.browse.thumbnail_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
