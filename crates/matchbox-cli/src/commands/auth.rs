//! Auth commands - Sign in and out of Dropbox
//!
//! Provides the `matchbox auth` CLI subcommands:
//! 1. `login`    - Opens the Dropbox authorization page in a browser.
//! 2. `callback` - Takes the `matchbox://` redirect URL the browser was sent
//!    to and stores its access token in the system keyring.
//! 3. `status`   - Shows whether a token is stored.
//! 4. `logout`   - Revokes the token, then clears it and the cache.

use anyhow::{Context, Result};
use clap::Subcommand;
use matchbox_core::config::Config;
use matchbox_dropbox::auth::AuthorizeConfig;
use tracing::info;

use crate::app::App;
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Open the Dropbox authorization page
    Login {
        /// Print the URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Finish signing in with the redirect URL
    Callback {
        /// The full matchbox://... URL including its #fragment
        url: String,
    },
    /// Check whether a token is stored
    Status,
    /// Revoke the token and clear local data
    Logout,
}

impl AuthCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let fmt = get_formatter(format);
        match self {
            AuthCommand::Login { no_browser } => {
                self.execute_login(config, *no_browser, &*fmt, format)
            }
            AuthCommand::Callback { url } => self.execute_callback(config, url, &*fmt).await,
            AuthCommand::Status => self.execute_status(config, &*fmt, format).await,
            AuthCommand::Logout => self.execute_logout(config, &*fmt).await,
        }
    }

    fn execute_login(
        &self,
        config: &Config,
        no_browser: bool,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        let authorize = AuthorizeConfig::from_config(&config.auth);
        info!(app_key = %authorize.app_key, "Starting authorization");

        let url = if no_browser {
            authorize.authorize_url()?.0
        } else {
            authorize.open_in_browser()?
        };

        if format == OutputFormat::Json {
            fmt.print_json(&serde_json::json!({ "authorize_url": url }));
            return Ok(());
        }

        fmt.success("Approve Matchbox in your browser");
        fmt.info(&url);
        fmt.info("");
        fmt.info("Dropbox then redirects to a matchbox:// URL. Finish with:");
        fmt.info("  matchbox auth callback '<redirect URL>'");

        Ok(())
    }

    async fn execute_callback(
        &self,
        config: &Config,
        url: &str,
        fmt: &dyn OutputFormatter,
    ) -> Result<()> {
        let app = App::open(config).await?;
        let result = app.account.complete_authorization(url);
        app.close().await;

        let credential = result.context("Could not complete sign-in")?;
        fmt.success("Signed in to Dropbox");
        fmt.info(&format!(
            "Token stored in keyring at {}",
            credential.stored_at.to_rfc3339()
        ));

        Ok(())
    }

    async fn execute_status(
        &self,
        config: &Config,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        let app = App::open(config).await?;
        let credential = app.account.credential();
        app.close().await;
        let credential = credential.context("Failed to read keyring")?;

        if format == OutputFormat::Json {
            fmt.print_json(&serde_json::json!({
                "signed_in": credential.is_some(),
                "stored_at": credential.as_ref().map(|c| c.stored_at.to_rfc3339()),
            }));
            return Ok(());
        }

        match credential {
            Some(credential) => {
                fmt.success("Signed in");
                fmt.info(&format!(
                    "Token stored {}",
                    credential.stored_at.format("%Y-%m-%d %H:%M UTC")
                ));
            }
            None => {
                fmt.info("Not signed in");
                fmt.info("Run 'matchbox auth login' to authenticate");
            }
        }

        Ok(())
    }

    async fn execute_logout(&self, config: &Config, fmt: &dyn OutputFormatter) -> Result<()> {
        let app = App::open(config).await?;

        if !app.account.is_signed_in()? {
            app.close().await;
            fmt.info("Not signed in. Nothing to log out.");
            return Ok(());
        }

        let result = app.account.sign_out().await;
        app.close().await;
        result.context("Sign-out failed; the token was kept")?;

        fmt.success("Signed out");
        fmt.info("Token revoked and local cache cleared");

        Ok(())
    }
}
