//! Adapter wiring shared by the commands
//!
//! Opens the cache, starts the CacheWriter task and connects the Dropbox
//! provider to the keyring token store.

use std::sync::Arc;

use anyhow::{Context, Result};
use matchbox_cache::{DatabasePool, SqliteBrowseRepository};
use matchbox_core::config::Config;
use matchbox_core::ports::ITokenStore;
use matchbox_dropbox::{auth::KeyringTokenStore, client::DropboxClient, provider::DropboxProvider};
use matchbox_sync::{account::AccountService, session::BrowseContext, writer::CacheWriter};
use tracing::debug;

pub struct App {
    pool: DatabasePool,
    pub context: BrowseContext,
    pub account: AccountService,
}

impl App {
    pub async fn open(config: &Config) -> Result<Self> {
        let db_path = &config.cache.database_path;
        let pool = DatabasePool::new(db_path)
            .await
            .with_context(|| format!("Failed to open cache database {}", db_path.display()))?;
        debug!(db_path = %db_path.display(), "Opened cache database");

        let repository = Arc::new(SqliteBrowseRepository::new(pool.pool().clone()));
        let tokens: Arc<dyn ITokenStore> = Arc::new(KeyringTokenStore::new());
        let client = DropboxClient::from_config(tokens.clone(), &config.api);
        let provider = Arc::new(DropboxProvider::new(client));
        let writer = CacheWriter::spawn(repository.clone());

        let context = BrowseContext::new(
            provider.clone(),
            repository,
            writer.clone(),
            config.browse.clone(),
        );
        let account = AccountService::new(tokens, provider, writer);

        Ok(Self {
            pool,
            context,
            account,
        })
    }

    /// Closes the database, flushing the WAL
    pub async fn close(self) {
        self.pool.close().await;
    }
}
