//! Browse commands - List folders and act on rows
//!
//! `matchbox ls [PATH]` shows the cached listing of a folder, fetching the
//! first page if nothing is cached yet. `--more` fetches the next page,
//! `--all` keeps fetching until the listing is complete and `--refresh`
//! discards the cache of the folder and starts over.
//!
//! `matchbox open PATH INDEX` selects row INDEX of that listing: a folder is
//! listed, an image has its thumbnail saved, and the trailing load-more row
//! fetches the next page.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use matchbox_core::config::Config;
use matchbox_core::domain::{BrowsePath, DirectoryEntry};
use matchbox_sync::events::BrowseEvent;
use matchbox_sync::session::{BrowseSession, Row, Selection};
use matchbox_sync::SyncError;
use tokio::sync::broadcast;
use tracing::info;

use crate::app::App;
use crate::output::{entry_json, get_formatter, render_row, OutputFormat, OutputFormatter};

/// List a folder
#[derive(Debug, Args)]
pub struct LsCommand {
    /// Folder to list
    #[arg(default_value = "/")]
    pub path: String,

    /// Discard the cached listing and fetch it again
    #[arg(long)]
    pub refresh: bool,

    /// Fetch the next page
    #[arg(long, conflicts_with = "all")]
    pub more: bool,

    /// Fetch every remaining page
    #[arg(long)]
    pub all: bool,
}

impl LsCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let fmt = get_formatter(format);
        let path = parse_path(&self.path)?;

        let app = App::open(config).await?;
        let result = self.run(&app, path, &*fmt, format).await;
        app.close().await;
        result
    }

    async fn run(
        &self,
        app: &App,
        path: BrowsePath,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        let mut events = app.context.subscribe();
        let session = BrowseSession::open(app.context.clone(), path).await?;

        let mut outcome = Ok(());
        if self.refresh && session.was_resumed() {
            outcome = session.force_refresh().await.map(|_| ());
        }
        if self.more && outcome.is_ok() {
            outcome = session.load_more(false).await.map(|_| ());
        }
        if self.all {
            while outcome.is_ok() && session.has_load_more().await? {
                outcome = session.load_more(false).await.map(|_| ());
            }
        }

        let failed = report_events(&mut events, fmt);
        print_listing(&session, fmt, format).await?;

        if let Err(e) = outcome {
            if !failed {
                fmt.error(&e.to_string());
            }
            return Err(e.into());
        }
        if failed {
            bail!("Listing of {} is incomplete", session.path());
        }
        Ok(())
    }
}

/// Act on one row of a folder listing
#[derive(Debug, Args)]
pub struct OpenCommand {
    /// Folder containing the row
    pub path: String,

    /// Row index as shown by `matchbox ls`
    pub index: u64,

    /// Where to save a thumbnail (default: NAME.thumb.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl OpenCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let fmt = get_formatter(format);
        let path = parse_path(&self.path)?;

        let app = App::open(config).await?;
        let result = self.run(&app, path, &*fmt, format).await;
        app.close().await;
        result
    }

    async fn run(
        &self,
        app: &App,
        path: BrowsePath,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        let mut events = app.context.subscribe();
        let session = BrowseSession::open(app.context.clone(), path).await?;
        if report_events(&mut events, fmt) {
            bail!("Could not list {}", session.path());
        }

        let selection = match session.select(self.index).await {
            Ok(selection) => selection,
            Err(e @ SyncError::InvalidSelection(_)) => {
                fmt.error(&e.to_string());
                return Err(e.into());
            }
            Err(e) => {
                report_events(&mut events, fmt);
                return Err(e.into());
            }
        };

        match selection {
            Selection::OpenFolder(folder) => {
                info!(path = %folder, "Opening folder");
                let child = BrowseSession::open(app.context.clone(), folder).await?;
                let failed = report_events(&mut events, fmt);
                print_listing(&child, fmt, format).await?;
                if failed {
                    bail!("Could not list {}", child.path());
                }
            }
            Selection::Thumbnail(entry) => {
                let bytes = session.fetch_thumbnail(&entry).await?;
                let target = self
                    .output
                    .clone()
                    .unwrap_or_else(|| default_thumbnail_path(&entry));
                write_thumbnail(&target, &bytes).await?;

                if format == OutputFormat::Json {
                    fmt.print_json(&serde_json::json!({
                        "name": entry.name,
                        "thumbnail": target.display().to_string(),
                        "bytes": bytes.len(),
                    }));
                } else {
                    fmt.success(&format!(
                        "Saved thumbnail of {} to {}",
                        entry.name,
                        target.display()
                    ));
                }
            }
            Selection::Unsupported(entry) => {
                if format == OutputFormat::Json {
                    fmt.print_json(&serde_json::json!({
                        "name": entry.name,
                        "thumbnail": serde_json::Value::Null,
                    }));
                } else {
                    fmt.info(&format!("No preview available for {}", entry.name));
                }
            }
            Selection::LoadedMore(loaded) => {
                report_events(&mut events, fmt);
                if format == OutputFormat::Human {
                    fmt.success(&format!("Loaded {} more entries", loaded.imported));
                }
                print_listing(&session, fmt, format).await?;
            }
        }

        Ok(())
    }
}

fn parse_path(raw: &str) -> Result<BrowsePath> {
    BrowsePath::new(raw.to_string()).with_context(|| format!("Invalid folder path '{raw}'"))
}

/// Prints failures delivered so far; returns true if there were any
fn report_events(events: &mut broadcast::Receiver<BrowseEvent>, fmt: &dyn OutputFormatter) -> bool {
    let mut failed = false;

    while let Ok(event) = events.try_recv() {
        match event {
            BrowseEvent::DataError { path, message } => {
                failed = true;
                fmt.error(&format!("Could not load {path}: {message}"));
                if message == SyncError::Unauthorized.to_string() {
                    fmt.info("Run 'matchbox auth login' to sign in");
                }
            }
            BrowseEvent::RefreshError { path, message } => {
                failed = true;
                fmt.error(&format!("Could not refresh {path}: {message}"));
            }
            _ => {}
        }
    }

    failed
}

async fn print_listing(
    session: &BrowseSession,
    fmt: &dyn OutputFormatter,
    format: OutputFormat,
) -> Result<()> {
    let rows = session.rows().await?;

    if format == OutputFormat::Json {
        let entries: Vec<_> = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| match row {
                Row::Entry(entry) => Some(entry_json(
                    index,
                    entry,
                    session.is_thumbnail_eligible(entry),
                )),
                Row::LoadMore => None,
            })
            .collect();
        fmt.print_json(&serde_json::json!({
            "path": session.path().as_str(),
            "entries": entries,
            "has_more": rows.last() == Some(&Row::LoadMore),
        }));
        return Ok(());
    }

    let count = rows.iter().filter(|r| matches!(r, Row::Entry(_))).count();
    fmt.success(&format!(
        "{} ({} {})",
        session.path(),
        count,
        if count == 1 { "entry" } else { "entries" }
    ));
    for (index, row) in rows.iter().enumerate() {
        fmt.info(&render_row(index, row));
    }

    Ok(())
}

fn default_thumbnail_path(entry: &DirectoryEntry) -> PathBuf {
    PathBuf::from(format!("{}.thumb.png", entry.name))
}

async fn write_thumbnail(target: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(target, bytes)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))
}
