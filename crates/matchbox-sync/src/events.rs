//! Notifications for the presentation layer
//!
//! Sessions publish on a `tokio::sync::broadcast` channel. Subscribers that
//! fall behind lose the oldest events, never block the session.

use matchbox_core::domain::BrowsePath;

/// Capacity of the event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Something the UI may want to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseEvent {
    /// A fresh load started (session open without saved state, or refresh)
    LoadingStarted { path: BrowsePath },
    /// A load ended, successfully or not
    LoadingFinished { path: BrowsePath },
    /// New entries are visible in the cache
    DataUpdated { path: BrowsePath },
    /// A load failed; pagination state was left untouched
    DataError { path: BrowsePath, message: String },
    /// A refresh could not clear the cache; nothing was reloaded
    RefreshError { path: BrowsePath, message: String },
}

impl BrowseEvent {
    /// Path the event refers to
    pub fn path(&self) -> &BrowsePath {
        match self {
            BrowseEvent::LoadingStarted { path }
            | BrowseEvent::LoadingFinished { path }
            | BrowseEvent::DataUpdated { path }
            | BrowseEvent::DataError { path, .. }
            | BrowseEvent::RefreshError { path, .. } => path,
        }
    }
}
