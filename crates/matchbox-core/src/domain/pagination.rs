//! Per-path pagination state

use serde::{Deserialize, Serialize};

use super::newtypes::Cursor;

/// Cursor and has-more flag recorded for one browse path
///
/// `None` means "nothing recorded", which is different from a recorded empty
/// cursor. Clearing both fields tells the session to start the path over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub cursor: Option<Cursor>,
    pub has_more: Option<bool>,
}

impl PaginationState {
    /// No state recorded
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// State after a successful page
    #[must_use]
    pub fn from_page(cursor: Cursor, has_more: bool) -> Self {
        Self {
            cursor: Some(cursor),
            has_more: Some(has_more),
        }
    }

    /// A session can resume without fetching iff both fields are recorded
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        self.cursor.is_some() && self.has_more.is_some()
    }

    /// Returns true if neither field is recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursor.is_none() && self.has_more.is_none()
    }

    /// Whether the trailing "load more" row is shown
    #[must_use]
    pub fn shows_load_more(&self) -> bool {
        self.has_more == Some(true)
    }

    /// Cursor to continue from, unless a fresh listing was requested
    #[must_use]
    pub fn continuation_cursor(&self, fresh: bool) -> Option<&Cursor> {
        if fresh {
            None
        } else {
            self.cursor.as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = PaginationState::empty();
        assert!(state.is_empty());
        assert!(!state.is_resumable());
        assert!(!state.shows_load_more());
    }

    #[test]
    fn test_half_recorded_state_is_not_resumable() {
        let state = PaginationState {
            cursor: Some(Cursor::new("c1")),
            has_more: None,
        };
        assert!(!state.is_empty());
        assert!(!state.is_resumable());
    }

    #[test]
    fn test_empty_cursor_still_counts_as_recorded() {
        let state = PaginationState::from_page(Cursor::new(""), false);
        assert!(state.is_resumable());
        assert!(!state.shows_load_more());
    }

    #[test]
    fn test_continuation_cursor_respects_fresh() {
        let state = PaginationState::from_page(Cursor::new("c1"), true);
        assert!(state.shows_load_more());
        assert_eq!(state.continuation_cursor(false), Some(&Cursor::new("c1")));
        assert_eq!(state.continuation_cursor(true), None);
    }
}
