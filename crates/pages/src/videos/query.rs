//! Transition table of the listing query.
//!
//! Every filter change resets paging and replaces the list; only reaching the
//! bottom of the page advances paging and appends.

use chrono::{DateTime, Utc};
use domain::{SortField, TimeWindow, VideoQuery};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    KeywordChanged(String),
    SortChanged(SortField),
    WindowChanged {
        window: TimeWindow,
        now: DateTime<Utc>,
    },
    PageAdvanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Start from an empty list
    Replace,
    /// Keep the held videos and add the new page after them
    Append,
}

impl FetchMode {
    /// Whether this transition starts a fresh result set, clearing the exhaustion latch
    pub fn resets_paging(&self) -> bool {
        matches!(self, FetchMode::Replace)
    }
}

pub fn reduce(query: &VideoQuery, event: QueryEvent) -> (VideoQuery, FetchMode) {
    let mut next = query.clone();
    let mode = match event {
        QueryEvent::KeywordChanged(keyword) => {
            next.keyword = keyword;
            FetchMode::Replace
        }
        QueryEvent::SortChanged(sort) => {
            next.sort = sort;
            FetchMode::Replace
        }
        QueryEvent::WindowChanged { window, now } => {
            next.start_time = Some(window.start_time(now));
            FetchMode::Replace
        }
        QueryEvent::PageAdvanced => {
            next.page += 1;
            FetchMode::Append
        }
    };
    if mode.resets_paging() {
        next.page = 1;
    }
    (next, mode)
}

/// What to do once the viewport reaches the bottom of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BottomReached {
    /// Set the exhaustion latch
    pub latch: bool,
    /// Request the next page
    pub fetch: bool,
}

/// Decide on paging when the bottom is reached with `held` videos loaded.
///
/// When the query is exhausted the latch is set, and the request is skipped
/// entirely if every video is already held.
pub fn on_bottom_reached(query: &VideoQuery, held: usize, total_count: u64) -> BottomReached {
    if query.is_exhausted(total_count) {
        BottomReached {
            latch: true,
            fetch: held as u64 != total_count,
        }
    } else {
        BottomReached {
            latch: false,
            fetch: true,
        }
    }
}
