//! Backward walk over the historical event log.
//!
//! The log is served newest first in bounded pages. Each request after the
//! first carries the oldest event id seen so far as a `before_id` cursor, so
//! the walk only ever moves back in time.

use crate::error::Result;
use crate::event::ActionLogPage;
use std::time::Duration;
use tracing::{debug, warn};

/// One page fetch against the log source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Inclusive lower bound, unix seconds.
    pub since: i64,
    /// Upper bound, unix seconds.
    pub before: i64,
    pub limit: usize,
    /// Only return events older than this id.
    pub before_id: Option<u64>,
}

/// Anything that can serve pages of the historical log.
pub trait LogSource {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<ActionLogPage>;
}

impl<T: LogSource + ?Sized> LogSource for &mut T {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<ActionLogPage> {
        (**self).fetch_page(request)
    }
}

/// Lazy, forward-only sequence of log pages covering `[since, before]`.
pub struct Paginator<'a, S: LogSource + ?Sized> {
    source: &'a mut S,
    since: i64,
    before: i64,
    page_size: usize,
    interval: Duration,
    cursor: Option<u64>,
    done: bool,
    fetches: usize,
    entries: usize,
    truncated: Option<String>,
}

/// Start a backward walk over `[since, before]` in pages of `page_size`.
pub fn fetch_window<S: LogSource + ?Sized>(
    source: &mut S,
    since: i64,
    before: i64,
    page_size: usize,
) -> Paginator<'_, S> {
    Paginator {
        source,
        since,
        before,
        page_size: page_size.max(1),
        interval: Duration::ZERO,
        cursor: None,
        done: false,
        fetches: 0,
        entries: 0,
        truncated: None,
    }
}

impl<'a, S: LogSource + ?Sized> Paginator<'a, S> {
    /// Pause between consecutive fetches (never before the first).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Number of fetches issued so far, including a failed one.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Number of raw entries yielded so far.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// The transport error that cut the walk short, if any.
    pub fn truncated(&self) -> Option<&str> {
        self.truncated.as_deref()
    }
}

impl<'a, S: LogSource + ?Sized> Iterator for Paginator<'a, S> {
    type Item = ActionLogPage;

    fn next(&mut self) -> Option<ActionLogPage> {
        if self.done {
            return None;
        }
        if self.fetches > 0 && !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }

        let request = PageRequest {
            since: self.since,
            before: self.before,
            limit: self.page_size,
            before_id: self.cursor,
        };
        self.fetches += 1;

        let page = match self.source.fetch_page(&request) {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    since = self.since,
                    before = self.before,
                    before_id = ?self.cursor,
                    error = %e,
                    "log page fetch failed; window truncated"
                );
                self.truncated = Some(e.to_string());
                self.done = true;
                return None;
            }
        };

        if page.is_empty() {
            self.done = true;
            return None;
        }
        self.entries += page.len();

        if page.len() < self.page_size {
            self.done = true;
        } else {
            // A full page must move the cursor strictly backward, otherwise
            // the source is not cooperating and we stop here.
            match page.iter().filter_map(|e| e.id).min() {
                Some(oldest) if self.cursor.map_or(true, |c| oldest < c) => {
                    self.cursor = Some(oldest);
                }
                _ => {
                    debug!(
                        before_id = ?self.cursor,
                        "full page without a usable cursor; treating as end of log"
                    );
                    self.done = true;
                }
            }
        }

        Some(page)
    }
}
