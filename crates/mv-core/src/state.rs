//! Application state management
//!
//! The viewer holds exactly one current value (the table on screen). Network
//! results arrive out of order, so every load is stamped with a ticket and only
//! the most recently issued ticket may replace the value.

use std::collections::VecDeque;
use std::fmt::Display;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info};

/// Maximum number of notices kept for display
const MAX_NOTICES: usize = 50;

/// Stamp handed out when a load starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    label: String,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Message shown to the user about a finished operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

struct Inner<T> {
    /// Last ticket handed out
    issued: u64,
    /// Revision of `current`, bumped on every replacement
    revision: u64,
    current: Option<Arc<T>>,
    /// Label of the load that is still expected to land, if any
    pending: Option<RequestTicket>,
    notices: VecDeque<Notice>,
}

/// Owned, replaceable application state
pub struct ViewerState<T> {
    inner: RwLock<Inner<T>>,
}

impl<T> ViewerState<T> {
    /// Create an empty state
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                issued: 0,
                revision: 0,
                current: None,
                pending: None,
                notices: VecDeque::new(),
            }),
        }
    }

    /// Start a load; any earlier ticket becomes stale
    pub fn begin_load(&self, label: impl Into<String>) -> RequestTicket {
        let mut inner = self.inner.write();
        inner.issued += 1;
        let ticket = RequestTicket {
            seq: inner.issued,
            label: label.into(),
        };
        debug!("Request #{} started: {}", ticket.seq, ticket.label);
        inner.pending = Some(ticket.clone());
        ticket
    }

    /// Apply the outcome of a load
    ///
    /// Returns `true` if a successful value replaced the current one. Results
    /// of superseded tickets are dropped. Errors are always reported.
    pub fn finish_load<E: Display>(&self, ticket: RequestTicket, result: Result<T, E>) -> bool {
        let mut inner = self.inner.write();
        let is_latest = ticket.seq == inner.issued;
        if is_latest {
            inner.pending = None;
        }

        match result {
            Ok(value) if is_latest => {
                inner.revision += 1;
                inner.current = Some(Arc::new(value));
                info!("Request #{} applied: {}", ticket.seq, ticket.label);
                Self::push(&mut inner, NoticeLevel::Info, format!("Loaded {}", ticket.label));
                true
            }
            Ok(_) => {
                debug!(
                    "Request #{} superseded by #{}, dropping result",
                    ticket.seq, inner.issued
                );
                false
            }
            Err(e) => {
                error!("Request #{} failed ({}): {}", ticket.seq, ticket.label, e);
                Self::push(
                    &mut inner,
                    NoticeLevel::Error,
                    format!("Failed to load {}: {}", ticket.label, e),
                );
                false
            }
        }
    }

    /// Replace the current value directly, superseding any load in flight
    pub fn replace(&self, value: T, label: impl Display) {
        let mut inner = self.inner.write();
        inner.issued += 1;
        inner.pending = None;
        inner.revision += 1;
        inner.current = Some(Arc::new(value));
        Self::push(&mut inner, NoticeLevel::Info, format!("Loaded {}", label));
    }

    /// Current value with its revision
    pub fn current(&self) -> Option<(u64, Arc<T>)> {
        let inner = self.inner.read();
        inner.current.clone().map(|value| (inner.revision, value))
    }

    /// Revision of the current value, `0` before anything was loaded
    pub fn revision(&self) -> u64 {
        self.inner.read().revision
    }

    /// Load still awaiting its result
    pub fn pending(&self) -> Option<RequestTicket> {
        self.inner.read().pending.clone()
    }

    /// Record an informational notice
    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        Self::push(&mut self.inner.write(), NoticeLevel::Info, message);
    }

    /// Record a failure so the user sees it
    pub fn report_error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        Self::push(&mut self.inner.write(), NoticeLevel::Error, message);
    }

    /// Notices, oldest first
    pub fn notices(&self) -> Vec<Notice> {
        self.inner.read().notices.iter().cloned().collect()
    }

    /// Most recent notice
    pub fn last_notice(&self) -> Option<Notice> {
        self.inner.read().notices.back().cloned()
    }

    pub fn clear_notices(&self) {
        self.inner.write().notices.clear();
    }

    fn push(inner: &mut Inner<T>, level: NoticeLevel, message: String) {
        if inner.notices.len() >= MAX_NOTICES {
            inner.notices.pop_front();
        }
        inner.notices.push_back(Notice { level, message });
    }
}

impl<T> Default for ViewerState<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_load_wins() {
        let state = ViewerState::<u32>::new();
        let first = state.begin_load("first");
        let second = state.begin_load("second");

        assert!(state.finish_load::<String>(second, Ok(2)));
        assert!(!state.finish_load::<String>(first, Ok(1)));

        let (revision, value) = state.current().unwrap();
        assert_eq!(*value, 2);
        assert_eq!(revision, 1);
    }

    #[test]
    fn test_stale_result_does_not_clear_pending() {
        let state = ViewerState::<u32>::new();
        let first = state.begin_load("first");
        let second = state.begin_load("second");

        state.finish_load::<String>(first, Ok(1));
        assert_eq!(state.pending(), Some(second.clone()));
        assert!(state.current().is_none());

        state.finish_load::<String>(second, Ok(2));
        assert!(state.pending().is_none());
    }

    #[test]
    fn test_errors_are_reported() {
        let state = ViewerState::<u32>::new();
        let ticket = state.begin_load("matrix 'a'");
        assert!(!state.finish_load(ticket, Err("connection refused")));

        let notice = state.last_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("connection refused"));
        assert!(state.current().is_none());
    }

    #[test]
    fn test_replace_supersedes_inflight_load() {
        let state = ViewerState::<u32>::new();
        let ticket = state.begin_load("remote");
        state.replace(7, "local table");

        assert!(!state.finish_load::<String>(ticket, Ok(1)));
        assert_eq!(*state.current().unwrap().1, 7);
    }

    #[test]
    fn test_notices_are_bounded() {
        let state = ViewerState::<u32>::new();
        for i in 0..(MAX_NOTICES + 5) {
            state.info(format!("notice {}", i));
        }
        let notices = state.notices();
        assert_eq!(notices.len(), MAX_NOTICES);
        assert_eq!(notices[0].message, "notice 5");
    }
}
