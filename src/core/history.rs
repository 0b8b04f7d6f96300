//! Bounded request history and burst detection.
//!
//! The history ring exists for observability only: the burst signal it
//! feeds never rejects or delays admission.

use std::collections::VecDeque;

use serde::Serialize;

use crate::util::serde::{Priority, TicketId};

/// Maximum retained history entries; the oldest is evicted beyond this.
pub const HISTORY_CAP: usize = 1000;

/// Trailing window inspected by the burst check, in milliseconds.
pub const BURST_WINDOW_MS: u128 = 60_000;

/// One observed admission or outcome.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// Ticket this entry belongs to.
    pub id: TicketId,
    /// Priority class of the ticket.
    pub priority: Priority,
    /// Wall-clock time of the observation in ms since epoch.
    pub at_ms: u128,
    /// Execution elapsed time; `None` for admission entries.
    pub response_time_ms: Option<u64>,
    /// Outcome flag; `None` for admission entries.
    pub success: Option<bool>,
    /// Error text for failed outcomes.
    pub error: Option<String>,
}

impl HistoryEntry {
    /// Entry recorded when a ticket is admitted into its lane.
    #[must_use]
    pub const fn admitted(id: TicketId, priority: Priority, at_ms: u128) -> Self {
        Self {
            id,
            priority,
            at_ms,
            response_time_ms: None,
            success: None,
            error: None,
        }
    }

    /// Entry recorded when a dispatched ticket resolves.
    #[must_use]
    pub const fn outcome(
        id: TicketId,
        priority: Priority,
        at_ms: u128,
        response_time_ms: u64,
        success: bool,
        error: Option<String>,
    ) -> Self {
        Self {
            id,
            priority,
            at_ms,
            response_time_ms: Some(response_time_ms),
            success: Some(success),
            error,
        }
    }
}

/// Capped ring buffer of history entries.
#[derive(Debug)]
pub struct HistoryRing {
    entries: VecDeque<HistoryEntry>,
    cap: usize,
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new(HISTORY_CAP)
    }
}

impl HistoryRing {
    /// Create a ring holding at most `cap` entries.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap.min(HISTORY_CAP)),
            cap,
        }
    }

    /// Append an entry, evicting the oldest at capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() >= self.cap {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Count entries observed at or after `cutoff_ms`.
    #[must_use]
    pub fn count_since(&self, cutoff_ms: u128) -> usize {
        // Entries are appended in time order, so scan from the back.
        self.entries
            .iter()
            .rev()
            .take_while(|e| e.at_ms >= cutoff_ms)
            .count()
    }

    /// Entries observed within the trailing burst window ending at `now_ms`.
    #[must_use]
    pub fn burst_window_count(&self, now_ms: u128) -> usize {
        self.count_since(now_ms.saturating_sub(BURST_WINDOW_MS))
    }

    /// Current number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
