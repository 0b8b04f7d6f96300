//! Failure-isolating circuit breaker.
//!
//! The breaker gates whether admitted work may be dispatched. It trips after
//! a configured run of failures and resumes either when the cooldown elapses
//! or, while still closed, after a run of consecutive successes clears the
//! failure count (fast healing). There is no separate half-open state: a
//! cooldown expiry simply resumes dispatch and the next outcome re-evaluates.

use std::time::{Duration, Instant};

/// Consecutive successes that reset the failure count while closed.
const FAST_HEAL_SUCCESSES: u32 = 5;

/// Failure-count state machine gating dispatch.
///
/// A trip protects the downstream resource, not the admission boundary:
/// queued tickets are preserved and dispatched once the breaker closes.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    is_open: bool,
    failure_count: u32,
    success_count: u32,
    last_failure_at: Option<Instant>,
}

impl CircuitBreaker {
    /// Create a closed breaker that trips after `threshold` failures and
    /// stays open for `cooldown` after the last failure.
    #[must_use]
    pub const fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            is_open: false,
            failure_count: 0,
            success_count: 0,
            last_failure_at: None,
        }
    }

    /// Whether dispatch is currently halted.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Current consecutive-failure count.
    #[must_use]
    pub const fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Successes observed since the last failure-count reset.
    #[must_use]
    pub const fn success_count(&self) -> u32 {
        self.success_count
    }

    /// Record a successful outcome. Only meaningful while closed; once the
    /// success run reaches the fast-heal threshold the failure count resets.
    pub fn on_success(&mut self) {
        if self.is_open {
            return;
        }
        self.success_count += 1;
        if self.success_count >= FAST_HEAL_SUCCESSES {
            self.failure_count = 0;
            self.success_count = 0;
        }
    }

    /// Record a failed outcome. Returns `true` exactly when this failure
    /// trips the breaker open.
    pub fn on_failure(&mut self, now: Instant) -> bool {
        if self.is_open {
            return false;
        }
        self.failure_count += 1;
        self.success_count = 0;
        self.last_failure_at = Some(now);
        if self.failure_count >= self.threshold {
            self.is_open = true;
            tracing::warn!(failures = self.failure_count, "circuit breaker tripped");
            return true;
        }
        false
    }

    /// Whether the cooldown window since the last failure has elapsed.
    #[must_use]
    pub fn cooldown_elapsed(&self, now: Instant) -> bool {
        self.last_failure_at
            .map_or(true, |at| now.duration_since(at) > self.cooldown)
    }

    /// Close the breaker and zero both counters. Called by the dispatcher
    /// once the cooldown has elapsed.
    pub fn reset(&mut self) {
        self.is_open = false;
        self.failure_count = 0;
        self.success_count = 0;
        tracing::info!("circuit breaker reset");
    }
}
