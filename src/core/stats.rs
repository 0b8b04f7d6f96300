//! Running counters, per-operation query statistics, and snapshots.

use std::collections::HashMap;

use serde::Serialize;

/// Per-operation query statistics, keyed by the payload's operation label.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpStats {
    /// Executions observed for this operation.
    pub count: u64,
    /// Sum of elapsed times in milliseconds.
    pub total_time_ms: u64,
    /// Fastest observed execution.
    pub min_ms: u64,
    /// Slowest observed execution.
    pub max_ms: u64,
    /// Successful executions.
    pub success_count: u64,
    /// Failed executions (including timeouts).
    pub failure_count: u64,
}

impl OpStats {
    /// Fold one outcome into the stats.
    pub fn record(&mut self, elapsed_ms: u64, success: bool) {
        if self.count == 0 {
            self.min_ms = elapsed_ms;
            self.max_ms = elapsed_ms;
        } else {
            self.min_ms = self.min_ms.min(elapsed_ms);
            self.max_ms = self.max_ms.max(elapsed_ms);
        }
        self.count += 1;
        self.total_time_ms += elapsed_ms;
        if success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
    }

    /// Mean elapsed time in milliseconds.
    #[must_use]
    pub fn average_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            {
                self.total_time_ms as f64 / self.count as f64
            }
        }
    }
}

/// Monotonic counters and the incremental mean response time.
///
/// Written only under the gate's state lock; callers observe copies via
/// snapshots.
#[derive(Debug, Default)]
pub struct GateStats {
    /// Tickets admitted since construction.
    pub total_requests: u64,
    /// Tickets resolved successfully (cache hits included).
    pub completed_requests: u64,
    /// Tickets that failed or timed out.
    pub failed_requests: u64,
    /// Times the circuit breaker tripped open.
    pub circuit_breaker_trips: u64,
    /// Times the burst check fired.
    pub burst_detections: u64,
    /// Wall-clock ms of the most recent burst detection.
    pub last_burst_at_ms: Option<u128>,
    /// Incremental mean response time over completed requests, in ms.
    pub average_response_time_ms: f64,
    /// Per-operation query statistics.
    pub operations: HashMap<String, OpStats>,
}

impl GateStats {
    /// Record a successful outcome: bump the completion counter and fold the
    /// elapsed time into the running mean via `avg += (x - avg) / n`.
    pub fn record_success(&mut self, operation: &str, elapsed_ms: u64) {
        self.completed_requests += 1;
        #[allow(clippy::cast_precision_loss)]
        let delta = elapsed_ms as f64 - self.average_response_time_ms;
        #[allow(clippy::cast_precision_loss)]
        {
            self.average_response_time_ms += delta / self.completed_requests as f64;
        }
        self.operations
            .entry(operation.to_string())
            .or_default()
            .record(elapsed_ms, true);
    }

    /// Record a failed or timed-out outcome.
    pub fn record_failure(&mut self, operation: &str, elapsed_ms: u64) {
        self.failed_requests += 1;
        self.operations
            .entry(operation.to_string())
            .or_default()
            .record(elapsed_ms, false);
    }
}

/// Per-operation view exposed in snapshots, with the derived average.
#[derive(Debug, Clone, Serialize)]
pub struct OpStatsSnapshot {
    /// Executions observed.
    pub count: u64,
    /// Sum of elapsed times in milliseconds.
    pub total_time_ms: u64,
    /// Mean elapsed time in milliseconds.
    pub average_ms: f64,
    /// Fastest observed execution.
    pub min_ms: u64,
    /// Slowest observed execution.
    pub max_ms: u64,
    /// Successful executions.
    pub success_count: u64,
    /// Failed executions.
    pub failure_count: u64,
}

impl From<&OpStats> for OpStatsSnapshot {
    fn from(s: &OpStats) -> Self {
        Self {
            count: s.count,
            total_time_ms: s.total_time_ms,
            average_ms: s.average_ms(),
            min_ms: s.min_ms,
            max_ms: s.max_ms,
            success_count: s.success_count,
            failure_count: s.failure_count,
        }
    }
}

/// Totals section of a gate snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct TotalsSnapshot {
    /// Tickets admitted since construction.
    pub total_requests: u64,
    /// Tickets resolved successfully.
    pub completed_requests: u64,
    /// Tickets that failed or timed out.
    pub failed_requests: u64,
    /// Breaker trips observed.
    pub circuit_breaker_trips: u64,
    /// Burst detections observed.
    pub burst_detections: u64,
    /// Dispatched-but-unfinished tickets at snapshot time.
    pub active_requests: u32,
    /// Mean response time over completed requests, in ms.
    pub average_response_time_ms: f64,
    /// Wall-clock ms of the most recent burst, if any.
    pub last_burst_at_ms: Option<u128>,
}

/// Breaker section of a gate snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    /// Whether dispatch is currently halted.
    pub is_open: bool,
    /// Current consecutive-failure count.
    pub failure_count: u32,
    /// Successes since the last failure-count reset.
    pub success_count: u32,
}

/// Lane-depth section of a gate snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct LaneSnapshot {
    /// Critical lane depth.
    pub critical: usize,
    /// High lane depth.
    pub high: usize,
    /// Normal lane depth.
    pub normal: usize,
    /// Low lane depth.
    pub low: usize,
    /// Total queued across all lanes.
    pub total: usize,
}

/// Cache section of a gate snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    /// Stored entries, fresh or stale.
    pub size: usize,
    /// Stored keys.
    pub keys: Vec<String>,
}

/// Point-in-time view of the whole gate.
#[derive(Debug, Clone, Serialize)]
pub struct GateSnapshot {
    /// Counter totals and the running mean.
    pub totals: TotalsSnapshot,
    /// Breaker state.
    pub breaker: BreakerSnapshot,
    /// Per-lane queue depths.
    pub lanes: LaneSnapshot,
    /// Result-cache contents summary.
    pub cache: CacheSnapshot,
    /// Per-operation query statistics.
    pub operations: HashMap<String, OpStatsSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_mean() {
        let mut stats = GateStats::default();
        stats.record_success("q", 100);
        stats.record_success("q", 200);
        stats.record_success("q", 300);
        assert!((stats.average_response_time_ms - 200.0).abs() < f64::EPSILON);
        assert_eq!(stats.completed_requests, 3);
    }

    #[test]
    fn test_failure_does_not_move_mean() {
        let mut stats = GateStats::default();
        stats.record_success("q", 100);
        stats.record_failure("q", 5000);
        assert!((stats.average_response_time_ms - 100.0).abs() < f64::EPSILON);
        assert_eq!(stats.failed_requests, 1);
    }

    #[test]
    fn test_op_stats_min_max() {
        let mut op = OpStats::default();
        op.record(50, true);
        op.record(10, true);
        op.record(90, false);
        assert_eq!(op.min_ms, 10);
        assert_eq!(op.max_ms, 90);
        assert_eq!(op.count, 3);
        assert_eq!(op.success_count, 2);
        assert_eq!(op.failure_count, 1);
        assert!((op.average_ms() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_per_operation_keying() {
        let mut stats = GateStats::default();
        stats.record_success("users.list", 10);
        stats.record_success("orders.list", 30);
        assert_eq!(stats.operations.len(), 2);
        assert_eq!(stats.operations["users.list"].count, 1);
    }
}
