//! Core admission, scheduling, and failure-isolation logic.

pub mod breaker;
pub mod cache;
pub mod error;
pub mod executor;
#[cfg(feature = "tokio-runtime")]
pub mod gate;
pub mod history;
pub mod stats;
pub mod ticket;

pub use breaker::CircuitBreaker;
pub use cache::{CacheEntry, ResultCache};
pub use error::{AppResult, GateError};
pub use executor::{RequestExecutor, RequestPayload};
#[cfg(feature = "tokio-runtime")]
pub use gate::{AdmissionGate, GateEvent};
pub use history::{HistoryEntry, HistoryRing, BURST_WINDOW_MS, HISTORY_CAP};
pub use stats::{
    BreakerSnapshot, CacheSnapshot, GateSnapshot, GateStats, LaneSnapshot, OpStats,
    OpStatsSnapshot, TotalsSnapshot,
};
pub use ticket::{LaneSet, Ticket};
