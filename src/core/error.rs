//! Error types for admission-gate operations.

use std::time::Duration;

use thiserror::Error;

/// Errors produced while resolving an admitted ticket.
///
/// Circuit-open and capacity-full conditions are deliberately absent: they
/// manifest as added queue latency, never as a per-ticket error.
#[derive(Debug, Clone, Error)]
pub enum GateError {
    /// The execution callback did not resolve within the request timeout.
    #[error("request timed out after {0:?}")]
    TimeoutExceeded(Duration),
    /// The execution callback raised an error; the message is opaque.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    /// Gate configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
