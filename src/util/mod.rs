//! Shared utilities.

/// Wall-clock helpers.
pub mod clock;
/// Shared serializable value types.
pub mod serde;
/// Telemetry helpers.
pub mod telemetry;

pub use clock::*;
pub use serde::*;
pub use telemetry::*;
