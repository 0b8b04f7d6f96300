//! Configuration models for the admission gate.

pub mod gate;

pub use gate::GateConfig;
