//! Builders to construct gate instances from configuration.

pub mod gate_builder;

pub use gate_builder::build_gate;
