//! # Loadgate
//!
//! In-process request admission and scheduling that protects a single server
//! instance from overload.
//!
//! Inbound work is admitted into four strict-precedence priority lanes and
//! dispatched by one logical worker under a concurrency ceiling. A
//! failure-counting circuit breaker halts dispatch when the downstream
//! resource degrades, a TTL cache short-circuits repeated expensive reads,
//! and a sliding-window burst detector raises an advisory signal when the
//! admission rate spikes.
//!
//! ## Core Problem Solved
//!
//! A single server instance under load needs one place that decides what
//! runs now, what waits, and what must not reach a failing backend:
//!
//! - **Strict priority**: critical traffic always dispatches before lower
//!   classes; FIFO order is preserved within a class
//! - **Bounded concurrency**: at most `max_concurrent_requests` tickets are
//!   in flight; the rest wait in their lanes
//! - **Failure isolation**: repeated downstream failures trip a breaker
//!   that pauses dispatch instead of hammering a degraded resource
//! - **Result caching**: cacheable reads resolve from a TTL cache without
//!   touching the backend
//!
//! ## Usage
//!
//! ```rust,ignore
//! use loadgate::builders::build_gate;
//! use loadgate::config::GateConfig;
//! use loadgate::runtime::TokioSpawner;
//! use loadgate::util::serde::Priority;
//!
//! let cfg = GateConfig::new()
//!     .with_max_concurrent_requests(8)
//!     .with_request_timeout_ms(5_000)
//!     .with_circuit_breaker_threshold(5);
//!
//! let gate = build_gate(&cfg, my_executor, TokioSpawner::current())?;
//! let mut events = gate.subscribe();
//! gate.enable();
//!
//! // Non-blocking admission; the outcome arrives on the event channel.
//! let ticket = gate.enqueue(my_query, Priority::High);
//! ```
//!
//! Admission never rejects and never raises: circuit-open and capacity-full
//! conditions surface as added latency only. Per-ticket failures (timeout,
//! execution error) arrive as `RequestFailed` events tied to the ticket id.
//!
//! For complete examples, see `tests/admission_gate_test.rs`.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core admission, scheduling, and failure-isolation logic.
pub mod core;
/// Configuration models for the gate.
pub mod config;
/// Builders to construct gate instances from configuration.
#[cfg(feature = "tokio-runtime")]
pub mod builders;
/// Runtime adapters and the spawn abstraction.
pub mod runtime;
/// Shared utilities.
pub mod util;
