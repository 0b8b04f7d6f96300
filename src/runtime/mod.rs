//! Runtime adapters decoupling the gate from a concrete async executor.

use std::future::Future;

#[cfg(feature = "tokio-runtime")]
pub mod tokio_spawner;

#[cfg(feature = "tokio-runtime")]
pub use tokio_spawner::TokioSpawner;

/// Abstraction for spawning the dispatcher worker and execution units.
pub trait Spawn {
    /// Spawn an async task onto the runtime.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
