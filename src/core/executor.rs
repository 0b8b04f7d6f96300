//! Injected execution contracts.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::error::AppResult;

/// Contract for payloads admitted into the gate.
///
/// A payload describes one unit of downstream work. Cacheable read
/// operations expose a deterministic key; everything else leaves the
/// defaults in place and always reaches the executor.
pub trait RequestPayload: Send + Sync + 'static {
    /// Label grouping this payload for per-operation statistics.
    fn operation(&self) -> &str;

    /// Deterministic cache key for cacheable data operations, `None`
    /// otherwise. Two payloads that must share a cached result must return
    /// the same key.
    fn cache_key(&self) -> Option<String> {
        None
    }

    /// Per-ticket TTL override; the gate's configured default applies when
    /// `None`.
    fn cache_ttl(&self) -> Option<Duration> {
        None
    }
}

/// Abstraction for resolving a payload against the downstream resource.
///
/// This is the injected callback the gate races against its request
/// timeout. On a fresh cache hit the executor is never invoked.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use loadgate::core::{AppResult, RequestExecutor};
///
/// #[derive(Clone)]
/// struct DbExecutor;
///
/// #[async_trait]
/// impl RequestExecutor<Query, Rows> for DbExecutor {
///     async fn execute(&self, query: Query) -> AppResult<Rows> {
///         run_query(query).await
///     }
/// }
/// ```
#[async_trait]
pub trait RequestExecutor<P, R>: Send + Sync + Clone + 'static
where
    P: RequestPayload,
    R: Send + Sync + Clone + 'static,
{
    /// Resolve one payload. Errors are recorded against the ticket and the
    /// breaker; they never propagate out of the admission call.
    async fn execute(&self, payload: P) -> AppResult<R>;
}
