//! Telemetry helpers for structured logging.

/// Initialize tracing output for the gate. Embedders that already install
/// their own subscriber keep it; otherwise an env-filtered fmt subscriber is
/// installed.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
