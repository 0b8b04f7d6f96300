//! Construct a validated admission gate from configuration.

use crate::config::GateConfig;
use crate::core::{AdmissionGate, GateError, RequestExecutor, RequestPayload};
use crate::runtime::Spawn;

/// Validate `cfg` and build a gate around the injected executor and spawner.
///
/// The returned gate is idle; call [`AdmissionGate::enable`] to start the
/// dispatcher.
pub fn build_gate<P, R, E, S>(
    cfg: &GateConfig,
    executor: E,
    spawner: S,
) -> Result<AdmissionGate<P, R, E, S>, GateError>
where
    P: RequestPayload,
    R: Send + Sync + Clone + 'static,
    E: RequestExecutor<P, R>,
    S: Spawn + Clone + Send + 'static,
{
    cfg.validate().map_err(GateError::InvalidConfig)?;
    Ok(AdmissionGate::new(cfg.clone(), executor, spawner))
}
