//! Gate configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Admission gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// In-flight ceiling for dispatched tickets.
    pub max_concurrent_requests: u32,
    /// Timeout raced against every dispatched execution, in ms.
    pub request_timeout_ms: u64,
    /// Consecutive failures that trip the breaker open.
    pub circuit_breaker_threshold: u32,
    /// Cooldown after the last failure before dispatch resumes, in ms.
    pub circuit_breaker_timeout_ms: u64,
    /// Default freshness window for cached results, in ms. Payloads may
    /// override per ticket.
    pub cache_ttl_ms: u64,
    /// Admissions within the trailing 60 s window that raise the burst
    /// signal.
    pub burst_threshold: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: u32::try_from(num_cpus::get()).unwrap_or(4),
            request_timeout_ms: 30_000,
            circuit_breaker_threshold: 5,
            circuit_breaker_timeout_ms: 60_000,
            cache_ttl_ms: 60_000,
            burst_threshold: 100,
        }
    }
}

impl GateConfig {
    /// Configuration with defaults sized for the host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the in-flight ceiling.
    #[must_use]
    pub const fn with_max_concurrent_requests(mut self, max: u32) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    /// Set the per-request timeout in ms.
    #[must_use]
    pub const fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    /// Set the breaker trip threshold.
    #[must_use]
    pub const fn with_circuit_breaker_threshold(mut self, threshold: u32) -> Self {
        self.circuit_breaker_threshold = threshold;
        self
    }

    /// Set the breaker cooldown in ms.
    #[must_use]
    pub const fn with_circuit_breaker_timeout_ms(mut self, ms: u64) -> Self {
        self.circuit_breaker_timeout_ms = ms;
        self
    }

    /// Set the default cache TTL in ms.
    #[must_use]
    pub const fn with_cache_ttl_ms(mut self, ms: u64) -> Self {
        self.cache_ttl_ms = ms;
        self
    }

    /// Set the burst threshold.
    #[must_use]
    pub const fn with_burst_threshold(mut self, threshold: usize) -> Self {
        self.burst_threshold = threshold;
        self
    }

    /// Per-request timeout as a duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Breaker cooldown as a duration.
    #[must_use]
    pub const fn circuit_breaker_timeout(&self) -> Duration {
        Duration::from_millis(self.circuit_breaker_timeout_ms)
    }

    /// Default cache TTL as a duration.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_requests == 0 {
            return Err("max_concurrent_requests must be greater than 0".into());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be greater than 0".into());
        }
        if self.circuit_breaker_threshold == 0 {
            return Err("circuit_breaker_threshold must be greater than 0".into());
        }
        if self.circuit_breaker_timeout_ms == 0 {
            return Err("circuit_breaker_timeout_ms must be greater than 0".into());
        }
        if self.cache_ttl_ms == 0 {
            return Err("cache_ttl_ms must be greater than 0".into());
        }
        if self.burst_threshold == 0 {
            return Err("burst_threshold must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse gate configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `LOADGATE_*` environment variables on top of
    /// the defaults, loading a `.env` file if present.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        let mut cfg = Self::default();
        if let Some(v) = read_env("LOADGATE_MAX_CONCURRENT_REQUESTS")? {
            cfg.max_concurrent_requests = v;
        }
        if let Some(v) = read_env("LOADGATE_REQUEST_TIMEOUT_MS")? {
            cfg.request_timeout_ms = v;
        }
        if let Some(v) = read_env("LOADGATE_CIRCUIT_BREAKER_THRESHOLD")? {
            cfg.circuit_breaker_threshold = v;
        }
        if let Some(v) = read_env("LOADGATE_CIRCUIT_BREAKER_TIMEOUT_MS")? {
            cfg.circuit_breaker_timeout_ms = v;
        }
        if let Some(v) = read_env("LOADGATE_CACHE_TTL_MS")? {
            cfg.cache_ttl_ms = v;
        }
        if let Some(v) = read_env("LOADGATE_BURST_THRESHOLD")? {
            cfg.burst_threshold = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn read_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, String> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("{name} has invalid value `{raw}`")),
        Err(_) => Ok(None),
    }
}
