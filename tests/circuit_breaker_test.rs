//! Integration tests for breaker trip, halted dispatch, cooldown healing,
//! and fast healing through consecutive successes.

use async_trait::async_trait;
use loadgate::config::GateConfig;
use loadgate::core::{AdmissionGate, AppResult, GateEvent, RequestExecutor, RequestPayload};
use loadgate::runtime::Spawn;
use loadgate::util::serde::Priority;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
struct Call {
    fail: bool,
}

impl RequestPayload for Call {
    fn operation(&self) -> &str {
        "call"
    }
}

#[derive(Clone)]
struct FlakyExecutor {
    invocations: Arc<AtomicU32>,
}

impl FlakyExecutor {
    fn new() -> Self {
        Self {
            invocations: Arc::new(AtomicU32::new(0)),
        }
    }

    fn invocations(&self) -> u32 {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestExecutor<Call, String> for FlakyExecutor {
    async fn execute(&self, call: Call) -> AppResult<String> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if call.fail {
            anyhow::bail!("backend unavailable");
        }
        Ok("ok".to_string())
    }
}

#[derive(Clone)]
struct TestSpawner;

impl Spawn for TestSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(fut);
    }
}

async fn wait_for_event<F>(
    rx: &mut broadcast::Receiver<GateEvent<String>>,
    mut pred: F,
) -> GateEvent<String>
where
    F: FnMut(&GateEvent<String>) -> bool,
{
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for gate event")
            .expect("event channel closed");
        if pred(&event) {
            return event;
        }
    }
}

/// The documented scenario: threshold 3, cooldown 1000 ms. Three failing
/// tickets trip the breaker; a fourth is admitted but held until the
/// cooldown has elapsed since the third failure.
#[tokio::test]
async fn test_trip_halts_dispatch_until_cooldown() {
    let executor = FlakyExecutor::new();
    let cfg = GateConfig::new()
        .with_max_concurrent_requests(1)
        .with_circuit_breaker_threshold(3)
        .with_circuit_breaker_timeout_ms(1000);
    let gate = AdmissionGate::new(cfg, executor.clone(), TestSpawner);
    let mut rx = gate.subscribe();
    gate.enable();

    for _ in 0..3 {
        gate.enqueue(Call { fail: true }, Priority::Normal);
    }
    let tripped =
        wait_for_event(&mut rx, |e| matches!(e, GateEvent::CircuitBreakerTripped { .. })).await;
    let trip_instant = Instant::now();
    if let GateEvent::CircuitBreakerTripped { failure_count } = tripped {
        assert_eq!(failure_count, 3);
    }

    let snapshot = gate.stats();
    assert!(snapshot.breaker.is_open);
    assert_eq!(snapshot.totals.circuit_breaker_trips, 1);
    assert_eq!(snapshot.totals.failed_requests, 3);

    // Admitted while open, but not dispatched.
    gate.enqueue(Call { fail: false }, Priority::Normal);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(executor.invocations(), 3);
    assert_eq!(gate.stats().lanes.total, 1);

    // Cooldown expiry closes the breaker and releases the queued ticket.
    wait_for_event(&mut rx, |e| matches!(e, GateEvent::CircuitBreakerReset)).await;
    let completed =
        wait_for_event(&mut rx, |e| matches!(e, GateEvent::RequestCompleted { .. })).await;
    // trip_instant lags the actual failure timestamp by event delivery, so
    // allow a little skew below the nominal 1000 ms cooldown.
    assert!(
        trip_instant.elapsed() >= Duration::from_millis(900),
        "dispatch resumed before the cooldown elapsed"
    );
    if let GateEvent::RequestCompleted { result, .. } = completed {
        assert_eq!(result, "ok");
    }
    assert_eq!(executor.invocations(), 4);

    let healed = gate.stats();
    assert!(!healed.breaker.is_open);
    assert_eq!(healed.breaker.failure_count, 0);
    gate.stop();
}

#[tokio::test]
async fn test_five_successes_reset_failure_count() {
    let executor = FlakyExecutor::new();
    let cfg = GateConfig::new()
        .with_max_concurrent_requests(1)
        .with_circuit_breaker_threshold(10);
    let gate = AdmissionGate::new(cfg, executor.clone(), TestSpawner);
    let mut rx = gate.subscribe();
    gate.enable();

    gate.enqueue(Call { fail: true }, Priority::Normal);
    gate.enqueue(Call { fail: true }, Priority::Normal);
    for _ in 0..2 {
        wait_for_event(&mut rx, |e| matches!(e, GateEvent::RequestFailed { .. })).await;
    }
    assert_eq!(gate.stats().breaker.failure_count, 2);

    for _ in 0..5 {
        gate.enqueue(Call { fail: false }, Priority::Normal);
    }
    for _ in 0..5 {
        wait_for_event(&mut rx, |e| matches!(e, GateEvent::RequestCompleted { .. })).await;
    }

    let snapshot = gate.stats();
    assert!(!snapshot.breaker.is_open);
    assert_eq!(snapshot.breaker.failure_count, 0);
    assert_eq!(snapshot.breaker.success_count, 0);
    gate.stop();
}

#[tokio::test]
async fn test_failures_below_threshold_keep_dispatching() {
    let executor = FlakyExecutor::new();
    let cfg = GateConfig::new()
        .with_max_concurrent_requests(1)
        .with_circuit_breaker_threshold(5);
    let gate = AdmissionGate::new(cfg, executor.clone(), TestSpawner);
    let mut rx = gate.subscribe();
    gate.enable();

    gate.enqueue(Call { fail: true }, Priority::Normal);
    gate.enqueue(Call { fail: true }, Priority::Normal);
    gate.enqueue(Call { fail: false }, Priority::Normal);

    for _ in 0..2 {
        wait_for_event(&mut rx, |e| matches!(e, GateEvent::RequestFailed { .. })).await;
    }
    wait_for_event(&mut rx, |e| matches!(e, GateEvent::RequestCompleted { .. })).await;

    let snapshot = gate.stats();
    assert!(!snapshot.breaker.is_open);
    assert_eq!(snapshot.totals.circuit_breaker_trips, 0);
    assert_eq!(executor.invocations(), 3);
    gate.stop();
}
