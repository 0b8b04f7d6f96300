//! The admission gate: priority-lane admission, bounded-concurrency
//! dispatch, breaker gating, and cache-aware execution.
//!
//! One logical dispatcher worker owns the pull side: it pops the head of the
//! highest-priority non-empty lane whenever the breaker is closed and an
//! in-flight slot is free, then spawns an execution unit racing the request
//! timeout. All shared structures live behind a single `parking_lot::Mutex`
//! so admission (caller context) and outcome recording (execution units)
//! mutate them one writer at a time.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::config::GateConfig;
use crate::core::breaker::CircuitBreaker;
use crate::core::cache::ResultCache;
use crate::core::error::GateError;
use crate::core::executor::{RequestExecutor, RequestPayload};
use crate::core::history::{HistoryEntry, HistoryRing};
use crate::core::stats::{
    BreakerSnapshot, CacheSnapshot, GateSnapshot, GateStats, LaneSnapshot, TotalsSnapshot,
};
use crate::core::ticket::{LaneSet, Ticket};
use crate::runtime::Spawn;
use crate::util::clock::now_ms;
use crate::util::serde::{new_ticket_id, Priority, TicketId};

/// Dispatcher backoff while the breaker cooldown is pending.
const COOLDOWN_POLL: Duration = Duration::from_millis(1000);
/// Dispatcher backoff when lanes are empty or all in-flight slots are taken.
const IDLE_POLL: Duration = Duration::from_millis(100);
/// Capacity of the event fan-out channel; slow subscribers observe lag.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Notifications fanned out to subscribers.
///
/// Circuit-open and capacity-full conditions never appear here as ticket
/// failures; they only delay dispatch.
#[derive(Debug, Clone)]
pub enum GateEvent<R> {
    /// A ticket entered its lane.
    RequestAdded {
        /// Ticket identifier.
        id: TicketId,
        /// Admitted priority class.
        priority: Priority,
    },
    /// A dispatched ticket resolved successfully.
    RequestCompleted {
        /// Ticket identifier.
        id: TicketId,
        /// Admitted priority class.
        priority: Priority,
        /// The resolved value.
        result: R,
        /// Whether the value came from the result cache.
        from_cache: bool,
        /// Elapsed dispatch-to-resolution time in ms.
        elapsed_ms: u64,
    },
    /// A dispatched ticket failed or timed out.
    RequestFailed {
        /// Ticket identifier.
        id: TicketId,
        /// Admitted priority class.
        priority: Priority,
        /// What went wrong.
        error: GateError,
    },
    /// The admission rate crossed the burst threshold. Advisory only.
    BurstDetected {
        /// History entries observed in the trailing window.
        window_count: usize,
    },
    /// The breaker opened; dispatch is halted until the cooldown elapses.
    CircuitBreakerTripped {
        /// Failure count at the moment of the trip.
        failure_count: u32,
    },
    /// The breaker closed after its cooldown; dispatch resumed.
    CircuitBreakerReset,
    /// Dispatch was enabled.
    Enabled,
    /// Dispatch was disabled; admission continues.
    Disabled,
}

/// Mutable aggregate owned by the gate, guarded by one mutex.
struct GateState<P, R> {
    lanes: LaneSet<P>,
    breaker: CircuitBreaker,
    cache: ResultCache<R>,
    history: HistoryRing,
    stats: GateStats,
}

/// State shared between the admission API, the dispatcher, and execution
/// units.
struct GateShared<P, R> {
    config: GateConfig,
    state: Mutex<GateState<P, R>>,
    /// Dispatched-but-unfinished tickets; the in-flight ceiling is enforced
    /// with a CAS reservation on this gauge.
    active_requests: AtomicU32,
    enabled: AtomicBool,
    shutdown: AtomicBool,
    running: AtomicBool,
    events: broadcast::Sender<GateEvent<R>>,
}

/// In-process request admission and scheduling gate.
///
/// Admits work into four priority lanes via [`AdmissionGate::enqueue`],
/// dispatches it under `max_concurrent_requests`, isolates downstream
/// failures with a circuit breaker, and caches results of cacheable
/// operations under a TTL. Outcomes surface through the event channel, never
/// as errors from the admission call.
pub struct AdmissionGate<P, R, E, S>
where
    P: RequestPayload,
    R: Send + Sync + Clone + 'static,
{
    shared: Arc<GateShared<P, R>>,
    executor: E,
    spawner: S,
}

impl<P, R, E, S> Clone for AdmissionGate<P, R, E, S>
where
    P: RequestPayload,
    R: Send + Sync + Clone + 'static,
    E: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            executor: self.executor.clone(),
            spawner: self.spawner.clone(),
        }
    }
}

impl<P, R, E, S> AdmissionGate<P, R, E, S>
where
    P: RequestPayload,
    R: Send + Sync + Clone + 'static,
    E: RequestExecutor<P, R>,
    S: Spawn + Clone + Send + 'static,
{
    /// Create a gate from configuration, an execution callback, and a
    /// spawner. The dispatcher does not run until [`AdmissionGate::enable`]
    /// is called.
    pub fn new(config: GateConfig, executor: E, spawner: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let breaker = CircuitBreaker::new(
            config.circuit_breaker_threshold,
            config.circuit_breaker_timeout(),
        );
        Self {
            shared: Arc::new(GateShared {
                config,
                state: Mutex::new(GateState {
                    lanes: LaneSet::new(),
                    breaker,
                    cache: ResultCache::new(),
                    history: HistoryRing::default(),
                    stats: GateStats::default(),
                }),
                active_requests: AtomicU32::new(0),
                enabled: AtomicBool::new(false),
                shutdown: AtomicBool::new(false),
                running: AtomicBool::new(false),
                events,
            }),
            executor,
            spawner,
        }
    }

    /// Admit a payload into the lane for `priority` and return its ticket
    /// id. Synchronous and non-blocking; never rejects. The burst check runs
    /// as a side effect and is advisory only.
    pub fn enqueue(&self, payload: P, priority: Priority) -> TicketId {
        let id = new_ticket_id();
        let at = now_ms();

        let burst = {
            let mut state = self.shared.state.lock();
            state.lanes.push(Ticket::new(id, payload, priority));
            state.stats.total_requests += 1;
            state.history.push(HistoryEntry::admitted(id, priority, at));

            let window_count = state.history.burst_window_count(at);
            if window_count >= self.shared.config.burst_threshold {
                state.stats.burst_detections += 1;
                state.stats.last_burst_at_ms = Some(at);
                Some(window_count)
            } else {
                None
            }
        };

        tracing::debug!(%id, %priority, "request admitted");
        let _ = self.shared.events.send(GateEvent::RequestAdded { id, priority });
        if let Some(window_count) = burst {
            tracing::warn!(window_count, "traffic burst detected");
            let _ = self.shared.events.send(GateEvent::BurstDetected { window_count });
        }
        id
    }

    /// Subscribe to gate notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent<R>> {
        self.shared.events.subscribe()
    }

    /// Point-in-time snapshot of counters, breaker, lanes, cache, and
    /// per-operation statistics.
    #[must_use]
    pub fn stats(&self) -> GateSnapshot {
        let state = self.shared.state.lock();
        let sizes = state.lanes.sizes();
        GateSnapshot {
            totals: TotalsSnapshot {
                total_requests: state.stats.total_requests,
                completed_requests: state.stats.completed_requests,
                failed_requests: state.stats.failed_requests,
                circuit_breaker_trips: state.stats.circuit_breaker_trips,
                burst_detections: state.stats.burst_detections,
                active_requests: self.shared.active_requests.load(Ordering::Acquire),
                average_response_time_ms: state.stats.average_response_time_ms,
                last_burst_at_ms: state.stats.last_burst_at_ms,
            },
            breaker: BreakerSnapshot {
                is_open: state.breaker.is_open(),
                failure_count: state.breaker.failure_count(),
                success_count: state.breaker.success_count(),
            },
            lanes: LaneSnapshot {
                critical: sizes[0],
                high: sizes[1],
                normal: sizes[2],
                low: sizes[3],
                total: state.lanes.len(),
            },
            cache: CacheSnapshot {
                size: state.cache.len(),
                keys: state.cache.keys(),
            },
            operations: state
                .stats
                .operations
                .iter()
                .map(|(name, op)| (name.clone(), op.into()))
                .collect(),
        }
    }

    /// Empty the result cache.
    pub fn clear_cache(&self) {
        self.shared.state.lock().cache.clear();
    }

    /// Start or resume the dispatcher. Spawns the worker on first call (or
    /// after [`AdmissionGate::stop`]); later calls just resume dispatch.
    pub fn enable(&self) {
        self.shared.shutdown.store(false, Ordering::Release);
        self.shared.enabled.store(true, Ordering::Release);
        if !self.shared.running.swap(true, Ordering::AcqRel) {
            let shared = Arc::clone(&self.shared);
            let executor = self.executor.clone();
            let spawner = self.spawner.clone();
            self.spawner
                .spawn(dispatch_loop(shared, executor, spawner));
        }
        tracing::info!("admission gate enabled");
        let _ = self.shared.events.send(GateEvent::Enabled);
    }

    /// Pause dispatch. Admission continues; queued tickets wait.
    pub fn disable(&self) {
        self.shared.enabled.store(false, Ordering::Release);
        tracing::info!("admission gate disabled");
        let _ = self.shared.events.send(GateEvent::Disabled);
    }

    /// Terminate the dispatcher worker. In-flight executions run to their
    /// timeout; queued tickets stay in their lanes.
    pub fn stop(&self) {
        self.shared.enabled.store(false, Ordering::Release);
        self.shared.shutdown.store(true, Ordering::Release);
        tracing::info!("admission gate stopped");
    }
}

/// Reserve one in-flight slot with a CAS loop against the configured
/// ceiling.
fn try_reserve_slot<P, R>(shared: &GateShared<P, R>) -> bool {
    let max = shared.config.max_concurrent_requests;
    let mut current = shared.active_requests.load(Ordering::Acquire);
    loop {
        if current >= max {
            return false;
        }
        match shared.active_requests.compare_exchange_weak(
            current,
            current + 1,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => return true,
            Err(actual) => current = actual,
        }
    }
}

/// Single logical dispatcher worker.
///
/// Loop order follows the design: breaker gate, capacity gate, lane pop,
/// spawn. The pop itself is serialized here, which preserves FIFO within a
/// lane and strict precedence across lanes even though up to
/// `max_concurrent_requests` execution units may be in flight at once.
async fn dispatch_loop<P, R, E, S>(shared: Arc<GateShared<P, R>>, executor: E, spawner: S)
where
    P: RequestPayload,
    R: Send + Sync + Clone + 'static,
    E: RequestExecutor<P, R>,
    S: Spawn + Clone + Send + 'static,
{
    tracing::debug!("dispatcher worker started");
    loop {
        if shared.shutdown.load(Ordering::Acquire) {
            break;
        }
        if !shared.enabled.load(Ordering::Acquire) {
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        }

        // Breaker gate: an open breaker halts dispatch, it never fast-fails
        // queued work. Cooldown expiry closes the breaker in place.
        let cooling = {
            let mut state = shared.state.lock();
            if state.breaker.is_open() {
                if state.breaker.cooldown_elapsed(Instant::now()) {
                    state.breaker.reset();
                    drop(state);
                    let _ = shared.events.send(GateEvent::CircuitBreakerReset);
                    false
                } else {
                    true
                }
            } else {
                false
            }
        };
        if cooling {
            tokio::time::sleep(COOLDOWN_POLL).await;
            continue;
        }

        if !try_reserve_slot(&shared) {
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        }

        let ticket = shared.state.lock().lanes.pop_next();
        let Some(ticket) = ticket else {
            shared.active_requests.fetch_sub(1, Ordering::Release);
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        };

        tracing::debug!(id = %ticket.id, priority = %ticket.priority, "dispatching ticket");
        let shared_unit = Arc::clone(&shared);
        let executor_unit = executor.clone();
        spawner.spawn(async move {
            run_ticket(shared_unit, executor_unit, ticket).await;
        });
    }
    shared.running.store(false, Ordering::Release);
    tracing::debug!("dispatcher worker exited");
}

/// Resolve one dispatched ticket through the cache-aware executor, racing
/// the request timeout, then record its outcome.
async fn run_ticket<P, R, E>(shared: Arc<GateShared<P, R>>, executor: E, ticket: Ticket<P>)
where
    P: RequestPayload,
    R: Send + Sync + Clone + 'static,
    E: RequestExecutor<P, R>,
{
    let started = Instant::now();
    let Ticket {
        id,
        payload,
        priority,
        ..
    } = ticket;

    let key = payload.cache_key();
    let ttl = payload
        .cache_ttl()
        .unwrap_or_else(|| shared.config.cache_ttl());

    if let Some(key) = key.as_deref() {
        let hit = shared
            .state
            .lock()
            .cache
            .get_fresh(key, Instant::now())
            .cloned();
        if let Some(value) = hit {
            record_success(&shared, id, priority, payload.operation(), value, true, started);
            return;
        }
    }

    let operation = payload.operation().to_string();
    let timeout = shared.config.request_timeout();
    match tokio::time::timeout(timeout, executor.execute(payload)).await {
        Ok(Ok(value)) => {
            if let Some(key) = key {
                shared.state.lock().cache.insert(key, value.clone(), ttl);
            }
            record_success(&shared, id, priority, &operation, value, false, started);
        }
        Ok(Err(err)) => {
            let error = GateError::ExecutionFailed(err.to_string());
            record_failure(&shared, id, priority, &operation, error, started);
        }
        // The callback's eventual result, if any, is discarded with its
        // future.
        Err(_) => {
            let error = GateError::TimeoutExceeded(timeout);
            record_failure(&shared, id, priority, &operation, error, started);
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn record_success<P, R>(
    shared: &Arc<GateShared<P, R>>,
    id: TicketId,
    priority: Priority,
    operation: &str,
    result: R,
    from_cache: bool,
    started: Instant,
) where
    P: RequestPayload,
    R: Send + Sync + Clone + 'static,
{
    let elapsed = elapsed_ms(started);
    shared.active_requests.fetch_sub(1, Ordering::Release);
    {
        let mut state = shared.state.lock();
        state.stats.record_success(operation, elapsed);
        state
            .history
            .push(HistoryEntry::outcome(id, priority, now_ms(), elapsed, true, None));
        state.breaker.on_success();
    }
    tracing::debug!(%id, from_cache, elapsed, "request completed");
    let _ = shared.events.send(GateEvent::RequestCompleted {
        id,
        priority,
        result,
        from_cache,
        elapsed_ms: elapsed,
    });
}

fn record_failure<P, R>(
    shared: &Arc<GateShared<P, R>>,
    id: TicketId,
    priority: Priority,
    operation: &str,
    error: GateError,
    started: Instant,
) where
    P: RequestPayload,
    R: Send + Sync + Clone + 'static,
{
    let elapsed = elapsed_ms(started);
    shared.active_requests.fetch_sub(1, Ordering::Release);
    let tripped = {
        let mut state = shared.state.lock();
        state.stats.record_failure(operation, elapsed);
        state.history.push(HistoryEntry::outcome(
            id,
            priority,
            now_ms(),
            elapsed,
            false,
            Some(error.to_string()),
        ));
        let tripped = state.breaker.on_failure(Instant::now());
        if tripped {
            state.stats.circuit_breaker_trips += 1;
        }
        tripped.then(|| state.breaker.failure_count())
    };
    tracing::warn!(%id, %error, elapsed, "request failed");
    let _ = shared.events.send(GateEvent::RequestFailed { id, priority, error });
    if let Some(failure_count) = tripped {
        let _ = shared
            .events
            .send(GateEvent::CircuitBreakerTripped { failure_count });
    }
}
