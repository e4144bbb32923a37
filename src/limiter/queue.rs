//! Rate Limiter Queue
//!
//! Single shared admission gate and FIFO execution queue for outbound calls.
//!
//! Every call is pushed onto one queue and executed by a single drain task.
//! The drain task is spawned on the first enqueue while the limiter is idle
//! and exits once the queue is empty (Idle -> Draining -> Idle), so at most
//! one upstream call is in flight per limiter.
//!
//! Window accounting is lazy: the request counter is reset when an admission
//! check notices that `interval` has elapsed since the last reset, never by a
//! timer. An exhausted budget parks the drain task until the window boundary
//! or until the limits change, whichever comes first. Once a full boundary
//! wait has elapsed the head call is admitted even if the budget still reads
//! zero, so an upstream report of no remaining quota delays the queue but
//! never stalls it. There is no per-call timeout; a call that never completes
//! stalls every call queued behind it.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{oneshot, Mutex, Notify};
use tokio::time::{sleep, Instant};
use tracing::{debug, error, warn};

use crate::error::{DiscoveryError, Result};
use crate::limiter::{RateLimitConfig, RateLimitUpdate};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

// == Queued Call ==
/// Caller work plus the channel its outcome is forwarded on.
struct QueuedCall {
    job: Job,
}

/// Unix-millisecond clock driven by the tokio clock, so window math follows
/// paused time in tests while still accepting upstream Unix reset times.
#[derive(Debug)]
struct Clock {
    origin: Instant,
    origin_unix_ms: i64,
}

impl Clock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            origin_unix_ms: Utc::now().timestamp_millis(),
        }
    }

    fn now_ms(&self) -> i64 {
        self.origin_unix_ms + self.origin.elapsed().as_millis() as i64
    }
}

struct LimiterState {
    queue: VecDeque<QueuedCall>,
    request_count: u32,
    /// Start of the current window, Unix milliseconds
    last_reset_ms: i64,
    draining: bool,
    config: RateLimitConfig,
    clock: Clock,
}

impl LimiterState {
    fn interval_ms(&self) -> i64 {
        self.config.interval.as_millis() as i64
    }

    fn reset_if_elapsed(&mut self) {
        let now = self.clock.now_ms();
        if now - self.last_reset_ms >= self.interval_ms() {
            self.request_count = 0;
            self.last_reset_ms = now;
        }
    }

    fn is_limited(&self) -> bool {
        self.request_count >= self.config.max_requests
    }

    fn time_until_reset(&self) -> Duration {
        let remaining = self.last_reset_ms + self.interval_ms() - self.clock.now_ms();
        Duration::from_millis(remaining.max(0) as u64)
    }

    /// Unix seconds at which the current window ends.
    fn reset_at_secs(&self) -> u64 {
        let until = self.time_until_reset().as_millis() as i64;
        ((self.clock.now_ms() + until) / 1000).max(0) as u64
    }
}

enum Step {
    Run(QueuedCall),
    Wait(Duration),
    Idle,
}

// == Rate Limit Status ==
/// Point-in-time view of the limiter.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    pub limited: bool,
    pub max_requests: u32,
    pub request_count: u32,
    pub remaining: u32,
    pub queued: usize,
    pub reset_in_ms: u64,
    /// Unix seconds at which the current window ends
    pub reset_at: u64,
}

// == Rate Limiter ==
/// Shared admission gate for all outbound calls.
///
/// Cloning is cheap and every clone drives the same queue.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<LimiterState>>,
    /// Wakes a drain task parked on an exhausted budget
    limits_changed: Arc<Notify>,
}

impl RateLimiter {
    /// Creates an idle limiter whose first window starts now.
    pub fn new(config: RateLimitConfig) -> Self {
        let clock = Clock::new();
        let last_reset_ms = clock.now_ms();

        Self {
            state: Arc::new(Mutex::new(LimiterState {
                queue: VecDeque::new(),
                request_count: 0,
                last_reset_ms,
                draining: false,
                config,
                clock,
            })),
            limits_changed: Arc::new(Notify::new()),
        }
    }

    /// Merges `update` into the live configuration.
    ///
    /// Takes effect at the next admission check, including for calls that are
    /// already queued. A zero interval is ignored.
    pub async fn configure(&self, update: impl Into<RateLimitUpdate>) {
        let mut update = update.into();
        update.interval = update.interval.filter(|interval| !interval.is_zero());

        let mut state = self.state.lock().await;
        state.config.merge(update);
        debug!(config = ?state.config, "Rate limiter reconfigured");
        self.limits_changed.notify_one();
    }

    /// Returns a copy of the live configuration.
    pub async fn config(&self) -> RateLimitConfig {
        self.state.lock().await.config
    }

    // == Enqueue ==
    /// Queues `call` and resolves with its outcome once it has executed.
    ///
    /// The call is appended when this future is first polled. Errors returned
    /// by the call are passed through untouched and never retried. If the
    /// call panics, the caller receives a transport error and the queue keeps
    /// draining.
    pub async fn enqueue<T, F, Fut>(&self, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            // Receiver gone means the caller stopped waiting; the budget is spent anyway
            let _ = tx.send(call().await);
        });

        let start_drain = {
            let mut state = self.state.lock().await;
            state.queue.push_back(QueuedCall { job });
            !std::mem::replace(&mut state.draining, true)
        };

        if start_drain {
            tokio::spawn(self.clone().drain());
        }

        rx.await.map_err(|_| {
            DiscoveryError::Transport("queued call ended without producing a result".to_string())
        })?
    }

    // == Drain Loop ==
    async fn drain(self) {
        debug!("Rate limiter queue draining");

        // Set once a wait has run to the window boundary; the head is then
        // admitted regardless of the budget
        let mut boundary_passed = false;

        loop {
            let step = {
                let mut state = self.state.lock().await;
                state.reset_if_elapsed();

                if state.is_limited() && !state.queue.is_empty() && !boundary_passed {
                    Step::Wait(state.time_until_reset())
                } else {
                    match state.queue.pop_front() {
                        Some(call) => {
                            state.request_count += 1;
                            Step::Run(call)
                        }
                        None => {
                            state.draining = false;
                            Step::Idle
                        }
                    }
                }
            };

            match step {
                Step::Run(call) => {
                    boundary_passed = false;
                    if let Err(err) = tokio::spawn(call.job).await {
                        error!(error = %err, "Queued call panicked");
                    }

                    let min_delay = self.state.lock().await.config.min_delay;
                    sleep(min_delay).await;
                }
                Step::Wait(wait) => {
                    warn!(
                        wait_ms = wait.as_millis() as u64,
                        "Rate limit budget exhausted, waiting for window reset"
                    );
                    tokio::select! {
                        _ = sleep(wait) => boundary_passed = true,
                        _ = self.limits_changed.notified() => {
                            debug!("Rate limits changed, re-checking admission");
                        }
                    }
                }
                Step::Idle => break,
            }
        }

        debug!("Rate limiter queue idle");
    }

    // == Queries ==
    /// True when the current window's budget is used up.
    pub async fn is_rate_limited(&self) -> bool {
        let mut state = self.state.lock().await;
        state.reset_if_elapsed();
        state.is_limited()
    }

    /// Time left in the current window, zero once it has elapsed.
    pub async fn time_until_reset(&self) -> Duration {
        self.state.lock().await.time_until_reset()
    }

    /// Unix seconds at which the current window ends.
    pub async fn reset_at(&self) -> u64 {
        self.state.lock().await.reset_at_secs()
    }

    /// Budget left in the current window.
    pub async fn remaining_requests(&self) -> u32 {
        let mut state = self.state.lock().await;
        state.reset_if_elapsed();
        state.config.max_requests.saturating_sub(state.request_count)
    }

    /// Snapshot for status reporting.
    pub async fn status(&self) -> RateLimitStatus {
        let mut state = self.state.lock().await;
        state.reset_if_elapsed();

        RateLimitStatus {
            limited: state.is_limited(),
            max_requests: state.config.max_requests,
            request_count: state.request_count,
            remaining: state.config.max_requests.saturating_sub(state.request_count),
            queued: state.queue.len(),
            reset_in_ms: state.time_until_reset().as_millis() as u64,
            reset_at: state.reset_at_secs(),
        }
    }

    // == Update Limits ==
    /// Resynchronizes with upstream quota headers.
    ///
    /// `remaining` replaces the window budget outright and the window start
    /// moves to the upstream reset time, so successive updates can tighten or
    /// loosen the effective limit between drain iterations.
    pub async fn update_limits(&self, remaining: u32, reset_unix_secs: u64) {
        let mut state = self.state.lock().await;
        state.config.max_requests = remaining;
        state.last_reset_ms = (reset_unix_secs as i64).saturating_mul(1000);
        debug!(remaining, reset_unix_secs, "Rate limits updated from upstream");
        self.limits_changed.notify_one();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
