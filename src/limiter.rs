// SPDX-License-Identifier: Apache-2.0

//! Fixed-window rate limiter keyed by opaque string identifiers.
//!
//! Identifiers are chosen by the caller, typically `"<route>:<client-ip>"`,
//! so independent endpoints sharing one limiter never interfere. The window
//! resets a fixed interval after the first request in it; requests past the
//! limit are rejected without incrementing the stored count.
//!
//! State is process-local. A restart resets all counters, and multiple
//! instances behind a load balancer count independently; both are accepted
//! trade-offs for abuse mitigation.

use crate::clock::Clock;
use crate::config::RateLimitPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Counter state for one identifier's current window.
#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    /// Requests observed in the current window
    count: u32,
    /// Epoch milliseconds at which the window expires
    reset_at_ms: i64,
}

/// Outcome of a rate limit check.
///
/// A check always produces a decision; there is no error path.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// The limit in force for this check
    pub limit: u32,
    /// Requests left in the current window (0 when rejected)
    pub remaining: u32,
    /// Epoch milliseconds at which the window expires
    pub reset_at_ms: i64,
}

impl RateLimitDecision {
    /// Seconds until the window resets, rounded up, never negative.
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let remaining_ms = self.reset_at_ms.saturating_sub(now_ms).max(0) as u64;
        remaining_ms.div_ceil(1000)
    }
}

/// Thread-safe fixed-window rate limiter.
///
/// The write lock is held across the whole check-and-increment so the count
/// stays exact on a multi-threaded runtime.
pub struct RateLimiter {
    records: RwLock<HashMap<String, WindowRecord>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a limiter reading time from the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Decide whether a request under `identifier` is allowed by `policy`.
    pub async fn check(&self, identifier: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        let now = self.clock.now_ms();
        let mut records = self.records.write().await;

        if let Some(record) = records.get_mut(identifier) {
            if now <= record.reset_at_ms {
                // Window still open and at capacity: reject without counting.
                if record.count >= policy.limit {
                    debug!(identifier, reset_at_ms = record.reset_at_ms, "rate limit exceeded");
                    return RateLimitDecision {
                        allowed: false,
                        limit: policy.limit,
                        remaining: 0,
                        reset_at_ms: record.reset_at_ms,
                    };
                }
                record.count += 1;
                return RateLimitDecision {
                    allowed: true,
                    limit: policy.limit,
                    remaining: policy.limit - record.count,
                    reset_at_ms: record.reset_at_ms,
                };
            }
        }

        // No record, or the window expired: start a fresh one.
        let reset_at_ms = now + policy.window_ms as i64;
        records.insert(
            identifier.to_string(),
            WindowRecord { count: 1, reset_at_ms },
        );
        RateLimitDecision {
            allowed: true,
            limit: policy.limit,
            remaining: policy.limit.saturating_sub(1),
            reset_at_ms,
        }
    }

    /// Delete every record whose window has expired.
    ///
    /// Bounds memory growth from the unbounded identifier space (IPs). Wired
    /// to a periodic task in `main`; safe to call at any time.
    pub async fn sweep(&self) {
        let now = self.clock.now_ms();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| now <= record.reset_at_ms);
        let swept = before - records.len();
        if swept > 0 {
            debug!(swept, retained = records.len(), "swept expired rate limit records");
        }
    }

    /// Number of tracked identifiers (expired records included until swept).
    pub async fn tracked(&self) -> usize {
        self.records.read().await.len()
    }

    /// Run `sweep` forever on a fixed interval. Intended for `tokio::spawn`.
    pub async fn sweep_loop(self: Arc<Self>, every: Duration) {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            self.sweep().await;
        }
    }
}
