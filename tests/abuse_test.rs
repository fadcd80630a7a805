// SPDX-License-Identifier: Apache-2.0

//! Abuse simulations for the submission gate.
//!
//! These tests drive the full rate-limit, validate, cooldown, insert
//! pipeline under flood patterns and check how much gets through. The
//! manual clock keeps every run deterministic.

mod harness;

use chrono::{Duration, TimeZone, Utc};
use harness::{
    generators,
    metrics::{FloodMetrics, Outcome},
};
use serde_json::Value;
use std::sync::Arc;
use token_submission_gate::{
    clock::ManualClock,
    config::{RateLimitPolicy, ValidationConfig},
    cooldown::CooldownGate,
    limiter::RateLimiter,
    store::{MemoryStore, SubmissionStore},
    validator::SubmissionValidator,
};

struct Gate {
    clock: Arc<ManualClock>,
    limiter: RateLimiter,
    validator: SubmissionValidator,
    cooldown: CooldownGate,
    store: Arc<MemoryStore>,
}

impl Gate {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
        ));
        let store = Arc::new(MemoryStore::new(clock.clone()));
        Self {
            limiter: RateLimiter::new(clock.clone()),
            validator: SubmissionValidator::new(ValidationConfig::default()),
            cooldown: CooldownGate::new(Duration::hours(3), clock.clone()),
            clock,
            store,
        }
    }

    /// Run one request through the same stages the submit handler uses.
    async fn submit(&self, ip: &str, body: &Value) -> Outcome {
        let decision = self
            .limiter
            .check(&format!("submit:{ip}"), RateLimitPolicy::STRICT)
            .await;
        if !decision.allowed {
            return Outcome::RateLimited;
        }

        let submission = match self.validator.validate(body) {
            Ok(submission) => submission,
            Err(_) => return Outcome::ValidationFailed,
        };

        match self
            .cooldown
            .check(self.store.as_ref(), &submission.wallet, &submission.mint)
            .await
        {
            Ok(()) => {}
            Err(token_submission_gate::cooldown::CooldownError::Active { .. }) => {
                return Outcome::CooldownBlocked;
            }
            Err(token_submission_gate::cooldown::CooldownError::Unverifiable) => {
                return Outcome::StoreFailed;
            }
        }

        match self.store.insert(submission).await {
            Ok(_) => Outcome::Allowed,
            Err(_) => Outcome::StoreFailed,
        }
    }
}

#[tokio::test]
async fn single_ip_flood_is_capped_at_the_limit() {
    let gate = Gate::new();
    let wallets = generators::generate_wallets(50);
    let mints = generators::generate_mints(50);
    let mut metrics = FloodMetrics::new();

    // 50 well-formed submissions from one IP inside one window.
    for i in 0..50 {
        let body = generators::submission_body(&wallets[i], &mints[i], i);
        let outcome = gate.submit("203.0.113.9", &body).await;
        metrics.record(outcome, "203.0.113.9");
    }

    println!("{metrics}");
    assert_eq!(metrics.count(Outcome::Allowed), 5, "strict policy allows 5 per window");
    assert_eq!(metrics.count(Outcome::RateLimited), 45);
}

#[tokio::test]
async fn distributed_flood_is_capped_per_ip() {
    let gate = Gate::new();
    let ips = generators::generate_ips(20);
    let wallets = generators::generate_wallets(200);
    let mints = generators::generate_mints(200);
    let mut metrics = FloodMetrics::new();

    // 10 submissions from each of 20 IPs; every IP gets its own window.
    for (i, ip) in ips.iter().enumerate() {
        for j in 0..10 {
            let n = i * 10 + j;
            let body = generators::submission_body(&wallets[n], &mints[n], n);
            metrics.record(gate.submit(ip, &body).await, ip);
        }
    }

    println!("{metrics}");
    assert_eq!(metrics.unique_ips(), 20);
    assert_eq!(metrics.count(Outcome::Allowed), 20 * 5);
    assert_eq!(metrics.count(Outcome::RateLimited), 20 * 5);
}

#[tokio::test]
async fn garbage_flood_never_touches_the_store() {
    let gate = Gate::new();
    let mut metrics = FloodMetrics::new();

    for body in generators::garbage_bodies() {
        metrics.record(gate.submit("198.51.100.7", &body).await, "198.51.100.7");
    }

    println!("{metrics}");
    assert_eq!(metrics.count(Outcome::Allowed), 0);
    // The strict limit kicks in after 5, everything before fails validation.
    assert_eq!(
        metrics.count(Outcome::ValidationFailed) + metrics.count(Outcome::RateLimited),
        metrics.total()
    );
    assert_eq!(gate.store.lookup_count(), 0, "invalid bodies must not reach the store");
}

#[tokio::test]
async fn cooldown_blocks_pair_hammering_across_ips() {
    let gate = Gate::new();
    let ips = generators::generate_ips(8);
    let wallet = generators::base58_address(7);
    let mint = generators::base58_address(9_000_000);
    let mut metrics = FloodMetrics::new();

    // One attempt every 30 minutes from a rotating IP, same pair each time.
    // Only the first attempt and the one at the 3 hour mark get through.
    for (i, ip) in ips.iter().enumerate() {
        let body = generators::submission_body(&wallet, &mint, i);
        metrics.record(gate.submit(ip, &body).await, ip);
        gate.clock.advance(Duration::minutes(30));
    }

    println!("{metrics}");
    assert_eq!(metrics.count(Outcome::Allowed), 2);
    assert_eq!(metrics.count(Outcome::CooldownBlocked), 6);
    assert_eq!(metrics.count(Outcome::RateLimited), 0, "IP rotation dodges the rate limit");
}

#[tokio::test]
async fn store_outage_blocks_writes_instead_of_allowing_them() {
    let gate = Gate::new();
    gate.store.set_unavailable(true);

    let body = generators::submission_body(
        &generators::base58_address(21),
        &generators::base58_address(9_000_021),
        0,
    );
    let outcome = gate.submit("203.0.113.9", &body).await;
    assert_eq!(outcome, Outcome::StoreFailed);
}
