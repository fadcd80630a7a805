// SPDX-License-Identifier: Apache-2.0

//! Token Submission Gate
//!
//! Ingress service for a Solana token-metadata directory:
//!
//! - Fixed-window rate limiting per client IP, with per-route policies
//! - Submission field validation (required fields, lengths, Base58 address
//!   shape, URL schemes), reporting every violation at once
//! - A 3 hour per-(wallet, mint) cooldown checked against the store
//! - A PostgREST-backed submission store plus an in-memory test double

pub mod clock;
pub mod config;
pub mod cooldown;
pub mod handlers;
pub mod limiter;
pub mod store;
pub mod validator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, RateLimitPolicy};
pub use cooldown::{CooldownError, CooldownGate};
pub use limiter::{RateLimitDecision, RateLimiter};
pub use store::{MemoryStore, RestStore, SubmissionStore};
pub use validator::{Submission, SubmissionValidator, ValidationIssue};
