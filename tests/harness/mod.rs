// SPDX-License-Identifier: Apache-2.0

//! Test harness for submission-gate abuse simulation.
//!
//! Provides deterministic generators for client IPs, Base58 addresses and
//! submission bodies, plus outcome counting for flood scenarios.

pub mod generators;
pub mod metrics;
