// SPDX-License-Identifier: Apache-2.0

//! Per-(wallet, mint) submission cooldown.
//!
//! A wallet may resubmit metadata for the same mint only after a fixed
//! window (3 hours by default) has elapsed since its most recent
//! submission. The check consults the persistence layer; if that lookup
//! fails the submission is rejected rather than silently allowed.

use crate::clock::Clock;
use crate::store::SubmissionStore;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

const MS_PER_HOUR: i64 = 60 * 60 * 1000;
const MS_PER_MINUTE: i64 = 60 * 1000;

/// Why a submission was not allowed through the cooldown gate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CooldownError {
    /// The pair submitted too recently. Hours and minutes are both floored,
    /// so the reported wait never exceeds the true remaining time.
    #[error("You can update this token again in about {hours}h {minutes}m.")]
    Active { hours: i64, minutes: i64 },

    /// The persistence lookup failed; the write must not proceed.
    #[error("Could not check cooldown. Please try again later.")]
    Unverifiable,
}

/// Cooldown gate over the submission store.
pub struct CooldownGate {
    cooldown: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl CooldownGate {
    pub fn new(cooldown: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        Self { cooldown, clock }
    }

    /// Allow the submission unless the exact (wallet, mint) pair was
    /// accepted within the cooldown window.
    pub async fn check(
        &self,
        store: &dyn SubmissionStore,
        wallet: &str,
        mint: &str,
    ) -> Result<(), CooldownError> {
        let last = store
            .latest_submission_at(wallet, mint)
            .await
            .map_err(|_| CooldownError::Unverifiable)?;

        let Some(last) = last else {
            return Ok(());
        };

        let elapsed = self.clock.now() - last;
        if elapsed >= self.cooldown {
            return Ok(());
        }

        let remaining_ms = (self.cooldown - elapsed).num_milliseconds().max(0);
        let hours = remaining_ms / MS_PER_HOUR;
        let minutes = (remaining_ms % MS_PER_HOUR) / MS_PER_MINUTE;
        debug!(wallet, mint, hours, minutes, "submission still in cooldown");
        Err(CooldownError::Active { hours, minutes })
    }
}
