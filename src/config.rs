// SPDX-License-Identifier: Apache-2.0

//! Configuration for the token submission gate.
//!
//! Default values reproduce the limits the public site enforced: 5
//! submissions per minute per IP, a 3 hour per-(wallet, mint) cooldown, and
//! the field length table of the submission form.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors raised at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rate limit policy: limit={limit}, window_ms={window_ms} (both must be positive)")]
    InvalidPolicy { limit: u32, window_ms: u64 },
}

/// A fixed-window rate limit: at most `limit` requests per `window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window_ms: u64,
}

impl RateLimitPolicy {
    /// Strict: 5 requests per minute (submissions).
    pub const STRICT: Self = Self { limit: 5, window_ms: 60_000 };

    /// Standard: 30 requests per minute (general API).
    pub const STANDARD: Self = Self { limit: 30, window_ms: 60_000 };

    /// Relaxed: 100 requests per minute (read-only endpoints).
    pub const RELAXED: Self = Self { limit: 100, window_ms: 60_000 };

    /// Login: 5 attempts per 15 minutes (admin authentication).
    pub const LOGIN: Self = Self { limit: 5, window_ms: 900_000 };

    /// Build a policy, rejecting zero limits and zero-length windows.
    pub fn new(limit: u32, window_ms: u64) -> Result<Self, ConfigError> {
        if limit == 0 || window_ms == 0 {
            return Err(ConfigError::InvalidPolicy { limit, window_ms });
        }
        Ok(Self { limit, window_ms })
    }
}

/// Configuration for the token submission gate service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// Submission validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Per-(wallet, mint) cooldown configuration
    #[serde(default)]
    pub cooldown: CooldownConfig,

    /// Persistence store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Admin password for the login endpoint; when unset, login attempts
    /// fail with a server configuration error.
    #[serde(default)]
    pub admin_password: Option<String>,
}

/// Per-route rate limit policies and the sweep interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Policy for the submission endpoint (default: STRICT)
    #[serde(default = "default_submit_policy")]
    pub submit: RateLimitPolicy,

    /// Policy for the search endpoint (default: RELAXED)
    #[serde(default = "default_search_policy")]
    pub search: RateLimitPolicy,

    /// Policy for admin login attempts (default: LOGIN)
    #[serde(default = "default_login_policy")]
    pub login: RateLimitPolicy,

    /// Interval between garbage-collection sweeps in seconds (default: 300)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Field limits applied to inbound submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_max_wallet")]
    pub max_wallet_len: usize,
    #[serde(default = "default_max_mint")]
    pub max_mint_len: usize,
    #[serde(default = "default_max_name")]
    pub max_name_len: usize,
    #[serde(default = "default_max_symbol")]
    pub max_symbol_len: usize,
    #[serde(default = "default_max_image")]
    pub max_image_len: usize,
    #[serde(default = "default_max_description")]
    pub max_description_len: usize,
    #[serde(default = "default_max_twitter")]
    pub max_twitter_len: usize,
    #[serde(default = "default_max_telegram")]
    pub max_telegram_len: usize,
    #[serde(default = "default_max_website")]
    pub max_website_len: usize,

    /// Minimum accepted address length (default: 20)
    #[serde(default = "default_min_address")]
    pub min_address_len: usize,
    /// Maximum accepted address length (default: 80)
    #[serde(default = "default_max_address")]
    pub max_address_len: usize,
}

/// Cooldown between accepted submissions for the same (wallet, mint) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    /// Cooldown window in milliseconds (default: 3 hours)
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

/// Persistence store configuration.
///
/// When `rest_url` is unset the service falls back to an in-memory store,
/// which is only useful for local development and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the PostgREST endpoint (e.g. `https://xyz.supabase.co/rest/v1`)
    #[serde(default)]
    pub rest_url: Option<String>,

    /// API key sent as `apikey` and bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Table holding submissions (default: token_submissions)
    #[serde(default = "default_table")]
    pub table: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_submit_policy() -> RateLimitPolicy {
    RateLimitPolicy::STRICT
}

fn default_search_policy() -> RateLimitPolicy {
    RateLimitPolicy::RELAXED
}

fn default_login_policy() -> RateLimitPolicy {
    RateLimitPolicy::LOGIN
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_max_wallet() -> usize {
    100
}

fn default_max_mint() -> usize {
    100
}

fn default_max_name() -> usize {
    80
}

fn default_max_symbol() -> usize {
    16
}

fn default_max_image() -> usize {
    500
}

fn default_max_description() -> usize {
    1000
}

fn default_max_twitter() -> usize {
    200
}

fn default_max_telegram() -> usize {
    200
}

fn default_max_website() -> usize {
    500
}

fn default_min_address() -> usize {
    20
}

fn default_max_address() -> usize {
    80
}

fn default_cooldown_ms() -> u64 {
    3 * 60 * 60 * 1000
}

fn default_table() -> String {
    "token_submissions".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitSettings::default(),
            validation: ValidationConfig::default(),
            cooldown: CooldownConfig::default(),
            store: StoreConfig::default(),
            admin_password: None,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            submit: default_submit_policy(),
            search: default_search_policy(),
            login: default_login_policy(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_wallet_len: default_max_wallet(),
            max_mint_len: default_max_mint(),
            max_name_len: default_max_name(),
            max_symbol_len: default_max_symbol(),
            max_image_len: default_max_image(),
            max_description_len: default_max_description(),
            max_twitter_len: default_max_twitter(),
            max_telegram_len: default_max_telegram(),
            max_website_len: default_max_website(),
            min_address_len: default_min_address(),
            max_address_len: default_max_address(),
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

impl RateLimitSettings {
    /// Get the sweep interval duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl CooldownConfig {
    /// Get the cooldown duration
    pub fn cooldown_duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.cooldown_ms as i64)
    }
}
