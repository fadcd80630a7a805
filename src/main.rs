// SPDX-License-Identifier: Apache-2.0

//! Token Submission Gate Service
//!
//! Fronts the token-metadata directory's write path: rate limits API
//! traffic per client IP, validates metadata submissions, enforces the
//! per-(wallet, mint) cooldown, and persists accepted submissions to a
//! PostgREST store.
//!
//! ## Configuration
//!
//! Loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `SUBMIT_LIMIT` / `SUBMIT_WINDOW_MS`: submission policy (default: 5 / 60000)
//! - `COOLDOWN_MS`: per-(wallet, mint) cooldown (default: 10800000, 3 hours)
//! - `SWEEP_INTERVAL_SECS`: limiter garbage-collection interval (default: 300)
//! - `STORE_REST_URL` / `STORE_API_KEY` / `STORE_TABLE`: PostgREST store;
//!   without a URL an in-memory store is used (local development only)
//! - `ADMIN_PASSWORD`: password for the admin login endpoint

use axum::http::Method;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use token_submission_gate::{
    clock::SystemClock,
    config::{Config, RateLimitPolicy, RateLimitSettings, StoreConfig},
    cooldown::CooldownGate,
    handlers::{router, AppState},
    limiter::RateLimiter,
    store::{MemoryStore, RestStore, SubmissionStore},
    validator::SubmissionValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config()?;
    info!(
        bind_addr = %config.bind_addr,
        submit_limit = config.rate_limit.submit.limit,
        submit_window_ms = config.rate_limit.submit.window_ms,
        cooldown_ms = config.cooldown.cooldown_ms,
        "Starting token submission gate"
    );

    let clock = Arc::new(SystemClock);

    // Select the store backend
    let store: Arc<dyn SubmissionStore> = match &config.store.rest_url {
        Some(url) => Arc::new(RestStore::new(
            url.clone(),
            config.store.api_key.clone(),
            config.store.table.clone(),
        )),
        None => {
            warn!("no STORE_REST_URL configured, using in-memory store");
            Arc::new(MemoryStore::new(clock.clone()))
        }
    };

    // Create application state
    let limiter = Arc::new(RateLimiter::new(clock.clone()));
    let state = Arc::new(AppState {
        limiter: limiter.clone(),
        validator: SubmissionValidator::new(config.validation.clone()),
        gate: CooldownGate::new(config.cooldown.cooldown_duration(), clock.clone()),
        store,
        clock,
        config: config.clone(),
    });

    // Spawn the limiter garbage-collection sweep
    tokio::spawn(limiter.sweep_loop(config.rate_limit.sweep_interval()));

    // Build router
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);
    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> anyhow::Result<Config> {
    let submit = RateLimitPolicy::new(
        env_parsed("SUBMIT_LIMIT", RateLimitPolicy::STRICT.limit),
        env_parsed("SUBMIT_WINDOW_MS", RateLimitPolicy::STRICT.window_ms),
    )?;

    Ok(Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        rate_limit: RateLimitSettings {
            submit,
            sweep_interval_secs: env_parsed("SWEEP_INTERVAL_SECS", 300),
            ..Default::default()
        },
        cooldown: token_submission_gate::config::CooldownConfig {
            cooldown_ms: env_parsed("COOLDOWN_MS", 3 * 60 * 60 * 1000),
        },
        store: StoreConfig {
            rest_url: std::env::var("STORE_REST_URL").ok(),
            api_key: std::env::var("STORE_API_KEY").ok(),
            table: std::env::var("STORE_TABLE").unwrap_or_else(|_| "token_submissions".to_string()),
        },
        admin_password: std::env::var("ADMIN_PASSWORD").ok(),
        ..Default::default()
    })
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
