// SPDX-License-Identifier: Apache-2.0

//! Persistence seam for token submissions.
//!
//! The production store is a PostgREST endpoint (Supabase). Failures are
//! logged and collapsed into [`StoreError::Unavailable`] so internal detail
//! never reaches a client. [`MemoryStore`] backs tests and local runs.

use crate::clock::Clock;
use crate::validator::Submission;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::error;

/// Store failures, deliberately detail-free.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("submission store unavailable")]
    Unavailable,
}

/// A persisted submission row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub id: i64,
    pub wallet: String,
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub description: String,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A row of the public search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
}

/// Submission persistence operations.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// `created_at` of the most recent submission for an exact,
    /// case-sensitive (wallet, mint) pair.
    async fn latest_submission_at(
        &self,
        wallet: &str,
        mint: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Insert a validated submission; status starts as `pending`.
    async fn insert(&self, submission: Submission) -> Result<StoredSubmission, StoreError>;

    /// Search approved submissions by name, symbol or mint.
    async fn search_approved(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError>;
}

/// PostgREST-backed store.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    table: String,
}

#[derive(Debug, Deserialize)]
struct CreatedAtRow {
    created_at: DateTime<Utc>,
}

impl RestStore {
    pub fn new(base_url: String, api_key: Option<String>, table: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.base_url, self.table)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl SubmissionStore for RestStore {
    async fn latest_submission_at(
        &self,
        wallet: &str,
        mint: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let wallet_filter = format!("eq.{wallet}");
        let mint_filter = format!("eq.{mint}");
        let request = self
            .client
            .get(self.table_url())
            .query(&[
                ("select", "created_at"),
                ("wallet", wallet_filter.as_str()),
                ("mint", mint_filter.as_str()),
                ("order", "created_at.desc"),
                ("limit", "1"),
            ]);

        let rows: Vec<CreatedAtRow> = self
            .authed(request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                error!(error = %e, "cooldown lookup failed");
                StoreError::Unavailable
            })?
            .json()
            .await
            .map_err(|e| {
                error!(error = %e, "cooldown lookup returned malformed rows");
                StoreError::Unavailable
            })?;

        Ok(rows.into_iter().next().map(|row| row.created_at))
    }

    async fn insert(&self, submission: Submission) -> Result<StoredSubmission, StoreError> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&submission);

        let mut rows: Vec<StoredSubmission> = self
            .authed(request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                error!(error = %e, "submission insert failed");
                StoreError::Unavailable
            })?
            .json()
            .await
            .map_err(|e| {
                error!(error = %e, "submission insert returned malformed row");
                StoreError::Unavailable
            })?;

        rows.pop().ok_or_else(|| {
            error!("submission insert returned no row");
            StoreError::Unavailable
        })
    }

    async fn search_approved(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let pattern = query.replace(['*', ','], "");
        let any_field = format!(
            "(name.ilike.*{pattern}*,symbol.ilike.*{pattern}*,mint.ilike.*{pattern}*)"
        );
        let limit_param = limit.to_string();
        let request = self
            .client
            .get(self.table_url())
            .query(&[
                ("select", "id,mint,name,symbol,image"),
                ("status", "eq.approved"),
                ("or", any_field.as_str()),
                ("limit", limit_param.as_str()),
            ]);

        self.authed(request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                error!(error = %e, "search query failed");
                StoreError::Unavailable
            })?
            .json()
            .await
            .map_err(|e| {
                error!(error = %e, "search query returned malformed rows");
                StoreError::Unavailable
            })
    }
}

/// In-memory store for tests and local development.
pub struct MemoryStore {
    rows: RwLock<Vec<StoredSubmission>>,
    next_id: AtomicI64,
    lookups: AtomicUsize,
    clock: Arc<dyn Clock>,
    fail: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
            lookups: AtomicUsize::new(0),
            clock,
            fail: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Number of cooldown lookups performed.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Make every operation fail, simulating an unreachable store.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fail.store(unavailable, Ordering::Relaxed);
    }

    /// Flip a stored submission to `approved`.
    pub async fn approve(&self, id: i64) {
        let mut rows = self.rows.write().await;
        if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
            row.status = "approved".to_string();
        }
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn latest_submission_at(
        &self,
        wallet: &str,
        mint: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|row| row.wallet == wallet && row.mint == mint)
            .map(|row| row.created_at)
            .max())
    }

    async fn insert(&self, submission: Submission) -> Result<StoredSubmission, StoreError> {
        self.check_available()?;
        let row = StoredSubmission {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            wallet: submission.wallet,
            mint: submission.mint,
            name: submission.name,
            symbol: submission.symbol,
            image: submission.image,
            description: submission.description,
            twitter: submission.twitter,
            telegram: submission.telegram,
            website: submission.website,
            status: "pending".to_string(),
            created_at: self.clock.now(),
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn search_approved(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        self.check_available()?;
        let needle = query.to_lowercase();
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|row| row.status == "approved")
            .filter(|row| {
                row.name.to_lowercase().contains(&needle)
                    || row.symbol.to_lowercase().contains(&needle)
                    || row.mint.to_lowercase().contains(&needle)
            })
            .take(limit)
            .map(|row| SearchHit {
                id: row.id,
                mint: row.mint.clone(),
                name: row.name.clone(),
                symbol: row.symbol.clone(),
                image: row.image.clone(),
            })
            .collect())
    }
}
