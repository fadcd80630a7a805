// SPDX-License-Identifier: Apache-2.0

//! Token metadata submission validator.
//!
//! Validates the raw JSON body of a submission against the form's field
//! rules: required fields, maximum lengths, string types, a Base58 shape
//! check for the wallet and mint addresses, and URL scheme checks for the
//! image and website fields.
//!
//! Every rule is evaluated and every violation collected; the check fails
//! atomically with the full list so a client can fix all problems in one
//! round-trip. The address check is a syntactic heuristic, not a lookup of
//! a real on-chain account.

use crate::config::ValidationConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// A single violated validation rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("{field} is required.")]
    Required { field: &'static str },

    #[error("{field} must be at most {max} characters.")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be a string.")]
    NotAString { field: &'static str },

    #[error("{field} does not look like a valid Solana address.")]
    BadAddress { field: &'static str },

    #[error("{field} must start with http:// or https://.")]
    BadUrlScheme { field: &'static str },
}

/// A submission that passed validation, fields unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub wallet: String,
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Submission validator.
pub struct SubmissionValidator {
    config: ValidationConfig,
}

impl SubmissionValidator {
    /// Create a validator with the given field limits.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a raw JSON body.
    ///
    /// Returns the sanitized submission, or the complete list of violated
    /// rules. Works on `Value` rather than a typed payload so that a
    /// non-string field is reported as a rule violation instead of failing
    /// deserialization outright.
    pub fn validate(&self, body: &Value) -> Result<Submission, Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        self.check_string(body, "wallet", "Wallet address", true, self.config.max_wallet_len, &mut issues);
        self.check_string(body, "mint", "Mint address", true, self.config.max_mint_len, &mut issues);
        self.check_string(body, "name", "Name", true, self.config.max_name_len, &mut issues);
        self.check_string(body, "symbol", "Symbol", true, self.config.max_symbol_len, &mut issues);
        self.check_string(body, "image", "Image URL", true, self.config.max_image_len, &mut issues);
        self.check_string(body, "description", "Description", true, self.config.max_description_len, &mut issues);
        self.check_string(body, "twitter", "Twitter", false, self.config.max_twitter_len, &mut issues);
        self.check_string(body, "telegram", "Telegram", false, self.config.max_telegram_len, &mut issues);
        self.check_string(body, "website", "Website", false, self.config.max_website_len, &mut issues);

        // Light Solana-style address checks, just to catch obvious garbage.
        if let Some(wallet) = str_field(body, "wallet") {
            if !self.looks_like_address(wallet) {
                issues.push(ValidationIssue::BadAddress { field: "Wallet address" });
            }
        }
        if let Some(mint) = str_field(body, "mint") {
            if !self.looks_like_address(mint) {
                issues.push(ValidationIssue::BadAddress { field: "Mint address" });
            }
        }

        if let Some(image) = str_field(body, "image") {
            if !has_http_scheme(image) {
                issues.push(ValidationIssue::BadUrlScheme { field: "Image URL" });
            }
        }
        if let Some(website) = str_field(body, "website") {
            if !website.trim().is_empty() && !has_http_scheme(website) {
                issues.push(ValidationIssue::BadUrlScheme { field: "Website" });
            }
        }

        if !issues.is_empty() {
            debug!(count = issues.len(), "submission failed validation");
            return Err(issues);
        }

        // All required fields are known to be present strings at this point.
        Ok(Submission {
            wallet: str_field(body, "wallet").unwrap_or_default().to_string(),
            mint: str_field(body, "mint").unwrap_or_default().to_string(),
            name: str_field(body, "name").unwrap_or_default().to_string(),
            symbol: str_field(body, "symbol").unwrap_or_default().to_string(),
            image: str_field(body, "image").unwrap_or_default().to_string(),
            description: str_field(body, "description").unwrap_or_default().to_string(),
            twitter: str_field(body, "twitter").map(str::to_string),
            telegram: str_field(body, "telegram").map(str::to_string),
            website: str_field(body, "website").map(str::to_string),
        })
    }

    /// Presence, type and length rules for one field.
    fn check_string(
        &self,
        body: &Value,
        key: &str,
        field: &'static str,
        required: bool,
        max_len: usize,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let value = body.get(key);

        let missing = matches!(value, None | Some(Value::Null))
            || matches!(value, Some(Value::String(s)) if s.is_empty());
        if required && missing {
            issues.push(ValidationIssue::Required { field });
            return;
        }

        match value {
            Some(Value::String(s)) => {
                if s.chars().count() > max_len {
                    issues.push(ValidationIssue::TooLong { field, max: max_len });
                }
            }
            None | Some(Value::Null) => {}
            Some(_) => issues.push(ValidationIssue::NotAString { field }),
        }
    }

    /// Base58 alphabet and plausible length, nothing more.
    fn looks_like_address(&self, s: &str) -> bool {
        let len = s.chars().count();
        len >= self.config.min_address_len
            && len <= self.config.max_address_len
            && s.chars().all(is_base58_char)
    }
}

/// Base58 excludes `0`, `O`, `I` and `l`.
fn is_base58_char(c: char) -> bool {
    matches!(c, '1'..='9' | 'A'..='H' | 'J'..='N' | 'P'..='Z' | 'a'..='k' | 'm'..='z')
}

fn has_http_scheme(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn str_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}
