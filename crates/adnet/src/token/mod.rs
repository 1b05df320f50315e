//! Refreshable bearer tokens.
//!
//! Networks with a token (IronSource, Fyber, Vungle) implement
//! [`TokenProvider`] for the acquisition protocol; a [`TokenManager`] per
//! network owns the cached [`BearerToken`] and decides when to refresh it.
//!
//! State machine:
//! `Absent → Acquiring → Valid → NearExpiry → Refreshing → Valid | RefreshFailed`

mod fyber;
mod ironsource;
pub mod jwt;
mod manager;
mod vungle;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use thiserror::Error;

use crate::credentials::{CredentialError, NetworkCredential};
use crate::network::Network;

pub use fyber::FyberTokenProvider;
pub use ironsource::IronSourceTokenProvider;
pub use manager::TokenManager;
pub use vungle::VungleTokenProvider;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Token request rejected (status={status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Observable lifecycle state of a network's token slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Absent,
    Acquiring,
    Valid,
    NearExpiry,
    Refreshing,
    RefreshFailed,
}

#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    pub value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Fingerprint of the credential pair that produced the token.
    pub source: String,
}

impl BearerToken {
    pub fn new(
        value: String,
        source: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            value,
            issued_at,
            expires_at,
            source,
        }
    }

    /// Derive the expiry of a freshly issued token.
    ///
    /// The JWT `exp` claim wins; otherwise a TTL declared by the auth endpoint
    /// is used; with neither, or with an expiry past the representable range,
    /// the token is considered already expired, so it is never reused.
    pub fn from_raw(
        value: String,
        source: String,
        declared_ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = jwt::expiry(&value)
            .or_else(|| declared_ttl.and_then(|ttl| now.checked_add_signed(ttl)))
            .unwrap_or(now);
        Self::new(value, source, now, expires_at)
    }

    #[inline]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining_at(now) <= Duration::zero()
    }

    /// Remaining lifetime is below `margin`.
    #[inline]
    pub fn needs_refresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.remaining_at(now) < margin
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("source", &self.source)
            .finish()
    }
}

/// Network-specific token acquisition protocol.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    fn network(&self) -> Network;

    /// Refresh once the remaining lifetime drops below this.
    fn refresh_margin(&self) -> Duration;

    /// Exchange the long-lived credential for a new token.
    async fn acquire(
        &self,
        client: &Client,
        credential: &NetworkCredential,
    ) -> Result<BearerToken, TokenError>;
}

/// Best diagnostic text out of an auth endpoint's error body.
pub(crate) fn rejection_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| crate::normalizer::error_message(&value))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response".to_string()
            } else {
                trimmed.chars().take(300).collect()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_expiring_in(secs: i64, now: DateTime<Utc>) -> BearerToken {
        BearerToken::new(
            "t".to_string(),
            "ironsource:abc".to_string(),
            now,
            now + Duration::seconds(secs),
        )
    }

    #[test]
    fn test_refresh_boundary() {
        let now = Utc::now();
        let margin = Duration::seconds(3600);
        assert!(token_expiring_in(3599, now).needs_refresh_at(now, margin));
        assert!(!token_expiring_in(3601, now).needs_refresh_at(now, margin));
    }

    #[test]
    fn test_from_raw_without_expiry_is_expired() {
        let now = Utc::now();
        let token = BearerToken::from_raw("opaque".to_string(), "s".to_string(), None, now);
        assert!(token.is_expired_at(now));
    }

    #[test]
    fn test_from_raw_with_declared_ttl() {
        let now = Utc::now();
        let token = BearerToken::from_raw(
            "opaque".to_string(),
            "s".to_string(),
            Some(Duration::seconds(600)),
            now,
        );
        assert_eq!(token.remaining_at(now), Duration::seconds(600));
    }

    #[test]
    fn test_from_raw_unrepresentable_ttl_is_expired() {
        let now = Utc::now();
        let ttl = Duration::try_seconds(10_000_000_000_000).unwrap();
        let token = BearerToken::from_raw("opaque".to_string(), "s".to_string(), Some(ttl), now);
        assert!(token.is_expired_at(now));
    }

    #[test]
    fn test_from_raw_prefers_jwt_exp() {
        let now = Utc::now();
        let exp = now.timestamp() + 86_400;
        let value = jwt::tests::make_jwt(&format!(r#"{{"exp":{exp}}}"#));
        let token = BearerToken::from_raw(value, "s".to_string(), Some(Duration::seconds(5)), now);
        assert_eq!(token.expires_at.timestamp(), exp);
    }

    #[test]
    fn test_debug_redacts_value() {
        let now = Utc::now();
        let printed = format!("{:?}", token_expiring_in(10, now));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_rejection_message() {
        assert_eq!(rejection_message(r#"{"message":"bad key"}"#), "bad key");
        assert_eq!(rejection_message("plain text"), "plain text");
        assert_eq!(rejection_message(""), "empty response");
    }
}
