//! IronSource bearer token exchange.
//!
//! `GET /partners/publisher/auth` with the `secretkey` and `refreshToken`
//! headers answers with the JWT as a bare, usually quoted, string.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use tracing::debug;

use super::{BearerToken, TokenError, TokenProvider, rejection_message};
use crate::credentials::NetworkCredential;
use crate::network::Network;

pub const REFRESH_MARGIN_SECS: i64 = 3600;

#[derive(Debug, Clone)]
pub struct IronSourceTokenProvider {
    auth_url: String,
}

impl IronSourceTokenProvider {
    pub fn new(auth_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
        }
    }
}

impl Default for IronSourceTokenProvider {
    fn default() -> Self {
        Self::new(Network::IronSource.default_auth_url().unwrap_or_default())
    }
}

/// Strip the JSON string quoting IronSource wraps the token in.
pub(crate) fn parse_token_body(body: &str) -> Result<String, TokenError> {
    let trimmed = body.trim();
    let token = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed)
            .map_err(|e| TokenError::Parse(format!("quoted token: {e}")))?
    } else {
        trimmed.to_string()
    };

    if token.is_empty() {
        return Err(TokenError::Parse("empty token".to_string()));
    }
    Ok(token)
}

#[async_trait]
impl TokenProvider for IronSourceTokenProvider {
    fn network(&self) -> Network {
        Network::IronSource
    }

    fn refresh_margin(&self) -> Duration {
        Duration::seconds(REFRESH_MARGIN_SECS)
    }

    async fn acquire(
        &self,
        client: &Client,
        credential: &NetworkCredential,
    ) -> Result<BearerToken, TokenError> {
        let secret_key = credential.require("secret_key")?;
        let refresh_token = credential.require("refresh_token")?;

        debug!(url = %self.auth_url, "Requesting IronSource bearer token");
        let response = client
            .get(&self.auth_url)
            .header("secretkey", secret_key)
            .header("refreshToken", refresh_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TokenError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&body),
            });
        }

        let token = parse_token_body(&body)?;
        Ok(BearerToken::from_raw(
            token,
            credential.fingerprint(),
            None,
            Utc::now(),
        ))
    }
}
