//! Fyber (DT) management API client-credentials grant.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

use super::{BearerToken, TokenError, TokenProvider, rejection_message};
use crate::credentials::NetworkCredential;
use crate::network::Network;

const GRANT_TYPE: &str = "management_client_credentials";

/// Fyber tokens are cached only while their declared expiry is at least this
/// far away.
pub const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct FyberTokenProvider {
    auth_url: String,
}

impl FyberTokenProvider {
    pub fn new(auth_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
        }
    }
}

impl Default for FyberTokenProvider {
    fn default() -> Self {
        Self::new(Network::Fyber.default_auth_url().unwrap_or_default())
    }
}

/// Token value and declared lifetime of a successful auth response.
pub(crate) fn parse_token_response(body: &Value) -> Result<(String, Option<Duration>), TokenError> {
    let token = ["accessToken", "access_token"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| TokenError::Parse("missing accessToken".to_string()))?;

    let ttl = ["expiresIn", "expires_in"]
        .iter()
        .find_map(|key| body.get(*key))
        .and_then(|v| v.as_i64().or_else(|| v.as_str()?.parse().ok()))
        .filter(|secs| *secs > 0)
        .and_then(Duration::try_seconds);

    Ok((token.to_string(), ttl))
}

#[async_trait]
impl TokenProvider for FyberTokenProvider {
    fn network(&self) -> Network {
        Network::Fyber
    }

    fn refresh_margin(&self) -> Duration {
        Duration::seconds(REFRESH_MARGIN_SECS)
    }

    async fn acquire(
        &self,
        client: &Client,
        credential: &NetworkCredential,
    ) -> Result<BearerToken, TokenError> {
        let client_id = credential.require("client_id")?;
        let client_secret = credential.require("client_secret")?;

        debug!(url = %self.auth_url, "Requesting Fyber access token");
        let response = client
            .post(&self.auth_url)
            .json(&json!({
                "grant_type": GRANT_TYPE,
                "client_id": client_id,
                "client_secret": client_secret,
            }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(TokenError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&text),
            });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| TokenError::Parse(format!("Fyber auth response: {e}")))?;
        let (token, ttl) = parse_token_response(&body)?;
        Ok(BearerToken::from_raw(
            token,
            credential.fingerprint(),
            ttl,
            Utc::now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case() {
        let (token, ttl) =
            parse_token_response(&json!({"accessToken": "abc", "expiresIn": 3600})).unwrap();
        assert_eq!(token, "abc");
        assert_eq!(ttl, Some(Duration::seconds(3600)));
    }

    #[test]
    fn test_parse_out_of_range_ttl() {
        let (_, ttl) =
            parse_token_response(&json!({"accessToken": "abc", "expiresIn": i64::MAX})).unwrap();
        assert_eq!(ttl, None);

        let (_, ttl) = parse_token_response(
            &json!({"accessToken": "abc", "expiresIn": 10_000_000_000_000_i64}),
        )
        .unwrap();
        assert_eq!(ttl, Duration::try_seconds(10_000_000_000_000));
    }

    #[test]
    fn test_parse_snake_case_without_ttl() {
        let (token, ttl) = parse_token_response(&json!({"access_token": "abc"})).unwrap();
        assert_eq!(token, "abc");
        assert_eq!(ttl, None);
    }

    #[test]
    fn test_parse_missing_token() {
        assert!(matches!(
            parse_token_response(&json!({"expiresIn": 10})),
            Err(TokenError::Parse(_))
        ));
        assert!(parse_token_response(&json!({"accessToken": ""})).is_err());
    }
}
