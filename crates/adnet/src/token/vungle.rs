//! Vungle (Liftoff) publisher API token.
//!
//! `GET /v2/auth` with the long-lived secret in `x-api-key`. The auth service
//! reports failures with a `messages` array or a `code` field, sometimes
//! under a 2xx status.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{BearerToken, TokenError, TokenProvider, rejection_message};
use crate::credentials::NetworkCredential;
use crate::network::Network;

pub const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct VungleTokenProvider {
    auth_url: String,
}

impl VungleTokenProvider {
    pub fn new(auth_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
        }
    }
}

impl Default for VungleTokenProvider {
    fn default() -> Self {
        Self::new(Network::Vungle.default_auth_url().unwrap_or_default())
    }
}

pub(crate) fn parse_token_response(
    status: u16,
    body: &Value,
) -> Result<(String, Option<Duration>), TokenError> {
    if body.get("messages").is_some() || body.get("code").is_some() {
        return Err(TokenError::Rejected {
            status,
            message: crate::normalizer::error_message(body)
                .unwrap_or_else(|| "Unknown error".to_string()),
        });
    }

    let token = body
        .get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| TokenError::Parse("missing token".to_string()))?;

    let ttl = ["expiresIn", "expires_in"]
        .iter()
        .find_map(|key| body.get(*key))
        .and_then(Value::as_i64)
        .filter(|secs| *secs > 0)
        .and_then(Duration::try_seconds);

    Ok((token.to_string(), ttl))
}

#[async_trait]
impl TokenProvider for VungleTokenProvider {
    fn network(&self) -> Network {
        Network::Vungle
    }

    fn refresh_margin(&self) -> Duration {
        Duration::seconds(REFRESH_MARGIN_SECS)
    }

    async fn acquire(
        &self,
        client: &Client,
        credential: &NetworkCredential,
    ) -> Result<BearerToken, TokenError> {
        let secret = credential.require("secret_token")?;

        debug!(url = %self.auth_url, "Requesting Vungle token");
        let response = client
            .get(&self.auth_url)
            .header("x-api-key", secret)
            .header("vungle-version", "1")
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
            .map_err(|e| TokenError::Parse(format!("Vungle auth response: {e}")))?;
        let (token, ttl) = parse_token_response(status.as_u16(), &body)?;
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
    use serde_json::json;

    #[test]
    fn test_parse_token() {
        let (token, ttl) = parse_token_response(200, &json!({"token": "abc"})).unwrap();
        assert_eq!(token, "abc");
        assert_eq!(ttl, None);
    }

    #[test]
    fn test_parse_out_of_range_ttl() {
        let (token, ttl) =
            parse_token_response(200, &json!({"token": "abc", "expiresIn": i64::MAX})).unwrap();
        assert_eq!(token, "abc");
        assert_eq!(ttl, None);
    }

    #[test]
    fn test_messages_is_rejection() {
        let err = parse_token_response(
            200,
            &json!({"messages": ["Invalid API key"], "token": "ignored"}),
        )
        .unwrap_err();
        match err {
            TokenError::Rejected { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_code_is_rejection() {
        assert!(matches!(
            parse_token_response(200, &json!({"code": 401, "message": "nope"})),
            Err(TokenError::Rejected { .. })
        ));
    }
}
