//! Minimal JWT inspection: only the `exp` claim is read, the signature is
//! not verified (the token is opaque to us and verified upstream).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// The `exp` claim of a JWT, in seconds since the epoch.
pub fn exp_claim(token: &str) -> Option<i64> {
    let segment = token.split('.').nth(1)?;
    let mut padded = segment.trim_end_matches('=').to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let bytes = URL_SAFE.decode(padded.as_bytes()).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?;
    exp.as_i64()
        .or_else(|| exp.as_f64().map(|f| f as i64))
        .or_else(|| exp.as_str().and_then(|s| s.trim().parse().ok()))
}

pub fn expiry(token: &str) -> Option<DateTime<Utc>> {
    exp_claim(token).and_then(|exp| DateTime::from_timestamp(exp, 0))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    pub(crate) fn make_jwt(claims: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn test_exp_claim() {
        let token = make_jwt(r#"{"sub":"pub-1","exp":1700003600}"#);
        assert_eq!(exp_claim(&token), Some(1_700_003_600));
        assert_eq!(expiry(&token).unwrap().timestamp(), 1_700_003_600);
    }

    #[test]
    fn test_missing_exp() {
        let token = make_jwt(r#"{"sub":"pub-1"}"#);
        assert_eq!(exp_claim(&token), None);
    }

    #[test]
    fn test_not_a_jwt() {
        assert_eq!(exp_claim("opaque-token"), None);
        assert_eq!(exp_claim("a.!!!.c"), None);
    }

    #[test]
    fn test_padding_lengths() {
        // Payload lengths that need 0, 1 and 2 padding characters.
        for claims in [
            r#"{"exp":1}"#,
            r#"{"exp":12}"#,
            r#"{"exp":123}"#,
            r#"{"exp":1234}"#,
        ] {
            let token = make_jwt(claims);
            assert!(exp_claim(&token).is_some(), "{claims}");
        }
    }

    #[test]
    fn test_url_safe_alphabet() {
        // `?` and `>` encode to `-` and `_` in the URL-safe alphabet.
        let token = make_jwt(r#"{"exp":1700000000,"n":"??>>"}"#);
        assert_eq!(exp_claim(&token), Some(1_700_000_000));
    }
}
