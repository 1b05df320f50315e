//! BigOAds request signing.
//!
//! `X-BIGO-Sign = sha1_hex("{developerId}-{now_ms}-{token}") + "." + now_ms`

use super::{SigningContext, sha1_hex, unix_millis};

pub const DEVELOPER_ID_HEADER: &str = "X-BIGO-DeveloperId";
pub const SIGN_HEADER: &str = "X-BIGO-Sign";

/// Sign with an explicit millisecond timestamp.
pub fn sign(developer_id: &str, token: &str, timestamp_ms: i64) -> SigningContext {
    let digest = sha1_hex(format!("{developer_id}-{timestamp_ms}-{token}"));
    SigningContext::new(timestamp_ms, None, format!("{digest}.{timestamp_ms}"))
}

/// Sign with the current time. BigOAds contexts are regenerated per call.
pub fn sign_now(developer_id: &str, token: &str) -> SigningContext {
    sign(developer_id, token, unix_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        let ctx = sign("dev1", "tok1", 1_700_000_000_000);
        let expected = sha1_hex("dev1-1700000000000-tok1");
        assert_eq!(ctx.digest, format!("{expected}.1700000000000"));
        assert_eq!(ctx.timestamp, 1_700_000_000_000);
        assert_eq!(ctx.nonce, None);
    }

    #[test]
    fn test_digest_shape() {
        let ctx = sign_now("dev", "tok");
        let (hex_part, ts) = ctx.digest.split_once('.').unwrap();
        assert_eq!(hex_part.len(), 40);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(ts, ctx.timestamp.to_string());
    }
}
