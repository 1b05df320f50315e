//! Networks that authenticate without a per-request signature.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// AppLovin management key header.
pub const APPLOVIN_KEY_HEADER: &str = "Api-Key";

/// InMobi static header names, in the order of their credential fields
/// `client_id`, `account_id`, `client_secret`.
pub const INMOBI_HEADERS: [&str; 3] = ["x-client-id", "x-account-id", "x-client-secret"];

/// `Basic base64(keyId:secretKey)` as used by Unity.
pub fn basic_auth(key_id: &str, secret_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{key_id}:{secret_key}")))
}
