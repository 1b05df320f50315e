//! Pangle request signing.
//!
//! The security key, timestamp (seconds) and nonce are sorted as strings,
//! concatenated and hashed with SHA-1. Pangle rejects signatures whose
//! timestamp drifted, so a context older than [`FRESHNESS_WINDOW`] must be
//! regenerated before it goes on the wire.

use std::time::Duration;

use rand::RngExt;
use tracing::debug;

use super::{SigningContext, sha1_hex, unix_seconds};

pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(5);
pub const API_VERSION: &str = "1.0";

/// Nonces are drawn from `[1, 2^31 - 1]`.
const NONCE_MAX: u32 = i32::MAX as u32;

pub fn sign(security_key: &str, timestamp: i64, nonce: u32) -> SigningContext {
    let mut keys = [
        security_key.to_string(),
        timestamp.to_string(),
        nonce.to_string(),
    ];
    keys.sort();
    let digest = sha1_hex(keys.concat());
    SigningContext::new(timestamp, Some(nonce), digest)
}

pub fn random_nonce() -> u32 {
    rand::rng().random_range(1..=NONCE_MAX)
}

pub fn sign_now(security_key: &str) -> SigningContext {
    sign(security_key, unix_seconds(), random_nonce())
}

/// Return `ctx` if still inside the freshness window, otherwise a new
/// context with a fresh timestamp, nonce and signature.
pub fn ensure_fresh(ctx: SigningContext, security_key: &str) -> SigningContext {
    if !ctx.is_stale(FRESHNESS_WINDOW) {
        return ctx;
    }
    debug!(
        age_ms = ctx.age().as_millis() as u64,
        "Pangle signing context is stale; regenerating"
    );
    sign_now(security_key)
}
