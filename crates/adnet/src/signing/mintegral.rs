//! Mintegral request signing.
//!
//! `sign = md5_hex(secret + md5_hex(str(time)))`, with `time` in seconds.

use super::{SigningContext, md5_hex, unix_seconds};

pub fn sign(secret: &str, timestamp: i64) -> SigningContext {
    let time_md5 = md5_hex(timestamp.to_string());
    let digest = md5_hex(format!("{secret}{time_md5}"));
    SigningContext::new(timestamp, None, digest)
}

pub fn sign_now(secret: &str) -> SigningContext {
    sign(secret, unix_seconds())
}

/// The `skey` / `time` / `sign` fields sent with every Mintegral request.
pub fn auth_fields(skey: &str, ctx: &SigningContext) -> [(&'static str, String); 3] {
    [
        ("skey", skey.to_string()),
        ("time", ctx.timestamp.to_string()),
        ("sign", ctx.digest.clone()),
    ]
}
