//! Per-request signature engines.
//!
//! Each engine is a pure function of the credential and time-based inputs.
//! The `*_now` helpers sample the clock and a random nonce; the plain
//! functions take every input explicitly so they can be checked against known
//! vectors.

pub mod bigoads;
pub mod mintegral;
pub mod pangle;
pub mod static_auth;

use std::time::{Duration, Instant};

use chrono::Utc;
use md5::{Digest, Md5};
use sha1::Sha1;

/// Timestamp, optional nonce and digest computed right before a signed
/// request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// Seconds or milliseconds since the epoch, depending on the network.
    pub timestamp: i64,
    pub nonce: Option<u32>,
    /// The value placed on the wire (header value or `sign` field).
    pub digest: String,
    created_at: Instant,
}

impl SigningContext {
    pub fn new(timestamp: i64, nonce: Option<u32>, digest: String) -> Self {
        Self {
            timestamp,
            nonce,
            digest,
            created_at: Instant::now(),
        }
    }

    /// Same context, pretending it was created at `created_at`.
    pub fn created_at(mut self, created_at: Instant) -> Self {
        self.created_at = created_at;
        self
    }

    #[inline]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Older than the network's freshness window.
    #[inline]
    pub fn is_stale(&self, window: Duration) -> bool {
        self.age() > window
    }
}

/// Lowercase hex SHA-1.
pub fn sha1_hex(data: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data.as_ref());
    hex::encode(hasher.finalize())
}

/// Lowercase hex MD5.
pub fn md5_hex(data: impl AsRef<[u8]>) -> String {
    let mut hasher = Md5::new();
    hasher.update(data.as_ref());
    format!("{:x}", hasher.finalize())
}

#[inline]
pub(crate) fn unix_seconds() -> i64 {
    Utc::now().timestamp()
}

#[inline]
pub(crate) fn unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        assert_eq!(sha1_hex("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_staleness() {
        let fresh = SigningContext::new(1, None, "d".to_string());
        assert!(!fresh.is_stale(Duration::from_secs(5)));

        let old = fresh
            .clone()
            .created_at(Instant::now() - Duration::from_secs(6));
        assert!(old.is_stale(Duration::from_secs(5)));
    }
}
