//! Per-network token slot with single-flight refresh.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::{BearerToken, TokenError, TokenProvider, TokenState};
use crate::credentials::NetworkCredential;
use crate::network::Network;

/// Consecutive acquisition failures for one network.
#[derive(Debug, Clone, Default)]
pub struct FailureInfo {
    pub count: u32,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct Status {
    state: TokenState,
    expires_at: Option<DateTime<Utc>>,
    failures: FailureInfo,
}

/// Owns the cached token of one network.
///
/// The slot lock is held across the upstream call, so concurrent callers that
/// find the token stale wait for the single in-flight refresh and then reuse
/// its result instead of issuing their own.
pub struct TokenManager {
    provider: Box<dyn TokenProvider>,
    client: Client,
    slot: tokio::sync::Mutex<Option<BearerToken>>,
    status: Mutex<Status>,
}

impl TokenManager {
    pub fn new(provider: impl TokenProvider + 'static, client: Client) -> Self {
        Self {
            provider: Box::new(provider),
            client,
            slot: tokio::sync::Mutex::new(None),
            status: Mutex::new(Status {
                state: TokenState::Absent,
                expires_at: None,
                failures: FailureInfo::default(),
            }),
        }
    }

    pub fn network(&self) -> Network {
        self.provider.network()
    }

    /// A token that is valid for at least the provider's refresh margin.
    ///
    /// The cached token is reused unless it is inside the margin or was
    /// issued for a different credential pair.
    pub async fn bearer(&self, credential: &NetworkCredential) -> Result<BearerToken, TokenError> {
        let mut slot = self.slot.lock().await;

        if let Some(token) = slot.as_ref() {
            let fresh = !token.needs_refresh_at(Utc::now(), self.provider.refresh_margin());
            if fresh && token.source == credential.fingerprint() {
                return Ok(token.clone());
            }
            if !fresh {
                debug!(network = %self.network(), expires_at = %token.expires_at, "Token near expiry");
            } else {
                info!(network = %self.network(), "Credentials changed; discarding cached token");
            }
        }

        self.acquire_locked(&mut slot, credential).await
    }

    /// Unconditionally replace the cached token, e.g. after the upstream
    /// answered 401 for a token we believed valid.
    pub async fn force_refresh(
        &self,
        credential: &NetworkCredential,
    ) -> Result<BearerToken, TokenError> {
        let mut slot = self.slot.lock().await;
        self.acquire_locked(&mut slot, credential).await
    }

    /// Drop the cached token.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = None;
        let mut status = self.status.lock();
        status.state = TokenState::Absent;
        status.expires_at = None;
    }

    async fn acquire_locked(
        &self,
        slot: &mut Option<BearerToken>,
        credential: &NetworkCredential,
    ) -> Result<BearerToken, TokenError> {
        self.status.lock().state = if slot.is_some() {
            TokenState::Refreshing
        } else {
            TokenState::Acquiring
        };

        match self.provider.acquire(&self.client, credential).await {
            Ok(token) => {
                debug!(
                    network = %self.network(),
                    expires_at = %token.expires_at,
                    "Token acquired"
                );
                {
                    let mut status = self.status.lock();
                    status.state = TokenState::Valid;
                    status.expires_at = Some(token.expires_at);
                    status.failures = FailureInfo::default();
                }
                *slot = Some(token.clone());
                Ok(token)
            }
            Err(e) => {
                *slot = None;
                let count = {
                    let mut status = self.status.lock();
                    status.state = TokenState::RefreshFailed;
                    status.expires_at = None;
                    status.failures.count += 1;
                    status.failures.last_failure = Some(Utc::now());
                    status.failures.last_error = Some(e.to_string());
                    status.failures.count
                };
                warn!(
                    network = %self.network(),
                    failures = count,
                    error = %e,
                    "Token acquisition failed"
                );
                Err(e)
            }
        }
    }

    pub fn state(&self) -> TokenState {
        self.state_at(Utc::now())
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        let status = self.status.lock();
        match (status.state, status.expires_at) {
            (TokenState::Valid, Some(expires_at))
                if expires_at - now < self.provider.refresh_margin() =>
            {
                TokenState::NearExpiry
            }
            (state, _) => state,
        }
    }

    pub fn failure_info(&self) -> FailureInfo {
        self.status.lock().failures.clone()
    }

    #[inline]
    pub fn failure_count(&self) -> u32 {
        self.status.lock().failures.count
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("network", &self.network())
            .field("state", &self.state())
            .finish()
    }
}
