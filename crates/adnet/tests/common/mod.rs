//! Shared fixtures: an in-process upstream and a registry pointed at it.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use adnet_adapters::{
    AdapterConfig, AdapterContext, AdapterRegistry, CredentialStore, Network,
};
use adnet_adapters::http::{DEFAULT_TIMEOUT, build_client};
use axum::Router;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Initialize tracing for tests, output captured per test.
#[inline]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Registry whose every network talks to `base_url`, with `auth_path`
/// (relative to `base_url`) as the token endpoint of token networks.
pub fn registry(base_url: &str, auth_path: &str, credentials: &[(&str, &str)]) -> AdapterRegistry {
    init_tracing();
    let mut config = AdapterConfig::default();
    for network in Network::all() {
        let auth_url = network
            .default_auth_url()
            .map(|_| format!("{base_url}{auth_path}"));
        config = config.with_endpoint(network, base_url, auth_url);
    }

    let store = CredentialStore::from_entries(credentials.iter().copied()).unwrap();
    AdapterRegistry::new(AdapterContext::new(
        build_client(DEFAULT_TIMEOUT).unwrap(),
        Arc::new(store),
        Arc::new(config),
    ))
}

/// Every network's credentials with dummy values.
pub const ALL_CREDENTIALS: &[(&str, &str)] = &[
    ("BIGOADS_DEVELOPER_ID", "dev1"),
    ("BIGOADS_TOKEN", "tok1"),
    ("MINTEGRAL_SKEY", "skey1"),
    ("MINTEGRAL_SECRET", "s3cr3t"),
    ("PANGLE_SECURITY_KEY", "abc"),
    ("PANGLE_USER_ID", "1001"),
    ("PANGLE_ROLE_ID", "2002"),
    ("IRONSOURCE_SECRET_KEY", "is-secret"),
    ("IRONSOURCE_REFRESH_TOKEN", "is-refresh"),
    ("INMOBI_CLIENT_ID", "im-client"),
    ("INMOBI_ACCOUNT_ID", "im-account"),
    ("INMOBI_CLIENT_SECRET", "im-secret"),
    ("FYBER_CLIENT_ID", "fy-client"),
    ("FYBER_CLIENT_SECRET", "fy-secret"),
    ("UNITY_KEY_ID", "key"),
    ("UNITY_SECRET_KEY", "secret"),
    ("UNITY_ORGANIZATION_ID", "org1"),
    ("APPLOVIN_API_KEY", "al-key"),
    ("VUNGLE_SECRET_TOKEN", "vg-secret"),
];

/// Request counter shared with upstream handlers.
#[derive(Debug, Default, Clone)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Unsigned JWT with the given `exp`.
pub fn jwt_with_exp(exp: i64) -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
        URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#))
    )
}

pub fn payload(value: serde_json::Value) -> adnet_adapters::Payload {
    value.as_object().cloned().unwrap_or_default()
}
