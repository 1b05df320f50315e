use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use rustls::ClientConfig;
use rustls::crypto::aws_lc_rs;
use rustls_platform_verifier::BuilderVerifierExt;
use thiserror::Error;

/// Timeout applied to every outbound call, token exchanges included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("adnet-adapters/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Build the client shared by all adapters: rustls with the platform
/// certificate verifier and a fixed request timeout.
pub fn build_client(timeout: Duration) -> Result<Client, ClientBuildError> {
    let provider = Arc::new(aws_lc_rs::default_provider());
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_platform_verifier()?
        .with_no_client_auth();

    Ok(Client::builder()
        .use_preconfigured_tls(tls_config)
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}
