//! The uniform four-operation contract every network adapter implements.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::config::AdapterConfig;
use crate::credentials::{CredentialStore, NetworkCredential};
use crate::envelope::AdapterResult;
use crate::error::AdapterError;
use crate::http::{ApiRequest, ClientBuildError, build_client};
use crate::identifier::NormalizedIdentifier;
use crate::network::Network;

/// Caller-supplied request fields, forwarded to the network as-is.
pub type Payload = Map<String, Value>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum Operation {
    CreateApp,
    CreateUnit,
    ListApps,
    ListUnits,
}

/// Shared collaborators handed to every adapter constructor.
#[derive(Debug, Clone)]
pub struct AdapterContext {
    pub client: Client,
    pub credentials: Arc<CredentialStore>,
    pub config: Arc<AdapterConfig>,
}

impl AdapterContext {
    /// `client` must carry its own rustls provider, as [`build_client`] does.
    pub fn new(client: Client, credentials: Arc<CredentialStore>, config: Arc<AdapterConfig>) -> Self {
        Self {
            client,
            credentials,
            config,
        }
    }

    /// Build the shared HTTP client from `config`.
    pub fn from_config(
        credentials: Arc<CredentialStore>,
        config: AdapterConfig,
    ) -> Result<Self, ClientBuildError> {
        let client = build_client(config.timeout())?;
        Ok(Self::new(client, credentials, Arc::new(config)))
    }

    /// Request builder rooted at the network's configured base URL.
    pub fn api(&self, network: Network) -> ApiRequest {
        ApiRequest::new(network, self.config.base_url(network), self.client.clone())
    }

    pub fn auth_url(&self, network: Network) -> String {
        self.config
            .auth_url(network)
            .unwrap_or_else(|| self.config.base_url(network))
    }

    #[inline]
    pub fn credential(&self, network: Network) -> Result<NetworkCredential, AdapterError> {
        Ok(self.credentials.get(network)?)
    }
}

/// One network's implementation of the management contract.
///
/// Operations never return `Err`: expected failures are folded into a
/// `status=1` [`AdapterResult`], and list operations degrade to an empty list.
#[async_trait]
pub trait NetworkAdapter: Send + Sync {
    fn network(&self) -> Network;

    fn supports(&self, operation: Operation) -> bool {
        let _ = operation;
        true
    }

    async fn create_app(&self, payload: Payload) -> AdapterResult {
        let _ = payload;
        AdapterError::unsupported(self.network(), Operation::CreateApp).into_result()
    }

    async fn create_unit(&self, payload: Payload, app_key: Option<&str>) -> AdapterResult;

    async fn list_apps(&self, filter: Option<&str>) -> Vec<NormalizedIdentifier> {
        let _ = filter;
        Vec::new()
    }

    async fn list_units(&self, app_code: &str) -> Vec<NormalizedIdentifier>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::DEFAULT_TIMEOUT;
    use std::str::FromStr;

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::CreateApp.to_string(), "createApp");
        assert_eq!(Operation::ListUnits.to_string(), "listUnits");
        assert_eq!(Operation::from_str("createUnit").unwrap(), Operation::CreateUnit);
    }

    #[test]
    fn test_context_urls() {
        let config = AdapterConfig::default().with_endpoint(
            Network::Fyber,
            "http://127.0.0.1:1",
            Some("http://127.0.0.1:1/auth".to_string()),
        );
        let ctx = AdapterContext::new(
            build_client(DEFAULT_TIMEOUT).unwrap(),
            Arc::new(
                CredentialStore::from_entries(std::iter::empty::<(String, String)>()).unwrap(),
            ),
            Arc::new(config),
        );
        assert_eq!(ctx.api(Network::Fyber).url("/x"), "http://127.0.0.1:1/x");
        assert_eq!(ctx.auth_url(Network::Fyber), "http://127.0.0.1:1/auth");
        assert!(matches!(
            ctx.credential(Network::Fyber),
            Err(AdapterError::Auth(_))
        ));
    }
}
