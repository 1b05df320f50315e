//! Adapter configuration: request timeout and per-network endpoint overrides.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::network::Network;

const fn default_timeout_secs() -> u64 {
    30
}

/// Endpoint overrides for one network.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Base URL of the management API (default: the network's public API)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Token endpoint, for networks that exchange a token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Timeout applied to every outbound call (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Per-network overrides, keyed by lowercase network name
    #[serde(default)]
    pub networks: BTreeMap<Network, EndpointConfig>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            networks: BTreeMap::new(),
        }
    }
}

impl AdapterConfig {
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_url(&self, network: Network) -> String {
        self.networks
            .get(&network)
            .and_then(|e| e.base_url.clone())
            .unwrap_or_else(|| network.default_base_url().to_string())
    }

    pub fn auth_url(&self, network: Network) -> Option<String> {
        self.networks
            .get(&network)
            .and_then(|e| e.auth_url.clone())
            .or_else(|| network.default_auth_url().map(str::to_string))
    }

    /// Point `network` at another base URL (and optionally token endpoint).
    pub fn with_endpoint(
        mut self,
        network: Network,
        base_url: impl Into<String>,
        auth_url: Option<String>,
    ) -> Self {
        self.networks.insert(
            network,
            EndpointConfig {
                base_url: Some(base_url.into()),
                auth_url,
            },
        );
        self
    }
}
