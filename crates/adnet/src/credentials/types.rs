//! Core credential types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::CredentialError;
use crate::network::Network;
use crate::signing::sha1_hex;

/// How a network authenticates outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// Static key(s) sent as request headers (AppLovin, InMobi).
    StaticHeaderKey,
    /// Pre-shared secret used to sign each request (BigOAds, Mintegral, Pangle).
    HmacPreShared,
    /// HTTP Basic authentication (Unity).
    BasicAuth,
    /// Bearer token exchanged from long-lived secrets (IronSource, Vungle).
    RefreshableBearer,
    /// OAuth2 client-credentials grant (Fyber).
    OAuthClientCredentials,
}

/// One network's secret group.
///
/// Immutable once loaded. Field values are never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkCredential {
    pub network: Network,
    pub auth_kind: AuthKind,
    fields: BTreeMap<String, String>,
}

impl NetworkCredential {
    pub fn new(network: Network, fields: BTreeMap<String, String>) -> Self {
        Self {
            network,
            auth_kind: network.auth_kind(),
            fields,
        }
    }

    /// Build a credential from `(field, value)` pairs.
    pub fn from_pairs<I, K, V>(network: Network, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            network,
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Look up a field, failing with [`CredentialError::MissingField`].
    pub fn require(&self, field: &'static str) -> Result<&str, CredentialError> {
        self.get(field).ok_or(CredentialError::MissingField {
            network: self.network,
            field,
        })
    }

    /// Required fields that are not present.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.network
            .required_fields()
            .iter()
            .copied()
            .filter(|f| !self.fields.contains_key(*f))
            .collect()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Short stable identifier of the secret values, used to tag tokens with
    /// the credential pair that produced them without exposing the secrets.
    pub fn fingerprint(&self) -> String {
        let joined = self
            .fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n");
        let digest = sha1_hex(joined.as_bytes());
        format!("{}:{}", self.network, &digest[..12])
    }
}

impl fmt::Debug for NetworkCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkCredential")
            .field("network", &self.network)
            .field("auth_kind", &self.auth_kind)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}
