//! Typed credential lookups over a reloadable snapshot.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use super::error::CredentialError;
use super::source::{CredentialSource, EnvSource, MapSource};
use super::types::NetworkCredential;
use crate::network::Network;

type Snapshot = FxHashMap<Network, NetworkCredential>;

/// Holds every network's secret group for the lifetime of the process.
///
/// Constructed once and shared (behind an `Arc`) by all adapters. Lookups
/// never touch the network.
pub struct CredentialStore {
    source: Arc<dyn CredentialSource>,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl CredentialStore {
    pub fn new(source: Arc<dyn CredentialSource>) -> Result<Self, CredentialError> {
        let snapshot = Self::read_snapshot(source.as_ref())?;
        info!(
            source = %source.describe(),
            configured = snapshot.len(),
            "Loaded ad network credentials"
        );
        Ok(Self {
            source,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Process environment plus an optional `.env` file.
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::new(Arc::new(EnvSource::new()))
    }

    /// Static entries, keyed like environment variables.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(Arc::new(MapSource::new(entries)))
    }

    fn read_snapshot(source: &dyn CredentialSource) -> Result<Snapshot, CredentialError> {
        let entries = source.load()?;
        Ok(Self::build_snapshot(&entries))
    }

    fn build_snapshot(entries: &HashMap<String, String>) -> Snapshot {
        let mut snapshot = FxHashMap::default();
        for network in Network::all() {
            let fields: BTreeMap<String, String> = network
                .required_fields()
                .iter()
                .filter_map(|field| {
                    let value = entries.get(&network.env_key(field))?.trim();
                    (!value.is_empty()).then(|| (field.to_string(), value.to_string()))
                })
                .collect();

            if !fields.is_empty() {
                snapshot.insert(network, NetworkCredential::new(network, fields));
            }
        }
        snapshot
    }

    /// Complete credential for `network`.
    pub fn get(&self, network: Network) -> Result<NetworkCredential, CredentialError> {
        let snapshot = self.snapshot.read().clone();
        let credential = snapshot
            .get(&network)
            .ok_or(CredentialError::NotConfigured(network))?;

        if let Some(&field) = credential.missing_fields().first() {
            return Err(CredentialError::MissingField {
                network,
                field,
            });
        }
        Ok(credential.clone())
    }

    pub fn is_configured(&self, network: Network) -> bool {
        self.get(network).is_ok()
    }

    /// Networks with a complete secret group, in declaration order.
    pub fn configured(&self) -> Vec<Network> {
        Network::all()
            .into_iter()
            .filter(|n| self.is_configured(*n))
            .collect()
    }

    /// Required fields still missing for `network`.
    pub fn missing_fields(&self, network: Network) -> Vec<&'static str> {
        match self.snapshot.read().get(&network) {
            Some(credential) => credential.missing_fields(),
            None => network.required_fields().to_vec(),
        }
    }

    /// Re-read the backing source.
    ///
    /// Returns `true` when any network's secret group changed.
    pub fn reload(&self) -> Result<bool, CredentialError> {
        let fresh = Self::read_snapshot(self.source.as_ref())?;
        let mut guard = self.snapshot.write();
        if **guard == fresh {
            debug!("Credential source unchanged");
            return Ok(false);
        }

        info!(configured = fresh.len(), "Credential source changed; reloaded");
        *guard = Arc::new(fresh);
        Ok(true)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("source", &self.source.describe())
            .field("configured", &self.configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_lookup() {
        let store = CredentialStore::from_entries([
            ("BIGOADS_DEVELOPER_ID", "dev1"),
            ("BIGOADS_TOKEN", "tok1"),
            ("UNRELATED", "x"),
        ])
        .unwrap();

        let cred = store.get(Network::BigOAds).unwrap();
        assert_eq!(cred.get("developer_id"), Some("dev1"));
        assert_eq!(cred.get("token"), Some("tok1"));
        assert_eq!(store.configured(), vec![Network::BigOAds]);
    }

    #[test]
    fn test_absent_and_partial() {
        let store = CredentialStore::from_entries([
            ("PANGLE_SECURITY_KEY", "abc"),
            ("PANGLE_USER_ID", "  "),
        ])
        .unwrap();

        assert!(matches!(
            store.get(Network::Vungle),
            Err(CredentialError::NotConfigured(Network::Vungle))
        ));
        assert!(matches!(
            store.get(Network::Pangle),
            Err(CredentialError::MissingField {
                network: Network::Pangle,
                field: "user_id"
            })
        ));
        assert_eq!(store.missing_fields(Network::Pangle), vec!["user_id", "role_id"]);
        assert_eq!(
            store.missing_fields(Network::AppLovin),
            vec!["api_key"]
        );
    }

    #[test]
    fn test_values_are_trimmed() {
        let store = CredentialStore::from_entries([("APPLOVIN_API_KEY", " key \n")]).unwrap();
        assert_eq!(
            store.get(Network::AppLovin).unwrap().get("api_key"),
            Some("key")
        );
    }

    #[test]
    fn test_reload_detects_changes() {
        let source = Arc::new(MapSource::new([("APPLOVIN_API_KEY", "k1")]));
        let store = CredentialStore::new(source.clone()).unwrap();

        assert!(!store.reload().unwrap());

        source.set("APPLOVIN_API_KEY", "k2");
        assert!(store.reload().unwrap());
        assert_eq!(
            store.get(Network::AppLovin).unwrap().get("api_key"),
            Some("k2")
        );

        source.set("VUNGLE_SECRET_TOKEN", "v");
        assert!(store.reload().unwrap());
        assert!(store.is_configured(Network::Vungle));
    }
}
