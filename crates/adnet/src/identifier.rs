use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::network::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum EntityKind {
    App,
    Unit,
}

/// A network entity id extracted from a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedIdentifier {
    pub network: Network,
    pub entity_kind: EntityKind,
    pub primary_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secondary_ids: BTreeMap<String, String>,
}

impl NormalizedIdentifier {
    pub fn new(network: Network, entity_kind: EntityKind, primary_id: impl Into<String>) -> Self {
        Self {
            network,
            entity_kind,
            primary_id: primary_id.into(),
            secondary_ids: BTreeMap::new(),
        }
    }

    pub fn with_secondary(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secondary_ids.insert(key.into(), value.into());
        self
    }

    pub fn secondary(&self, key: &str) -> Option<&str> {
        self.secondary_ids.get(key).map(String::as_str)
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.secondary("name")
    }

    /// Case-insensitive substring match on the name or primary id.
    pub fn matches(&self, filter: &str) -> bool {
        let needle = filter.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.primary_id.to_lowercase().contains(&needle)
            || self
                .name()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
    }
}
