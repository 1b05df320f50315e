//! Bounded fan-out of adapter calls across many targets.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::identifier::NormalizedIdentifier;
use crate::network::Network;
use crate::registry::AdapterRegistry;

/// Upper bound on concurrent upstream calls in a bulk run.
pub const MAX_WORKERS: usize = 5;

#[inline]
pub fn worker_count(targets: usize) -> usize {
    targets.clamp(1, MAX_WORKERS)
}

/// One `(network, app code)` pair of a bulk unit listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitTarget {
    pub network: Network,
    pub app_code: String,
}

impl UnitTarget {
    pub fn new(network: Network, app_code: impl Into<String>) -> Self {
        Self {
            network,
            app_code: app_code.into(),
        }
    }
}

impl fmt::Display for UnitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.network, self.app_code)
    }
}

impl FromStr for UnitTarget {
    type Err = String;

    /// Parse `network:appCode`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (network, app_code) = s
            .split_once(':')
            .ok_or_else(|| format!("expected network:appCode, got '{s}'"))?;
        let network = Network::from_str(network.trim())
            .map_err(|_| format!("unknown network '{}'", network.trim()))?;
        let app_code = app_code.trim();
        if app_code.is_empty() {
            return Err(format!("missing app code in '{s}'"));
        }
        Ok(Self::new(network, app_code))
    }
}

/// Run `task` for every key on at most [`worker_count`] concurrent workers
/// and collect the results by key, independent of completion order.
pub async fn fan_out<K, T, F, Fut>(keys: Vec<K>, task: F) -> BTreeMap<K, T>
where
    K: Ord + Clone,
    F: Fn(K) -> Fut,
    Fut: Future<Output = T>,
{
    let workers = worker_count(keys.len());
    debug!(targets = keys.len(), workers, "Starting bulk fan-out");

    stream::iter(keys)
        .map(|key| {
            let fut = task(key.clone());
            async move { (key, fut.await) }
        })
        .buffer_unordered(workers)
        .collect()
        .await
}

/// `listUnits` for every target through the registry.
pub async fn list_units_across(
    registry: &AdapterRegistry,
    targets: Vec<UnitTarget>,
) -> BTreeMap<UnitTarget, Vec<NormalizedIdentifier>> {
    fan_out(targets, move |target| async move {
        registry.list_units(target.network, &target.app_code).await
    })
    .await
}
