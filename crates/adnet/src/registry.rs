//! Single dispatch point from a [`Network`] to its adapter.

use std::sync::Arc;

use tracing::debug;

use crate::adapter::{AdapterContext, NetworkAdapter, Operation, Payload};
use crate::envelope::AdapterResult;
use crate::error::AdapterError;
use crate::identifier::NormalizedIdentifier;
use crate::network::Network;
use crate::networks::{
    AppLovinAdapter, BigOAdsAdapter, FyberAdapter, InMobiAdapter, IronSourceAdapter,
    MintegralAdapter, PangleAdapter, UnityAdapter, VungleAdapter,
};

type AdapterConstructor = fn(&AdapterContext) -> Arc<dyn NetworkAdapter>;

struct AdapterEntry {
    network: Network,
    constructor: AdapterConstructor,
}

macro_rules! adapter_registry {
    ( $( $network:path => $builder:path ),+ $(,)? ) => {
        &[
            $(
                AdapterEntry {
                    network: $network,
                    constructor: |ctx| Arc::new($builder(ctx)) as Arc<dyn NetworkAdapter>,
                },
            )+
        ]
    };
}

// One entry per network, in `Network` declaration order.
static ADAPTERS: &[AdapterEntry] = adapter_registry![
    Network::BigOAds => BigOAdsAdapter::new,
    Network::Mintegral => MintegralAdapter::new,
    Network::Pangle => PangleAdapter::new,
    Network::IronSource => IronSourceAdapter::new,
    Network::InMobi => InMobiAdapter::new,
    Network::Fyber => FyberAdapter::new,
    Network::Unity => UnityAdapter::new,
    Network::AppLovin => AppLovinAdapter::new,
    Network::Vungle => VungleAdapter::new,
];

/// Every network's adapter, built once and shared.
///
/// Token state lives inside the adapters, so one registry per process keeps
/// one token slot per network.
#[derive(Clone)]
pub struct AdapterRegistry {
    ctx: AdapterContext,
    adapters: Vec<Arc<dyn NetworkAdapter>>,
}

impl AdapterRegistry {
    pub fn new(ctx: AdapterContext) -> Self {
        let adapters = ADAPTERS
            .iter()
            .map(|entry| {
                debug!(network = %entry.network, "Registering adapter");
                (entry.constructor)(&ctx)
            })
            .collect();
        Self { ctx, adapters }
    }

    #[inline]
    fn index(network: Network) -> usize {
        network as usize
    }

    pub fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    pub fn adapter(&self, network: Network) -> Arc<dyn NetworkAdapter> {
        self.adapters[Self::index(network)].clone()
    }

    pub fn supports(&self, network: Network, operation: Operation) -> bool {
        self.adapters[Self::index(network)].supports(operation)
    }

    /// Networks whose credentials are complete.
    pub fn configured_networks(&self) -> Vec<Network> {
        self.ctx.credentials.configured()
    }

    pub async fn create_app(&self, network: Network, payload: Payload) -> AdapterResult {
        if !self.supports(network, Operation::CreateApp) {
            return AdapterError::unsupported(network, Operation::CreateApp).into_result();
        }
        self.adapter(network).create_app(payload).await
    }

    pub async fn create_unit(
        &self,
        network: Network,
        payload: Payload,
        app_key: Option<&str>,
    ) -> AdapterResult {
        if !self.supports(network, Operation::CreateUnit) {
            return AdapterError::unsupported(network, Operation::CreateUnit).into_result();
        }
        self.adapter(network).create_unit(payload, app_key).await
    }

    pub async fn list_apps(&self, network: Network, filter: Option<&str>) -> Vec<NormalizedIdentifier> {
        if !self.supports(network, Operation::ListApps) {
            debug!(%network, "listApps not supported");
            return Vec::new();
        }
        self.adapter(network).list_apps(filter).await
    }

    pub async fn list_units(&self, network: Network, app_code: &str) -> Vec<NormalizedIdentifier> {
        if !self.supports(network, Operation::ListUnits) {
            debug!(%network, "listUnits not supported");
            return Vec::new();
        }
        self.adapter(network).list_units(app_code).await
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("networks", &self.adapters.iter().map(|a| a.network()).collect::<Vec<_>>())
            .finish()
    }
}
