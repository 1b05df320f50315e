//! One adapter per supported network.

mod applovin;
mod bigoads;
mod fyber;
mod inmobi;
mod ironsource;
mod mintegral;
mod pangle;
mod unity;
mod vungle;

pub use applovin::AppLovinAdapter;
pub use bigoads::BigOAdsAdapter;
pub use fyber::FyberAdapter;
pub use inmobi::InMobiAdapter;
pub use ironsource::IronSourceAdapter;
pub use mintegral::MintegralAdapter;
pub use pangle::PangleAdapter;
pub use unity::UnityAdapter;
pub use vungle::VungleAdapter;

use tracing::warn;

use crate::adapter::Operation;
use crate::envelope::AdapterResult;
use crate::error::AdapterError;
use crate::http::RawResponse;
use crate::identifier::{EntityKind, NormalizedIdentifier};
use crate::network::Network;
use crate::normalizer::normalize;
use crate::resolver::resolve_list;

/// Fold a call outcome into the envelope.
pub(crate) fn finish(
    network: Network,
    operation: Operation,
    outcome: Result<RawResponse, AdapterError>,
) -> AdapterResult {
    match outcome {
        Ok(response) => normalize(network, &response),
        Err(e) => {
            warn!(%network, %operation, error = %e, "Adapter call failed");
            e.into_result()
        }
    }
}

/// Resolve the records of a list call. Failures are logged and yield an
/// empty list.
pub(crate) fn finish_list(
    network: Network,
    operation: Operation,
    kind: EntityKind,
    outcome: Result<RawResponse, AdapterError>,
) -> Vec<NormalizedIdentifier> {
    let result = finish(network, operation, outcome);
    if !result.is_success() {
        warn!(
            %network,
            %operation,
            code = %result.code,
            message = %result.message,
            "List call failed; returning no identifiers"
        );
        return Vec::new();
    }
    resolve_list(network, kind, &result.payload)
}

/// Keep the identifiers matching `filter`, if any.
pub(crate) fn apply_filter(
    identifiers: Vec<NormalizedIdentifier>,
    filter: Option<&str>,
) -> Vec<NormalizedIdentifier> {
    match filter {
        Some(filter) => identifiers
            .into_iter()
            .filter(|identifier| identifier.matches(filter))
            .collect(),
        None => identifiers,
    }
}

/// Failure for a `create_unit` call that lacks its required app key.
pub(crate) fn missing_app_key(network: Network) -> AdapterResult {
    AdapterError::InvalidParams(format!("{network} createUnit requires an app key")).into_result()
}
