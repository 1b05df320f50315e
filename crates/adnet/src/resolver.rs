//! Extracts [`NormalizedIdentifier`]s from normalized results.
//!
//! The resolver works on one result at a time and never correlates ids
//! across calls (e.g. the Android and iOS variants of the same app created
//! through two separate calls stay two unrelated identifiers).

use serde_json::Value;

use crate::envelope::AdapterResult;
use crate::identifier::{EntityKind, NormalizedIdentifier};
use crate::network::Network;
use crate::utils::{first_id, list_items};

/// Secondary ids copied when present: output key, then candidate source keys.
const SECONDARY_FIELDS: &[(&str, &[&str])] = &[
    (
        "name",
        &[
            "name",
            "appName",
            "app_name",
            "site_name",
            "slotName",
            "unit_name",
            "code_name",
            "mediationAdUnitName",
            "placementName",
        ],
    ),
    ("platform", &["platform", "os"]),
    (
        "bundleId",
        &["bundleId", "bundle_id", "package_name", "packageName", "pkgName"],
    ),
    ("adFormat", &["adFormat", "ad_format", "adType", "ad_type"]),
];

const UNITY_STORES: [&str; 2] = ["apple", "google"];

fn primary_keys(network: Network, kind: EntityKind) -> &'static [&'static str] {
    use EntityKind::{App, Unit};
    match (network, kind) {
        (Network::BigOAds, App) => &["appCode"],
        (Network::BigOAds, Unit) => &["slotCode"],
        (Network::Mintegral, App) => &["app_id"],
        (Network::Mintegral, Unit) => &["unit_id"],
        (Network::Pangle, App) => &["site_id"],
        (Network::Pangle, Unit) => &["code_id", "ad_slot_id"],
        (Network::IronSource, App) => &["appKey"],
        (Network::IronSource, Unit) => &["mediationAdUnitId", "id"],
        (Network::InMobi | Network::Fyber, App) => &["appId", "id"],
        (Network::InMobi | Network::Fyber, Unit) => &["placementId", "id"],
        // Unity apps are keyed by store game ids, see `unity_project`.
        (Network::Unity, App) => &[],
        (Network::Unity, Unit) => &["id"],
        (Network::AppLovin, App) => &[],
        (Network::AppLovin, Unit) => &["id"],
        (Network::Vungle, App) => &["vungleAppId", "id"],
        (Network::Vungle, Unit) => &["referenceID", "id"],
    }
}

fn with_secondary_ids(
    mut identifier: NormalizedIdentifier,
    network: Network,
    kind: EntityKind,
    record: &Value,
) -> NormalizedIdentifier {
    for (output, sources) in SECONDARY_FIELDS {
        if let Some(value) = first_id(record, sources) {
            identifier.secondary_ids.insert((*output).to_string(), value);
        }
    }
    if network == Network::Mintegral
        && kind == EntityKind::Unit
        && let Some(placement) = first_id(record, &["placement_id"])
    {
        identifier
            .secondary_ids
            .insert("placement_id".to_string(), placement);
    }
    identifier
}

/// One Unity project yields one identifier per store game id, apple first.
fn unity_project(record: &Value) -> Vec<NormalizedIdentifier> {
    let project_id = first_id(record, &["id", "projectId"]);
    let name = first_id(record, &["name"]);

    UNITY_STORES
        .iter()
        .filter_map(|store| {
            let game_id = record
                .get("stores")
                .and_then(|stores| stores.get(*store))
                .and_then(|entry| first_id(entry, &["gameId"]))?;

            let mut identifier =
                NormalizedIdentifier::new(Network::Unity, EntityKind::App, game_id)
                    .with_secondary("platform", *store);
            if let Some(project_id) = &project_id {
                identifier = identifier.with_secondary("projectId", project_id.clone());
            }
            if let Some(name) = &name {
                identifier = identifier.with_secondary("name", name.clone());
            }
            Some(identifier)
        })
        .collect()
}

/// Identifiers carried by a single entity record.
pub fn resolve_entity(network: Network, kind: EntityKind, record: &Value) -> Vec<NormalizedIdentifier> {
    if network == Network::Unity && kind == EntityKind::App {
        return unity_project(record);
    }

    match first_id(record, primary_keys(network, kind)) {
        Some(primary) => vec![with_secondary_ids(
            NormalizedIdentifier::new(network, kind, primary),
            network,
            kind,
            record,
        )],
        None => Vec::new(),
    }
}

/// Identifiers of every record in a list payload.
pub fn resolve_list(network: Network, kind: EntityKind, payload: &Value) -> Vec<NormalizedIdentifier> {
    list_items(payload)
        .into_iter()
        .flat_map(|record| resolve_entity(network, kind, record))
        .collect()
}

/// Identifiers in a successful result; failures yield none.
///
/// The payload is read as a single entity first and as a list otherwise.
pub fn resolve(network: Network, kind: EntityKind, result: &AdapterResult) -> Vec<NormalizedIdentifier> {
    if !result.is_success() {
        return Vec::new();
    }
    let entity = resolve_entity(network, kind, &result.payload);
    if !entity.is_empty() {
        return entity;
    }
    resolve_list(network, kind, &result.payload)
}
