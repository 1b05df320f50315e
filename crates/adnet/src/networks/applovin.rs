use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{instrument, warn};

use super::finish;
use crate::adapter::{AdapterContext, NetworkAdapter, Operation, Payload};
use crate::envelope::AdapterResult;
use crate::error::AdapterError;
use crate::http::{ApiRequest, RawResponse, send};
use crate::identifier::{EntityKind, NormalizedIdentifier};
use crate::network::Network;
use crate::resolver::resolve_entity;
use crate::signing::static_auth::APPLOVIN_KEY_HEADER;
use crate::utils::{get_str, insert_if_absent, list_items};

/// AppLovin MAX ad unit management. There is no app concept: ad units are
/// keyed by the app's package name.
pub struct AppLovinAdapter {
    ctx: AdapterContext,
    api: ApiRequest,
}

impl AppLovinAdapter {
    const AD_UNIT: &'static str = "/ad_unit";
    const AD_UNITS: &'static str = "/ad_units";

    pub fn new(ctx: &AdapterContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: ctx.api(Network::AppLovin),
        }
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse, AdapterError> {
        let credential = self.ctx.credential(Network::AppLovin)?;
        let mut api = self.api.clone();
        api.add_header_str(APPLOVIN_KEY_HEADER, credential.require("api_key")?);

        let mut request = api.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        send(request).await
    }
}

#[async_trait]
impl NetworkAdapter for AppLovinAdapter {
    fn network(&self) -> Network {
        Network::AppLovin
    }

    fn supports(&self, operation: Operation) -> bool {
        matches!(operation, Operation::CreateUnit | Operation::ListUnits)
    }

    #[instrument(skip(self, payload), fields(network = "applovin"))]
    async fn create_unit(&self, mut payload: Payload, app_key: Option<&str>) -> AdapterResult {
        if let Some(package_name) = app_key {
            insert_if_absent(&mut payload, "package_name", package_name);
        }
        let body = Value::Object(payload);
        let outcome = self.call(Method::POST, Self::AD_UNIT, Some(&body)).await;
        finish(Network::AppLovin, Operation::CreateUnit, outcome)
    }

    /// Ad units whose `package_name` equals `app_code`.
    #[instrument(skip(self), fields(network = "applovin"))]
    async fn list_units(&self, app_code: &str) -> Vec<NormalizedIdentifier> {
        let outcome = self.call(Method::GET, Self::AD_UNITS, None).await;
        let result = finish(Network::AppLovin, Operation::ListUnits, outcome);
        if !result.is_success() {
            warn!(
                code = %result.code,
                message = %result.message,
                "List call failed; returning no identifiers"
            );
            return Vec::new();
        }

        list_items(&result.payload)
            .into_iter()
            .filter(|record| get_str(record, "package_name") == Some(app_code))
            .flat_map(|record| resolve_entity(Network::AppLovin, EntityKind::Unit, record))
            .collect()
    }
}
