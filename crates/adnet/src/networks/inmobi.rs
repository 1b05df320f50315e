use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use super::{apply_filter, finish, finish_list};
use crate::adapter::{AdapterContext, NetworkAdapter, Operation, Payload};
use crate::envelope::AdapterResult;
use crate::error::AdapterError;
use crate::http::{ApiRequest, RawResponse, send};
use crate::identifier::{EntityKind, NormalizedIdentifier};
use crate::network::Network;
use crate::signing::static_auth::INMOBI_HEADERS;
use crate::utils::insert_if_absent;

/// InMobi publisher API with static account headers.
pub struct InMobiAdapter {
    ctx: AdapterContext,
    api: ApiRequest,
}

impl InMobiAdapter {
    const APPS: &'static str = "/rest/api/v2/apps";
    const PLACEMENTS: &'static str = "/rest/api/v1/placements";

    const CREDENTIAL_FIELDS: [&'static str; 3] = ["client_id", "account_id", "client_secret"];

    pub fn new(ctx: &AdapterContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: ctx.api(Network::InMobi),
        }
    }

    /// Base request with the account headers of the current credential.
    fn authorized(&self) -> Result<ApiRequest, AdapterError> {
        let credential = self.ctx.credential(Network::InMobi)?;
        let mut api = self.api.clone();
        for (header, field) in INMOBI_HEADERS.iter().zip(Self::CREDENTIAL_FIELDS) {
            api.add_header_str(header, credential.require(field)?);
        }
        Ok(api)
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<RawResponse, AdapterError> {
        let mut request = self.authorized()?.request(method, path);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        send(request).await
    }
}

#[async_trait]
impl NetworkAdapter for InMobiAdapter {
    fn network(&self) -> Network {
        Network::InMobi
    }

    #[instrument(skip(self, payload), fields(network = "inmobi"))]
    async fn create_app(&self, payload: Payload) -> AdapterResult {
        let body = Value::Object(payload);
        let outcome = self.call(Method::POST, Self::APPS, &[], Some(&body)).await;
        finish(Network::InMobi, Operation::CreateApp, outcome)
    }

    #[instrument(skip(self, payload), fields(network = "inmobi"))]
    async fn create_unit(&self, mut payload: Payload, app_key: Option<&str>) -> AdapterResult {
        if let Some(app_id) = app_key {
            insert_if_absent(&mut payload, "appId", app_id);
        }
        let body = Value::Object(payload);
        let outcome = self
            .call(Method::POST, Self::PLACEMENTS, &[], Some(&body))
            .await;
        finish(Network::InMobi, Operation::CreateUnit, outcome)
    }

    #[instrument(skip(self), fields(network = "inmobi"))]
    async fn list_apps(&self, filter: Option<&str>) -> Vec<NormalizedIdentifier> {
        let outcome = self.call(Method::GET, Self::APPS, &[], None).await;
        apply_filter(
            finish_list(Network::InMobi, Operation::ListApps, EntityKind::App, outcome),
            filter,
        )
    }

    #[instrument(skip(self), fields(network = "inmobi"))]
    async fn list_units(&self, app_code: &str) -> Vec<NormalizedIdentifier> {
        let outcome = self
            .call(Method::GET, Self::PLACEMENTS, &[("appId", app_code)], None)
            .await;
        finish_list(Network::InMobi, Operation::ListUnits, EntityKind::Unit, outcome)
    }
}
