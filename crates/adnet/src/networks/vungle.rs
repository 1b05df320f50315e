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
use crate::token::{TokenManager, VungleTokenProvider};
use crate::utils::insert_if_absent;

/// Vungle (Liftoff Monetize) publisher API.
pub struct VungleAdapter {
    ctx: AdapterContext,
    api: ApiRequest,
    tokens: TokenManager,
}

impl VungleAdapter {
    const APPLICATIONS: &'static str = "/api/v1/applications";
    const PLACEMENTS: &'static str = "/api/v1/placements";

    pub fn new(ctx: &AdapterContext) -> Self {
        let mut api = ctx.api(Network::Vungle);
        api.add_header_static("vungle-version", "1");

        let provider = VungleTokenProvider::new(ctx.auth_url(Network::Vungle));
        Self {
            ctx: ctx.clone(),
            api,
            tokens: TokenManager::new(provider, ctx.client.clone()),
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<RawResponse, AdapterError> {
        let credential = self.ctx.credential(Network::Vungle)?;
        let token = self.tokens.bearer(&credential).await?;

        let mut request = self.api.request(method, path).bearer_auth(&token.value);
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
impl NetworkAdapter for VungleAdapter {
    fn network(&self) -> Network {
        Network::Vungle
    }

    #[instrument(skip(self, payload), fields(network = "vungle"))]
    async fn create_app(&self, payload: Payload) -> AdapterResult {
        let body = Value::Object(payload);
        let outcome = self
            .call(Method::POST, Self::APPLICATIONS, &[], Some(&body))
            .await;
        finish(Network::Vungle, Operation::CreateApp, outcome)
    }

    #[instrument(skip(self, payload), fields(network = "vungle"))]
    async fn create_unit(&self, mut payload: Payload, app_key: Option<&str>) -> AdapterResult {
        if let Some(application) = app_key {
            insert_if_absent(&mut payload, "application", application);
        }
        let body = Value::Object(payload);
        let outcome = self
            .call(Method::POST, Self::PLACEMENTS, &[], Some(&body))
            .await;
        finish(Network::Vungle, Operation::CreateUnit, outcome)
    }

    #[instrument(skip(self), fields(network = "vungle"))]
    async fn list_apps(&self, filter: Option<&str>) -> Vec<NormalizedIdentifier> {
        let outcome = self.call(Method::GET, Self::APPLICATIONS, &[], None).await;
        apply_filter(
            finish_list(Network::Vungle, Operation::ListApps, EntityKind::App, outcome),
            filter,
        )
    }

    #[instrument(skip(self), fields(network = "vungle"))]
    async fn list_units(&self, app_code: &str) -> Vec<NormalizedIdentifier> {
        let outcome = self
            .call(
                Method::GET,
                Self::PLACEMENTS,
                &[("application", app_code)],
                None,
            )
            .await;
        finish_list(Network::Vungle, Operation::ListUnits, EntityKind::Unit, outcome)
    }
}
