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
use crate::token::{FyberTokenProvider, TokenManager};
use crate::utils::insert_if_absent;

/// Fyber (DT Exchange) management API, OAuth client-credentials bearer.
pub struct FyberAdapter {
    ctx: AdapterContext,
    api: ApiRequest,
    tokens: TokenManager,
}

impl FyberAdapter {
    const APP: &'static str = "/api/management/v1/app";
    const PLACEMENT: &'static str = "/api/management/v1/placement";

    pub fn new(ctx: &AdapterContext) -> Self {
        let provider = FyberTokenProvider::new(ctx.auth_url(Network::Fyber));
        Self {
            ctx: ctx.clone(),
            api: ctx.api(Network::Fyber),
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
        let credential = self.ctx.credential(Network::Fyber)?;
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
impl NetworkAdapter for FyberAdapter {
    fn network(&self) -> Network {
        Network::Fyber
    }

    #[instrument(skip(self, payload), fields(network = "fyber"))]
    async fn create_app(&self, payload: Payload) -> AdapterResult {
        let body = Value::Object(payload);
        let outcome = self.call(Method::POST, Self::APP, &[], Some(&body)).await;
        finish(Network::Fyber, Operation::CreateApp, outcome)
    }

    #[instrument(skip(self, payload), fields(network = "fyber"))]
    async fn create_unit(&self, mut payload: Payload, app_key: Option<&str>) -> AdapterResult {
        if let Some(app_id) = app_key {
            insert_if_absent(&mut payload, "appId", app_id);
        }
        let body = Value::Object(payload);
        let outcome = self
            .call(Method::POST, Self::PLACEMENT, &[], Some(&body))
            .await;
        finish(Network::Fyber, Operation::CreateUnit, outcome)
    }

    #[instrument(skip(self), fields(network = "fyber"))]
    async fn list_apps(&self, filter: Option<&str>) -> Vec<NormalizedIdentifier> {
        let outcome = self.call(Method::GET, Self::APP, &[], None).await;
        apply_filter(
            finish_list(Network::Fyber, Operation::ListApps, EntityKind::App, outcome),
            filter,
        )
    }

    #[instrument(skip(self), fields(network = "fyber"))]
    async fn list_units(&self, app_code: &str) -> Vec<NormalizedIdentifier> {
        let outcome = self
            .call(Method::GET, Self::PLACEMENT, &[("appId", app_code)], None)
            .await;
        finish_list(Network::Fyber, Operation::ListUnits, EntityKind::Unit, outcome)
    }
}
