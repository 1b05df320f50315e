use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use super::{apply_filter, finish, finish_list, missing_app_key};
use crate::adapter::{AdapterContext, NetworkAdapter, Operation, Payload};
use crate::envelope::AdapterResult;
use crate::error::AdapterError;
use crate::http::{ApiRequest, RawResponse, RetryPolicy, send};
use crate::identifier::{EntityKind, NormalizedIdentifier};
use crate::network::Network;
use crate::token::{IronSourceTokenProvider, TokenManager};

/// IronSource (LevelPlay) publisher API, authenticated with a bearer token
/// exchanged from the secret key and refresh token.
///
/// A 401 on a token we believed valid triggers one forced refresh and one
/// retry.
pub struct IronSourceAdapter {
    ctx: AdapterContext,
    api: ApiRequest,
    tokens: TokenManager,
    retry: RetryPolicy,
}

impl IronSourceAdapter {
    const APPLICATIONS: &'static str = "/partners/publisher/applications/v6";
    const AD_UNITS: &'static str = "/levelPlay/adUnits/v1";

    pub fn new(ctx: &AdapterContext) -> Self {
        let provider = IronSourceTokenProvider::new(ctx.auth_url(Network::IronSource));
        Self {
            ctx: ctx.clone(),
            api: ctx.api(Network::IronSource),
            tokens: TokenManager::new(provider, ctx.client.clone()),
            retry: RetryPolicy::REFRESH_ON_UNAUTHORIZED,
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    fn ad_units_path(app_key: &str) -> String {
        format!("{}/{}", Self::AD_UNITS, app_key)
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse, AdapterError> {
        let credential = self.ctx.credential(Network::IronSource)?;
        let credential = &credential;
        let tokens = &self.tokens;
        let api = &self.api;

        self.retry
            .run(
                move |_| {
                    let method = method.clone();
                    async move {
                        let token = tokens.bearer(credential).await?;
                        let mut request = api.request(method, path).bearer_auth(&token.value);
                        if let Some(body) = body {
                            request = request.json(body);
                        }
                        send(request).await
                    }
                },
                move || async move {
                    tokens.force_refresh(credential).await?;
                    Ok::<(), AdapterError>(())
                },
            )
            .await
    }
}

#[async_trait]
impl NetworkAdapter for IronSourceAdapter {
    fn network(&self) -> Network {
        Network::IronSource
    }

    #[instrument(skip(self, payload), fields(network = "ironsource"))]
    async fn create_app(&self, payload: Payload) -> AdapterResult {
        let body = Value::Object(payload);
        let outcome = self
            .call(Method::POST, Self::APPLICATIONS, Some(&body))
            .await;
        finish(Network::IronSource, Operation::CreateApp, outcome)
    }

    #[instrument(skip(self, payload), fields(network = "ironsource"))]
    async fn create_unit(&self, payload: Payload, app_key: Option<&str>) -> AdapterResult {
        let Some(app_key) = app_key.filter(|k| !k.trim().is_empty()) else {
            return missing_app_key(Network::IronSource);
        };
        let body = Value::Object(payload);
        let outcome = self
            .call(Method::POST, &Self::ad_units_path(app_key), Some(&body))
            .await;
        finish(Network::IronSource, Operation::CreateUnit, outcome)
    }

    #[instrument(skip(self), fields(network = "ironsource"))]
    async fn list_apps(&self, filter: Option<&str>) -> Vec<NormalizedIdentifier> {
        let outcome = self.call(Method::GET, Self::APPLICATIONS, None).await;
        apply_filter(
            finish_list(Network::IronSource, Operation::ListApps, EntityKind::App, outcome),
            filter,
        )
    }

    #[instrument(skip(self), fields(network = "ironsource"))]
    async fn list_units(&self, app_code: &str) -> Vec<NormalizedIdentifier> {
        let outcome = self
            .call(Method::GET, &Self::ad_units_path(app_code), None)
            .await;
        finish_list(Network::IronSource, Operation::ListUnits, EntityKind::Unit, outcome)
    }
}
