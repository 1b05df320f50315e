use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::instrument;

use super::{apply_filter, finish, finish_list};
use crate::adapter::{AdapterContext, NetworkAdapter, Operation, Payload};
use crate::envelope::AdapterResult;
use crate::error::AdapterError;
use crate::http::{ApiRequest, RateLimitPolicy, RawResponse, send};
use crate::identifier::{EntityKind, NormalizedIdentifier};
use crate::network::Network;
use crate::signing::bigoads::{self, DEVELOPER_ID_HEADER, SIGN_HEADER};
use crate::utils::insert_if_absent;

/// BigOAds open API. Every call is a signed JSON POST.
pub struct BigOAdsAdapter {
    ctx: AdapterContext,
    api: ApiRequest,
    list_apps_pacing: RateLimitPolicy,
}

impl BigOAdsAdapter {
    const CREATE_APP: &'static str = "/open/app/add";
    const CREATE_SLOT: &'static str = "/open/slot/add";
    const LIST_APPS: &'static str = "/open/app/list";
    const LIST_SLOTS: &'static str = "/open/slot/list";

    const PAGE_SIZE: u32 = 500;
    const LIST_APPS_DELAY: Duration = Duration::from_millis(500);

    pub fn new(ctx: &AdapterContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: ctx.api(Network::BigOAds),
            list_apps_pacing: RateLimitPolicy::FixedDelay(Self::LIST_APPS_DELAY),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<RawResponse, AdapterError> {
        let credential = self.ctx.credential(Network::BigOAds)?;
        let developer_id = credential.require("developer_id")?;
        let signing = bigoads::sign_now(developer_id, credential.require("token")?);

        send(
            self.api
                .post(path)
                .header(DEVELOPER_ID_HEADER, developer_id)
                .header(SIGN_HEADER, &signing.digest)
                .json(body),
        )
        .await
    }
}

#[async_trait]
impl NetworkAdapter for BigOAdsAdapter {
    fn network(&self) -> Network {
        Network::BigOAds
    }

    #[instrument(skip(self, payload), fields(network = "bigoads"))]
    async fn create_app(&self, payload: Payload) -> AdapterResult {
        let outcome = self.post(Self::CREATE_APP, &Value::Object(payload)).await;
        finish(Network::BigOAds, Operation::CreateApp, outcome)
    }

    #[instrument(skip(self, payload), fields(network = "bigoads"))]
    async fn create_unit(&self, mut payload: Payload, app_key: Option<&str>) -> AdapterResult {
        if let Some(app_code) = app_key {
            insert_if_absent(&mut payload, "appCode", app_code);
        }
        let outcome = self.post(Self::CREATE_SLOT, &Value::Object(payload)).await;
        finish(Network::BigOAds, Operation::CreateUnit, outcome)
    }

    #[instrument(skip(self), fields(network = "bigoads"))]
    async fn list_apps(&self, filter: Option<&str>) -> Vec<NormalizedIdentifier> {
        self.list_apps_pacing.wait().await;
        let body = json!({"pageNo": 1, "pageSize": Self::PAGE_SIZE});
        let outcome = self.post(Self::LIST_APPS, &body).await;
        apply_filter(
            finish_list(Network::BigOAds, Operation::ListApps, EntityKind::App, outcome),
            filter,
        )
    }

    #[instrument(skip(self), fields(network = "bigoads"))]
    async fn list_units(&self, app_code: &str) -> Vec<NormalizedIdentifier> {
        let body = json!({"appCode": app_code, "pageNo": 1, "pageSize": Self::PAGE_SIZE});
        let outcome = self.post(Self::LIST_SLOTS, &body).await;
        finish_list(Network::BigOAds, Operation::ListUnits, EntityKind::Unit, outcome)
    }
}
