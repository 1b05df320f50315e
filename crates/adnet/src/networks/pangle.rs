use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::instrument;

use super::{apply_filter, finish, finish_list};
use crate::adapter::{AdapterContext, NetworkAdapter, Operation, Payload};
use crate::credentials::NetworkCredential;
use crate::envelope::AdapterResult;
use crate::error::AdapterError;
use crate::http::{ApiRequest, RawResponse, send};
use crate::identifier::{EntityKind, NormalizedIdentifier};
use crate::network::Network;
use crate::signing::{SigningContext, pangle};
use crate::utils::{insert_if_absent, number_or_string};

/// Pangle media open API. JSON POSTs whose body carries the account ids and
/// the timestamp / nonce / sign triple.
pub struct PangleAdapter {
    ctx: AdapterContext,
    api: ApiRequest,
}

/// Merge account ids and the signing context into `payload`.
pub(crate) fn signed_body(
    mut payload: Payload,
    credential: &NetworkCredential,
    signing: &SigningContext,
) -> Result<Payload, AdapterError> {
    payload.insert(
        "user_id".to_string(),
        number_or_string(credential.require("user_id")?),
    );
    payload.insert(
        "role_id".to_string(),
        number_or_string(credential.require("role_id")?),
    );
    payload.insert("timestamp".to_string(), json!(signing.timestamp));
    payload.insert(
        "nonce".to_string(),
        json!(signing.nonce.ok_or_else(|| {
            AdapterError::Signature("Pangle signing context has no nonce".to_string())
        })?),
    );
    payload.insert("sign".to_string(), json!(signing.digest));
    payload.insert("version".to_string(), json!(pangle::API_VERSION));
    Ok(payload)
}

impl PangleAdapter {
    const CREATE_SITE: &'static str = "/union/media/open_api/site/create";
    const CREATE_CODE: &'static str = "/union/media/open_api/code/create";
    const QUERY_SITES: &'static str = "/union/media/open_api/site/query";
    const QUERY_CODES: &'static str = "/union/media/open_api/code/query";

    const PAGE_SIZE: u32 = 500;

    pub fn new(ctx: &AdapterContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: ctx.api(Network::Pangle),
        }
    }

    async fn post(&self, path: &str, payload: Payload) -> Result<RawResponse, AdapterError> {
        let credential = self.ctx.credential(Network::Pangle)?;
        let security_key = credential.require("security_key")?;

        let body = signed_body(payload, &credential, &pangle::sign_now(security_key))?;
        send(self.api.post(path).json(&Value::Object(body))).await
    }

    fn page(extra: Option<(&str, &str)>) -> Payload {
        let mut payload = Payload::new();
        payload.insert("page".to_string(), json!(1));
        payload.insert("page_size".to_string(), json!(Self::PAGE_SIZE));
        if let Some((key, value)) = extra {
            payload.insert(key.to_string(), number_or_string(value));
        }
        payload
    }
}

#[async_trait]
impl NetworkAdapter for PangleAdapter {
    fn network(&self) -> Network {
        Network::Pangle
    }

    #[instrument(skip(self, payload), fields(network = "pangle"))]
    async fn create_app(&self, payload: Payload) -> AdapterResult {
        let outcome = self.post(Self::CREATE_SITE, payload).await;
        finish(Network::Pangle, Operation::CreateApp, outcome)
    }

    #[instrument(skip(self, payload), fields(network = "pangle"))]
    async fn create_unit(&self, mut payload: Payload, app_key: Option<&str>) -> AdapterResult {
        if let Some(site_id) = app_key {
            insert_if_absent(&mut payload, "site_id", site_id);
        }
        let outcome = self.post(Self::CREATE_CODE, payload).await;
        finish(Network::Pangle, Operation::CreateUnit, outcome)
    }

    #[instrument(skip(self), fields(network = "pangle"))]
    async fn list_apps(&self, filter: Option<&str>) -> Vec<NormalizedIdentifier> {
        let outcome = self.post(Self::QUERY_SITES, Self::page(None)).await;
        apply_filter(
            finish_list(Network::Pangle, Operation::ListApps, EntityKind::App, outcome),
            filter,
        )
    }

    #[instrument(skip(self), fields(network = "pangle"))]
    async fn list_units(&self, app_code: &str) -> Vec<NormalizedIdentifier> {
        let outcome = self
            .post(Self::QUERY_CODES, Self::page(Some(("site_id", app_code))))
            .await;
        finish_list(Network::Pangle, Operation::ListUnits, EntityKind::Unit, outcome)
    }
}
