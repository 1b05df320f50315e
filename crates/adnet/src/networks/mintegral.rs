use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use super::{apply_filter, finish, finish_list};
use crate::adapter::{AdapterContext, NetworkAdapter, Operation, Payload};
use crate::envelope::AdapterResult;
use crate::error::AdapterError;
use crate::http::{ApiRequest, RawResponse, send};
use crate::identifier::{EntityKind, NormalizedIdentifier};
use crate::network::Network;
use crate::signing::mintegral;
use crate::utils::insert_if_absent;

/// Mintegral open API: form-encoded creates, query-string lists, each signed
/// with `skey` / `time` / `sign`.
pub struct MintegralAdapter {
    ctx: AdapterContext,
    api: ApiRequest,
}

/// Flatten a payload into form fields. Strings go as-is, everything else as
/// its JSON text; nulls are dropped.
fn form_fields(payload: &Payload) -> Vec<(String, String)> {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}

/// Append the auth fields, dropping any caller field with the same name.
fn append_auth(fields: &mut Vec<(String, String)>, auth: Vec<(String, String)>) {
    fields.retain(|(key, _)| auth.iter().all(|(auth_key, _)| auth_key != key));
    fields.extend(auth);
}

impl MintegralAdapter {
    const CREATE_APP: &'static str = "/app/open_api_create";
    const CREATE_UNIT: &'static str = "/unit/open_api_create";
    const LIST_APPS: &'static str = "/app/open_api_list";
    const LIST_UNITS: &'static str = "/unit/open_api_list";

    pub fn new(ctx: &AdapterContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: ctx.api(Network::Mintegral),
        }
    }

    fn signed_fields(&self) -> Result<Vec<(String, String)>, AdapterError> {
        let credential = self.ctx.credential(Network::Mintegral)?;
        let signing = mintegral::sign_now(credential.require("secret")?);
        Ok(mintegral::auth_fields(credential.require("skey")?, &signing)
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect())
    }

    async fn post_form(&self, path: &str, payload: &Payload) -> Result<RawResponse, AdapterError> {
        let mut fields = form_fields(payload);
        append_auth(&mut fields, self.signed_fields()?);
        send(self.api.post(path).form(&fields)).await
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RawResponse, AdapterError> {
        let mut params: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        append_auth(&mut params, self.signed_fields()?);
        send(self.api.get(path).query(&params)).await
    }
}

#[async_trait]
impl NetworkAdapter for MintegralAdapter {
    fn network(&self) -> Network {
        Network::Mintegral
    }

    #[instrument(skip(self, payload), fields(network = "mintegral"))]
    async fn create_app(&self, payload: Payload) -> AdapterResult {
        let outcome = self.post_form(Self::CREATE_APP, &payload).await;
        finish(Network::Mintegral, Operation::CreateApp, outcome)
    }

    #[instrument(skip(self, payload), fields(network = "mintegral"))]
    async fn create_unit(&self, mut payload: Payload, app_key: Option<&str>) -> AdapterResult {
        if let Some(app_id) = app_key {
            insert_if_absent(&mut payload, "app_id", app_id);
        }
        let outcome = self.post_form(Self::CREATE_UNIT, &payload).await;
        finish(Network::Mintegral, Operation::CreateUnit, outcome)
    }

    #[instrument(skip(self), fields(network = "mintegral"))]
    async fn list_apps(&self, filter: Option<&str>) -> Vec<NormalizedIdentifier> {
        let outcome = self.get(Self::LIST_APPS, &[]).await;
        apply_filter(
            finish_list(Network::Mintegral, Operation::ListApps, EntityKind::App, outcome),
            filter,
        )
    }

    #[instrument(skip(self), fields(network = "mintegral"))]
    async fn list_units(&self, app_code: &str) -> Vec<NormalizedIdentifier> {
        let outcome = self.get(Self::LIST_UNITS, &[("app_id", app_code)]).await;
        finish_list(Network::Mintegral, Operation::ListUnits, EntityKind::Unit, outcome)
    }
}
