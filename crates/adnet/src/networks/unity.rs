use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use super::{apply_filter, finish, finish_list, missing_app_key};
use crate::adapter::{AdapterContext, NetworkAdapter, Operation, Payload};
use crate::envelope::AdapterResult;
use crate::error::AdapterError;
use crate::http::{ApiRequest, RawResponse, send};
use crate::identifier::{EntityKind, NormalizedIdentifier};
use crate::network::Network;
use crate::signing::static_auth::basic_auth;

/// Unity monetization API. Apps are projects scoped to the organization;
/// ad units live under a project.
pub struct UnityAdapter {
    ctx: AdapterContext,
    api: ApiRequest,
}

impl UnityAdapter {
    pub fn new(ctx: &AdapterContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: ctx.api(Network::Unity),
        }
    }

    fn projects_path(organization_id: &str) -> String {
        format!("/organizations/{organization_id}/projects")
    }

    fn ad_units_path(organization_id: &str, project_id: &str) -> String {
        format!("/organizations/{organization_id}/projects/{project_id}/adunits")
    }

    /// `path` receives the organization id of the current credential.
    async fn call(
        &self,
        method: Method,
        path: impl FnOnce(&str) -> String,
        body: Option<&Value>,
    ) -> Result<RawResponse, AdapterError> {
        let credential = self.ctx.credential(Network::Unity)?;
        let authorization = basic_auth(
            credential.require("key_id")?,
            credential.require("secret_key")?,
        );
        let path = path(credential.require("organization_id")?);

        let mut request = self
            .api
            .request(method, &path)
            .header(reqwest::header::AUTHORIZATION, authorization);
        if let Some(body) = body {
            request = request.json(body);
        }
        send(request).await
    }
}

#[async_trait]
impl NetworkAdapter for UnityAdapter {
    fn network(&self) -> Network {
        Network::Unity
    }

    #[instrument(skip(self, payload), fields(network = "unity"))]
    async fn create_app(&self, payload: Payload) -> AdapterResult {
        let body = Value::Object(payload);
        let outcome = self
            .call(Method::POST, Self::projects_path, Some(&body))
            .await;
        finish(Network::Unity, Operation::CreateApp, outcome)
    }

    #[instrument(skip(self, payload), fields(network = "unity"))]
    async fn create_unit(&self, payload: Payload, app_key: Option<&str>) -> AdapterResult {
        let Some(project_id) = app_key.filter(|k| !k.trim().is_empty()) else {
            return missing_app_key(Network::Unity);
        };
        let body = Value::Object(payload);
        let outcome = self
            .call(
                Method::POST,
                |org| Self::ad_units_path(org, project_id),
                Some(&body),
            )
            .await;
        finish(Network::Unity, Operation::CreateUnit, outcome)
    }

    #[instrument(skip(self), fields(network = "unity"))]
    async fn list_apps(&self, filter: Option<&str>) -> Vec<NormalizedIdentifier> {
        let outcome = self.call(Method::GET, Self::projects_path, None).await;
        apply_filter(
            finish_list(Network::Unity, Operation::ListApps, EntityKind::App, outcome),
            filter,
        )
    }

    #[instrument(skip(self), fields(network = "unity"))]
    async fn list_units(&self, app_code: &str) -> Vec<NormalizedIdentifier> {
        let outcome = self
            .call(Method::GET, |org| Self::ad_units_path(org, app_code), None)
            .await;
        finish_list(Network::Unity, Operation::ListUnits, EntityKind::Unit, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(UnityAdapter::projects_path("org1"), "/organizations/org1/projects");
        assert_eq!(
            UnityAdapter::ad_units_path("org1", "p1"),
            "/organizations/org1/projects/p1/adunits"
        );
    }
}
