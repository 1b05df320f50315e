use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;

use adnet_adapters::bulk::{self, UnitTarget};
use adnet_adapters::credentials::EnvSource;
use adnet_adapters::{
    AdapterContext, AdapterRegistry, AdapterResult, CredentialStore, EntityKind, Network, Payload,
    resolver,
};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::output::{NetworkStatus, OutputManager};

/// Whether a command's outcome should turn into a non-zero exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Failed,
}

pub struct CommandExecutor {
    registry: AdapterRegistry,
    output: OutputManager,
}

impl CommandExecutor {
    pub fn new(config: AppConfig, env_file: Option<&Path>, output: OutputManager) -> Result<Self> {
        let source = match env_file.or(config.env_file.as_deref()) {
            Some(path) => EnvSource::with_file(path),
            None => EnvSource::new(),
        };
        let credentials = CredentialStore::new(Arc::new(source))
            .context("Failed to load network credentials")?;
        let ctx = AdapterContext::from_config(Arc::new(credentials), config.adapter)
            .context("Failed to build HTTP client")?;

        Ok(Self {
            registry: AdapterRegistry::new(ctx),
            output,
        })
    }

    fn emit_created(
        &self,
        network: Network,
        kind: EntityKind,
        result: &AdapterResult,
    ) -> Result<Outcome> {
        let ids = resolver::resolve(network, kind, result);
        debug!(%network, count = ids.len(), "Resolved created identifiers");
        println!("{}", self.output.format_created(result, &ids)?);
        Ok(if result.is_success() {
            Outcome::Ok
        } else {
            Outcome::Failed
        })
    }

    pub async fn create_app(&self, network: Network, payload: Option<String>) -> Result<Outcome> {
        let payload = read_payload(payload)?;
        info!(%network, "Creating app");
        let result = self.registry.create_app(network, payload).await;
        self.emit_created(network, EntityKind::App, &result)
    }

    pub async fn create_unit(
        &self,
        network: Network,
        app_key: Option<&str>,
        payload: Option<String>,
    ) -> Result<Outcome> {
        let payload = read_payload(payload)?;
        info!(%network, app_key, "Creating ad unit");
        let result = self.registry.create_unit(network, payload, app_key).await;
        self.emit_created(network, EntityKind::Unit, &result)
    }

    pub async fn list_apps(&self, network: Network, filter: Option<&str>) -> Result<Outcome> {
        let apps = self.registry.list_apps(network, filter).await;
        debug!(%network, count = apps.len(), "Listed apps");
        println!("{}", self.output.format_identifiers(&apps)?);
        Ok(Outcome::Ok)
    }

    pub async fn list_units(&self, network: Network, app_code: &str) -> Result<Outcome> {
        let units = self.registry.list_units(network, app_code).await;
        debug!(%network, count = units.len(), "Listed units");
        println!("{}", self.output.format_identifiers(&units)?);
        Ok(Outcome::Ok)
    }

    pub async fn bulk_units(&self, targets: Vec<UnitTarget>) -> Result<Outcome> {
        info!(
            targets = targets.len(),
            workers = bulk::worker_count(targets.len()),
            "Listing units in bulk"
        );
        let results = bulk::list_units_across(&self.registry, targets).await;
        println!("{}", self.output.format_bulk(&results)?);
        Ok(Outcome::Ok)
    }

    pub fn networks(&self) -> Result<Outcome> {
        let store = &self.registry.context().credentials;
        let statuses: Vec<NetworkStatus> = Network::all()
            .into_iter()
            .map(|network| {
                let missing = store.missing_fields(network);
                NetworkStatus {
                    network,
                    auth: format!("{:?}", network.auth_kind()),
                    configured: missing.is_empty(),
                    missing: missing
                        .into_iter()
                        .map(|field| network.env_key(field))
                        .collect(),
                }
            })
            .collect();
        println!("{}", self.output.format_networks(&statuses)?);
        Ok(Outcome::Ok)
    }
}

/// Request body from `--payload`, or from stdin when piped.
fn read_payload(arg: Option<String>) -> Result<Payload> {
    let text = match arg {
        Some(text) => text,
        None if io::stdin().is_terminal() => return Ok(Payload::new()),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    parse_payload(&text)
}

fn parse_payload(text: &str) -> Result<Payload> {
    if text.trim().is_empty() {
        return Ok(Payload::new());
    }
    match serde_json::from_str::<Value>(text).context("Payload is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("Payload must be a JSON object, got {}", json_kind(&other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
