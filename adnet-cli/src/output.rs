use std::collections::BTreeMap;
use std::fmt::Write as _;

use adnet_adapters::bulk::UnitTarget;
use adnet_adapters::{AdapterResult, Network, NormalizedIdentifier, ResultStatus};
use anyhow::Result;
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::OutputFormat;

/// Credential status of one network for the `networks` command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub network: Network,
    pub auth: String,
    pub configured: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

pub struct OutputManager {
    format: OutputFormat,
}

impl OutputManager {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn json(value: &impl Serialize) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    pub fn format_result(&self, result: &AdapterResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::json(result),
            OutputFormat::Pretty => {
                let mut out = String::new();
                match result.status {
                    ResultStatus::Success => writeln!(out, "✓ {}", result.message)?,
                    ResultStatus::Failure => {
                        writeln!(out, "✗ {} (code {})", result.message, result.code)?
                    }
                }
                if !result.payload.is_null() {
                    writeln!(out, "{}", serde_json::to_string_pretty(&result.payload)?)?;
                }
                Ok(out.trim_end().to_string())
            }
        }
    }

    /// A create result together with the identifiers resolved from it.
    pub fn format_created(
        &self,
        result: &AdapterResult,
        ids: &[NormalizedIdentifier],
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::json(&json!({ "result": result, "identifiers": ids })),
            OutputFormat::Pretty => {
                let mut out = self.format_result(result)?;
                if !ids.is_empty() {
                    out.push('\n');
                    for id in ids {
                        write_identifier(&mut out, id, "")?;
                    }
                }
                Ok(out.trim_end().to_string())
            }
        }
    }

    pub fn format_identifiers(&self, ids: &[NormalizedIdentifier]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::json(&ids),
            OutputFormat::Pretty => {
                if ids.is_empty() {
                    return Ok("No entries found".to_string());
                }
                let mut out = String::new();
                for id in ids {
                    write_identifier(&mut out, id, "")?;
                }
                writeln!(out, "{} entr{}", ids.len(), if ids.len() == 1 { "y" } else { "ies" })?;
                Ok(out.trim_end().to_string())
            }
        }
    }

    pub fn format_bulk(
        &self,
        results: &BTreeMap<UnitTarget, Vec<NormalizedIdentifier>>,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let keyed: serde_json::Map<String, Value> = results
                    .iter()
                    .map(|(target, ids)| -> Result<(String, Value)> {
                        Ok((target.to_string(), serde_json::to_value(ids)?))
                    })
                    .collect::<Result<_>>()?;
                Self::json(&Value::Object(keyed))
            }
            OutputFormat::Pretty => {
                let mut out = String::new();
                for (target, ids) in results {
                    writeln!(out, "{target} ({} units)", ids.len())?;
                    for id in ids {
                        write_identifier(&mut out, id, "  ")?;
                    }
                }
                Ok(out.trim_end().to_string())
            }
        }
    }

    pub fn format_networks(&self, statuses: &[NetworkStatus]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::json(&json!({ "networks": statuses })),
            OutputFormat::Pretty => {
                let mut out = String::new();
                for status in statuses {
                    let mark = if status.configured { "✓" } else { "✗" };
                    write!(
                        out,
                        "{mark} {:<11} {}",
                        status.network.display_name(),
                        status.auth
                    )?;
                    if !status.missing.is_empty() {
                        write!(out, "  missing: {}", status.missing.join(", "))?;
                    }
                    out.push('\n');
                }
                Ok(out.trim_end().to_string())
            }
        }
    }
}

fn write_identifier(out: &mut String, id: &NormalizedIdentifier, indent: &str) -> Result<()> {
    write!(out, "{indent}{}", id.primary_id)?;
    if let Some(name) = id.name() {
        write!(out, "  {name}")?;
    }
    let extra: Vec<String> = id
        .secondary_ids
        .iter()
        .filter(|(key, _)| key.as_str() != "name")
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    if !extra.is_empty() {
        write!(out, "  [{}]", extra.join(" "))?;
    }
    out.push('\n');
    Ok(())
}
