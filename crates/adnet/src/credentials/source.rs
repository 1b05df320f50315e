//! Backing sources for credential material.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;
use tracing::debug;

use super::CredentialError;

/// Where raw `KEY=value` secret entries come from.
///
/// Keys follow the `<NETWORK>_<FIELD>` convention, e.g. `MINTEGRAL_SKEY`.
pub trait CredentialSource: Send + Sync {
    /// Short description for log lines.
    fn describe(&self) -> String;

    /// Read the current entries.
    fn load(&self) -> Result<HashMap<String, String>, CredentialError>;
}

/// Process environment, optionally seeded from a `.env` file.
///
/// Variables already present in the process environment take precedence over
/// entries in the file, matching `dotenvy` semantics.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    env_file: Option<PathBuf>,
    required: bool,
}

impl EnvSource {
    /// Environment plus an optional `.env` in the working directory.
    pub fn new() -> Self {
        Self {
            env_file: Some(PathBuf::from(".env")),
            required: false,
        }
    }

    /// Environment only.
    pub fn process_only() -> Self {
        Self {
            env_file: None,
            required: false,
        }
    }

    /// Environment plus an explicit env file which must exist.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            env_file: Some(path.into()),
            required: true,
        }
    }

    fn load_file(&self) -> Result<HashMap<String, String>, CredentialError> {
        let Some(path) = &self.env_file else {
            return Ok(HashMap::new());
        };

        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() && !self.required => {
                debug!(path = %path.display(), "No env file found; using process environment");
                return Ok(HashMap::new());
            }
            Err(e) => {
                return Err(CredentialError::Source(format!(
                    "{}: {}",
                    path.display(),
                    e
                )));
            }
        };

        iter.map(|item| {
            item.map_err(|e| CredentialError::Source(format!("{}: {}", path.display(), e)))
        })
        .collect()
    }
}

impl CredentialSource for EnvSource {
    fn describe(&self) -> String {
        match &self.env_file {
            Some(path) => format!("environment + {}", path.display()),
            None => "environment".to_string(),
        }
    }

    fn load(&self) -> Result<HashMap<String, String>, CredentialError> {
        let mut entries = self.load_file()?;
        entries.extend(std::env::vars());
        Ok(entries)
    }
}

/// In-memory source, mutable at runtime. Used by tests and by callers that
/// resolve secrets from their own configuration system.
#[derive(Debug, Default)]
pub struct MapSource {
    entries: RwLock<HashMap<String, String>>,
}

impl MapSource {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().remove(key)
    }
}

impl CredentialSource for MapSource {
    fn describe(&self) -> String {
        "in-memory map".to_string()
    }

    fn load(&self) -> Result<HashMap<String, String>, CredentialError> {
        Ok(self.entries.read().clone())
    }
}
