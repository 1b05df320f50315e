use std::fs;
use std::path::{Path, PathBuf};

use adnet_adapters::AdapterConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// On-disk CLI configuration.
///
/// ```toml
/// env_file = "/etc/adnet/credentials.env"
///
/// [adapter]
/// timeout_secs = 20
///
/// [adapter.networks.vungle]
/// base_url = "https://report.api.vungle.com"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Env file with network credentials, used when `--env-file` is not given
    pub env_file: Option<PathBuf>,
    #[serde(default)]
    pub adapter: AdapterConfig,
}

impl AppConfig {
    /// `<config_dir>/adnet/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("adnet").join("config.toml"))
    }

    /// Load from `path`, or from the default location when it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
