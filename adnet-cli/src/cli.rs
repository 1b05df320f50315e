use std::path::PathBuf;

use adnet_adapters::Network;
use adnet_adapters::bulk::UnitTarget;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "adnet",
    version,
    about = "Create and list apps and ad units across advertising networks"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "ADNET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Env file holding network credentials (defaults to ./.env when present)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an app (site) on a network
    CreateApp {
        #[arg(short, long)]
        network: Network,

        /// JSON object sent as the request body; read from stdin when omitted
        #[arg(short, long)]
        payload: Option<String>,
    },

    /// Create an ad unit (placement, slot) under an app
    CreateUnit {
        #[arg(short, long)]
        network: Network,

        /// Network-side app identifier the unit belongs to
        #[arg(short, long)]
        app_key: Option<String>,

        /// JSON object sent as the request body; read from stdin when omitted
        #[arg(short, long)]
        payload: Option<String>,
    },

    /// List apps, optionally filtered by id or name
    ListApps {
        #[arg(short, long)]
        network: Network,

        /// Case-insensitive substring of the id or name
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// List the ad units of one app
    ListUnits {
        #[arg(short, long)]
        network: Network,

        #[arg(short, long)]
        app_code: String,
    },

    /// List units for many apps concurrently
    BulkUnits {
        /// Targets as network:appCode
        #[arg(required = true)]
        targets: Vec<UnitTarget>,
    },

    /// Show which networks have complete credentials
    Networks,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    Pretty,
    /// Pretty-printed JSON
    Json,
}
