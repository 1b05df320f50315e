mod cli;
mod commands;
mod config;
mod output;

use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::{Level, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{
    cli::{Args, Commands, OutputFormat},
    commands::{CommandExecutor, Outcome},
    config::AppConfig,
    output::OutputManager,
};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let format = args.output;

    match run(args).await {
        Ok(Outcome::Ok) => {}
        Ok(Outcome::Failed) => process::exit(1),
        Err(e) => {
            match format {
                OutputFormat::Json => {
                    let error_json = serde_json::json!({
                        "status": "error",
                        "message": format!("{e:#}"),
                    });
                    println!("{error_json}");
                }
                OutputFormat::Pretty => {
                    error!("Application error: {:#}", e);
                    eprintln!("Error: {e:#}");
                }
            }
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<Outcome> {
    init_logging(args.verbose, args.quiet);

    let config = AppConfig::load(args.config.as_deref())?;
    let executor = CommandExecutor::new(
        config,
        args.env_file.as_deref(),
        OutputManager::new(args.output),
    )?;

    match args.command {
        Commands::CreateApp { network, payload } => executor.create_app(network, payload).await,
        Commands::CreateUnit {
            network,
            app_key,
            payload,
        } => {
            executor
                .create_unit(network, app_key.as_deref(), payload)
                .await
        }
        Commands::ListApps { network, filter } => {
            executor.list_apps(network, filter.as_deref()).await
        }
        Commands::ListUnits { network, app_code } => {
            executor.list_units(network, &app_code).await
        }
        Commands::BulkUnits { targets } => executor.bulk_units(targets).await,
        Commands::Networks => executor.networks(),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(verbose)
                .with_writer(std::io::stderr),
        )
        .init();
}
