//! uitree CLI Binary
//!
//! Command-line interface for the UI tree state engine.

use anyhow::Context;
use clap::Parser;
use std::process;
use tracing::{error, info};
use uitree::cli::{command_name, Cli, RunContext};
use uitree::config::ConfigLoader;
use uitree::logging::{init_logging, LoggingConfig};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            error!(command = command_name(&cli.command), "Command failed: {:#}", e);
            match e.downcast_ref::<uitree::error::ApiError>() {
                Some(api_error) => eprintln!("{}", uitree::cli::map_error(api_error)),
                None => eprintln!("{:#}", e),
            }
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    info!(command = command_name(&cli.command), "uitree starting");
    let context = RunContext::new(cli.workspace.clone(), cli.config.clone())
        .context("Failed to initialize workspace")?;
    let output = context.execute(&cli.command)?;
    Ok(output)
}

/// Build logging configuration from the config file, then CLI args.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    if cli.quiet {
        return LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
    }

    let mut config = match cli.config {
        Some(ref config_path) => ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default(),
        None => ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default(),
    };

    if cli.verbose {
        config.level = "info".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if config.file.is_relative() {
        config.file = cli.workspace.join(&config.file);
    }

    config
}
