// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use artifact_resolver::config::Config;
use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

/// Library errors are prefixed with their status class, e.g. `404 Not Found: ...`
fn error_line(err: &anyhow::Error) -> String {
    match err.downcast_ref::<artifact_resolver::Error>() {
        Some(e) => {
            let class = e.class();
            format!("{} {}: {:#}", class.status_code(), class.title(), err)
        }
        None => format!("Error: {:#}", err),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env(cli.config.as_deref())?;
    let provider = config.provider_kind()?;
    let db_path = match cli.db_path {
        Some(path) => path,
        None => config.db_file_path()?,
    };

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Find { criteria } => {
            commands::cmd_find(&db_path, provider, &criteria.to_params())
        }
        Commands::FindAll { criteria } => {
            commands::cmd_find_all(&db_path, provider, &criteria.to_params())
        }
        Commands::Bitstream { item_id } => commands::cmd_bitstream(&config, &item_id),
        Commands::Ingest {
            records_file,
            remove_item_ids,
            skip_upsert,
        } => commands::cmd_ingest(
            &db_path,
            provider,
            records_file.as_deref(),
            remove_item_ids.as_deref(),
            skip_upsert,
        ),
        Commands::Duplicates { records_file } => {
            commands::cmd_duplicates(&db_path, provider, records_file.as_deref())
        }
    }
}
