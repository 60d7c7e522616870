// src/cli.rs
//! CLI definitions for the artifact resolver
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use artifact_resolver::resolve::Params;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "artifact-resolver")]
#[command(version)]
#[command(about = "Resolve download requests against stored release build records", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "ARTIFACT_RESOLVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Record database, overriding the configuration
    #[arg(short, long, global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the record database
    Init,

    /// Resolve a single build
    Find {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },

    /// Resolve one build per operating system and stability
    FindAll {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },

    /// Print the upstream download URL for an item id
    Bitstream {
        /// Item id from a `/bitstream/<id>` reference
        item_id: String,
    },

    /// Load raw provider records from a JSON file
    Ingest {
        /// JSON array of raw records
        records_file: Option<PathBuf>,

        /// Comma separated item ids to delete after loading
        #[arg(long)]
        remove_item_ids: Option<String>,

        /// Only remove items, do not insert or update rows
        #[arg(long)]
        skip_upsert: bool,
    },

    /// List packages stored more than once
    Duplicates {
        /// Read records from this JSON file instead of the database
        #[arg(long)]
        records_file: Option<PathBuf>,
    },
}

/// Request parameters, passed through unvalidated
#[derive(Args, Debug, Default)]
pub struct CriteriaArgs {
    /// Operating system: macosx, win or linux
    #[arg(long)]
    pub os: Option<String>,

    /// release, nightly or any
    #[arg(long)]
    pub stability: Option<String>,

    /// Exact revision
    #[arg(long)]
    pub revision: Option<String>,

    /// Newest revision not above this one
    #[arg(long)]
    pub closest_revision: Option<String>,

    /// Version prefix such as 5.2
    #[arg(long)]
    pub version: Option<String>,

    /// Newest build checked out on or before this date
    #[arg(long)]
    pub checkout_date: Option<String>,

    /// Newest build built on or before this date
    #[arg(long)]
    pub date: Option<String>,

    /// Step to older (negative) or newer (positive) revisions
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<String>,
}

impl CriteriaArgs {
    pub fn to_params(&self) -> Params {
        [
            ("os", &self.os),
            ("stability", &self.stability),
            ("revision", &self.revision),
            ("closest-revision", &self.closest_revision),
            ("version", &self.version),
            ("checkout-date", &self.checkout_date),
            ("date", &self.date),
            ("offset", &self.offset),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_flags_become_params() {
        let cli = Cli::parse_from([
            "artifact-resolver",
            "find",
            "--os",
            "linux",
            "--closest-revision",
            "30000",
            "--offset",
            "-1",
        ]);
        let Commands::Find { criteria } = cli.command else {
            panic!("expected find");
        };
        let params = criteria.to_params();
        assert_eq!(params.len(), 3);
        assert_eq!(params["closest-revision"], "30000");
        assert_eq!(params["offset"], "-1");
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
