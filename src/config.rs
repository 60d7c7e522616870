// src/config.rs
//! Configuration for the resolver tools
//!
//! Settings come from an optional TOML file, then environment variables:
//! - `ARTIFACT_RESOLVER_CONFIG` - path of the TOML file
//! - `ARTIFACT_RESOLVER_PROVIDER` - `midas` or `girder`
//! - `ARTIFACT_RESOLVER_DB_FILE` - record database, used when the file names none
//! - `ARTIFACT_RESOLVER_DB_FALLBACK` - use the bundled fallback database

use crate::error::{Error, Result};
use crate::record::{ProviderKind, parse_bool};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_ENV: &str = "ARTIFACT_RESOLVER_CONFIG";
pub const PROVIDER_ENV: &str = "ARTIFACT_RESOLVER_PROVIDER";
pub const DB_FILE_ENV: &str = "ARTIFACT_RESOLVER_DB_FILE";
pub const DB_FALLBACK_ENV: &str = "ARTIFACT_RESOLVER_DB_FALLBACK";

/// TOML configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Backend provider the stored records come from
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Record database path
    #[serde(default)]
    pub db_file: Option<PathBuf>,

    /// Use the fallback database shipped under `etc/fallback`
    #[serde(default)]
    pub db_fallback: bool,

    /// Base directory for relative paths
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Upstream download base, overriding the provider default
    #[serde(default)]
    pub source_base_url: Option<String>,

    /// Database path taken from the environment
    #[serde(skip)]
    env_db_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            db_file: None,
            db_fallback: false,
            root_dir: default_root_dir(),
            source_base_url: None,
            env_db_file: None,
        }
    }
}

fn default_provider() -> String {
    ProviderKind::default().as_str().to_string()
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::ConfigError(format!("Failed to parse config file {}: {e}", path.display()))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from `ARTIFACT_RESOLVER_CONFIG`, or defaults,
    /// then apply environment overrides
    pub fn from_env(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.or(env_path.as_deref()) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }

    /// Apply overrides looked up by variable name
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup(PROVIDER_ENV) {
            self.provider = provider;
        }
        if let Some(db_file) = lookup(DB_FILE_ENV)
            && !db_file.is_empty()
        {
            self.env_db_file = Some(PathBuf::from(db_file));
        }
        if let Some(fallback) = lookup(DB_FALLBACK_ENV) {
            self.db_fallback = parse_bool(&fallback);
        }
        self.validate()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.provider_kind()?;
        Ok(())
    }

    pub fn provider_kind(&self) -> Result<ProviderKind> {
        self.provider.parse().map_err(Error::ConfigError)
    }

    /// Path of the record database
    ///
    /// An explicit `db_file` wins over the environment; otherwise the path is
    /// derived from the provider name under `var/`, or under `etc/fallback/`
    /// when the fallback database is selected.
    pub fn db_file_path(&self) -> Result<PathBuf> {
        let path = match self.db_file.as_ref().or(self.env_db_file.as_ref()) {
            Some(path) => path.clone(),
            None => {
                let file_name = format!("{}-records.sqlite", self.provider_kind()?);
                if self.db_fallback {
                    PathBuf::from("etc").join("fallback").join(file_name)
                } else {
                    PathBuf::from("var").join(file_name)
                }
            }
        };

        if path.is_relative() {
            Ok(self.root_dir.join(path))
        } else {
            Ok(path)
        }
    }

    pub fn source_base_url(&self) -> Option<&str> {
        self.source_base_url.as_deref()
    }
}
