//! Layered settings for the `convo-graph` binary.
//!
//! Precedence, lowest to highest: built-in defaults, the user config file
//! (`<config dir>/convo-graph/config.{toml,json,yaml}`), a `--config` file,
//! `CONVO_*` environment variables, then CLI flags applied by the caller.

use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use convo_embeddings::EmbeddingConfig;
use convo_graph::GraphConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid {section} settings: {reason}")]
    Invalid {
        section: &'static str,
        reason: String,
    },
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error), or any `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub graph: GraphConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            embedding: EmbeddingConfig::default(),
            graph: GraphConfig::default(),
        }
    }
}

/// Default user config file stem, without extension.
pub fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", "convo-graph")
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config")
}

/// Environment source: `CONVO_LOG_LEVEL`, `CONVO_GRAPH__TOP_K`,
/// `CONVO_EMBEDDING__EMBEDDER`, and so on.
pub fn environment() -> Environment {
    Environment::with_prefix("CONVO")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load settings from files and the process environment.
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, SettingsError> {
        Self::load_with(cli_config_path, environment())
    }

    /// Load settings with an explicit environment source.
    pub fn load_with(
        cli_config_path: Option<&str>,
        env: Environment,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())?
            .add_source(File::with_name(&default_config_path().to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.graph.validate().map_err(|e| SettingsError::Invalid {
            section: "graph",
            reason: e.to_string(),
        })?;
        self.embedding
            .validate()
            .map_err(|reason| SettingsError::Invalid {
                section: "embedding",
                reason,
            })
    }
}
