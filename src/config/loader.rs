//! Configuration Loader
//!
//! Environment-aware loading: a base file, an environment-specific override
//! file and `MESFLOW__` environment variables, merged in that order.

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ConfigResult;
use super::FlowConfig;
use crate::constants::ENV_PREFIX;

/// Base name of configuration files inside the config directory
const CONFIG_FILE_STEM: &str = "mesflow";

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_directory: PathBuf,
    environment: String,
    read_environment_variables: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader for `./config` with the environment auto-detected
    pub fn new() -> Self {
        Self {
            config_directory: PathBuf::from("config"),
            environment: Self::detect_environment(),
            read_environment_variables: true,
        }
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config_directory = directory.into();
        self
    }

    /// Use an explicit environment instead of detecting it
    /// This is useful for testing without modifying global environment variables
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Skip `MESFLOW__` environment variables
    pub fn without_environment_variables(mut self) -> Self {
        self.read_environment_variables = false;
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Merge all sources and validate the result
    pub fn load(&self) -> ConfigResult<FlowConfig> {
        debug!(
            environment = %self.environment,
            directory = %self.config_directory.display(),
            "Loading configuration"
        );

        let base = self.config_directory.join(CONFIG_FILE_STEM);
        let environment_override = self
            .config_directory
            .join(format!("{CONFIG_FILE_STEM}.{}", self.environment));

        let mut builder = ::config::Config::builder()
            .add_source(::config::File::with_name(&base.to_string_lossy()).required(false))
            .add_source(
                ::config::File::with_name(&environment_override.to_string_lossy()).required(false),
            );

        if self.read_environment_variables {
            builder = builder.add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config: FlowConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            environment = %self.environment,
            link_processes = config.layout.link_processes,
            log_format = ?config.logging.format,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// Get current environment from environment variables
    pub fn detect_environment() -> String {
        env::var("MESFLOW_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }
}
