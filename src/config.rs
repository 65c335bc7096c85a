//! Configuration file handling for statement composition.
//!
//! This module provides loading and parsing of `.galaxy_query.json` files and
//! resolution of the effective settings from file, environment and defaults.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::queries::builder::BindingStyle;
use crate::queries::ComposeOptions;

/// Name of the configuration file looked up in the current directory.
pub const CONFIG_FILE: &str = ".galaxy_query.json";

/// Environment variable selecting the binding style.
pub const BINDING_ENV: &str = "GALAXY_QUERY_BINDING";

/// Top-level configuration file structure. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// How bound values reach the executor
    pub binding: Option<BindingStyle>,
    /// Schema of the `tasks_per_user`/`editors_per_user` functions
    pub function_schema: Option<String>,
    /// Prefix turning a project id into a hashtag
    pub project_hashtag_prefix: Option<String>,
}

impl ConfigFile {
    /// Load `.galaxy_query.json` from the current directory, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or holds
    /// invalid JSON.
    pub fn load() -> Result<Option<Self>, Box<dyn Error>> {
        let path = PathBuf::from(CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file doesn't exist
    /// - The file cannot be read
    /// - The JSON is invalid
    pub fn load_from(config_path: &Path) -> Result<Self, Box<dyn Error>> {
        if !config_path.exists() {
            return Err(format!(
                "Configuration file not found: {}\n\n\
                 Create it with any of the following fields:\n\
                 {{\n  \
                   \"binding\": \"positional\",\n  \
                   \"function_schema\": \"public\",\n  \
                   \"project_hashtag_prefix\": \"hotosm-project-\"\n\
                 }}\n",
                config_path.display()
            )
            .into());
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to read {}: {}", config_path.display(), e),
            )) as Box<dyn Error>
        })?;

        let config: ConfigFile = serde_json::from_str(&content).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid JSON in {}: {}", config_path.display(), e),
            )) as Box<dyn Error>
        })?;

        Ok(config)
    }
}

/// Effective composition settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeConfig {
    pub binding: BindingStyle,
    pub options: ComposeOptions,
}

impl ComposeConfig {
    /// Resolve settings with priority config file > environment > defaults.
    pub fn resolve(file: Option<ConfigFile>, env_binding: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let file = file.unwrap_or_default();
        let defaults = ComposeOptions::default();

        let env_binding = env_binding
            .map(|value| {
                BindingStyle::from_str(value, true)
                    .map_err(|e| format!("Invalid {} value '{}': {}", BINDING_ENV, value, e))
            })
            .transpose()?;

        Ok(Self {
            binding: file.binding.or(env_binding).unwrap_or_default(),
            options: ComposeOptions {
                function_schema: file.function_schema.unwrap_or(defaults.function_schema),
                project_hashtag_prefix: file
                    .project_hashtag_prefix
                    .unwrap_or(defaults.project_hashtag_prefix),
            },
        })
    }

    /// Resolve from `.galaxy_query.json` (when present) and the process environment.
    pub fn load() -> Result<Self, Box<dyn Error>> {
        let env_binding = std::env::var(BINDING_ENV).ok();
        let config = Self::resolve(ConfigFile::load()?, env_binding.as_deref())?;
        tracing::debug!(binding = ?config.binding, schema = %config.options.function_schema, "resolved configuration");
        Ok(config)
    }
}
