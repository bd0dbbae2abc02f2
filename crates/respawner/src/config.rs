//! Configuration management for the respawner console host.
//!
//! This module handles loading and validation of the host configuration
//! from TOML files.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Host configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Respawner plugin settings
    #[serde(default)]
    pub plugin: PluginSettings,
    /// Worlds loaded when the host starts
    #[serde(default = "default_worlds")]
    pub worlds: Vec<WorldSettings>,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

/// Respawner plugin configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    /// File holding the checked worlds, the destination and the active flag
    #[serde(default = "default_policy_file")]
    pub policy_file: String,
}

/// A world created at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldSettings {
    pub name: String,
    /// Spawn point as `[x, y, z]`
    #[serde(default = "default_spawn")]
    pub spawn: [f64; 3],
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_policy_file() -> String {
    "respawn.toml".to_string()
}

fn default_spawn() -> [f64; 3] {
    [0.5, 64.0, 0.5]
}

fn default_worlds() -> Vec<WorldSettings> {
    ["world", "world_nether", "world_the_end"]
        .into_iter()
        .map(|name| WorldSettings {
            name: name.to_string(),
            spawn: default_spawn(),
        })
        .collect()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            policy_file: default_policy_file(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingSettings::default(),
            plugin: PluginSettings::default(),
            worlds: default_worlds(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the
    /// specified path and returns the default configuration.
    pub async fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if tokio::fs::try_exists(path).await? {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Path of the respawn policy file.
    pub fn policy_path(&self) -> PathBuf {
        PathBuf::from(&self.plugin.policy_file)
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error string describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        if self.plugin.policy_file.trim().is_empty() {
            return Err("Policy file path cannot be empty".to_string());
        }

        let mut seen = HashSet::new();
        for world in &self.worlds {
            if world.name.trim().is_empty() {
                return Err("World names cannot be empty".to_string());
            }
            if !seen.insert(world.name.to_lowercase()) {
                return Err(format!("Duplicate world name: {}", world.name));
            }
        }

        Ok(())
    }
}
