//! Configuration management for the BranchWarden CLI.
//!
//! This module provides functionality for loading, saving, and managing
//! configuration files for the BranchWarden CLI application. It handles the
//! repository identity, the rule settings, and CLI-specific authentication
//! configuration.
//!
//! The configuration is stored in TOML format and can be loaded from a
//! specified file path or from the default location in the current directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use branch_warden_core::RuleSettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "branch-warden.toml";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Main configuration structure for the BranchWarden CLI application.
///
/// # Example TOML Configuration
///
/// ```toml
/// [repository]
/// owner = "acme"
/// slug = "widgets"
///
/// [authentication]
/// username = "ci-bot"
///
/// [rules]
/// branch_pattern = "release/*"
/// merge_access_users = "alice, bob"
/// require_approvals = true
/// required_approvals = 2
/// ```
///
/// The app password itself never lives in the file; it is read from the
/// `BRANCH_WARDEN_APP_PASSWORD` environment variable at sync time.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// The repository the restrictions are pushed to
    pub repository: RepositoryConfig,

    /// CLI-specific authentication settings
    #[serde(default)]
    pub authentication: AuthenticationConfig,

    /// The branch restriction rules to apply
    pub rules: RuleSettings,
}

impl AppConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path to the configuration file to load
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist, cannot be read,
    /// or contains invalid TOML.
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration file: {}", e)))?;

        Ok(config)
    }

    /// Saves the configuration to a TOML file at the specified path.
    ///
    /// Creates parent directories automatically if they don't exist and
    /// overwrites existing files at the target path. The output is
    /// pretty-formatted for human readability.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails or the file cannot be
    /// written.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        debug!("Saving configuration to {:?}", path);

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize configuration: {}", e)))?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create directory: {}", e)))?;
        }

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write configuration file: {}", e)))?;

        info!("Configuration saved to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig {
                owner: "your-workspace".to_string(),
                slug: "your-repository".to_string(),
            },
            authentication: AuthenticationConfig::new(),
            rules: RuleSettings {
                branch_pattern: "main".to_string(),
                ..RuleSettings::default()
            },
        }
    }
}

/// The repository section of the configuration file.
#[derive(Debug, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Workspace or user owning the repository
    pub owner: String,

    /// URL-safe repository name
    pub slug: String,
}

/// Configuration for CLI authentication settings.
///
/// Holds the Bitbucket username the app password belongs to. The password is
/// deliberately kept out of the configuration file and is read from the
/// environment instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthenticationConfig {
    /// Bitbucket username owning the app password
    #[serde(default)]
    pub username: String,
}

impl AuthenticationConfig {
    /// Creates a new AuthenticationConfig with default values.
    pub fn new() -> Self {
        AuthenticationConfig {
            username: String::new(),
        }
    }
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the path to the configuration file.
///
/// # Behaviour
///
/// - If `config_path` is `Some(path)`, returns that path as a `PathBuf`
/// - If `config_path` is `None`, returns `./branch-warden.toml` in the
///   current directory
/// - Falls back to the current directory if unable to determine the working
///   directory
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        // Look for config in current directory
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}
