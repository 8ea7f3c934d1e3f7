//! Configuration file loading and management
//!
//! This module handles loading and parsing the host configuration from
//! `$XDG_CONFIG_HOME/glyphgate/config.toml`. If the configuration file
//! doesn't exist, a default configuration is created with documented
//! comments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Capability names the host knows how to wire.
pub const KNOWN_CAPABILITIES: &[&str] = &["console", "fs", "env", "encoding", "system", "time"];

/// Main host configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostConfig {
    /// Host-wide settings
    pub host: HostSettings,
    /// Filesystem sandbox settings
    pub fs: FsSettings,
    /// Per-capability toggles
    #[serde(default)]
    pub capabilities: HashMap<String, CapabilitySettings>,
}

/// Host-wide settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostSettings {
    /// Log level (trace, debug, info, warn, error)
    /// Default: "info"
    pub log_level: String,
}

/// Filesystem sandbox settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FsSettings {
    /// Sandbox root guest filesystem access is confined to.
    /// If None, uses XDG_DATA_HOME/glyphgate/guest (created on demand).
    /// An explicitly configured root is used as-is and must already exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// Per-capability toggle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapabilitySettings {
    /// Whether this capability is registered and bound at bootstrap
    pub enabled: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host: HostSettings::default(),
            fs: FsSettings::default(),
            capabilities: HashMap::new(),
        }
    }
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for FsSettings {
    fn default() -> Self {
        Self { root: None }
    }
}

impl Default for CapabilitySettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl HostConfig {
    /// Load configuration from the specified path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: HostConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default XDG config location
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration file with documented comments.
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_file(&config_path)?;
        }

        Self::load(&config_path)
    }

    /// Get the default configuration file path
    ///
    /// Returns `$XDG_CONFIG_HOME/glyphgate/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "glyphgate-dev", "glyphgate")
            .context("Failed to determine project directories")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Create a default configuration file with documented comments
    fn create_default_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let default_config = Self::default_config_content();
        fs::write(path, default_config)
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        tracing::info!("Created default configuration file at: {}", path.display());
        Ok(())
    }

    /// Generate the default configuration file content with comments
    fn default_config_content() -> String {
        r#"# Glyphgate Host Configuration
# This file configures the capability layer exposed to guest scripts.

[host]
# Log level: trace, debug, info, warn, error
# Default: "info"
log_level = "info"

[fs]
# Sandbox root for guest filesystem access.
# If not specified, defaults to $XDG_DATA_HOME/glyphgate/guest and is
# created on demand. An explicitly configured root must already exist.
# root = "/path/to/guest/files"

# Per-capability toggles. Every capability is enabled unless listed here
# with enabled = false. Known names: console, fs, env, encoding, system,
# time.

# Example: run guests without filesystem access
# [capabilities.fs]
# enabled = false
"#
        .to_string()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.host.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log_level: {}. Must be one of: {}",
                self.host.log_level,
                valid_log_levels.join(", ")
            );
        }

        for name in self.capabilities.keys() {
            if !KNOWN_CAPABILITIES.contains(&name.as_str()) {
                anyhow::bail!(
                    "Unknown capability '{}'. Known capabilities: {}",
                    name,
                    KNOWN_CAPABILITIES.join(", ")
                );
            }
        }

        Ok(())
    }

    /// Whether a capability is enabled.
    ///
    /// Capabilities not mentioned in the config are enabled.
    pub fn capability_enabled(&self, name: &str) -> bool {
        self.capabilities
            .get(name)
            .map_or(true, |settings| settings.enabled)
    }

    /// Get the filesystem sandbox root
    ///
    /// Returns the configured root or the default XDG data directory path.
    /// Only the default root is created on demand; an explicit root is the
    /// embedder's responsibility.
    pub fn fs_root(&self) -> Result<PathBuf> {
        if let Some(ref root) = self.fs.root {
            return Ok(root.clone());
        }

        let dirs = directories::ProjectDirs::from("", "glyphgate-dev", "glyphgate")
            .context("Failed to determine project directories")?;

        let root = dirs.data_dir().join("guest");
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create guest sandbox root: {}", root.display()))?;
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = HostConfig::default();
        assert_eq!(config.host.log_level, "info");
        assert!(config.fs.root.is_none());
        assert!(config.capabilities.is_empty());
    }

    #[test]
    fn test_every_capability_enabled_by_default() {
        let config = HostConfig::default();
        for name in KNOWN_CAPABILITIES {
            assert!(config.capability_enabled(name));
        }
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[host]
log_level = "debug"

[fs]
root = "/srv/guest"

[capabilities.fs]
enabled = false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = HostConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.host.log_level, "debug");
        assert_eq!(config.fs.root, Some(PathBuf::from("/srv/guest")));
        assert!(!config.capability_enabled("fs"));
        assert!(config.capability_enabled("console"));
    }

    #[test]
    fn test_load_minimal_config() {
        let config_content = r#"
[host]
log_level = "info"

[fs]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = HostConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.host.log_level, "info");
        assert!(config.capabilities.is_empty());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = HostConfig::default();
        config.host.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_capability() {
        let mut config = HostConfig::default();
        config.capabilities.insert(
            "network".to_string(),
            CapabilitySettings { enabled: true },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fs_root_custom_is_used_as_is() {
        let mut config = HostConfig::default();
        let custom = PathBuf::from("/custom/guest/root");
        config.fs.root = Some(custom.clone());
        assert_eq!(config.fs_root().unwrap(), custom);
    }

    #[test]
    fn test_full_config_roundtrip() {
        let mut config = HostConfig::default();
        config.host.log_level = "debug".to_string();
        config
            .capabilities
            .insert("time".to_string(), CapabilitySettings { enabled: false });

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: HostConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
    }
}
