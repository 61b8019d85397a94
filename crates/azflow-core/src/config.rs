use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Compiler-facing defaults shared by every output dialect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Region used when a node carries no `region` property.
    pub location: String,
    /// Name of the resource group the Terraform document declares.
    pub resource_group: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            location: "East US".to_string(),
            resource_group: "example-resources".to_string(),
        }
    }
}

/// Resolve the global config directory (~/.azflow/).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".azflow")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Read the global settings. Missing or unreadable files fall back to defaults.
pub fn read_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    match read_settings_from(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            Settings::default()
        }
    }
}

pub fn read_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn write_settings(settings: &Settings) -> Result<(), ConfigError> {
    write_settings_to(&settings_path(), settings)
}

pub fn write_settings_to(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
