//! TOML-based application configuration.
//!
//! Stores the acting member's identity and the endpoints for the two
//! external text collaborators. Configuration lives at
//! `~/.config/questboard/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Identity of the member driving this session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_member_id")]
    pub member_id: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_family_id")]
    pub family_id: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            member_id: default_member_id(),
            display_name: default_display_name(),
            family_id: default_family_id(),
        }
    }
}

/// Cheer (celebratory message) collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheerConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Endpoint receiving the completion context; empty disables the call.
    #[serde(default)]
    pub endpoint: String,
    /// Hard timeout; a hung request must not stall the completion flow.
    #[serde(default = "default_cheer_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CheerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            timeout_ms: default_cheer_timeout_ms(),
        }
    }
}

/// Quest-draft collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_draft_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_ms: default_draft_timeout_ms(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/questboard/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub cheer: CheerConfig,
    #[serde(default)]
    pub draft: DraftConfig,
}

fn default_member_id() -> String {
    "me".into()
}
fn default_display_name() -> String {
    "Me".into()
}
fn default_family_id() -> String {
    "home".into()
}
fn default_cheer_timeout_ms() -> u64 {
    2000
}
fn default_draft_timeout_ms() -> u64 {
    4000
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf, std::io::Error> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Ok(path) = Self::path() else {
            return Self::default();
        };
        let Ok(raw) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        toml::from_str(&raw).unwrap_or_default()
    }

    /// Save the configuration.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("~/.config/questboard/config.toml"),
            message: e.to_string(),
        })?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value by dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "profile.member_id" => Some(self.profile.member_id.clone()),
            "profile.display_name" => Some(self.profile.display_name.clone()),
            "profile.family_id" => Some(self.profile.family_id.clone()),
            "cheer.enabled" => Some(self.cheer.enabled.to_string()),
            "cheer.endpoint" => Some(self.cheer.endpoint.clone()),
            "cheer.timeout_ms" => Some(self.cheer.timeout_ms.to_string()),
            "draft.endpoint" => Some(self.draft.endpoint.clone()),
            "draft.timeout_ms" => Some(self.draft.timeout_ms.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dotted key and persist it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        match key {
            "profile.member_id" => self.profile.member_id = value.to_string(),
            "profile.display_name" => self.profile.display_name = value.to_string(),
            "profile.family_id" => self.profile.family_id = value.to_string(),
            "cheer.enabled" => {
                self.cheer.enabled = value.parse().map_err(|_| invalid("expected true/false"))?
            }
            "cheer.endpoint" => self.cheer.endpoint = value.to_string(),
            "cheer.timeout_ms" => {
                self.cheer.timeout_ms = value.parse().map_err(|_| invalid("expected an integer"))?
            }
            "draft.endpoint" => self.draft.endpoint = value.to_string(),
            "draft.timeout_ms" => {
                self.draft.timeout_ms = value.parse().map_err(|_| invalid("expected an integer"))?
            }
            _ => return Err(ConfigError::MissingKey(key.to_string())),
        }
        self.save()
    }
}
