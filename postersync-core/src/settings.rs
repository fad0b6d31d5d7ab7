//! Persistent settings, stored as TOML under the user config directory.
//!
//! The file is created with defaults on first load so users have
//! something to edit, and writes go through a temp file + rename.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "postersync";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine the user config directory")]
    NoConfigDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn default_jellyfin_url() -> String {
    "http://127.0.0.1:8096".to_owned()
}

fn default_plex_url() -> String {
    "http://127.0.0.1:32400".to_owned()
}

fn default_mediux_url() -> String {
    "https://api.mediux.pro".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JellyfinSettings {
    pub base_url: String,
    pub api_key: String,
}

impl Default for JellyfinSettings {
    fn default() -> Self {
        Self {
            base_url: default_jellyfin_url(),
            api_key: String::new(),
        }
    }
}

impl JellyfinSettings {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlexSettings {
    pub base_url: String,
    pub token: String,
}

impl Default for PlexSettings {
    fn default() -> Self {
        Self {
            base_url: default_plex_url(),
            token: String::new(),
        }
    }
}

impl PlexSettings {
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediuxSettings {
    pub base_url: String,
    pub token: String,
}

impl Default for MediuxSettings {
    fn default() -> Self {
        Self {
            base_url: default_mediux_url(),
            token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Set publishers whose sets are never used.
    pub exclude_usernames: Vec<String>,
    /// Preferred publishers, best first.
    pub priority_usernames: Vec<String>,
    /// Only use sets from `priority_usernames`.
    pub only_priority_usernames: bool,
    /// Strip the Kometa "Overlay" label after Plex uploads.
    pub kometa_integration: bool,
    /// Library names to leave alone during a sweep.
    pub skip_libraries: Vec<String>,
    pub jellyfin: JellyfinSettings,
    pub plex: PlexSettings,
    pub mediux: MediuxSettings,
}

impl Settings {
    /// Path of the settings file.
    pub fn path() -> Result<PathBuf, SettingsError> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load settings, writing a default file first if none exists.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::info!("Creating default settings at {}", path.display());
            let settings = Self::default();
            settings.save_to(path)?;
            return Ok(settings);
        }
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::path()?)
    }

    /// Write atomically: temp file in the same directory, then rename.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_servers() {
        let settings = Settings::default();
        assert_eq!(settings.jellyfin.base_url, "http://127.0.0.1:8096");
        assert_eq!(settings.plex.base_url, "http://127.0.0.1:32400");
        assert_eq!(settings.mediux.base_url, "https://api.mediux.pro");
        assert!(!settings.jellyfin.is_configured());
        assert!(!settings.plex.is_configured());
    }

    #[test]
    fn first_load_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let settings = Settings::load_from(&path).unwrap();
        assert!(path.exists());
        assert!(settings.exclude_usernames.is_empty());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut settings = Settings::default();
        settings.priority_usernames = vec!["alice".into(), "bob".into()];
        settings.kometa_integration = true;
        settings.plex.token = "secret".into();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.priority_usernames, vec!["alice", "bob"]);
        assert!(loaded.kometa_integration);
        assert_eq!(loaded.plex.token, "secret");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "only_priority_usernames = true\n").unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert!(settings.only_priority_usernames);
        assert_eq!(settings.mediux.base_url, "https://api.mediux.pro");
    }
}
