//! Host configuration.
//!
//! Read once at startup; only the presentation layer consumes it, so a
//! missing or malformed file falls back to defaults with a warning instead
//! of failing the session.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Presentation theme requested by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the operating system appearance.
    #[default]
    System,
    Light,
    Dark,
}

/// Configuration served by `get_config`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub theme: Theme,
}

/// Platform config file location.
pub fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("marksync").join("config.json");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("marksync")
                .join("config.json");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("marksync").join("config.json");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("marksync")
                .join("config.json");
        }
    }

    PathBuf::from(".marksync.json")
}

/// Load the config file, falling back to defaults when it is missing or
/// malformed.
pub fn load_config(path: &Path) -> HostConfig {
    if !path.exists() {
        return HostConfig::default();
    }
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "malformed config, using defaults");
                HostConfig::default()
            }
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "unreadable config, using defaults");
            HostConfig::default()
        }
    }
}

/// Persist the config file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn save_config(path: &Path, config: &HostConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;
    fs::write(path, format!("{content}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.json"));
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.theme, Theme::System);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = HostConfig { theme: Theme::Dark };

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path), config);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_config(&path), HostConfig::default());
    }

    #[test]
    fn test_theme_serializes_lowercase() {
        let json = serde_json::to_string(&HostConfig { theme: Theme::Light }).unwrap();
        assert!(json.contains("\"light\""));
        let parsed: HostConfig = serde_json::from_str("{\"theme\":\"dark\"}").unwrap();
        assert_eq!(parsed.theme, Theme::Dark);
    }
}
