//! Application settings and persistence management
//!
//! This module handles loading, saving, and managing user preferences
//! that persist between sessions, and resolves which API root to talk to.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::config::{
    API_URL, API_URL_ENV, DEFAULT_CONCURRENT_DOWNLOADS, DEFAULT_LANGUAGE, DEFAULT_OUTPUT_ENCODING,
    SANDBOX_API_URL,
};
use crate::errors::{Result, SubDbError};

/// Application settings that persist between sessions
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub language: String,
    pub output_encoding: String,
    pub write_bom: bool,
    pub concurrent_downloads: usize,
    pub overwrite_existing: bool,
    pub base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            output_encoding: DEFAULT_OUTPUT_ENCODING.to_string(),
            write_bom: false,
            concurrent_downloads: DEFAULT_CONCURRENT_DOWNLOADS,
            overwrite_existing: true,
            base_url: None,
        }
    }
}

impl Settings {
    /// Get the path where settings are stored
    pub fn get_path() -> std::io::Result<PathBuf> {
        #[cfg(windows)]
        {
            let exe_path = std::env::current_exe()?;
            let exe_dir = exe_path.parent().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "Failed to get executable directory")
            })?;
            Ok(exe_dir.join("subdb_settings.json"))
        }

        #[cfg(target_os = "macos")]
        {
            let home_dir = dirs::home_dir().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "Failed to get home directory")
            })?;
            let app_support = home_dir.join("Library/Application Support/subdb");
            std::fs::create_dir_all(&app_support)?;
            Ok(app_support.join("settings.json"))
        }

        #[cfg(not(any(windows, target_os = "macos")))]
        {
            if let Ok(xdg_dirs) = xdg::BaseDirectories::new() {
                let app_dir = xdg_dirs.get_config_home().join("subdb");
                std::fs::create_dir_all(&app_dir)?;
                Ok(app_dir.join("settings.json"))
            } else {
                let home_dir = dirs::home_dir().ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "Failed to get home directory")
                })?;
                let app_dir = home_dir.join(".subdb");
                std::fs::create_dir_all(&app_dir)?;
                Ok(app_dir.join("settings.json"))
            }
        }
    }

    /// Load settings from disk, falling back to defaults if file doesn't exist
    pub fn load() -> Self {
        match Self::get_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                log::warn!("Failed to get settings path: {}. Using defaults.", e);
                Settings::default()
            }
        }
    }

    /// Load settings from `path`; unreadable or malformed files give defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    log::info!("Settings loaded from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings file: {}. Using defaults.", e);
                    Settings::default()
                }
            },
            Err(e) => {
                log::debug!("Settings file not found or unreadable: {}. Using defaults.", e);
                Settings::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::get_path()
            .map_err(|e| SubDbError::Settings(format!("Failed to get settings path: {}", e)))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::debug!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Take over the download defaults of `current`: language, output
    /// encoding and parallel jobs. One-shot switches such as the BOM and
    /// overwrite flags are left as they were saved.
    pub fn remember_download_defaults(&mut self, current: &Settings) {
        self.language = current.language.clone();
        self.output_encoding = current.output_encoding.clone();
        self.concurrent_downloads = current.concurrent_downloads;
    }

    /// Pick the API root: explicit URL, then sandbox switch, then the
    /// environment variable, then the saved setting, then production.
    pub fn resolve_base_url(&self, explicit: Option<&str>, sandbox: bool) -> String {
        let from_env = std::env::var(API_URL_ENV).ok();
        resolve_base_url(explicit, sandbox, from_env.as_deref(), self.base_url.as_deref())
    }
}

fn resolve_base_url(
    explicit: Option<&str>,
    sandbox: bool,
    from_env: Option<&str>,
    saved: Option<&str>,
) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }
    if sandbox {
        return SANDBOX_API_URL.to_string();
    }
    from_env
        .filter(|url| !url.trim().is_empty())
        .or(saved)
        .unwrap_or(API_URL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            language: "pt".into(),
            concurrent_downloads: 4,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn partial_or_broken_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"language":"fr"}"#).unwrap();
        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.language, "fr");
        assert_eq!(loaded.output_encoding, "utf-8");

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
        assert_eq!(Settings::load_from(&dir.path().join("missing.json")), Settings::default());
    }

    #[test]
    fn saving_download_defaults_keeps_one_shot_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut saved = Settings::load_from(&path);
        let current = Settings {
            language: "pt".into(),
            output_encoding: "windows-1252".into(),
            concurrent_downloads: 4,
            write_bom: true,
            overwrite_existing: false,
            ..Default::default()
        };

        saved.remember_download_defaults(&current);
        saved.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.language, "pt");
        assert_eq!(loaded.output_encoding, "windows-1252");
        assert_eq!(loaded.concurrent_downloads, 4);
        assert!(!loaded.write_bom);
        assert!(loaded.overwrite_existing);
    }

    #[test]
    fn base_url_precedence() {
        assert_eq!(
            resolve_base_url(Some("http://localhost:9000/"), true, Some("http://env/"), None),
            "http://localhost:9000/"
        );
        assert_eq!(resolve_base_url(None, true, Some("http://env/"), None), SANDBOX_API_URL);
        assert_eq!(
            resolve_base_url(None, false, Some("http://env/"), Some("http://saved/")),
            "http://env/"
        );
        assert_eq!(resolve_base_url(None, false, Some(""), Some("http://saved/")), "http://saved/");
        assert_eq!(resolve_base_url(None, false, None, None), API_URL);
    }
}
