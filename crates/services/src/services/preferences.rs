//! Per-user preferences.
//!
//! A sectioned TOML file read wholesale at startup and rewritten wholesale
//! on save. Missing keys are backfilled from the schema defaults; an
//! unreadable file falls back to defaults entirely.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CURRENT_PREFS_VERSION: &str = "v3";

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
}

fn default_version() -> String {
    CURRENT_PREFS_VERSION.to_string()
}

fn default_host() -> String {
    "standalone".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerSection {
    pub version: String,
    /// Host adapter selected at startup; unknown names fall back to
    /// standalone.
    pub host: String,
    pub auto_refresh: bool,
}

impl Default for ManagerSection {
    fn default() -> Self {
        Self {
            version: default_version(),
            host: default_host(),
            auto_refresh: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MayaSection {
    /// Import assets as references instead of flattened copies.
    pub use_instances: bool,
    /// Plugins probed by `initialize_formats`.
    pub plugins: Vec<String>,
}

impl Default for MayaSection {
    fn default() -> Self {
        Self {
            use_instances: true,
            plugins: vec!["AbcImport".to_string(), "fbxmaya".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GuerillaSection {
    pub plugins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KitsuSection {
    pub host_url: String,
    pub username: String,
    pub remember_login: bool,
}

impl Default for KitsuSection {
    fn default() -> Self {
        Self {
            host_url: String::new(),
            username: String::new(),
            remember_login: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Preferences {
    #[serde(rename = "MANAGER")]
    pub manager: ManagerSection,
    #[serde(rename = "MAYA")]
    pub maya: MayaSection,
    #[serde(rename = "GUERILLA")]
    pub guerilla: GuerillaSection,
    #[serde(rename = "KITSU")]
    pub kitsu: KitsuSection,
}

impl Preferences {
    pub fn from_raw(raw: &str) -> Self {
        match toml::from_str::<Preferences>(raw) {
            Ok(prefs) => prefs.normalized(),
            Err(err) => {
                tracing::warn!("Failed to parse preferences: {}, using defaults", err);
                Self::default()
            }
        }
    }

    pub fn normalized(mut self) -> Self {
        self.manager.version = CURRENT_PREFS_VERSION.to_string();
        if self.manager.host.trim().is_empty() {
            self.manager.host = default_host();
        }
        self.kitsu.host_url = self.kitsu.host_url.trim().to_string();
        self.kitsu.username = self.kitsu.username.trim().to_string();
        self
    }
}

/// Fixed per-user preferences path.
pub fn preferences_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hestia")
        .join("preferences.toml")
}

/// Always returns preferences, falling back to defaults on missing or
/// invalid files.
pub fn load_preferences(path: &PathBuf) -> Preferences {
    match std::fs::read_to_string(path) {
        Ok(raw) => Preferences::from_raw(&raw),
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                tracing::info!("No preferences file found, using defaults");
            } else {
                tracing::warn!("Failed to read preferences file: {}", err);
            }
            Preferences::default()
        }
    }
}

/// Rewrites the whole file. A crash mid-write can corrupt it; the next load
/// falls back to defaults.
pub fn save_preferences(prefs: &Preferences, path: &PathBuf) -> Result<(), PreferencesError> {
    let normalized = prefs.clone().normalized();
    let raw = toml::to_string_pretty(&normalized)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, raw)?;
    Ok(())
}
