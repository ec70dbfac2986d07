//! Tunable timing and trust settings for the player core.

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol::DEFAULT_TRUSTED_ORIGINS;

/// Error type for loading settings files.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Json(err) => write!(f, "invalid settings json: {}", err),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Player timing configuration.
///
/// Every field has a default, so a settings file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Foreground estimator cadence while the document is visible.
    pub foreground_tick_ms: u64,
    /// Background tracker cadence while the document is hidden.
    pub background_tick_ms: u64,
    /// Delay between loading new media and the first state requests.
    pub settle_delay_ms: u64,
    /// Grace delay between end-of-media and advancing to the next item.
    pub advance_grace_ms: u64,
    /// Seconds before the known duration at which media counts as ended.
    pub end_margin_secs: f64,
    /// Duration assumed for seeking when the real one is not known yet.
    pub seek_fallback_secs: f64,
    pub trusted_origins: Vec<String>,
    pub embed_host: String,
    pub page_origin: String,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            foreground_tick_ms: 250,
            background_tick_ms: 1000,
            settle_delay_ms: 1000,
            advance_grace_ms: 1000,
            end_margin_secs: 1.0,
            seek_fallback_secs: 100.0,
            trusted_origins: DEFAULT_TRUSTED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
            embed_host: "https://www.youtube.com".to_string(),
            page_origin: "chrome-extension://tabtune".to_string(),
        }
    }
}

impl PlayerSettings {
    /// Read settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn foreground_tick(&self) -> Duration {
        Duration::from_millis(self.foreground_tick_ms.max(1))
    }

    pub fn background_tick(&self) -> Duration {
        Duration::from_millis(self.background_tick_ms.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn advance_grace(&self) -> Duration {
        Duration::from_millis(self.advance_grace_ms)
    }
}

/// Endpoint configuration for the search/metadata catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub api_base: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            api_base: "https://yt-me-venopyx.vercel.app".to_string(),
        }
    }
}
