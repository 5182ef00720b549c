use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::{debug, warn};

use crate::domain::Language;
use crate::infra::geocoder;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "FreightQuote";
const APP_NAME: &str = "FreightQuote";

pub const ENV_GEOCODER_URL: &str = "FREIGHT_QUOTE_GEOCODER_URL";
pub const ENV_API_KEY: &str = "FREIGHT_QUOTE_API_KEY";
pub const ENV_LANGUAGE: &str = "FREIGHT_QUOTE_LANGUAGE";

/// User settings, stored as JSON in the platform config directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub geocoder_url: String,
    pub api_key: Option<String>,
    pub debounce_ms: u64,
    pub cache_ttl_secs: u64,
    pub language: Language,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            geocoder_url: geocoder::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            debounce_ms: 300,
            cache_ttl_secs: geocoder::DEFAULT_TTL.as_secs(),
            language: Language::default(),
        }
    }
}

impl Settings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Applies `FREIGHT_QUOTE_*` overrides looked up through `var`.
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var(ENV_GEOCODER_URL).filter(|value| !value.trim().is_empty()) {
            self.geocoder_url = url;
        }
        if let Some(key) = var(ENV_API_KEY).filter(|value| !value.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(raw) = var(ENV_LANGUAGE) {
            match raw.parse::<Language>() {
                Ok(language) => self.language = language,
                Err(_) => warn!(value = %raw, "ignoring unknown {ENV_LANGUAGE}"),
            }
        }
        self
    }

    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }
}

fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("settings.json"))
}

/// Settings file contents, or defaults when there is none yet.
pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(serde_json::from_str(&data)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Settings::default())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

/// Stored settings with environment overrides applied.
pub fn load_settings() -> Result<Settings, SettingsError> {
    let stored = match settings_file() {
        Some(path) => load_settings_from(&path)?,
        None => Settings::default(),
    };
    Ok(stored.with_env())
}

/// Persists the language choice without writing environment overrides.
pub fn remember_language(language: Language) -> Result<(), SettingsError> {
    let path = settings_file().ok_or(SettingsError::StorageUnavailable)?;
    let mut stored = load_settings_from(&path)?;
    stored.language = language;
    save_settings_to(&path, &stored)
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            api_key: Some("abc".into()),
            language: Language::En,
            ..Settings::default()
        };
        save_settings_to(&path, &settings).unwrap();
        assert_eq!(load_settings_from(&path).unwrap(), settings);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"language": "en"}"#).unwrap();
        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.debounce_ms, 300);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            load_settings_from(&path),
            Err(SettingsError::Serde(_))
        ));
    }

    #[test]
    fn overrides_win_over_file() {
        let settings = Settings::default().with_overrides(|name| match name {
            ENV_API_KEY => Some("from-env".into()),
            ENV_LANGUAGE => Some("EN".into()),
            ENV_GEOCODER_URL => Some("  ".into()),
            _ => None,
        });
        assert_eq!(settings.api_key.as_deref(), Some("from-env"));
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.geocoder_url, geocoder::DEFAULT_BASE_URL);
    }

    #[test]
    fn unknown_language_override_is_ignored() {
        let settings =
            Settings::default().with_overrides(|name| (name == ENV_LANGUAGE).then(|| "fr".into()));
        assert_eq!(settings.language, Language::Pt);
    }
}
