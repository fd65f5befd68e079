//! Application configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then a
//! couple of environment overrides for the API endpoint and session token.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::state::pagination::DEFAULT_PAGE_SIZE;

/// Points at an explicit config file.
pub const CONFIG_ENV: &str = "VENDADMIN_CONFIG";
/// Overrides `api_base_url`.
pub const API_URL_ENV: &str = "VENDADMIN_API_URL";
/// Overrides `api_token`.
pub const TOKEN_ENV: &str = "VENDADMIN_TOKEN";

const APP_DIR: &str = "vendadmin";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub page_size: usize,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,
    pub search_debounce_ms: u64,
    pub notification_poll_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            export_dir: default_export_dir(),
            log_dir: config_dir().join("logs"),
            search_debounce_ms: 300,
            notification_poll_secs: 30,
            request_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    /// Loads the configuration from the usual locations and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir().join(CONFIG_FILE));
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Reads a TOML file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(text)?;
        config.normalize();
        Ok(config)
    }

    /// Applies environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_token = Some(token);
        }
    }

    fn normalize(&mut self) {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = Self::default().request_timeout_secs;
        }
        if self.api_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            self.api_token = None;
        }
    }
}

/// Resolve an XDG base directory from the environment, else `$HOME` + segments.
fn xdg_base_dir(var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(p) = env::var(var) {
        if !p.trim().is_empty() {
            return PathBuf::from(p);
        }
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let mut base = PathBuf::from(home);
    for seg in home_default {
        base = base.join(seg);
    }
    base
}

/// `$XDG_CONFIG_HOME/vendadmin`, or `$HOME/.config/vendadmin`.
pub fn config_dir() -> PathBuf {
    xdg_base_dir("XDG_CONFIG_HOME", &[".config"]).join(APP_DIR)
}

fn default_export_dir() -> PathBuf {
    xdg_base_dir("XDG_DOWNLOAD_DIR", &["Downloads"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_base_url = \"https://admin.example.com/api\"\npage_size = 25\n",
        )
        .unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.api_base_url, "https://admin.example.com/api");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn test_zero_page_size_corrected() {
        let config = AppConfig::from_toml("page_size = 0").unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = \"ten\"").unwrap();
        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (API_URL_ENV, "https://staging.example.com/api"),
            (TOKEN_ENV, "tok"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_base_url, "https://staging.example.com/api");
        assert_eq!(config.api_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_blank_env_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config, AppConfig::default());
    }
}
