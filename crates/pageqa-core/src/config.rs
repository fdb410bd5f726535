use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::suggestions::SuggestionCatalog;

/// Environment variable overriding the service base address.
pub const SERVICE_URL_ENV: &str = "PAGEQA_SERVICE_URL";
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5001";
pub const DEFAULT_LOG_FILE: &str = "./pageqa.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Contents of `config.json`. Every field is optional.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub service_url: Option<String>,
    pub log_file: Option<PathBuf>,
    pub suggestions: Option<SuggestionCatalog>,
}

/// Where the service base address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceUrlSource {
    Environment,
    ConfigFile,
    Default,
}

impl Config {
    /// Loads the user config file. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pageqa").join("config.json"))
    }

    /// Resolves the base address from the process environment, then this
    /// config, then the default.
    pub fn service_url(&self) -> (String, ServiceUrlSource) {
        self.service_url_with(std::env::var(SERVICE_URL_ENV).ok())
    }

    pub fn service_url_with(&self, env_value: Option<String>) -> (String, ServiceUrlSource) {
        if let Some(url) = non_blank(env_value.as_deref()) {
            return (url, ServiceUrlSource::Environment);
        }
        if let Some(url) = non_blank(self.service_url.as_deref()) {
            return (url, ServiceUrlSource::ConfigFile);
        }
        (DEFAULT_SERVICE_URL.to_string(), ServiceUrlSource::Default)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
    }

    pub fn suggestions(&self) -> SuggestionCatalog {
        self.suggestions.clone().unwrap_or_default()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
