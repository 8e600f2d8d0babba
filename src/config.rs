//! Configuration: TOML file, environment and command-line flags
//!
//! Precedence: flag / environment > config file > built-in defaults.

use crate::api::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::{WbError, WbResult};
use crate::types::Credentials;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "wb-export.toml";
pub const DEFAULT_WORKBOOK: &str = "test.xlsx";
pub const DEFAULT_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT.as_secs();

/// Contents of the TOML config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub workbook: WorkbookSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkbookSection {
    pub path: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_toml_str(contents: &str) -> WbResult<Self> {
        toml::from_str(contents).map_err(|e| WbError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> WbResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WbError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| WbError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub token: Option<String>,
    pub key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub workbook: Option<PathBuf>,
}

/// Effective settings after merging all sources
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub token: Option<String>,
    pub key: Option<String>,
    pub timeout: Duration,
    pub workbook: PathBuf,
}

impl Settings {
    /// Load `config_path`, or `wb-export.toml` if it exists, then apply
    /// `overrides`. An explicit path that cannot be read is an error.
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> WbResult<Self> {
        let file = match config_path {
            Some(path) => {
                tracing::info!("Loading config from: {}", path.display());
                FileConfig::load(path)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    tracing::info!("Loading config from: {}", default_path.display());
                    FileConfig::load(default_path)?
                } else {
                    tracing::debug!("{} not found, using defaults", DEFAULT_CONFIG_FILE);
                    FileConfig::default()
                }
            }
        };
        Self::merge(file, overrides)
    }

    pub fn merge(file: FileConfig, overrides: Overrides) -> WbResult<Self> {
        let timeout_secs = overrides
            .timeout_secs
            .or(file.api.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(WbError::Config("timeout must be at least 1 second".into()));
        }

        Ok(Self {
            base_url: overrides
                .base_url
                .or(file.api.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token: overrides.token.or(file.api.token),
            key: overrides.key.or(file.api.key),
            timeout: Duration::from_secs(timeout_secs),
            workbook: overrides
                .workbook
                .or(file.workbook.path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK)),
        })
    }

    /// Token and key, both required for API calls. They are used exactly as
    /// given, so surrounding whitespace is an error rather than trimmed.
    pub fn credentials(&self) -> WbResult<Credentials> {
        let present = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };
        let (token, key) = (present(&self.token), present(&self.key));
        for (name, value) in [("token", &token), ("key", &key)] {
            if let Some(value) = value {
                if value.trim() != value.as_str() {
                    return Err(WbError::Config(format!(
                        "API {} has leading or trailing whitespace",
                        name
                    )));
                }
            }
        }
        match (token, key) {
            (Some(token), Some(key)) => Ok(Credentials::new(token, key)),
            (None, Some(_)) => Err(WbError::Config(
                "API token is missing (set WB_TOKEN, --token or [api] token)".into(),
            )),
            (Some(_), None) => Err(WbError::Config(
                "API key is missing (set WB_KEY, --key or [api] key)".into(),
            )),
            (None, None) => Err(WbError::Config(
                "API token and key are missing (set WB_TOKEN and WB_KEY)".into(),
            )),
        }
    }

    pub fn client_config(&self) -> WbResult<ClientConfig> {
        Ok(ClientConfig::new(self.credentials()?)
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout))
    }
}
