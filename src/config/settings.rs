//! TOML-based configuration for Periscope.
//!
//! Supports a config file (periscope.toml) with environment variable
//! expansion, plus an env-only constructor for the dev-harness case where no
//! file is present.
//!
//! Example configuration:
//! ```toml
//! [service]
//! url = "https://myorg.example.com"
//! api_version = "9.2"
//! access_token = "${PERISCOPE_ACCESS_TOKEN}"
//!
//! [discovery]
//! sample_size = 10
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Remote data service connection.
    pub service: ServiceSettings,

    /// Relationship discovery tuning.
    pub discovery: DiscoverySettings,
}

/// Data service connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Organization root URL (supports ${ENV_VAR} expansion).
    pub url: String,

    /// Web API version segment (e.g. "9.2").
    pub api_version: String,

    /// Bearer token for the Authorization header (supports ${ENV_VAR} expansion).
    pub access_token: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_version: "9.2".to_string(),
            access_token: None,
        }
    }
}

impl ServiceSettings {
    /// The versioned API root, e.g. `https://org.example.com/api/data/v9.2`.
    pub fn api_root(&self) -> Result<String, SettingsError> {
        if self.url.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "service.url is not set".to_string(),
            ));
        }
        let url = expand_env_vars(&self.url)?;
        Ok(format!(
            "{}/api/data/v{}",
            url.trim_end_matches('/'),
            self.api_version
        ))
    }

    /// The expanded bearer token, if configured.
    pub fn bearer_token(&self) -> Result<Option<String>, SettingsError> {
        match &self.access_token {
            Some(raw) => Ok(Some(expand_env_vars(raw)?)),
            None => Ok(None),
        }
    }
}

/// Relationship discovery tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// How many records to sample per entity when deriving the column set.
    pub sample_size: u32,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self { sample_size: 10 }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;
        Ok(settings)
    }

    /// Load settings from `periscope.toml` in the current directory, falling
    /// back to environment variables when no file is present.
    pub fn discover() -> Result<Self, SettingsError> {
        let default_path = PathBuf::from("periscope.toml");
        if default_path.exists() {
            Self::load(default_path)
        } else {
            Self::from_env()
        }
    }

    /// Build settings purely from environment variables.
    ///
    /// Reads `PERISCOPE_SERVICE_URL`, `PERISCOPE_API_VERSION` and
    /// `PERISCOPE_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self, SettingsError> {
        let url = env::var("PERISCOPE_SERVICE_URL")
            .map_err(|_| SettingsError::MissingEnvVar("PERISCOPE_SERVICE_URL".to_string()))?;

        let mut service = ServiceSettings {
            url,
            ..ServiceSettings::default()
        };
        if let Ok(version) = env::var("PERISCOPE_API_VERSION") {
            service.api_version = version;
        }
        if let Ok(token) = env::var("PERISCOPE_ACCESS_TOKEN") {
            service.access_token = Some(token);
        }

        Ok(Self {
            service,
            discovery: DiscoverySettings::default(),
        })
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' {
            if chars.peek() == Some(&'{') {
                chars.next(); // consume '{'
                let mut var_name = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }
                let value = env::var(&var_name)
                    .map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
                result.push_str(&value);
            } else {
                // $VAR (ends at non-alphanumeric/underscore)
                let mut var_name = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        var_name.push(chars.next().unwrap());
                    } else {
                        break;
                    }
                }
                if var_name.is_empty() {
                    result.push('$');
                } else {
                    let value = env::var(&var_name)
                        .map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
                    result.push_str(&value);
                }
            }
        } else {
            result.push(c);
        }
    }

    Ok(result)
}
