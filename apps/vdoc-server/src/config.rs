//! Configuration management for VDoc Server
//!
//! Everything is read from the process environment (after `.env` has been
//! loaded by `main`). The generative API key has no default: a missing key is
//! a startup error.

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Default upload limit: 20MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub generative: GenerativeConfig,
    pub vision: VisionOcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerativeConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionOcrConfig {
    /// Credentials file, resolved against the working directory when relative
    pub credentials_file: PathBuf,
    pub endpoint: String,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Failed to read credentials file {path}: {reason}")]
    Credentials { path: PathBuf, reason: String },
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl GenerativeConfig {
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-flash";
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    /// Config with the default model and endpoint for the given key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for VisionOcrConfig {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("vision-credentials.json"),
            endpoint: "https://vision.googleapis.com".to_string(),
        }
    }
}

impl VisionOcrConfig {
    /// Credentials path resolved relative to the current working directory
    pub fn resolved_credentials_file(&self) -> PathBuf {
        if self.credentials_file.is_absolute() {
            return self.credentials_file.clone();
        }
        env::current_dir()
            .map(|cwd| cwd.join(&self.credentials_file))
            .unwrap_or_else(|_| self.credentials_file.clone())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_defaults = ServerConfig::default();
        let vision_defaults = VisionOcrConfig::default();

        let api_key = lookup("GOOGLE_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("GOOGLE_API_KEY"))?;

        Ok(Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or(server_defaults.host),
                port: parse_or("SERVER_PORT", lookup("SERVER_PORT"), server_defaults.port)?,
                max_upload_bytes: parse_or(
                    "MAX_UPLOAD_BYTES",
                    lookup("MAX_UPLOAD_BYTES"),
                    server_defaults.max_upload_bytes,
                )?,
            },
            generative: GenerativeConfig {
                api_key,
                model: lookup("GEMINI_MODEL")
                    .unwrap_or_else(|| GenerativeConfig::DEFAULT_MODEL.to_string()),
                base_url: lookup("GEMINI_BASE_URL")
                    .unwrap_or_else(|| GenerativeConfig::DEFAULT_BASE_URL.to_string()),
            },
            vision: VisionOcrConfig {
                credentials_file: lookup("VISION_CREDENTIALS_FILE")
                    .map(PathBuf::from)
                    .unwrap_or(vision_defaults.credentials_file),
                endpoint: lookup("VISION_ENDPOINT").unwrap_or(vision_defaults.endpoint),
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
