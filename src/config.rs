// src/config.rs
//!
//! Runtime configuration.
//!
//! Values are resolved in three layers, later layers winning:
//! 1. optional TOML file at `<config_dir>/askdoc/config.toml`
//! 2. environment variables (`ASKDOC_IDENTITY_URL`, `ASKDOC_IDENTITY_KEY`,
//!    `ASKDOC_API_BASE`)
//! 3. CLI flags (applied by the binary)
//!
//! The identity key may additionally live in the OS keychain; see
//! [`Config::resolve_identity_key`].

use crate::{keychain, Error};
use serde::Deserialize;
use std::path::PathBuf;

/// Default base URL of the local answer/summary backend. Matches the
/// backend's default Flask-style bind address.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Keychain entry under which the identity provider key is stored.
pub const IDENTITY_KEY_ENTRY: &str = "identity_key";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub identity_url: Option<String>,
    pub identity_key: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the identity provider (e.g. `https://xyz.supabase.co`).
    pub identity_url: Option<String>,
    /// Public API key sent with every identity provider request.
    pub identity_key: Option<String>,
    /// Base URL of the local answer/summary backend.
    pub api_base: String,
}

impl Config {
    /// Load configuration from the config file (if present) and the
    /// environment. A missing file is not an error; a malformed one is.
    pub fn load() -> Result<Self, Error> {
        let file = match Self::config_file_path() {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(&path)?;
                toml::from_str::<ConfigFile>(&raw).map_err(|e| {
                    Error::Config(format!("failed to parse {}: {e}", path.display()))
                })?
            }
            _ => ConfigFile::default(),
        };

        Ok(Self {
            identity_url: env_var("ASKDOC_IDENTITY_URL").or(file.identity_url),
            identity_key: env_var("ASKDOC_IDENTITY_KEY").or(file.identity_key),
            api_base: env_var("ASKDOC_API_BASE")
                .or(file.api_base)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }

    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("askdoc").join("config.toml"))
    }

    /// Resolve the identity key, falling back to the keychain when neither
    /// the environment nor the config file provided one.
    pub fn resolve_identity_key(&self) -> Result<String, Error> {
        if let Some(key) = &self.identity_key {
            return Ok(key.clone());
        }
        keychain::load_secret(IDENTITY_KEY_ENTRY).map_err(|_| {
            Error::Config(
                "identity key not configured; set ASKDOC_IDENTITY_KEY or run `askdoc key set`"
                    .to_string(),
            )
        })
    }

    /// The identity provider base URL, required for auth operations.
    pub fn require_identity_url(&self) -> Result<String, Error> {
        self.identity_url.clone().ok_or_else(|| {
            Error::Config("identity URL not configured; set ASKDOC_IDENTITY_URL".to_string())
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
