//! Configuration system (layered: explicit path > env > config dir).

pub mod catalog;

pub use catalog::CatalogSettings;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Env var naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "MODELRELAY_CONFIG";
/// Env var overriding where blacklist and failure records live.
pub const STATE_DIR_ENV: &str = "MODELRELAY_STATE_DIR";

const BLACKLIST_FILE: &str = "blacklist.json";
const FAILURES_FILE: &str = "failed_llm_providers.json";

/// Top-level configuration.
///
/// ```
/// use modelrelay::config::RelayConfig;
///
/// let config = RelayConfig::from_toml_str(r#"
/// state_dir = "/tmp/relay"
///
/// [catalog]
/// min_variants = 1
///
/// [[providers]]
/// name = "local"
/// base_url = "http://localhost:8080/v1"
/// models = ["gpt-4o", "gpt-4o-mini"]
/// "#)?;
/// assert_eq!(config.providers[0].name, "local");
/// # Ok::<(), modelrelay::error::RelayError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Directory holding `blacklist.json` and `failed_llm_providers.json`.
    pub state_dir: PathBuf,
    pub catalog: CatalogSettings,
    /// Providers in priority order; resolution tries them in this order.
    pub providers: Vec<ProviderConfig>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            catalog: CatalogSettings::default(),
            providers: Vec::new(),
        }
    }
}

/// One OpenAI-compatible provider endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub base_url: String,
    /// Env var holding the bearer token; unauthenticated when absent.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Raw model identifiers this provider claims to serve.
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default = "default_true")]
    pub working: bool,
    #[serde(default = "default_true")]
    pub supports_stream: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    60
}

impl ProviderConfig {
    /// Read the bearer token from the configured env var, if any.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    }
}

impl RelayConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file. A missing file is an error.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            RelayError::Configuration(format!("Cannot read config {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load using the layered lookup.
    ///
    /// 1. `explicit` path, when given (must exist)
    /// 2. `MODELRELAY_CONFIG` (must exist)
    /// 3. `<config dir>/modelrelay/config.toml` (defaults when absent)
    ///
    /// `.env` is read first; `MODELRELAY_STATE_DIR` overrides `state_dir`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let mut config = if let Some(path) = explicit {
            Self::load_from_path(path)?
        } else if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            Self::load_from_path(PathBuf::from(path))?
        } else {
            match default_config_path() {
                Some(path) if path.exists() => Self::load_from_path(path)?,
                _ => Self::default(),
            }
        };

        if let Some(dir) = std::env::var_os(STATE_DIR_ENV) {
            config.state_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn blacklist_path(&self) -> PathBuf {
        self.state_dir.join(BLACKLIST_FILE)
    }

    pub fn failures_path(&self) -> PathBuf {
        self.state_dir.join(FAILURES_FILE)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(RelayError::Configuration(
                    "Provider entry with empty name".into(),
                ));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(RelayError::Configuration(format!(
                    "Provider '{}' is configured twice",
                    provider.name
                )));
            }
        }
        Ok(())
    }
}

/// Default config file location (`<config dir>/modelrelay/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "modelrelay")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn default_state_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".modelrelay"))
        .unwrap_or_else(|| PathBuf::from(".modelrelay"))
}
