//! Startup configuration.
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. Settings files: `<config dir>/lazy-git/config.toml`, then `.lazy-git.toml`
//!    in the current directory
//! 3. Environment (a `.env` file in the current directory is loaded first and
//!    never overrides variables that are already set)
//! 4. Command-line overrides

use std::env;
use std::fmt;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::llm::{BackendConfig, Provider};

pub const API_KEY_ENV_VAR: &str = "AI_API_KEY";
pub const MODEL_ENV_VAR: &str = "AI_MODEL";
pub const WORK_DIR_ENV_VAR: &str = "GIT_WORK_DIR";
pub const PROVIDER_ENV_VAR: &str = "AI_PROVIDER";
pub const BASE_URL_ENV_VAR: &str = "AI_BASE_URL";
pub const TIMEOUT_ENV_VAR: &str = "LAZY_GIT_TIMEOUT";

/// Default timeout for each git command and model request (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Per-project settings file, looked up in the current directory.
pub const LOCAL_SETTINGS_FILE: &str = ".lazy-git.toml";

/// Contents of a TOML settings file. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub work_dir: Option<PathBuf>,
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Read a settings file. A missing file is `Ok(None)`.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::ReadFailed {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::ParseFailed {
                path: path.display().to_string(),
                source,
            })
    }

    /// Layer `other` on top of `self`; keys set in `other` win.
    pub fn merge(self, other: Settings) -> Settings {
        Settings {
            api_key: other.api_key.or(self.api_key),
            model: other.model.or(self.model),
            work_dir: other.work_dir.or(self.work_dir),
            provider: other.provider.or(self.provider),
            base_url: other.base_url.or(self.base_url),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub work_dir: Option<PathBuf>,
}

/// Resolved configuration, fixed for the life of the process.
#[derive(Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub work_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("work_dir", &self.work_dir)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Load `.env`, the settings files and the environment, then apply `overrides`.
    pub fn load(overrides: Overrides) -> Result<Self, ConfigError> {
        match dotenv::dotenv() {
            Ok(path) => debug!("loaded environment from {}", path.display()),
            Err(e) => debug!("no .env loaded: {e}"),
        }

        let mut settings = Settings::default();
        for path in settings_paths() {
            if let Some(file) = Settings::from_file(&path)? {
                debug!("loaded settings from {}", path.display());
                settings = settings.merge(file);
            }
        }

        Self::resolve(settings, overrides)
    }

    /// Combine file settings with the environment and command-line overrides.
    pub fn resolve(settings: Settings, overrides: Overrides) -> Result<Self, ConfigError> {
        let provider = match overrides.provider {
            Some(p) => p,
            None => match env_var(PROVIDER_ENV_VAR).or(settings.provider) {
                Some(name) => name.parse::<Provider>()?,
                None => Provider::default(),
            },
        };

        let api_key = env_var(API_KEY_ENV_VAR)
            .or(settings.api_key)
            .filter(|k| !k.trim().is_empty());
        if provider.requires_api_key() && api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }

        let model = overrides
            .model
            .or_else(|| env_var(MODEL_ENV_VAR))
            .or(settings.model)
            .filter(|m| !m.trim().is_empty());

        let work_dir = overrides
            .work_dir
            .or_else(|| env_var(WORK_DIR_ENV_VAR).map(PathBuf::from))
            .or(settings.work_dir);

        Ok(Self {
            provider,
            api_key,
            model,
            base_url: env_var(BASE_URL_ENV_VAR).or(settings.base_url),
            work_dir,
            timeout: resolve_timeout(settings.timeout_secs),
        })
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
        }
    }
}

/// Settings files in the order they are applied.
pub fn settings_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("lazy-git").join("config.toml"));
    }
    paths.push(PathBuf::from(LOCAL_SETTINGS_FILE));
    paths
}

/// Read an environment variable, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Timeout from `LAZY_GIT_TIMEOUT`, else the settings file, else the default.
///
/// Logs a warning and falls back if either source is set but is not a
/// positive whole number of seconds.
fn resolve_timeout(from_file: Option<u64>) -> Duration {
    let fallback = match from_file {
        Some(0) => {
            warn!(
                "Invalid timeout_secs value '0' in settings, using {}s",
                DEFAULT_TIMEOUT_SECS
            );
            DEFAULT_TIMEOUT_SECS
        }
        Some(secs) => secs,
        None => DEFAULT_TIMEOUT_SECS,
    };

    match env_var(TIMEOUT_ENV_VAR) {
        Some(v) => match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using {}s",
                    TIMEOUT_ENV_VAR, v, fallback
                );
                Duration::from_secs(fallback)
            }
        },
        None => Duration::from_secs(fallback),
    }
}
