//! File configuration for CLI defaults.
//!
//! Read from `$XDG_CONFIG_HOME/datos/config.toml`, falling back to
//! `$HOME/.config/datos/config.toml`. Every key is optional; command-line
//! flags override whatever the file sets.
//!
//! ```toml
//! base_url = "https://datosabiertos.gob.pe"
//! destination = "datasets"
//! skip_existing = true
//! verify_ssl = true
//! max_size = 50000000      # bytes, negative for unlimited
//! timeout_secs = 30
//! request_delay_ms = 1000
//! report_errors = true
//! log_dir = "logs"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors produced while loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {value}. Expected range: {expected}")]
    Invalid {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// TOML-backed defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatosConfig {
    /// Portal origin.
    pub base_url: Option<String>,
    /// Root directory for downloaded datasets.
    pub destination: Option<PathBuf>,
    pub skip_existing: Option<bool>,
    pub verify_ssl: Option<bool>,
    /// Size ceiling in bytes; negative means unlimited.
    pub max_size: Option<i64>,
    /// Per-request timeout (1..=3600).
    pub timeout_secs: Option<u64>,
    /// Pause after each download and between search expansions (0..=60000).
    pub request_delay_ms: Option<u64>,
    pub report_errors: Option<bool>,
    /// Directory for dated error logs; unset logs failures through tracing only.
    pub log_dir: Option<PathBuf>,
}

impl DatosConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys, and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates values against runtime and CLI constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.timeout_secs
            && !(1..=3600).contains(&timeout)
        {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                value: timeout.to_string(),
                expected: "1..=3600",
            });
        }
        if let Some(delay) = self.request_delay_ms
            && delay > 60_000
        {
            return Err(ConfigError::Invalid {
                field: "request_delay_ms",
                value: delay.to_string(),
                expected: "0..=60000",
            });
        }
        if let Some(base_url) = &self.base_url
            && url::Url::parse(base_url).is_err()
        {
            return Err(ConfigError::Invalid {
                field: "base_url",
                value: base_url.clone(),
                expected: "an absolute http(s) URL",
            });
        }
        Ok(())
    }

    /// Size ceiling with negative values mapped to unlimited.
    #[must_use]
    pub fn max_size_limit(&self) -> Option<u64> {
        self.max_size.and_then(size_limit)
    }
}

/// Maps a signed size to a ceiling; negative means unlimited.
#[must_use]
pub fn size_limit(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed config when the file exists.
    pub config: Option<DatosConfig>,
}

impl LoadedConfig {
    /// The parsed config, or all-defaults when no file was found.
    #[must_use]
    pub fn config_or_default(&self) -> DatosConfig {
        self.config.clone().unwrap_or_default()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/datos/config.toml`
/// 2. `$HOME/.config/datos/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join("datos").join("config.toml"));
    }
    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("datos")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file exists but is unreadable or invalid.
pub fn load_default_config() -> Result<LoadedConfig, ConfigError> {
    let path = resolve_default_config_path();
    match path.as_deref() {
        Some(existing) if existing.exists() => {
            let config = load_config(existing)?;
            Ok(LoadedConfig {
                path,
                config: Some(config),
            })
        }
        _ => Ok(LoadedConfig { path, config: None }),
    }
}

/// Loads and validates the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file is unreadable or invalid.
pub fn load_config(path: &Path) -> Result<DatosConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    DatosConfig::from_toml_str(&raw, path)
}
