//! Configuration file loading and path resolution
//!
//! Resolution priority for the config file location:
//! 1. Environment variable (explicit path, highest priority)
//! 2. User config directory (~/.config/atelier/<module>.toml)
//! 3. System config directory (/etc/atelier/<module>.toml, Linux only)
//!
//! Individual settings may additionally be overridden by environment
//! variables; that resolution lives with the service's own config module.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Logging section of the TOML config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter directive (e.g. "info", "atelier_cp=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Contents of a service TOML config file
///
/// All fields are optional; the service applies its own defaults and env
/// overrides on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// HTTP listen port
    pub listen_port: Option<u16>,

    /// API key for the LLM backend
    pub llm_api_key: Option<String>,

    /// API key for the Europeana aggregator
    pub europeana_api_key: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Resolve the config file path for a module
///
/// Returns None when no config file exists anywhere in the search path;
/// callers fall back to compiled defaults in that case.
pub fn resolve_config_path(env_var: &str, module: &str) -> Option<PathBuf> {
    // Priority 1: explicit path from environment
    if let Ok(path) = std::env::var(env_var) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!(
            "Config path from {} does not exist: {}",
            env_var,
            path.display()
        );
    }

    // Priority 2: user config directory
    if let Some(dir) = dirs::config_dir() {
        let path = dir.join("atelier").join(format!("{}.toml", module));
        if path.exists() {
            return Some(path);
        }
    }

    // Priority 3: system config directory (Linux)
    if cfg!(target_os = "linux") {
        let path = PathBuf::from("/etc/atelier").join(format!("{}.toml", module));
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load a module's TOML config, falling back to defaults when absent
///
/// A malformed file is an error; a missing file is not.
pub fn load_module_config(env_var: &str, module: &str) -> Result<TomlConfig> {
    match resolve_config_path(env_var, module) {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            load_toml_config(&path)
        }
        None => {
            tracing::info!("No config file found for {}; using defaults", module);
            Ok(TomlConfig::default())
        }
    }
}
