//! Configuration resolution for atelier-cp
//!
//! Settings resolve with ENV → TOML → default priority. API keys may
//! arrive from either tier; when both carry a value a warning is logged
//! and the environment wins.

use atelier_common::config::TomlConfig;
use tracing::{info, warn};

const CONFIG_ENV_VAR: &str = "ATELIER_CP_CONFIG";
const MODULE_NAME: &str = "atelier-cp";

const DEFAULT_PORT: u16 = 5731;
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// LLM backend settings
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl LlmSettings {
    /// The LLM strategy is only constructed when a key is configured
    pub fn enabled(&self) -> bool {
        self.api_key.as_deref().map(is_valid_key).unwrap_or(false)
    }
}

/// Source adapter settings
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub wikidata_enabled: bool,
    pub getty_enabled: bool,
    /// Europeana requires an API key; absent key disables the adapter
    pub europeana_api_key: Option<String>,
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct CpConfig {
    pub listen_port: u16,
    pub log_filter: String,
    pub llm: LlmSettings,
    pub sources: SourceSettings,
}

impl CpConfig {
    /// Resolve configuration from environment and TOML
    pub fn resolve() -> atelier_common::Result<Self> {
        let toml_config = atelier_common::config::load_module_config(CONFIG_ENV_VAR, MODULE_NAME)?;
        Ok(Self::from_parts(toml_config))
    }

    fn from_parts(toml_config: TomlConfig) -> Self {
        let listen_port = std::env::var("ATELIER_CP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .or(toml_config.listen_port)
            .unwrap_or(DEFAULT_PORT);

        let llm_api_key = resolve_key(
            "LLM",
            std::env::var("ATELIER_LLM_API_KEY").ok(),
            toml_config.llm_api_key.clone(),
        );
        let europeana_api_key = resolve_key(
            "Europeana",
            std::env::var("ATELIER_EUROPEANA_API_KEY").ok(),
            toml_config.europeana_api_key.clone(),
        );

        let llm = LlmSettings {
            base_url: std::env::var("ATELIER_LLM_BASE_URL")
                .ok()
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            api_key: llm_api_key,
            model: std::env::var("ATELIER_LLM_MODEL")
                .ok()
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        };

        if llm.enabled() {
            info!("LLM scoring enabled (model: {})", llm.model);
        } else {
            info!("LLM API key not configured; scoring uses the heuristic strategy only");
        }

        let sources = SourceSettings {
            wikidata_enabled: env_flag("ATELIER_SOURCE_WIKIDATA", true),
            getty_enabled: env_flag("ATELIER_SOURCE_GETTY", true),
            europeana_api_key,
        };

        if sources.europeana_api_key.is_none() {
            warn!("Europeana API key not configured; Europeana source disabled");
        }

        Self {
            listen_port,
            log_filter: toml_config.logging.level,
            llm,
            sources,
        }
    }
}

/// Resolve an API key with ENV → TOML priority, warning when both are set
fn resolve_key(label: &str, env_key: Option<String>, toml_key: Option<String>) -> Option<String> {
    let env_valid = env_key.as_deref().map(is_valid_key).unwrap_or(false);
    let toml_valid = toml_key.as_deref().map(is_valid_key).unwrap_or(false);

    if env_valid && toml_valid {
        warn!(
            "{} API key found in both environment and TOML; using environment (highest priority)",
            label
        );
    }

    if env_valid {
        info!("{} API key loaded from environment variable", label);
        return env_key;
    }
    if toml_valid {
        info!("{} API key loaded from TOML config", label);
        return toml_key;
    }
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn env_flag(var: &str, default: bool) -> bool {
    match std::env::var(var) {
        Ok(value) => !matches!(
            value.trim().to_lowercase().as_str(),
            "0" | "false" | "off" | "no"
        ),
        Err(_) => default,
    }
}
