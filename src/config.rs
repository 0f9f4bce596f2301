//! Configuration for the healing engine
//!
//! A `HealConfig` value is handed to the engine at construction; there is
//! no process-wide singleton. `from_env` layers environment overrides on
//! top of the defaults for runner integration.

use serde::{Deserialize, Serialize};

use crate::strategies;

/// Healing engine configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealConfig {
    /// Master switch; when false every heal call short-circuits
    pub enabled: bool,

    /// Strategy names in trial order; unknown names are ignored
    pub strategies: Vec<String>,

    /// Whether successful heals are cached
    pub cache_healing: bool,

    /// Endpoint for the AI-powered strategy
    pub ollama_url: String,

    /// Model identifier for the AI-powered strategy
    pub ollama_model: String,

    /// Timeout for AI-powered strategy calls, in milliseconds
    pub ollama_timeout_ms: u64,
}

impl Default for HealConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategies: strategies::default_strategy_names(),
            cache_healing: true,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.1:8b".to_string(),
            ollama_timeout_ms: 30_000,
        }
    }
}

impl HealConfig {
    /// Defaults overlaid with environment variables where set.
    ///
    /// Recognized: `HEALING_ENABLED`, `HEALING_STRATEGIES` (comma
    /// separated), `HEALING_CACHE`, `OLLAMA_URL`, `OLLAMA_MODEL`,
    /// `OLLAMA_TIMEOUT`. Unparseable values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(enabled) = std::env::var("HEALING_ENABLED") {
            config.enabled = parse_bool(&enabled);
        }
        if let Ok(list) = std::env::var("HEALING_STRATEGIES") {
            config.strategies = list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(cache) = std::env::var("HEALING_CACHE") {
            config.cache_healing = parse_bool(&cache);
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.ollama_url = url;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            config.ollama_model = model;
        }
        if let Ok(timeout) = std::env::var("OLLAMA_TIMEOUT") {
            if let Ok(ms) = timeout.parse() {
                config.ollama_timeout_ms = ms;
            }
        }
        config
    }

    /// Disable healing (builder-style, mainly for tests)
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Disable caching of healed selectors
    pub fn without_cache(mut self) -> Self {
        self.cache_healing = false;
        self
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
