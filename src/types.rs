//! Core types for the healing engine

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pseudo-strategy name reported on a cache hit
pub const STRATEGY_CACHE: &str = "cache";

/// Pseudo-strategy name reported when the selector still resolves
pub const STRATEGY_NO_HEALING_NEEDED: &str = "no-healing-needed";

/// Pseudo-strategy name reported when healing is disabled
pub const STRATEGY_DISABLED: &str = "disabled";

/// Pseudo-strategy name reported when every strategy failed
pub const STRATEGY_ALL_FAILED: &str = "all-strategies-failed";

/// Outcome of one healing attempt
///
/// On success `selector` carries the healed selector; on failure it
/// echoes the original broken selector and `error` explains why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingResult {
    /// Whether healing succeeded
    pub success: bool,

    /// Healed selector, or the original selector on failure
    pub selector: String,

    /// Confidence score (0.0-1.0)
    pub confidence: f64,

    /// Name of the strategy (or pseudo-strategy) that produced this result
    pub strategy: String,

    /// Runner-up candidate selectors, descending confidence
    #[serde(default)]
    pub alternatives: Vec<String>,

    /// Strategy-specific diagnostic data
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Error message, present iff `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealingResult {
    /// Create a successful result
    pub fn healed(selector: impl Into<String>, confidence: f64, strategy: &str) -> Self {
        Self {
            success: true,
            selector: selector.into(),
            confidence,
            strategy: strategy.to_string(),
            alternatives: Vec::new(),
            metadata: HashMap::new(),
            error: None,
        }
    }

    /// Create a failed result echoing the original selector
    pub fn failed(selector: impl Into<String>, strategy: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            selector: selector.into(),
            confidence: 0.0,
            strategy: strategy.to_string(),
            alternatives: Vec::new(),
            metadata: HashMap::new(),
            error: Some(error.into()),
        }
    }

    /// Attach runner-up candidates
    pub fn with_alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// Per-selector reliability snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlakinessItem {
    /// The selector being tracked
    pub selector: String,

    /// Number of recorded successes
    pub successes: u64,

    /// Number of recorded failures
    pub failures: u64,

    /// failures / (successes + failures), 0.0 when nothing recorded
    pub flakiness_score: f64,
}

/// Aggregate healing statistics for one engine instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealingStats {
    /// Number of heal calls that reached the strategy loop
    pub attempts: u64,

    /// Number of heal calls resolved by a strategy
    pub successes: u64,

    /// Number of heal calls where every strategy failed
    pub failures: u64,

    /// Number of heal calls served from the cache
    pub cache_hits: u64,

    /// Per-selector reliability, most flaky first
    #[serde(default)]
    pub flaky_selectors: Vec<FlakinessItem>,
}

impl HealingStats {
    /// successes / attempts, 0.0 before the first attempt
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.attempts as f64
    }

    /// Mean flakiness score across tracked selectors, 0.0 when empty
    pub fn flakiness(&self) -> f64 {
        if self.flaky_selectors.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.flaky_selectors.iter().map(|i| i.flakiness_score).sum();
        sum / self.flaky_selectors.len() as f64
    }
}

/// Engine status reported by the health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Healthy,
    Disabled,
}

/// One cache entry in the health report, with its hit count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheUse {
    pub selector: String,
    pub uses: u64,
}

/// Cache portion of the health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheHealth {
    /// Number of cached healed selectors
    pub size: usize,

    /// Up to five most-used entries, descending hit count
    pub most_used: Vec<CacheUse>,
}

/// Health check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall engine status
    pub status: EngineStatus,

    /// Registered strategy names in trial order
    pub strategies: Vec<String>,

    /// Cache occupancy and usage
    pub cache: CacheHealth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healed_result_has_no_error() {
        let result = HealingResult::healed("[data-testid=\"ok\"]", 0.9, "data-testid-recovery");
        assert!(result.success);
        assert!(result.error.is_none());
        assert!(result.alternatives.is_empty());
    }

    #[test]
    fn test_failed_result_echoes_selector() {
        let result = HealingResult::failed("#gone", STRATEGY_ALL_FAILED, "nope");
        assert!(!result.success);
        assert_eq!(result.selector, "#gone");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.error.as_deref(), Some("nope"));
    }

    #[test]
    fn test_success_rate_and_flakiness_defaults() {
        let stats = HealingStats::default();
        assert_eq!(stats.success_rate(), 0.0);
        assert_eq!(stats.flakiness(), 0.0);
    }

    #[test]
    fn test_success_rate() {
        let stats = HealingStats {
            attempts: 4,
            successes: 3,
            ..Default::default()
        };
        assert!((stats.success_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_engine_status_serialization() {
        let json = serde_json::to_string(&EngineStatus::Healthy).unwrap();
        assert_eq!(json, "\"healthy\"");
        let json = serde_json::to_string(&EngineStatus::Disabled).unwrap();
        assert_eq!(json, "\"disabled\"");
    }
}
