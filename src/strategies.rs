//! Healing strategies
//!
//! Strategies run strictly sequentially in configured order; the first
//! success wins. Only test-id recovery is implemented today, the other
//! three reserve their names and position in the trial order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::HealConfig;
use crate::errors::HealError;
use crate::page::PageQuery;
use crate::similarity::similarity;
use crate::types::HealingResult;

/// Attribute names conventionally used for test-oriented identifiers
pub const TEST_ID_ATTRIBUTES: [&str; 5] =
    ["data-testid", "data-test-id", "data-cy", "data-test", "testid"];

/// Minimum similarity for a candidate to be considered, exclusive
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Strategy trait for selector healing
///
/// A strategy either heals (`Ok`, always `success: true`) or reports why
/// it could not (`Err`). The engine maps `Err` to a failed trial and
/// moves on to the next strategy; nothing a strategy does can abort the
/// whole healing attempt.
#[async_trait]
pub trait HealingStrategy: Send + Sync {
    /// Registry name, also reported in healing results
    fn name(&self) -> &'static str;

    /// Attempt to heal a broken selector against the live page
    async fn heal(
        &self,
        page: &dyn PageQuery,
        broken_selector: &str,
        expected_type: Option<&str>,
    ) -> Result<HealingResult, HealError>;
}

/// Default strategy names in trial order
pub fn default_strategy_names() -> Vec<String> {
    vec![
        "data-testid-recovery".to_string(),
        "text-content-matching".to_string(),
        "css-hierarchy-analysis".to_string(),
        "ai-powered-analysis".to_string(),
    ]
}

/// Build the strategy registry from configuration.
///
/// Unknown strategy names are skipped without error so a runner can ship
/// a forward-compatible strategy list.
pub fn build_registry(config: &HealConfig) -> Vec<Arc<dyn HealingStrategy>> {
    let mut registry: Vec<Arc<dyn HealingStrategy>> = Vec::new();
    for name in &config.strategies {
        match name.as_str() {
            "data-testid-recovery" => registry.push(Arc::new(TestIdRecoveryStrategy)),
            "text-content-matching" => registry.push(Arc::new(TextContentMatchingStrategy)),
            "css-hierarchy-analysis" => registry.push(Arc::new(CssHierarchyAnalysisStrategy)),
            "ai-powered-analysis" => registry.push(Arc::new(AiPoweredAnalysisStrategy::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
                Duration::from_millis(config.ollama_timeout_ms),
            ))),
            other => debug!("Ignoring unknown healing strategy: {}", other),
        }
    }
    registry
}

/// Recovers test-id selectors by fuzzy-matching against every test-id
/// attribute present on the page.
pub struct TestIdRecoveryStrategy;

struct ScoredCandidate {
    selector: String,
    test_id: String,
    score: f64,
}

#[async_trait]
impl HealingStrategy for TestIdRecoveryStrategy {
    fn name(&self) -> &'static str {
        "data-testid-recovery"
    }

    async fn heal(
        &self,
        page: &dyn PageQuery,
        broken_selector: &str,
        _expected_type: Option<&str>,
    ) -> Result<HealingResult, HealError> {
        let test_id = extract_test_id(broken_selector).ok_or(HealError::NoPatternFound)?;
        debug!("Extracted test ID '{}' from broken selector", test_id);

        let mut candidates: Vec<ScoredCandidate> = Vec::new();
        for attr in TEST_ID_ATTRIBUTES {
            let elements = page.query_all(&format!("[{}]", attr)).await?;
            for element in &elements {
                let Some(value) = page.get_attribute(element, attr).await? else {
                    continue;
                };
                let score = similarity(&test_id, &value);
                if score > SIMILARITY_THRESHOLD {
                    candidates.push(ScoredCandidate {
                        selector: format!("[{}=\"{}\"]", attr, value),
                        test_id: value,
                        score,
                    });
                }
            }
        }

        // Stable sort keeps insertion order for equal scores.
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let Some(best) = candidates.first() else {
            return Err(HealError::NoCandidateFound);
        };

        let alternatives: Vec<String> = candidates[1..]
            .iter()
            .filter(|c| c.selector != best.selector)
            .take(4)
            .map(|c| c.selector.clone())
            .collect();

        Ok(
            HealingResult::healed(best.selector.clone(), best.score, self.name())
                .with_alternatives(alternatives)
                .with_metadata("original_test_id", json!(test_id))
                .with_metadata("found_test_id", json!(best.test_id)),
        )
    }
}

/// Pull a test-id token out of a selector.
///
/// Scans for each known attribute in `attr="value"` or `attr='value'`
/// form and returns the first value found. Attribute order matters:
/// `data-test` only matches when immediately followed by `=`, so it does
/// not shadow `data-testid`.
fn extract_test_id(selector: &str) -> Option<String> {
    for attr in TEST_ID_ATTRIBUTES {
        for (pos, _) in selector.match_indices(attr) {
            let rest = &selector[pos + attr.len()..];
            let Some(rest) = rest.strip_prefix('=') else {
                continue;
            };
            let quote = match rest.chars().next() {
                Some(q @ ('"' | '\'')) => q,
                _ => continue,
            };
            let body = &rest[1..];
            if let Some(end) = body.find(quote) {
                if end > 0 {
                    return Some(body[..end].to_string());
                }
            }
        }
    }
    None
}

/// Placeholder: match elements by visible text content.
pub struct TextContentMatchingStrategy;

#[async_trait]
impl HealingStrategy for TextContentMatchingStrategy {
    fn name(&self) -> &'static str {
        "text-content-matching"
    }

    async fn heal(
        &self,
        _page: &dyn PageQuery,
        _broken_selector: &str,
        _expected_type: Option<&str>,
    ) -> Result<HealingResult, HealError> {
        Err(HealError::StrategyFailed {
            strategy: self.name().to_string(),
            reason: "Text content matching implementation in progress".to_string(),
        })
    }
}

/// Placeholder: analyze DOM hierarchy around the broken selector.
pub struct CssHierarchyAnalysisStrategy;

#[async_trait]
impl HealingStrategy for CssHierarchyAnalysisStrategy {
    fn name(&self) -> &'static str {
        "css-hierarchy-analysis"
    }

    async fn heal(
        &self,
        _page: &dyn PageQuery,
        _broken_selector: &str,
        _expected_type: Option<&str>,
    ) -> Result<HealingResult, HealError> {
        Err(HealError::StrategyFailed {
            strategy: self.name().to_string(),
            reason: "CSS hierarchy analysis implementation in progress".to_string(),
        })
    }
}

/// Placeholder: ask a local model for selector suggestions.
pub struct AiPoweredAnalysisStrategy {
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl AiPoweredAnalysisStrategy {
    /// Create the strategy with its endpoint, model, and request timeout
    pub fn new(endpoint: String, model: String, timeout: Duration) -> Self {
        Self {
            endpoint,
            model,
            timeout,
        }
    }

    /// Configured endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl HealingStrategy for AiPoweredAnalysisStrategy {
    fn name(&self) -> &'static str {
        "ai-powered-analysis"
    }

    async fn heal(
        &self,
        _page: &dyn PageQuery,
        _broken_selector: &str,
        _expected_type: Option<&str>,
    ) -> Result<HealingResult, HealError> {
        Err(HealError::StrategyFailed {
            strategy: self.name().to_string(),
            reason: "AI-powered analysis implementation in progress".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_test_id_double_quotes() {
        assert_eq!(
            extract_test_id("[data-testid=\"submit-btn\"]"),
            Some("submit-btn".to_string())
        );
    }

    #[test]
    fn test_extract_test_id_single_quotes() {
        assert_eq!(
            extract_test_id("[data-cy='login-form']"),
            Some("login-form".to_string())
        );
    }

    #[test]
    fn test_extract_test_id_prefers_attribute_order() {
        // data-testid is checked before data-test
        assert_eq!(
            extract_test_id("[data-test=\"a\"][data-testid=\"b\"]"),
            Some("b".to_string())
        );
    }

    #[test]
    fn test_extract_test_id_no_pattern() {
        assert_eq!(extract_test_id("#plain-id"), None);
        assert_eq!(extract_test_id(".btn.primary"), None);
        assert_eq!(extract_test_id("[data-testid=\"\"]"), None);
    }

    #[test]
    fn test_extract_test_id_not_shadowed_by_prefix() {
        // "data-test" must not consume "data-testid=..."
        assert_eq!(
            extract_test_id("[data-testid='x']"),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_build_registry_skips_unknown_names() {
        let config = HealConfig {
            strategies: vec![
                "data-testid-recovery".to_string(),
                "does-not-exist".to_string(),
                "ai-powered-analysis".to_string(),
            ],
            ..Default::default()
        };
        let registry = build_registry(&config);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry[0].name(), "data-testid-recovery");
        assert_eq!(registry[1].name(), "ai-powered-analysis");
    }

    #[test]
    fn test_default_strategy_order() {
        let names = default_strategy_names();
        assert_eq!(
            names,
            vec![
                "data-testid-recovery",
                "text-content-matching",
                "css-hierarchy-analysis",
                "ai-powered-analysis",
            ]
        );
    }
}
