//! End-to-end healing flows against an in-memory page double.

use std::collections::HashSet;

use async_trait::async_trait;
use selector_healer::{
    DriverError, ElementHandle, HealConfig, HealingEngine, PageQuery, STRATEGY_ALL_FAILED,
    STRATEGY_CACHE, STRATEGY_NO_HEALING_NEEDED,
};

/// Page double backed by a fixed selector set and a flat list of
/// attribute-carrying elements.
#[derive(Default)]
struct FakePage {
    existing: HashSet<String>,
    elements: Vec<(String, String)>,
}

impl FakePage {
    fn with_elements(elements: &[(&str, &str)]) -> Self {
        Self {
            elements: elements
                .iter()
                .map(|(a, v)| (a.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    fn with_existing(selectors: &[&str]) -> Self {
        Self {
            existing: selectors.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PageQuery for FakePage {
    async fn exists(&self, selector: &str) -> Result<bool, DriverError> {
        Ok(self.existing.contains(selector))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, DriverError> {
        let attr = selector
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| DriverError::InvalidSelector(selector.to_string()))?;
        Ok(self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, (a, _))| a == attr)
            .map(|(i, _)| ElementHandle::new(format!("el-{}", i)))
            .collect())
    }

    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let index: usize = element
            .id
            .strip_prefix("el-")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| DriverError::Io(format!("unknown element {}", element.id)))?;
        Ok(self
            .elements
            .get(index)
            .filter(|(a, _)| a == name)
            .map(|(_, v)| v.clone()))
    }
}

#[tokio::test]
async fn heals_renamed_test_id() {
    let engine = HealingEngine::default();
    let page = FakePage::with_elements(&[("data-testid", "submit-button")]);

    let result = engine.heal(&page, "[data-testid=\"submit-btn\"]", None).await;

    assert!(result.success);
    assert_eq!(result.strategy, "data-testid-recovery");
    assert_eq!(result.selector, "[data-testid=\"submit-button\"]");
    // distance 3 over max length 13
    assert!((result.confidence - (1.0 - 3.0 / 13.0)).abs() < 1e-9);
    assert!(result.confidence > 0.6);
    assert_eq!(
        result.metadata.get("original_test_id").unwrap(),
        "submit-btn"
    );
    assert_eq!(
        result.metadata.get("found_test_id").unwrap(),
        "submit-button"
    );
}

#[tokio::test]
async fn ranks_candidates_and_reports_alternatives() {
    let engine = HealingEngine::default();
    let page = FakePage::with_elements(&[
        ("data-testid", "submit-button"),
        ("data-testid", "submit-btn-x"),
        ("data-testid", "cancel-button"),
        ("data-cy", "submit-btn2"),
    ]);

    let result = engine.heal(&page, "[data-testid=\"submit-btn\"]", None).await;

    assert!(result.success);
    // submit-btn2 under data-cy is the closest value overall (distance 1)
    assert_eq!(result.selector, "[data-cy=\"submit-btn2\"]");
    assert_eq!(
        result.alternatives,
        vec![
            "[data-testid=\"submit-btn-x\"]".to_string(),
            "[data-testid=\"submit-button\"]".to_string(),
        ]
    );
    // cancel-button is well under the 0.6 threshold
    assert!(!result
        .alternatives
        .iter()
        .any(|s| s.contains("cancel-button")));
    // the winner never shows up among its own alternatives
    assert!(!result.alternatives.contains(&result.selector));
}

#[tokio::test]
async fn threshold_is_strict() {
    let engine = HealingEngine::default();
    // similarity("abcde", "abcxy") == 0.6 exactly; must be excluded
    let page = FakePage::with_elements(&[("data-testid", "abcxy")]);

    let result = engine.heal(&page, "[data-testid=\"abcde\"]", None).await;

    assert!(!result.success);
    assert_eq!(result.strategy, STRATEGY_ALL_FAILED);
}

#[tokio::test]
async fn live_selector_short_circuits_strategies() {
    let engine = HealingEngine::default();
    let page = FakePage::with_existing(&["[data-testid=\"ok\"]"]);

    let result = engine.heal(&page, "[data-testid=\"ok\"]", None).await;

    assert!(result.success);
    assert_eq!(result.strategy, STRATEGY_NO_HEALING_NEEDED);
    assert_eq!(result.selector, "[data-testid=\"ok\"]");
    assert_eq!(result.confidence, 1.0);
    assert_eq!(engine.get_stats().attempts, 0);
}

#[tokio::test]
async fn repeated_heals_hit_the_cache_once_per_call() {
    let engine = HealingEngine::default();
    let page = FakePage::with_elements(&[("data-testid", "submit-button")]);

    let first = engine.heal(&page, "[data-testid=\"submit-btn\"]", None).await;
    assert_eq!(first.strategy, "data-testid-recovery");

    for expected_hits in 1..=3u64 {
        let again = engine.heal(&page, "[data-testid=\"submit-btn\"]", None).await;
        assert!(again.success);
        assert_eq!(again.strategy, STRATEGY_CACHE);
        assert_eq!(again.selector, "[data-testid=\"submit-button\"]");
        assert_eq!(again.confidence, 1.0);
        assert_eq!(engine.get_stats().cache_hits, expected_hits);
    }

    // The strategy ran exactly once; the rest came from the cache.
    let stats = engine.get_stats();
    assert_eq!(stats.attempts, 1);
    assert_eq!(stats.successes, 1);
}

#[tokio::test]
async fn page_without_test_ids_exhausts_all_strategies() {
    let engine = HealingEngine::default();
    let page = FakePage::default();

    let result = engine.heal(&page, "[data-testid=\"submit-btn\"]", None).await;

    assert!(!result.success);
    assert_eq!(result.strategy, STRATEGY_ALL_FAILED);
    assert_eq!(result.selector, "[data-testid=\"submit-btn\"]");
    assert_eq!(
        result.error.as_deref(),
        Some("Unable to heal selector with any strategy")
    );
    assert_eq!(result.confidence, 0.0);
}

#[tokio::test]
async fn caching_can_be_disabled() {
    let engine = HealingEngine::new(HealConfig::default().without_cache());
    let page = FakePage::with_elements(&[("data-testid", "submit-button")]);

    let first = engine.heal(&page, "[data-testid=\"submit-btn\"]", None).await;
    assert!(first.success);

    let second = engine.heal(&page, "[data-testid=\"submit-btn\"]", None).await;
    assert!(second.success);
    // Strategy runs again instead of serving from cache.
    assert_eq!(second.strategy, "data-testid-recovery");

    let stats = engine.get_stats();
    assert_eq!(stats.cache_hits, 0);
    assert_eq!(stats.attempts, 2);
    assert_eq!(engine.health_check().cache.size, 0);
}
