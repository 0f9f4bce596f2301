//! Healing engine orchestration
//!
//! Trial order per `heal` call: disabled check, cache probe, liveness
//! probe, then registered strategies in configured order with
//! first-success-wins fallthrough. Every failure path degrades to
//! returning the original selector with diagnostics; nothing here is
//! fatal to the calling test.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::HealingCache;
use crate::config::HealConfig;
use crate::errors::HealError;
use crate::page::PageQuery;
use crate::strategies::{build_registry, HealingStrategy};
use crate::tracker::FlakinessTracker;
use crate::types::{
    CacheHealth, EngineStatus, FlakinessItem, HealingResult, HealingStats, HealthReport,
    STRATEGY_ALL_FAILED, STRATEGY_CACHE, STRATEGY_DISABLED, STRATEGY_NO_HEALING_NEEDED,
};

#[derive(Debug, Default, Clone, Copy)]
struct StatsCounters {
    attempts: u64,
    successes: u64,
    failures: u64,
    cache_hits: u64,
}

/// Core healing engine
///
/// Owns its cache, flakiness tracker, stats, and strategy registry; none
/// of them outlive the engine or are shared across instances. Each
/// stateful collaborator sits behind its own lock so a single engine can
/// be shared by parallel test workers.
pub struct HealingEngine {
    config: HealConfig,
    cache: Mutex<HealingCache>,
    tracker: Mutex<FlakinessTracker>,
    stats: Mutex<StatsCounters>,
    strategies: RwLock<Vec<Arc<dyn HealingStrategy>>>,
}

impl HealingEngine {
    /// Create an engine from configuration
    pub fn new(config: HealConfig) -> Self {
        let strategies = build_registry(&config);
        debug!(
            "Healing engine initialized with {} strategies",
            strategies.len()
        );
        Self {
            config,
            cache: Mutex::new(HealingCache::new()),
            tracker: Mutex::new(FlakinessTracker::new()),
            stats: Mutex::new(StatsCounters::default()),
            strategies: RwLock::new(strategies),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &HealConfig {
        &self.config
    }

    /// Attempt to heal a broken selector.
    ///
    /// `expected_type` is a hint for strategies ("button", "input", ...)
    /// and may be ignored by them.
    pub async fn heal(
        &self,
        page: &dyn PageQuery,
        broken_selector: &str,
        expected_type: Option<&str>,
    ) -> HealingResult {
        if !self.config.enabled {
            return HealingResult::failed(
                broken_selector,
                STRATEGY_DISABLED,
                HealError::Disabled.to_string(),
            );
        }

        // Cache probe. A hit is not an attempt and leaves the tracker alone.
        if self.config.cache_healing {
            if let Some(cached) = self.cache_lookup(broken_selector) {
                info!("Cache hit for selector: {}", broken_selector);
                self.stats.lock().cache_hits += 1;
                return HealingResult::healed(cached, 1.0, STRATEGY_CACHE);
            }
        }

        // Liveness probe. Driver errors here mean "treat as missing".
        match page.exists(broken_selector).await {
            Ok(true) => {
                info!("Selector exists, no healing needed: {}", broken_selector);
                self.tracker.lock().record_success(broken_selector);
                return HealingResult::healed(broken_selector, 1.0, STRATEGY_NO_HEALING_NEEDED);
            }
            Ok(false) => {}
            Err(err) => debug!("Error checking selector existence: {}", err),
        }

        // One attempt per call, however many strategies get tried.
        self.stats.lock().attempts += 1;

        let strategies: Vec<Arc<dyn HealingStrategy>> = self.strategies.read().clone();
        for strategy in strategies {
            info!("Trying strategy: {}", strategy.name());
            match strategy.heal(page, broken_selector, expected_type).await {
                Ok(result) if result.success => {
                    info!(
                        "Healed '{}' to '{}' using {} (confidence: {:.2})",
                        broken_selector,
                        result.selector,
                        strategy.name(),
                        result.confidence
                    );
                    self.stats.lock().successes += 1;
                    self.tracker.lock().record_success(broken_selector);
                    if self.config.cache_healing {
                        self.cache
                            .lock()
                            .put(broken_selector, result.selector.clone());
                    }
                    return result;
                }
                Ok(result) => {
                    // Contract violation by a custom strategy; downgrade to a
                    // failed trial rather than aborting the healing attempt.
                    warn!(
                        "Strategy {} returned unsuccessful result: {:?}",
                        strategy.name(),
                        result.error
                    );
                }
                Err(err) => {
                    warn!("Strategy {} failed: {}", strategy.name(), err);
                }
            }
        }

        warn!("All healing strategies failed for: {}", broken_selector);
        self.stats.lock().failures += 1;
        self.tracker.lock().record_failure(broken_selector);

        HealingResult::failed(
            broken_selector,
            STRATEGY_ALL_FAILED,
            HealError::AllStrategiesExhausted.to_string(),
        )
    }

    fn cache_lookup(&self, selector: &str) -> Option<String> {
        let mut cache = self.cache.lock();
        let hit = cache.get(selector).map(str::to_string)?;
        cache.record_use(selector);
        Some(hit)
    }

    /// Register a strategy by name.
    ///
    /// Overwriting an existing name keeps its position in the trial
    /// order; a new name is appended after the existing strategies.
    pub fn register_strategy(&self, strategy: Arc<dyn HealingStrategy>) {
        let mut registry = self.strategies.write();
        let name = strategy.name();
        match registry.iter().position(|s| s.name() == name) {
            Some(index) => registry[index] = strategy,
            None => registry.push(strategy),
        }
        info!("Registered healing strategy: {}", name);
    }

    /// Flakiness snapshot, most flaky selector first
    pub fn get_flakiness_stats(&self) -> Vec<FlakinessItem> {
        self.tracker.lock().snapshot()
    }

    /// Aggregate stats with a fresh flakiness snapshot
    pub fn get_stats(&self) -> HealingStats {
        let counters = *self.stats.lock();
        HealingStats {
            attempts: counters.attempts,
            successes: counters.successes,
            failures: counters.failures,
            cache_hits: counters.cache_hits,
            flaky_selectors: self.get_flakiness_stats(),
        }
    }

    /// Pure read of engine health: status, strategy roster, cache usage
    pub fn health_check(&self) -> HealthReport {
        let cache = self.cache.lock();
        HealthReport {
            status: if self.config.enabled {
                EngineStatus::Healthy
            } else {
                EngineStatus::Disabled
            },
            strategies: self
                .strategies
                .read()
                .iter()
                .map(|s| s.name().to_string())
                .collect(),
            cache: CacheHealth {
                size: cache.len(),
                most_used: cache.top_used(5),
            },
        }
    }

    /// Empty the healing cache; flakiness history is untouched
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
        info!("Healing cache cleared");
    }
}

impl Default for HealingEngine {
    fn default() -> Self {
        Self::new(HealConfig::default())
    }
}
