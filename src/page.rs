//! Page collaborator traits and the auto-healing page facade
//!
//! The engine only needs the read side (`PageQuery`); the facade also
//! needs the action primitives (`PageDriver`). Drivers adapt whatever
//! automation backend the test suite runs on.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::HealConfig;
use crate::engine::HealingEngine;
use crate::errors::DriverError;
use crate::types::{FlakinessItem, HealingStats, STRATEGY_NO_HEALING_NEEDED};

/// Opaque reference to an element enumerated by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Driver-scoped element identifier
    pub id: String,
}

impl ElementHandle {
    /// Wrap a driver element identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Read-only page queries consumed by the engine and strategies
#[async_trait]
pub trait PageQuery: Send + Sync {
    /// Whether any element matches the selector
    async fn exists(&self, selector: &str) -> Result<bool, DriverError>;

    /// Enumerate elements matching an attribute selector like `[data-testid]`
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, DriverError>;

    /// Read an attribute off an enumerated element
    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError>;
}

/// Action primitives layered on top of the query surface
#[async_trait]
pub trait PageDriver: PageQuery {
    /// Navigate to a URL
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// Click the element matching the selector
    async fn click(&self, selector: &str) -> Result<(), DriverError>;

    /// Fill the element matching the selector with a value
    async fn fill(&self, selector: &str, value: &str) -> Result<(), DriverError>;
}

/// Page facade that routes every action through the healing engine.
///
/// When healing fails the facade proceeds with the original selector and
/// lets the downstream action fail on its own terms.
pub struct HealingPage<D: PageDriver> {
    driver: D,
    engine: HealingEngine,
}

impl<D: PageDriver> HealingPage<D> {
    /// Wrap a driver with a default-configured engine
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, HealConfig::default())
    }

    /// Wrap a driver with explicit healing configuration
    pub fn with_config(driver: D, config: HealConfig) -> Self {
        Self {
            driver,
            engine: HealingEngine::new(config),
        }
    }

    /// Navigate to a URL (no healing involved)
    pub async fn goto(&self, url: &str) -> Result<(), DriverError> {
        info!("Navigating to: {}", url);
        self.driver.goto(url).await
    }

    /// Click with auto-healing
    pub async fn click(&self, selector: &str) -> Result<(), DriverError> {
        let healed = self.heal_selector(selector, Some("button")).await;
        info!("Clicking: {}", healed);
        self.driver.click(&healed).await
    }

    /// Fill with auto-healing
    pub async fn fill(&self, selector: &str, value: &str) -> Result<(), DriverError> {
        let healed = self.heal_selector(selector, Some("input")).await;
        info!("Filling {} with: {}", healed, value);
        self.driver.fill(&healed, value).await
    }

    /// Resolve a selector through the engine without acting on it
    pub async fn resolve(&self, selector: &str) -> String {
        self.heal_selector(selector, None).await
    }

    /// Aggregate healing statistics
    pub fn healing_stats(&self) -> HealingStats {
        self.engine.get_stats()
    }

    /// Flakiness snapshot, most flaky selector first
    pub fn flakiness_stats(&self) -> Vec<FlakinessItem> {
        self.engine.get_flakiness_stats()
    }

    /// Empty the healing cache
    pub fn clear_healing_cache(&self) {
        self.engine.clear_cache();
    }

    /// The healing engine backing this page
    pub fn engine(&self) -> &HealingEngine {
        &self.engine
    }

    /// The wrapped driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    async fn heal_selector(&self, selector: &str, expected_type: Option<&str>) -> String {
        let result = self.engine.heal(&self.driver, selector, expected_type).await;
        if result.success {
            if result.strategy != STRATEGY_NO_HEALING_NEEDED {
                info!(
                    "Healed '{}' to '{}' using {}",
                    selector, result.selector, result.strategy
                );
            }
            result.selector
        } else {
            warn!(
                "Failed to heal '{}': {}",
                selector,
                result.error.as_deref().unwrap_or("unknown")
            );
            selector.to_string()
        }
    }
}
