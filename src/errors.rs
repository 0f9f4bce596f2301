//! Error types for the healing engine

use thiserror::Error;

/// Errors raised by the page-automation driver.
///
/// The engine never propagates these to callers: a driver failure during
/// the liveness probe is treated as "selector does not exist", and a
/// driver failure inside a strategy is downgraded to that strategy's
/// failure.
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// The selector could not be parsed by the driver
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// The navigation context backing the page is gone
    #[error("Navigation context lost: {0}")]
    ContextLost(String),

    /// Transport-level failure talking to the browser
    #[error("Driver I/O error: {0}")]
    Io(String),
}

/// Healing error enumeration
#[derive(Debug, Error, Clone)]
pub enum HealError {
    /// Healing is switched off in configuration
    #[error("Healing is disabled")]
    Disabled,

    /// No recognized test-id pattern in the broken selector
    #[error("No test ID pattern found in selector")]
    NoPatternFound,

    /// No candidate cleared the similarity threshold
    #[error("No matching test IDs found")]
    NoCandidateFound,

    /// A strategy faulted internally
    #[error("Strategy '{strategy}' failed: {reason}")]
    StrategyFailed { strategy: String, reason: String },

    /// Every registered strategy failed
    #[error("Unable to heal selector with any strategy")]
    AllStrategiesExhausted,

    /// Driver-level failure surfaced through a strategy
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl HealError {
    /// Check if the error came from the driver rather than the healing logic
    pub fn is_driver_error(&self) -> bool {
        matches!(self, HealError::Driver(_))
    }

    /// Get error severity (0=low, 1=medium, 2=high)
    pub fn severity(&self) -> u8 {
        match self {
            HealError::Driver(_) | HealError::StrategyFailed { .. } => 2,
            HealError::AllStrategiesExhausted => 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_detection() {
        let err = HealError::from(DriverError::Io("socket closed".to_string()));
        assert!(err.is_driver_error());
        assert!(!HealError::NoPatternFound.is_driver_error());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(HealError::Disabled.severity() < HealError::AllStrategiesExhausted.severity());
        assert!(
            HealError::AllStrategiesExhausted.severity()
                < HealError::StrategyFailed {
                    strategy: "x".to_string(),
                    reason: "y".to_string(),
                }
                .severity()
        );
    }
}
