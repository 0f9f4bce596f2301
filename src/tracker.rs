//! Per-selector success/failure tracking
//!
//! Counters are created on first observation and survive cache clears;
//! only engine teardown discards them.

use std::collections::HashMap;

use crate::types::FlakinessItem;

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    successes: u64,
    failures: u64,
}

/// Flakiness tracker over observed selectors
#[derive(Debug, Default)]
pub struct FlakinessTracker {
    counters: HashMap<String, Counters>,
}

impl FlakinessTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful resolution for the selector
    pub fn record_success(&mut self, selector: &str) {
        self.entry(selector).successes += 1;
    }

    /// Record a failed resolution for the selector
    pub fn record_failure(&mut self, selector: &str) {
        self.entry(selector).failures += 1;
    }

    fn entry(&mut self, selector: &str) -> &mut Counters {
        self.counters.entry(selector.to_string()).or_default()
    }

    /// Snapshot of all tracked selectors, most flaky first
    pub fn snapshot(&self) -> Vec<FlakinessItem> {
        let mut items: Vec<FlakinessItem> = self
            .counters
            .iter()
            .filter(|(_, c)| c.successes + c.failures > 0)
            .map(|(selector, c)| {
                let total = c.successes + c.failures;
                FlakinessItem {
                    selector: selector.clone(),
                    successes: c.successes,
                    failures: c.failures,
                    flakiness_score: c.failures as f64 / total as f64,
                }
            })
            .collect();
        items.sort_by(|a, b| {
            b.flakiness_score
                .partial_cmp(&a.flakiness_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        items
    }
}
