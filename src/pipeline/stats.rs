//! Run statistics

use serde::Serialize;
use std::collections::BTreeMap;

use super::{TokenResult, TokenStatus};
use crate::error::ErrorCategory;

/// Counters for one screening run, updated once per token
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    pub total: usize,
    /// Tokens whose market data was available
    pub evaluated: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub featured: usize,
    /// Failed tokens rejected as honeypots
    pub honeypot_rejected: usize,
    pub error_categories: BTreeMap<ErrorCategory, usize>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &TokenResult) {
        self.total += 1;
        if result.metrics.is_some() {
            self.evaluated += 1;
        }

        match result.status {
            TokenStatus::Passed => {
                self.passed += 1;
                if result.is_featured() {
                    self.featured += 1;
                }
            }
            TokenStatus::Failed => {
                self.failed += 1;
                if result.honeypot {
                    self.honeypot_rejected += 1;
                }
            }
            TokenStatus::Error => {
                self.errors += 1;
                let category = result.error_category.unwrap_or(ErrorCategory::Other);
                *self.error_categories.entry(category).or_insert(0) += 1;
            }
        }
    }

    pub fn error_count(&self, category: ErrorCategory) -> usize {
        self.error_categories.get(&category).copied().unwrap_or(0)
    }

    /// `part` as a percentage of `whole`, 0 when `whole` is 0
    pub fn percent(part: usize, whole: usize) -> f64 {
        if whole == 0 {
            0.0
        } else {
            part as f64 / whole as f64 * 100.0
        }
    }
}
