//! Composite scoring engine
//!
//! Applies the hard filters, then maps liquidity, volume, holder distribution
//! and fragmentation onto 0-100 sub-scores with tiered step curves and
//! combines them with the configured weights.

use serde::Serialize;

use crate::config::{ScoringConfig, ThresholdConfig};
use crate::types::ScoringInput;

pub mod curves;

pub use curves::{fragmentation_score, holder_score, liquidity_score, volume_score};

/// Score breakdown for one token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub liquidity_score: f64,
    pub volume_score: f64,
    pub holder_score: f64,
    pub fragmentation_score: f64,
    pub composite_score: f64,
    pub is_safe: bool,
    /// Every violated hard filter, empty iff safe
    pub failure_reasons: Vec<String>,
}

impl ScoreResult {
    fn rejected(failure_reasons: Vec<String>) -> Self {
        Self {
            liquidity_score: 0.0,
            volume_score: 0.0,
            holder_score: 0.0,
            fragmentation_score: 0.0,
            composite_score: 0.0,
            is_safe: false,
            failure_reasons,
        }
    }
}

/// The main scoring engine
#[derive(Debug, Clone)]
pub struct CompositeScorer {
    thresholds: ThresholdConfig,
    weights: ScoringConfig,
}

impl CompositeScorer {
    pub fn new(thresholds: ThresholdConfig, weights: ScoringConfig) -> Self {
        Self { thresholds, weights }
    }

    /// Liquidity and volume minimums, checkable from market data alone
    pub fn market_failures(&self, liquidity_usd: f64, volume_24h_usd: f64) -> Vec<String> {
        let t = &self.thresholds;
        let mut reasons = Vec::new();

        if liquidity_usd < t.min_liquidity_usd {
            reasons.push(format!(
                "Liquidity too low: ${:.2} < ${:.2}",
                liquidity_usd, t.min_liquidity_usd
            ));
        }

        if volume_24h_usd < t.min_volume_24h_usd {
            reasons.push(format!(
                "Volume too low: ${:.2} < ${:.2}",
                volume_24h_usd, t.min_volume_24h_usd
            ));
        }

        reasons
    }

    /// Collect every violated hard filter
    pub fn hard_filter_failures(&self, input: &ScoringInput) -> Vec<String> {
        let t = &self.thresholds;
        let mut reasons = Vec::new();

        if !input.verified {
            reasons.push("Contract not verified".to_string());
        }

        reasons.extend(self.market_failures(input.liquidity_usd, input.volume_24h_usd));

        if input.top10_concentration > t.max_top10_concentration {
            reasons.push(format!(
                "Holder concentration too high: {:.2}% > {:.2}%",
                input.top10_concentration, t.max_top10_concentration
            ));
        }

        if input.pool_age_days < t.min_pool_age_days {
            reasons.push(format!(
                "Pair too new: {:.1} days < {:.1} days",
                input.pool_age_days, t.min_pool_age_days
            ));
        }

        reasons
    }

    /// Score a token. Any hard-filter failure forces the composite to 0.
    pub fn score(&self, input: &ScoringInput) -> ScoreResult {
        let failures = self.hard_filter_failures(input);
        if !failures.is_empty() {
            return ScoreResult::rejected(failures);
        }

        let liquidity = liquidity_score(input.liquidity_usd);
        let volume = volume_score(input.volume_24h_usd, input.liquidity_usd);
        let holder = holder_score(input.top10_concentration);
        let fragmentation = fragmentation_score(input.fragmentation_safe);

        let w = &self.weights;
        let composite = liquidity * w.liquidity_weight
            + volume * w.volume_weight
            + holder * w.holder_weight
            + fragmentation * w.fragmentation_weight;

        ScoreResult {
            liquidity_score: liquidity,
            volume_score: volume,
            holder_score: holder,
            fragmentation_score: fragmentation,
            composite_score: composite.clamp(0.0, 100.0),
            is_safe: true,
            failure_reasons: Vec::new(),
        }
    }

    /// Whether a passing score is high enough to feature
    pub fn is_featured(&self, result: &ScoreResult) -> bool {
        result.is_safe && result.composite_score >= self.weights.featured_threshold
    }
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self::new(ThresholdConfig::default(), ScoringConfig::default())
    }
}
