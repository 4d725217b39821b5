//! Fraud aggregation
//!
//! Reconciles the primary (sell simulation) and secondary (static analysis)
//! oracle readings into one verdict. Disagreements resolve toward rejection:
//! flags are OR-ed and taxes take the maximum, never the average.

use serde::Serialize;
use tracing::debug;

use crate::config::FraudConfig;
use crate::types::FraudSignal;

/// Hard-reject reasons, in evaluation order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudRejection {
    /// Primary oracle flagged a honeypot and the sell simulation confirms it
    HoneypotConfirmed { fail_rate: f64, failed: u64, sampled: u64 },

    /// Secondary oracle reports buys are blocked
    CannotBuy,

    /// Secondary oracle reports holders cannot sell their full balance
    CannotSellAll,

    /// Too many simulated sells failed, honeypot flag or not
    HighHolderFailRate { fail_rate: f64, failed: u64, sampled: u64 },

    /// Aggregated buy + sell tax above the acceptable maximum
    ExcessiveTax { total: f64, buy: f64, sell: f64 },

    /// Creator has deployed other honeypots
    CreatorDeployedHoneypots,
}

impl FraudRejection {
    /// Get human-readable description
    pub fn description(&self) -> String {
        match self {
            FraudRejection::HoneypotConfirmed {
                fail_rate,
                failed,
                sampled,
            } => {
                format!(
                    "Honeypot detected with high fail rate: {:.1}% ({}/{} holders cannot sell)",
                    fail_rate * 100.0,
                    failed,
                    sampled
                )
            }
            FraudRejection::CannotBuy => "Cannot buy token (secondary oracle)".to_string(),
            FraudRejection::CannotSellAll => {
                "Cannot sell all tokens - partial honeypot (secondary oracle)".to_string()
            }
            FraudRejection::HighHolderFailRate {
                fail_rate,
                failed,
                sampled,
            } => {
                format!(
                    "High holder fail rate: {:.1}% ({}/{} holders cannot sell)",
                    fail_rate * 100.0,
                    failed,
                    sampled
                )
            }
            FraudRejection::ExcessiveTax { total, buy, sell } => {
                format!(
                    "Excessive tax: {:.1}% (buy: {:.1}%, sell: {:.1}%)",
                    total, buy, sell
                )
            }
            FraudRejection::CreatorDeployedHoneypots => {
                "Creator has deployed other honeypot tokens (secondary oracle)".to_string()
            }
        }
    }

    /// Check if this rejection means holders are trapped
    pub fn is_honeypot(&self) -> bool {
        !matches!(self, FraudRejection::ExcessiveTax { .. })
    }
}

/// Advisory findings on tokens that survive every hard-reject rule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// Upgradeable contract, owner can swap the code
    ProxyContract,
    NotOpenSource,
    OwnerNotRenounced,
    HighCreatorHoldings { fraction: f64 },
    /// A single address holds all LP tokens
    CentralizedLiquidity,
    HighTax { total: f64 },
    ModerateFailRate { fail_rate: f64, honeypot_flagged: bool },
}

impl RiskFactor {
    /// Stable label used in reports
    pub fn label(&self) -> String {
        match self {
            RiskFactor::ProxyContract => "proxy_contract".to_string(),
            RiskFactor::NotOpenSource => "not_open_source".to_string(),
            RiskFactor::OwnerNotRenounced => "owner_not_renounced".to_string(),
            RiskFactor::HighCreatorHoldings { fraction } => {
                format!("high_creator_holdings_{:.1}%", fraction * 100.0)
            }
            RiskFactor::CentralizedLiquidity => "centralized_liquidity".to_string(),
            RiskFactor::HighTax { total } => format!("high_tax_{:.1}%", total),
            RiskFactor::ModerateFailRate {
                fail_rate,
                honeypot_flagged: true,
            } => format!("honeypot_flagged_moderate_fail_rate_{:.1}%", fail_rate * 100.0),
            RiskFactor::ModerateFailRate { fail_rate, .. } => {
                format!("moderate_fail_rate_{:.1}%", fail_rate * 100.0)
            }
        }
    }

    /// Points this factor adds to the risk score
    pub fn weight(&self) -> u32 {
        match self {
            RiskFactor::ProxyContract => 15,
            RiskFactor::NotOpenSource => 10,
            RiskFactor::OwnerNotRenounced => 10,
            RiskFactor::HighCreatorHoldings { .. } => 20,
            RiskFactor::CentralizedLiquidity => 0,
            RiskFactor::HighTax { .. } => 15,
            RiskFactor::ModerateFailRate { .. } => 20,
        }
    }
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Aggregated fraud verdict
#[derive(Debug, Clone, Serialize)]
pub struct FraudVerdict {
    pub is_safe: bool,
    pub is_honeypot: bool,
    pub rejection: Option<FraudRejection>,
    /// Present iff the verdict is unsafe
    pub rejection_reason: Option<String>,

    // Aggregated taxes (percent)
    pub max_buy_tax: f64,
    pub max_sell_tax: f64,
    pub max_transfer_tax: f64,
    pub total_tax: f64,

    // Oracle-reported facts
    pub holder_fail_rate: f64,
    pub creator_fraction: f64,
    pub top10_concentration: f64,
    pub is_proxy: bool,
    pub is_open_source: bool,
    pub has_owner: bool,

    pub risk_factors: Vec<RiskFactor>,
    /// 0 (clean) to 100; only meaningful when safe
    pub risk_score: u32,
}

impl FraudVerdict {
    pub fn risk_labels(&self) -> Vec<String> {
        self.risk_factors.iter().map(RiskFactor::label).collect()
    }

    fn reject(&mut self, rejection: FraudRejection) {
        self.is_safe = false;
        self.is_honeypot = rejection.is_honeypot();
        self.rejection_reason = Some(rejection.description());
        self.rejection = Some(rejection);
        self.risk_score = risk_score(&self.risk_factors);
    }
}

/// Capped additive tally of factor weights
fn risk_score(factors: &[RiskFactor]) -> u32 {
    factors.iter().map(RiskFactor::weight).sum::<u32>().min(100)
}

/// Reconciles two oracle readings into one verdict
#[derive(Debug, Clone)]
pub struct FraudAggregator {
    config: FraudConfig,
}

impl FraudAggregator {
    pub fn new(config: FraudConfig) -> Self {
        Self { config }
    }

    fn sample_is_trusted(&self, signal: &FraudSignal) -> bool {
        signal.holder_simulation.total >= self.config.min_holder_sample
    }

    /// Evaluate the primary and secondary readings.
    ///
    /// Hard-reject rules run in severity order and the first match wins.
    /// Risk factors never flip safety.
    pub fn evaluate(&self, primary: &FraudSignal, secondary: &FraudSignal) -> FraudVerdict {
        let max_buy_tax = primary.buy_tax.max(secondary.buy_tax);
        let max_sell_tax = primary.sell_tax.max(secondary.sell_tax);
        let fail_rate = primary.fail_rate();
        let sim = primary.holder_simulation;
        let trusted = self.sample_is_trusted(primary);

        let mut verdict = FraudVerdict {
            is_safe: true,
            is_honeypot: false,
            rejection: None,
            rejection_reason: None,
            max_buy_tax,
            max_sell_tax,
            max_transfer_tax: primary.transfer_tax.max(secondary.transfer_tax),
            total_tax: max_buy_tax + max_sell_tax,
            holder_fail_rate: fail_rate,
            creator_fraction: primary.creator_fraction.max(secondary.creator_fraction),
            top10_concentration: secondary.top10_concentration,
            is_proxy: primary.is_proxy || secondary.is_proxy,
            is_open_source: primary.is_open_source && secondary.is_open_source,
            has_owner: primary.has_owner || secondary.has_owner,
            risk_factors: Vec::new(),
            risk_score: 0,
        };

        // 1. Primary honeypot flag, only trusted when the simulation confirms it
        if primary.is_honeypot {
            if trusted && fail_rate > self.config.max_holder_fail_rate {
                verdict.reject(FraudRejection::HoneypotConfirmed {
                    fail_rate,
                    failed: sim.failed,
                    sampled: sim.total,
                });
                return verdict;
            }

            debug!(
                "Primary oracle flagged honeypot ({}) without confirmation, fail rate {:.1}% over {} holders",
                primary.honeypot_reason.as_deref().unwrap_or("no reason"),
                fail_rate * 100.0,
                sim.total
            );
            verdict.risk_factors.push(RiskFactor::ModerateFailRate {
                fail_rate,
                honeypot_flagged: true,
            });
        }

        // 2. Buys blocked
        if secondary.cannot_buy {
            verdict.reject(FraudRejection::CannotBuy);
            return verdict;
        }

        // 3. Partial honeypot
        if secondary.cannot_sell_all {
            verdict.reject(FraudRejection::CannotSellAll);
            return verdict;
        }

        // 4. Fail rate alone, whether or not the primary flagged it
        if trusted && fail_rate > self.config.max_holder_fail_rate {
            verdict.reject(FraudRejection::HighHolderFailRate {
                fail_rate,
                failed: sim.failed,
                sampled: sim.total,
            });
            return verdict;
        }

        // 5. Taxes
        if verdict.total_tax > self.config.max_total_tax_pct {
            verdict.reject(FraudRejection::ExcessiveTax {
                total: verdict.total_tax,
                buy: max_buy_tax,
                sell: max_sell_tax,
            });
            return verdict;
        }

        // 6. Serial honeypot deployer
        if secondary.creator_has_honeypots {
            verdict.reject(FraudRejection::CreatorDeployedHoneypots);
            return verdict;
        }

        self.collect_risk_factors(&mut verdict, primary, secondary);
        verdict.risk_score = risk_score(&verdict.risk_factors);
        verdict
    }

    fn collect_risk_factors(
        &self,
        verdict: &mut FraudVerdict,
        primary: &FraudSignal,
        secondary: &FraudSignal,
    ) {
        if verdict.is_proxy {
            verdict.risk_factors.push(RiskFactor::ProxyContract);
        }

        if !verdict.is_open_source {
            verdict.risk_factors.push(RiskFactor::NotOpenSource);
        }

        // Widely held tokens are exempt
        if verdict.has_owner && secondary.holder_count <= self.config.major_token_holder_count {
            verdict.risk_factors.push(RiskFactor::OwnerNotRenounced);
        }

        if verdict.creator_fraction > self.config.max_creator_fraction {
            verdict.risk_factors.push(RiskFactor::HighCreatorHoldings {
                fraction: verdict.creator_fraction,
            });
        }

        if secondary.lp_holder_count == Some(1) {
            verdict.risk_factors.push(RiskFactor::CentralizedLiquidity);
        }

        if verdict.total_tax > self.config.high_tax_warning_pct {
            verdict.risk_factors.push(RiskFactor::HighTax {
                total: verdict.total_tax,
            });
        }

        let already_flagged = verdict
            .risk_factors
            .iter()
            .any(|f| matches!(f, RiskFactor::ModerateFailRate { .. }));
        if !already_flagged
            && self.sample_is_trusted(primary)
            && primary.fail_rate() > self.config.moderate_holder_fail_rate
        {
            verdict.risk_factors.push(RiskFactor::ModerateFailRate {
                fail_rate: primary.fail_rate(),
                honeypot_flagged: false,
            });
        }
    }
}

impl Default for FraudAggregator {
    fn default() -> Self {
        Self::new(FraudConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HolderSimulation, OracleSource};

    fn primary() -> FraudSignal {
        FraudSignal::clean(OracleSource::Primary)
    }

    fn secondary() -> FraudSignal {
        FraudSignal {
            holder_count: 1_000,
            top10_concentration: 35.0,
            ..FraudSignal::clean(OracleSource::Secondary)
        }
    }

    fn simulation(total: u64, failed: u64) -> HolderSimulation {
        HolderSimulation {
            total,
            successful: total - failed,
            failed,
        }
    }

    #[test]
    fn test_clean_token_is_safe() {
        let verdict = FraudAggregator::default().evaluate(&primary(), &secondary());
        assert!(verdict.is_safe);
        assert!(!verdict.is_honeypot);
        assert!(verdict.rejection_reason.is_none());
        assert!(verdict.risk_factors.is_empty());
        assert_eq!(verdict.risk_score, 0);
        assert_eq!(verdict.top10_concentration, 35.0);
    }

    #[test]
    fn test_confirmed_honeypot_rejected() {
        let mut a = primary();
        a.is_honeypot = true;
        a.holder_simulation = simulation(200, 40);

        let verdict = FraudAggregator::default().evaluate(&a, &secondary());
        assert!(!verdict.is_safe);
        assert!(verdict.is_honeypot);
        assert!(matches!(
            verdict.rejection,
            Some(FraudRejection::HoneypotConfirmed { failed: 40, sampled: 200, .. })
        ));
        assert!(verdict.rejection_reason.unwrap().contains("20.0%"));
    }

    #[test]
    fn test_unconfirmed_honeypot_flag_is_advisory() {
        // 3% fail rate over a sample too small to trust
        let mut a = primary();
        a.is_honeypot = true;
        a.honeypot_reason = Some("simulation reverted".to_string());
        a.holder_simulation = simulation(33, 1);

        let verdict = FraudAggregator::default().evaluate(&a, &secondary());
        assert!(verdict.is_safe);
        assert!(verdict.rejection_reason.is_none());
        assert_eq!(verdict.risk_factors.len(), 1);
        assert!(verdict.risk_labels()[0].contains("moderate_fail_rate"));
        assert!(verdict.risk_score > 0);
    }

    #[test]
    fn test_small_sample_high_fail_rate_not_rejected() {
        let mut a = primary();
        a.holder_simulation = simulation(50, 25);

        let verdict = FraudAggregator::default().evaluate(&a, &secondary());
        assert!(verdict.is_safe);
        assert!(verdict.risk_factors.is_empty());
    }

    #[test]
    fn test_cannot_buy_rejected() {
        let mut b = secondary();
        b.cannot_buy = true;

        let verdict = FraudAggregator::default().evaluate(&primary(), &b);
        assert!(!verdict.is_safe);
        assert!(verdict.is_honeypot);
        assert_eq!(verdict.rejection, Some(FraudRejection::CannotBuy));
    }

    #[test]
    fn test_cannot_sell_all_rejected() {
        let mut b = secondary();
        b.cannot_sell_all = true;

        let verdict = FraudAggregator::default().evaluate(&primary(), &b);
        assert_eq!(verdict.rejection, Some(FraudRejection::CannotSellAll));
        assert!(verdict.rejection_reason.unwrap().contains("partial honeypot"));
    }

    #[test]
    fn test_unflagged_high_fail_rate_rejected() {
        let mut a = primary();
        a.holder_simulation = simulation(150, 30);

        let verdict = FraudAggregator::default().evaluate(&a, &secondary());
        assert!(!verdict.is_safe);
        assert!(matches!(
            verdict.rejection,
            Some(FraudRejection::HighHolderFailRate { .. })
        ));
    }

    #[test]
    fn test_rule_order_first_match_wins() {
        // Cannot-buy outranks excessive tax and serial deployer
        let mut b = secondary();
        b.cannot_buy = true;
        b.sell_tax = 50.0;
        b.creator_has_honeypots = true;

        let verdict = FraudAggregator::default().evaluate(&primary(), &b);
        assert_eq!(verdict.rejection, Some(FraudRejection::CannotBuy));

        // Tax outranks serial deployer
        b.cannot_buy = false;
        let verdict = FraudAggregator::default().evaluate(&primary(), &b);
        assert!(matches!(verdict.rejection, Some(FraudRejection::ExcessiveTax { .. })));
        assert!(!verdict.is_honeypot);
    }

    #[test]
    fn test_excessive_tax_uses_max_of_oracles() {
        let mut a = primary();
        a.buy_tax = 10.0;
        a.sell_tax = 2.0;
        let mut b = secondary();
        b.buy_tax = 1.0;
        b.sell_tax = 8.0;

        // 10 + 8, never the average
        let verdict = FraudAggregator::default().evaluate(&a, &b);
        assert_eq!(verdict.total_tax, 18.0);
        assert!(!verdict.is_safe);
        assert!(verdict.rejection_reason.unwrap().to_lowercase().contains("tax"));
    }

    #[test]
    fn test_tax_above_cap_always_rejected() {
        let aggregator = FraudAggregator::default();
        for buy in [0.0, 5.0, 10.0, 16.0] {
            for sell in [0.0, 6.0, 15.5] {
                let mut a = primary();
                a.buy_tax = buy;
                let mut b = secondary();
                b.sell_tax = sell;
                let verdict = aggregator.evaluate(&a, &b);
                if buy + sell > 15.0 {
                    assert!(!verdict.is_safe, "buy {} sell {}", buy, sell);
                    assert!(verdict
                        .rejection_reason
                        .unwrap()
                        .to_lowercase()
                        .contains("tax"));
                } else {
                    assert!(verdict.is_safe, "buy {} sell {}", buy, sell);
                }
            }
        }
    }

    #[test]
    fn test_tax_aggregation_is_monotonic() {
        let aggregator = FraudAggregator::default();
        let taxes = [0.0, 1.0, 3.5, 7.0, 12.0, 20.0];
        for &base in &taxes {
            for &bumped in taxes.iter().filter(|&&t| t >= base) {
                let mut a = primary();
                a.sell_tax = 4.0;
                let mut b = secondary();
                b.buy_tax = base;
                let before = aggregator.evaluate(&a, &b).total_tax;
                b.buy_tax = bumped;
                let after = aggregator.evaluate(&a, &b).total_tax;
                assert!(after >= before);
            }
        }
    }

    #[test]
    fn test_creator_honeypots_rejected() {
        let mut b = secondary();
        b.creator_has_honeypots = true;

        let verdict = FraudAggregator::default().evaluate(&primary(), &b);
        assert_eq!(verdict.rejection, Some(FraudRejection::CreatorDeployedHoneypots));
        assert!(verdict.is_honeypot);
    }

    #[test]
    fn test_risk_factors_and_score() {
        let mut a = primary();
        a.is_proxy = true;
        a.buy_tax = 6.0;
        a.sell_tax = 6.0;
        a.holder_simulation = simulation(200, 14);
        let mut b = secondary();
        b.is_open_source = false;
        b.has_owner = true;
        b.creator_fraction = 0.35;
        b.lp_holder_count = Some(1);

        let verdict = FraudAggregator::default().evaluate(&a, &b);
        assert!(verdict.is_safe);
        let labels = verdict.risk_labels();
        assert_eq!(
            labels,
            vec![
                "proxy_contract",
                "not_open_source",
                "owner_not_renounced",
                "high_creator_holdings_35.0%",
                "centralized_liquidity",
                "high_tax_12.0%",
                "moderate_fail_rate_7.0%",
            ]
        );
        // 15 + 10 + 10 + 20 + 0 + 15 + 20
        assert_eq!(verdict.risk_score, 90);
    }

    #[test]
    fn test_owner_flag_skipped_for_major_tokens() {
        let mut b = secondary();
        b.has_owner = true;
        b.holder_count = 250_000;

        let verdict = FraudAggregator::default().evaluate(&primary(), &b);
        assert!(verdict.is_safe);
        assert!(verdict.has_owner);
        assert!(verdict.risk_factors.is_empty());
        assert_eq!(verdict.risk_score, 0);
    }

    #[test]
    fn test_moderate_fail_rate_recorded_once() {
        let mut a = primary();
        a.is_honeypot = true;
        a.holder_simulation = simulation(200, 16);

        let verdict = FraudAggregator::default().evaluate(&a, &secondary());
        assert!(verdict.is_safe);
        let moderate = verdict
            .risk_factors
            .iter()
            .filter(|f| matches!(f, RiskFactor::ModerateFailRate { .. }))
            .count();
        assert_eq!(moderate, 1);
        assert_eq!(verdict.risk_score, 20);
    }

    #[test]
    fn test_rejection_keeps_accumulated_factors() {
        let mut a = primary();
        a.is_honeypot = true;
        a.holder_simulation = simulation(10, 1);
        let mut b = secondary();
        b.cannot_sell_all = true;

        let verdict = FraudAggregator::default().evaluate(&a, &b);
        assert!(!verdict.is_safe);
        assert_eq!(verdict.risk_factors.len(), 1);
    }
}
