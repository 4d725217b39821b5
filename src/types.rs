//! Shared data types for the screening pipeline

use serde::{Deserialize, Serialize};

/// A token to screen, as read from the token list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenCandidate {
    #[serde(rename = "contract_address")]
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    18
}

impl TokenCandidate {
    pub fn new(address: &str, symbol: &str) -> Self {
        Self {
            address: address.to_string(),
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            decimals: default_decimals(),
        }
    }
}

/// Aggregated market data over a token's stablecoin-quoted pairs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MarketMetrics {
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    /// Large cap, or the largest pool holds at least half the liquidity
    pub fragmentation_safe: bool,
    /// Age of the largest single pool
    pub pool_age_days: f64,
}

/// Which fraud oracle produced a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleSource {
    /// Sell-simulation oracle (Honeypot.is), required
    Primary,
    /// Static-analysis oracle (GoPlus), advisory
    Secondary,
    /// Best-case stand-in used when the secondary oracle is down
    Synthetic,
}

/// Outcome of simulated sells across sampled holders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HolderSimulation {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}

impl HolderSimulation {
    /// Fraction of sampled holders that could not sell
    pub fn fail_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 / self.total as f64
        }
    }
}

/// One oracle's view of a token's fraud risk.
///
/// Facts an oracle does not report keep their best-case default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudSignal {
    pub source: OracleSource,
    pub is_honeypot: bool,
    pub honeypot_reason: Option<String>,
    /// Taxes in percent
    pub buy_tax: f64,
    pub sell_tax: f64,
    pub transfer_tax: f64,
    pub cannot_buy: bool,
    pub cannot_sell_all: bool,
    pub holder_simulation: HolderSimulation,
    pub is_proxy: bool,
    pub is_open_source: bool,
    pub has_owner: bool,
    /// Fraction of supply (0-1) held by the creator
    pub creator_fraction: f64,
    pub creator_has_honeypots: bool,
    pub holder_count: u64,
    /// Percentage of supply held by the top 10 addresses
    pub top10_concentration: f64,
    pub lp_holder_count: Option<u32>,
}

impl FraudSignal {
    /// A clean reading from the given oracle
    pub fn clean(source: OracleSource) -> Self {
        Self {
            source,
            is_honeypot: false,
            honeypot_reason: None,
            buy_tax: 0.0,
            sell_tax: 0.0,
            transfer_tax: 0.0,
            cannot_buy: false,
            cannot_sell_all: false,
            holder_simulation: HolderSimulation::default(),
            is_proxy: false,
            is_open_source: true,
            has_owner: false,
            creator_fraction: 0.0,
            creator_has_honeypots: false,
            holder_count: 0,
            top10_concentration: 0.0,
            lp_holder_count: None,
        }
    }

    /// Stand-in for an unavailable secondary oracle.
    ///
    /// Source verification has already passed, and the holder concentration
    /// is copied from the dedicated provider.
    pub fn synthetic(top10_concentration: f64) -> Self {
        Self {
            top10_concentration,
            ..Self::clean(OracleSource::Synthetic)
        }
    }

    pub fn fail_rate(&self) -> f64 {
        self.holder_simulation.fail_rate()
    }

    pub fn total_tax(&self) -> f64 {
        self.buy_tax + self.sell_tax
    }
}

/// Inputs to the composite scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringInput {
    pub verified: bool,
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    pub top10_concentration: f64,
    pub fragmentation_safe: bool,
    pub pool_age_days: f64,
}

impl ScoringInput {
    pub fn new(verified: bool, market: &MarketMetrics, top10_concentration: f64) -> Self {
        Self {
            verified,
            liquidity_usd: market.liquidity_usd,
            volume_24h_usd: market.volume_24h_usd,
            top10_concentration,
            fragmentation_safe: market.fragmentation_safe,
            pool_age_days: market.pool_age_days,
        }
    }
}
