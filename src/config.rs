//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub fraud: FraudConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Upstream API endpoints and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub bscscan_api_key: String,
    #[serde(default = "default_bscscan_base_url")]
    pub bscscan_base_url: String,
    #[serde(default = "default_dexscreener_base_url")]
    pub dexscreener_base_url: String,
    #[serde(default = "default_honeypot_base_url")]
    pub honeypot_base_url: String,
    #[serde(default = "default_goplus_base_url")]
    pub goplus_base_url: String,
    /// EVM chain id used by Etherscan, Honeypot.is and GoPlus
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Chain slug used by DexScreener
    #[serde(default = "default_dexscreener_chain")]
    pub dexscreener_chain: String,
    /// Quote token that counts as "stablecoin-quoted" (BSC USDT)
    #[serde(default = "default_stablecoin_address")]
    pub stablecoin_address: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Hard filter thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_min_liquidity_usd")]
    pub min_liquidity_usd: f64,
    #[serde(default = "default_min_volume_24h_usd")]
    pub min_volume_24h_usd: f64,
    /// Maximum percentage of supply held by the top 10 addresses
    #[serde(default = "default_max_top10_concentration")]
    pub max_top10_concentration: f64,
    #[serde(default = "default_min_pool_age_days")]
    pub min_pool_age_days: f64,
    /// Above this aggregate liquidity, fragmentation is not a concern
    #[serde(default = "default_large_cap_liquidity_usd")]
    pub large_cap_liquidity_usd: f64,
}

/// Composite score weights (must sum to 1.0)
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_liquidity_weight")]
    pub liquidity_weight: f64,
    #[serde(default = "default_volume_weight")]
    pub volume_weight: f64,
    #[serde(default = "default_holder_weight")]
    pub holder_weight: f64,
    #[serde(default = "default_fragmentation_weight")]
    pub fragmentation_weight: f64,
    /// Passing tokens at or above this score are FEATURED
    #[serde(default = "default_featured_threshold")]
    pub featured_threshold: f64,
}

/// Fraud aggregation thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct FraudConfig {
    /// Buy + sell tax above this (percent) is rejected
    #[serde(default = "default_max_total_tax_pct")]
    pub max_total_tax_pct: f64,
    /// Buy + sell tax above this (percent) is flagged
    #[serde(default = "default_high_tax_warning_pct")]
    pub high_tax_warning_pct: f64,
    /// Simulated sell fail rate (0-1) above this is rejected
    #[serde(default = "default_max_holder_fail_rate")]
    pub max_holder_fail_rate: f64,
    /// Simulated sell fail rate (0-1) above this is flagged
    #[serde(default = "default_moderate_holder_fail_rate")]
    pub moderate_holder_fail_rate: f64,
    /// Minimum simulated holders before the fail rate is trusted
    #[serde(default = "default_min_holder_sample")]
    pub min_holder_sample: u64,
    /// Creator supply fraction (0-1) above this is flagged
    #[serde(default = "default_max_creator_fraction")]
    pub max_creator_fraction: f64,
    /// Tokens with more holders skip the owner-renounced flag
    #[serde(default = "default_major_token_holder_count")]
    pub major_token_holder_count: u64,
}

/// Orchestration settings
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Courtesy pause between tokens to protect shared API quotas
    #[serde(default = "default_inter_token_delay_ms")]
    pub inter_token_delay_ms: u64,
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    /// Error rows listed in the detailed breakdown
    #[serde(default = "default_max_error_rows")]
    pub max_error_rows: usize,
}

fn default_bscscan_base_url() -> String {
    "https://api.etherscan.io/v2/api".to_string()
}

fn default_dexscreener_base_url() -> String {
    "https://api.dexscreener.com".to_string()
}

fn default_honeypot_base_url() -> String {
    "https://api.honeypot.is".to_string()
}

fn default_goplus_base_url() -> String {
    "https://api.gopluslabs.io".to_string()
}

fn default_chain_id() -> u64 {
    56
}

fn default_dexscreener_chain() -> String {
    "bsc".to_string()
}

fn default_stablecoin_address() -> String {
    "0x55d398326f99059ff775485246999027b3197955".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_min_liquidity_usd() -> f64 {
    100_000.0
}

fn default_min_volume_24h_usd() -> f64 {
    10_000.0
}

fn default_max_top10_concentration() -> f64 {
    70.0
}

fn default_min_pool_age_days() -> f64 {
    7.0
}

fn default_large_cap_liquidity_usd() -> f64 {
    10_000_000.0
}

fn default_liquidity_weight() -> f64 {
    0.35
}

fn default_volume_weight() -> f64 {
    0.30
}

fn default_holder_weight() -> f64 {
    0.25
}

fn default_fragmentation_weight() -> f64 {
    0.10
}

fn default_featured_threshold() -> f64 {
    70.0
}

fn default_max_total_tax_pct() -> f64 {
    15.0
}

fn default_high_tax_warning_pct() -> f64 {
    10.0
}

fn default_max_holder_fail_rate() -> f64 {
    0.10
}

fn default_moderate_holder_fail_rate() -> f64 {
    0.05
}

fn default_min_holder_sample() -> u64 {
    100
}

fn default_max_creator_fraction() -> f64 {
    0.20
}

fn default_major_token_holder_count() -> u64 {
    50_000
}

fn default_inter_token_delay_ms() -> u64 {
    2_000
}

fn default_results_dir() -> String {
    "results".to_string()
}

fn default_max_error_rows() -> usize {
    50
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bscscan_api_key: String::new(),
            bscscan_base_url: default_bscscan_base_url(),
            dexscreener_base_url: default_dexscreener_base_url(),
            honeypot_base_url: default_honeypot_base_url(),
            goplus_base_url: default_goplus_base_url(),
            chain_id: default_chain_id(),
            dexscreener_chain: default_dexscreener_chain(),
            stablecoin_address: default_stablecoin_address(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_liquidity_usd: default_min_liquidity_usd(),
            min_volume_24h_usd: default_min_volume_24h_usd(),
            max_top10_concentration: default_max_top10_concentration(),
            min_pool_age_days: default_min_pool_age_days(),
            large_cap_liquidity_usd: default_large_cap_liquidity_usd(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            liquidity_weight: default_liquidity_weight(),
            volume_weight: default_volume_weight(),
            holder_weight: default_holder_weight(),
            fragmentation_weight: default_fragmentation_weight(),
            featured_threshold: default_featured_threshold(),
        }
    }
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            max_total_tax_pct: default_max_total_tax_pct(),
            high_tax_warning_pct: default_high_tax_warning_pct(),
            max_holder_fail_rate: default_max_holder_fail_rate(),
            moderate_holder_fail_rate: default_moderate_holder_fail_rate(),
            min_holder_sample: default_min_holder_sample(),
            max_creator_fraction: default_max_creator_fraction(),
            major_token_holder_count: default_major_token_holder_count(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inter_token_delay_ms: default_inter_token_delay_ms(),
            results_dir: default_results_dir(),
            max_error_rows: default_max_error_rows(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            thresholds: ThresholdConfig::default(),
            scoring: ScoringConfig::default(),
            fraud: FraudConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ScoringConfig {
    pub fn weight_sum(&self) -> f64 {
        self.liquidity_weight + self.volume_weight + self.holder_weight + self.fragmentation_weight
    }
}

impl PipelineConfig {
    pub fn inter_token_delay(&self) -> Duration {
        Duration::from_millis(self.inter_token_delay_ms)
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("api.chain_id", default_chain_id() as i64)?
            .set_default("api.timeout_ms", default_timeout_ms() as i64)?
            .set_default(
                "pipeline.inter_token_delay_ms",
                default_inter_token_delay_ms() as i64,
            )?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix SCREENER_)
            .add_source(
                config::Environment::with_prefix("SCREENER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Legacy variable name used by older deployments
        if config.api.bscscan_api_key.is_empty() {
            if let Ok(key) = std::env::var("BSCSCAN_API_KEY") {
                config.api.bscscan_api_key = key;
            }
        }

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let s = &self.scoring;
        for (name, weight) in [
            ("liquidity_weight", s.liquidity_weight),
            ("volume_weight", s.volume_weight),
            ("holder_weight", s.holder_weight),
            ("fragmentation_weight", s.fragmentation_weight),
        ] {
            if weight < 0.0 {
                anyhow::bail!("{} cannot be negative", name);
            }
        }

        if (s.weight_sum() - 1.0).abs() > 0.001 {
            anyhow::bail!("scoring weights must sum to 1.0, got {:.3}", s.weight_sum());
        }

        if !(0.0..=100.0).contains(&s.featured_threshold) {
            anyhow::bail!("featured_threshold must be between 0 and 100");
        }

        let t = &self.thresholds;
        if t.min_liquidity_usd <= 0.0 || t.min_volume_24h_usd <= 0.0 {
            anyhow::bail!("minimum liquidity and volume must be positive");
        }

        if t.max_top10_concentration <= 0.0 || t.max_top10_concentration > 100.0 {
            anyhow::bail!("max_top10_concentration must be between 0 and 100");
        }

        if t.min_pool_age_days < 0.0 {
            anyhow::bail!("min_pool_age_days cannot be negative");
        }

        let f = &self.fraud;
        for (name, rate) in [
            ("max_holder_fail_rate", f.max_holder_fail_rate),
            ("moderate_holder_fail_rate", f.moderate_holder_fail_rate),
            ("max_creator_fraction", f.max_creator_fraction),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                anyhow::bail!("{} must be a fraction between 0 and 1", name);
            }
        }

        if f.moderate_holder_fail_rate >= f.max_holder_fail_rate {
            anyhow::bail!("moderate_holder_fail_rate must be below max_holder_fail_rate");
        }

        if f.high_tax_warning_pct > f.max_total_tax_pct {
            anyhow::bail!("high_tax_warning_pct cannot exceed max_total_tax_pct");
        }

        if self.api.timeout_ms == 0 {
            anyhow::bail!("api.timeout_ms must be positive");
        }

        if self.pipeline.inter_token_delay_ms == 0 {
            tracing::warn!(
                "inter_token_delay_ms is 0 - upstream rate limits will likely be hit"
            );
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  API:
    bscscan: {}
    bscscan_api_key: {}
    dexscreener: {}
    honeypot: {}
    goplus: {}
    chain_id: {}
    stablecoin: {}
    timeout: {}ms
  Thresholds:
    min_liquidity: ${:.0}
    min_volume_24h: ${:.0}
    max_top10_concentration: {}%
    min_pool_age: {} days
  Scoring:
    weights: liquidity {} / volume {} / holder {} / fragmentation {}
    featured_threshold: {}
  Fraud:
    max_total_tax: {}%
    high_tax_warning: {}%
    max_holder_fail_rate: {}
    min_holder_sample: {}
  Pipeline:
    inter_token_delay: {}ms
    results_dir: {}
"#,
            mask_url(&self.api.bscscan_base_url),
            if self.api.bscscan_api_key.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            mask_url(&self.api.dexscreener_base_url),
            mask_url(&self.api.honeypot_base_url),
            mask_url(&self.api.goplus_base_url),
            self.api.chain_id,
            self.api.stablecoin_address,
            self.api.timeout_ms,
            self.thresholds.min_liquidity_usd,
            self.thresholds.min_volume_24h_usd,
            self.thresholds.max_top10_concentration,
            self.thresholds.min_pool_age_days,
            self.scoring.liquidity_weight,
            self.scoring.volume_weight,
            self.scoring.holder_weight,
            self.scoring.fragmentation_weight,
            self.scoring.featured_threshold,
            self.fraud.max_total_tax_pct,
            self.fraud.high_tax_warning_pct,
            self.fraud.max_holder_fail_rate,
            self.fraud.min_holder_sample,
            self.pipeline.inter_token_delay_ms,
            self.pipeline.results_dir,
        )
    }
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}
