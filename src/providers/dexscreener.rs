// DexScreener API client for pair liquidity and volume
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{get_json, MarketDataProvider, ProviderResult};
use crate::config::ApiConfig;
use crate::error::ProviderError;
use crate::types::MarketMetrics;

const MS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub m5: Option<f64>,
    pub h1: Option<f64>,
    pub h6: Option<f64>,
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairToken {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexPair {
    #[serde(rename = "chainId")]
    pub chain_id: String,
    #[serde(rename = "dexId")]
    pub dex_id: String,
    #[serde(rename = "pairAddress")]
    pub pair_address: String,
    #[serde(rename = "baseToken")]
    pub base_token: PairToken,
    #[serde(rename = "quoteToken")]
    pub quote_token: PairToken,
    pub volume: Option<Volume>,
    pub liquidity: Option<Liquidity>,
    /// Pair creation time, unix milliseconds
    #[serde(rename = "pairCreatedAt")]
    pub pair_created_at: Option<i64>,
}

impl DexPair {
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    pub fn volume_h24(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0)
    }
}

/// Aggregate a token's pairs into market metrics.
///
/// Only pairs quoted in the stablecoin count. Liquidity is fragmentation-safe
/// when the total exceeds `large_cap_liquidity_usd` or the largest pool holds
/// at least half of it. Pool age comes from the largest pool; a missing
/// creation time counts as brand new.
pub fn aggregate_pairs(
    address: &str,
    pairs: &[DexPair],
    stablecoin_address: &str,
    large_cap_liquidity_usd: f64,
    now_ms: i64,
) -> ProviderResult<MarketMetrics> {
    if pairs.is_empty() {
        return Err(ProviderError::NoPairs {
            address: address.to_string(),
        });
    }

    let stable_pairs: Vec<&DexPair> = pairs
        .iter()
        .filter(|p| p.quote_token.address.eq_ignore_ascii_case(stablecoin_address))
        .collect();

    let largest = stable_pairs
        .iter()
        .copied()
        .max_by(|a, b| {
            a.liquidity_usd()
                .partial_cmp(&b.liquidity_usd())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .ok_or_else(|| ProviderError::NoStablecoinPairs {
            address: address.to_string(),
        })?;

    let liquidity_usd: f64 = stable_pairs.iter().map(|p| p.liquidity_usd()).sum();
    let volume_24h_usd: f64 = stable_pairs.iter().map(|p| p.volume_h24()).sum();

    let fragmentation_safe =
        liquidity_usd > large_cap_liquidity_usd || largest.liquidity_usd() >= 0.5 * liquidity_usd;

    let pool_age_days = largest
        .pair_created_at
        .map(|created| ((now_ms - created) as f64 / MS_PER_DAY).max(0.0))
        .unwrap_or(0.0);

    Ok(MarketMetrics {
        liquidity_usd,
        volume_24h_usd,
        fragmentation_safe,
        pool_age_days,
    })
}

pub struct DexScreenerClient {
    client: Client,
    base_url: String,
    chain: String,
    stablecoin_address: String,
    large_cap_liquidity_usd: f64,
}

impl DexScreenerClient {
    pub fn new(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.dexscreener_base_url.clone(),
            chain: config.dexscreener_chain.clone(),
            stablecoin_address: config.stablecoin_address.clone(),
            large_cap_liquidity_usd: crate::config::ThresholdConfig::default()
                .large_cap_liquidity_usd,
        }
    }

    /// Override the large-cap cutoff for fragmentation
    pub fn with_large_cap_liquidity(mut self, large_cap_liquidity_usd: f64) -> Self {
        self.large_cap_liquidity_usd = large_cap_liquidity_usd;
        self
    }

    /// Fetch all pairs for a token
    pub async fn get_token_pairs(&self, address: &str) -> ProviderResult<Vec<DexPair>> {
        let url = format!("{}/token-pairs/v1/{}/{}", self.base_url, self.chain, address);
        debug!("Fetching DexScreener pairs for {}", address);
        get_json(self.client.get(&url)).await
    }
}

#[async_trait]
impl MarketDataProvider for DexScreenerClient {
    async fn pair_metrics(&self, address: &str) -> ProviderResult<MarketMetrics> {
        let pairs = self.get_token_pairs(address).await?;
        aggregate_pairs(
            address,
            &pairs,
            &self.stablecoin_address,
            self.large_cap_liquidity_usd,
            chrono::Utc::now().timestamp_millis(),
        )
    }
}
