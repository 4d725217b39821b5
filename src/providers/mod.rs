//! Data providers consumed by the screening pipeline
//!
//! Each upstream service sits behind a small async trait so the orchestrator
//! only sees typed data and a structured [`ProviderError`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, ProviderError, Result};
use crate::types::{FraudSignal, MarketMetrics};

pub mod bscscan;
pub mod dexscreener;
pub mod goplus;
pub mod honeypot;

pub use bscscan::EtherscanClient;
pub use dexscreener::DexScreenerClient;
pub use goplus::GoPlusClient;
pub use honeypot::HoneypotClient;

/// Result type for provider calls
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Aggregated liquidity and volume for a token's stablecoin pairs
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn pair_metrics(&self, address: &str) -> ProviderResult<MarketMetrics>;
}

/// Source-verification status of a contract
#[async_trait]
pub trait ContractVerifier: Send + Sync {
    /// True when the source is verified and the contract is not a proxy
    async fn is_verified(&self, address: &str) -> ProviderResult<bool>;
}

/// Share of supply held by the largest holders
#[async_trait]
pub trait HolderConcentrationProvider: Send + Sync {
    /// Percentage (0-100) of supply held by the top 10 addresses
    async fn top10_concentration(&self, address: &str) -> ProviderResult<f64>;
}

/// An independent fraud oracle
#[async_trait]
pub trait FraudOracle: Send + Sync {
    /// Oracle name for logs and error messages
    fn name(&self) -> &'static str;

    async fn check_token(&self, address: &str) -> ProviderResult<FraudSignal>;
}

/// The full set of providers used by the screener
#[derive(Clone)]
pub struct Providers {
    pub market: Arc<dyn MarketDataProvider>,
    pub holders: Arc<dyn HolderConcentrationProvider>,
    pub verifier: Arc<dyn ContractVerifier>,
    /// Required oracle
    pub primary_oracle: Arc<dyn FraudOracle>,
    /// Advisory oracle, may be unavailable
    pub secondary_oracle: Arc<dyn FraudOracle>,
}

impl Providers {
    /// Build the live HTTP clients
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = &config.api;
        if api.bscscan_api_key.is_empty() {
            return Err(Error::MissingEnvVar("BSCSCAN_API_KEY".to_string()));
        }

        let client = http_client(api.timeout())?;
        let honeypot = Arc::new(HoneypotClient::new(client.clone(), api));
        let market = DexScreenerClient::new(client.clone(), api)
            .with_large_cap_liquidity(config.thresholds.large_cap_liquidity_usd);

        Ok(Self {
            market: Arc::new(market),
            holders: honeypot.clone(),
            verifier: Arc::new(EtherscanClient::new(client.clone(), api)),
            primary_oracle: honeypot,
            secondary_oracle: Arc::new(GoPlusClient::new(client, api)),
        })
    }
}

/// Shared HTTP client with the configured timeout
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("dex-token-screener/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))
}

/// Send a request and decode a JSON body, rejecting non-success statuses
pub(crate) async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> ProviderResult<T> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Other(format!(
            "API error {}: {}",
            status,
            truncate_body(&body)
        )));
    }

    let body = response.text().await?;
    debug!("Received {} bytes", body.len());
    serde_json::from_str(&body)
        .map_err(|e| ProviderError::Other(format!("Failed to parse response: {}", e)))
}

fn truncate_body(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Lenient numeric parsing for APIs that encode numbers as strings
pub(crate) fn parse_f64(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(0.0)
}

pub(crate) fn parse_u64(value: &str) -> u64 {
    value.trim().parse::<u64>().unwrap_or(0)
}
