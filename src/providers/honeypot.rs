//! Honeypot.is client
//!
//! Serves two roles: top-holder concentration, and the primary fraud oracle
//! backed by simulated buys and sells across sampled holders.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{
    get_json, parse_f64, parse_u64, FraudOracle, HolderConcentrationProvider, ProviderResult,
};
use crate::config::ApiConfig;
use crate::error::ProviderError;
use crate::types::{FraudSignal, HolderSimulation, OracleSource};

const ORACLE_NAME: &str = "Honeypot.is";

#[derive(Debug, Clone, Deserialize)]
pub struct TopHoldersResponse {
    #[serde(rename = "totalSupply", default)]
    pub total_supply: String,
    #[serde(default)]
    pub holders: Vec<TopHolder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopHolder {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub balance: String,
}

impl TopHoldersResponse {
    /// Percentage of total supply held by the listed holders
    pub fn concentration(&self) -> f64 {
        if self.holders.is_empty() {
            return 0.0;
        }

        let total_supply = parse_f64(&self.total_supply);
        if total_supply <= 0.0 {
            return 0.0;
        }

        let held: f64 = self.holders.iter().map(|h| parse_f64(&h.balance)).sum();
        held / total_supply * 100.0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotResponse {
    #[serde(default)]
    pub honeypot_result: Option<HoneypotResult>,
    #[serde(default)]
    pub simulation_result: Option<SimulationResult>,
    #[serde(default)]
    pub holder_analysis: Option<HolderAnalysis>,
    #[serde(default)]
    pub contract_code: Option<ContractCode>,
    #[serde(default)]
    pub simulation_success: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotResult {
    #[serde(default)]
    pub is_honeypot: bool,
    #[serde(default)]
    pub honeypot_reason: Option<String>,
}

/// Taxes are reported in percent
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    #[serde(default)]
    pub buy_tax: f64,
    #[serde(default)]
    pub sell_tax: f64,
    #[serde(default)]
    pub transfer_tax: f64,
}

/// Counts arrive as strings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HolderAnalysis {
    #[serde(default)]
    pub holders: String,
    #[serde(default)]
    pub successful: String,
    #[serde(default)]
    pub failed: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCode {
    #[serde(default)]
    pub open_source: bool,
    #[serde(default)]
    pub is_proxy: bool,
}

impl HoneypotResponse {
    /// A scan that could not simulate trades carries no usable verdict
    pub fn into_signal(self) -> ProviderResult<FraudSignal> {
        if !self.simulation_success {
            return Err(ProviderError::oracle(ORACLE_NAME, "simulation failed"));
        }

        let mut signal = FraudSignal::clean(OracleSource::Primary);
        // Unknown source status is not assumed open
        signal.is_open_source = false;

        if let Some(result) = self.honeypot_result {
            signal.is_honeypot = result.is_honeypot;
            signal.honeypot_reason = result.honeypot_reason.filter(|r| !r.is_empty());
        }

        if let Some(sim) = self.simulation_result {
            signal.buy_tax = sim.buy_tax;
            signal.sell_tax = sim.sell_tax;
            signal.transfer_tax = sim.transfer_tax;
        }

        if let Some(analysis) = self.holder_analysis {
            signal.holder_simulation = HolderSimulation {
                total: parse_u64(&analysis.holders),
                successful: parse_u64(&analysis.successful),
                failed: parse_u64(&analysis.failed),
            };
        }

        if let Some(code) = self.contract_code {
            signal.is_open_source = code.open_source;
            signal.is_proxy = code.is_proxy;
        }

        Ok(signal)
    }
}

pub struct HoneypotClient {
    client: Client,
    base_url: String,
    chain_id: u64,
}

impl HoneypotClient {
    pub fn new(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.honeypot_base_url.clone(),
            chain_id: config.chain_id,
        }
    }

    pub async fn get_top_holders(&self, address: &str) -> ProviderResult<TopHoldersResponse> {
        let url = format!("{}/v1/TopHolders", self.base_url);
        debug!("Fetching top holders for {}", address);
        let chain_id = self.chain_id.to_string();
        get_json(
            self.client
                .get(&url)
                .query(&[("address", address), ("chainID", chain_id.as_str())]),
        )
        .await
    }

    pub async fn is_honeypot(&self, address: &str) -> ProviderResult<HoneypotResponse> {
        let url = format!("{}/v2/IsHoneypot", self.base_url);
        debug!("Running honeypot simulation for {}", address);
        let chain_id = self.chain_id.to_string();
        get_json(
            self.client
                .get(&url)
                .query(&[("address", address), ("chainID", chain_id.as_str())]),
        )
        .await
    }
}

#[async_trait]
impl HolderConcentrationProvider for HoneypotClient {
    async fn top10_concentration(&self, address: &str) -> ProviderResult<f64> {
        let response = self.get_top_holders(address).await?;
        if response.holders.is_empty() {
            warn!("No top holders reported for {}", address);
        }
        Ok(response.concentration())
    }
}

#[async_trait]
impl FraudOracle for HoneypotClient {
    fn name(&self) -> &'static str {
        ORACLE_NAME
    }

    async fn check_token(&self, address: &str) -> ProviderResult<FraudSignal> {
        let response = self
            .is_honeypot(address)
            .await
            .map_err(|e| ProviderError::oracle(ORACLE_NAME, e.to_string()))?;
        response.into_signal()
    }
}
