//! GoPlus token security client, the secondary fraud oracle
//!
//! Static analysis of the contract plus holder and creator facts. Every
//! field arrives string-encoded; taxes and percents are fractions of 1.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use super::{get_json, parse_f64, parse_u64, FraudOracle, ProviderResult};
use crate::config::ApiConfig;
use crate::error::ProviderError;
use crate::types::{FraudSignal, OracleSource};

const ORACLE_NAME: &str = "GoPlus";
const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSecurityResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Option<HashMap<String, TokenSecurity>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenSecurity {
    pub buy_tax: String,
    pub sell_tax: String,
    pub transfer_tax: String,
    pub cannot_buy: String,
    pub cannot_sell_all: String,
    pub creator_address: String,
    pub creator_percent: String,
    pub holder_count: String,
    pub holders: Vec<SecurityHolder>,
    pub honeypot_with_same_creator: String,
    pub is_open_source: String,
    pub is_proxy: String,
    pub lp_holder_count: String,
    pub owner_address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecurityHolder {
    pub address: String,
    pub percent: String,
}

fn flag(value: &str) -> bool {
    value.trim() == "1"
}

impl TokenSecurity {
    /// Sum of the top 10 holder shares, in percent
    pub fn top10_concentration(&self) -> f64 {
        self.holders
            .iter()
            .take(10)
            .map(|h| parse_f64(&h.percent))
            .sum::<f64>()
            * 100.0
    }

    /// Owner is set and not renounced to the zero address
    pub fn has_owner(&self) -> bool {
        let owner = self.owner_address.trim();
        !owner.is_empty() && !owner.eq_ignore_ascii_case(ZERO_ADDRESS)
    }

    pub fn into_signal(self) -> FraudSignal {
        let lp_holder_count = match self.lp_holder_count.trim() {
            "" => None,
            count => count.parse::<u32>().ok(),
        };

        FraudSignal {
            source: OracleSource::Secondary,
            is_honeypot: false,
            honeypot_reason: None,
            buy_tax: parse_f64(&self.buy_tax) * 100.0,
            sell_tax: parse_f64(&self.sell_tax) * 100.0,
            transfer_tax: parse_f64(&self.transfer_tax) * 100.0,
            cannot_buy: flag(&self.cannot_buy),
            cannot_sell_all: flag(&self.cannot_sell_all),
            holder_simulation: Default::default(),
            is_proxy: flag(&self.is_proxy),
            is_open_source: flag(&self.is_open_source),
            has_owner: self.has_owner(),
            creator_fraction: parse_f64(&self.creator_percent),
            creator_has_honeypots: flag(&self.honeypot_with_same_creator),
            holder_count: parse_u64(&self.holder_count),
            top10_concentration: self.top10_concentration(),
            lp_holder_count,
        }
    }
}

impl TokenSecurityResponse {
    /// Extract the report for one token, keys are usually lowercased
    pub fn into_signal(self, address: &str) -> ProviderResult<FraudSignal> {
        if self.code != 1 {
            return Err(ProviderError::oracle(
                ORACLE_NAME,
                format!("code {}: {}", self.code, self.message),
            ));
        }

        let mut result = self.result.unwrap_or_default();
        let security = result
            .remove(address)
            .or_else(|| result.remove(&address.to_lowercase()))
            .ok_or_else(|| {
                ProviderError::oracle(ORACLE_NAME, format!("no data for token {}", address))
            })?;

        Ok(security.into_signal())
    }
}

pub struct GoPlusClient {
    client: Client,
    base_url: String,
    chain_id: u64,
}

impl GoPlusClient {
    pub fn new(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.goplus_base_url.clone(),
            chain_id: config.chain_id,
        }
    }

    pub async fn token_security(&self, address: &str) -> ProviderResult<TokenSecurityResponse> {
        let url = format!("{}/api/v1/token_security/{}", self.base_url, self.chain_id);
        debug!("Fetching GoPlus security report for {}", address);
        get_json(self.client.get(&url).query(&[("contract_addresses", address)])).await
    }
}

#[async_trait]
impl FraudOracle for GoPlusClient {
    fn name(&self) -> &'static str {
        ORACLE_NAME
    }

    async fn check_token(&self, address: &str) -> ProviderResult<FraudSignal> {
        self.token_security(address)
            .await
            .map_err(|e| match e {
                ProviderError::OracleUnavailable { .. } => e,
                other => ProviderError::oracle(ORACLE_NAME, other.to_string()),
            })?
            .into_signal(address)
    }
}
