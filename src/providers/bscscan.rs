//! Etherscan v2 client for contract source verification
//!
//! Etherscan's multichain API serves BSC through the `chainid` parameter.
//! Errors come back with HTTP 200, `status: "0"` and a string `result`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{get_json, ContractVerifier, ProviderResult};
use crate::config::ApiConfig;
use crate::error::ProviderError;

#[derive(Debug, Clone, Deserialize)]
pub struct SourceCodeResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub result: SourceCodeResult,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SourceCodeResult {
    Sources(Vec<ContractSource>),
    Message(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractSource {
    #[serde(rename = "SourceCode", default)]
    pub source_code: String,
    #[serde(rename = "ABI", default)]
    pub abi: String,
    #[serde(rename = "ContractName", default)]
    pub contract_name: String,
    #[serde(rename = "Proxy", default)]
    pub proxy: String,
}

impl SourceCodeResponse {
    /// Verified source with an ABI, and not a proxy
    pub fn is_verified(&self) -> ProviderResult<bool> {
        match &self.result {
            SourceCodeResult::Message(msg) if self.status == "0" => Err(ProviderError::Other(
                format!("Etherscan API error: {}", msg),
            )),
            SourceCodeResult::Message(_) => Ok(false),
            SourceCodeResult::Sources(sources) => Ok(self.status == "1"
                && sources.first().is_some_and(|s| {
                    !s.source_code.is_empty() && !s.abi.is_empty() && s.proxy == "0"
                })),
        }
    }
}

pub struct EtherscanClient {
    client: Client,
    base_url: String,
    api_key: String,
    chain_id: u64,
}

impl EtherscanClient {
    pub fn new(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.bscscan_base_url.clone(),
            api_key: config.bscscan_api_key.clone(),
            chain_id: config.chain_id,
        }
    }

    pub async fn get_source_code(&self, address: &str) -> ProviderResult<SourceCodeResponse> {
        debug!("Fetching contract source for {}", address);
        let chain_id = self.chain_id.to_string();
        let request = self.client.get(&self.base_url).query(&[
            ("chainid", chain_id.as_str()),
            ("module", "contract"),
            ("action", "getsourcecode"),
            ("address", address),
            ("apikey", self.api_key.as_str()),
        ]);
        get_json(request).await
    }
}

#[async_trait]
impl ContractVerifier for EtherscanClient {
    async fn is_verified(&self, address: &str) -> ProviderResult<bool> {
        self.get_source_code(address).await?.is_verified()
    }
}
