//! Token list loading
//!
//! Accepts either a flat list of tokens or a map of symbol to contract
//! entries, as produced by the token list exporter.

use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::TokenCandidate;

lazy_static::lazy_static! {
    static ref ADDRESS_RE: Regex =
        Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("Invalid address regex");
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenFile {
    Flat(Vec<TokenCandidate>),
    Grouped(BTreeMap<String, Vec<GroupedEntry>>),
}

#[derive(Debug, Deserialize)]
struct GroupedEntry {
    contract_address: String,
}

pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

/// Parse a token list from JSON text
pub fn parse(json: &str) -> Result<Vec<TokenCandidate>> {
    let file: TokenFile = serde_json::from_str(json).map_err(|e| {
        Error::InvalidTokenList(format!(
            "expected a token array or a symbol map: {}",
            e
        ))
    })?;

    let tokens = match file {
        TokenFile::Flat(tokens) => tokens,
        TokenFile::Grouped(groups) => groups
            .into_iter()
            .flat_map(|(symbol, entries)| {
                entries
                    .into_iter()
                    .map(move |entry| TokenCandidate::new(&entry.contract_address, &symbol))
            })
            .collect(),
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::with_capacity(tokens.len());
    for mut token in tokens {
        token.address = token.address.trim().to_string();
        if !is_valid_address(&token.address) {
            warn!("Skipping {} with invalid address {:?}", token.symbol, token.address);
            continue;
        }
        if !seen.insert(token.address.to_lowercase()) {
            warn!("Skipping duplicate address {}", token.address);
            continue;
        }
        candidates.push(token);
    }

    Ok(candidates)
}

/// Load a token list from a JSON file
pub fn load(path: impl AsRef<Path>) -> Result<Vec<TokenCandidate>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| {
        Error::InvalidTokenList(format!("cannot read {}: {}", path.display(), e))
    })?;
    let candidates = parse(&json)?;
    info!("Loaded {} tokens from {}", candidates.len(), path.display());
    Ok(candidates)
}
