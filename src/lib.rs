//! DEX Token Screener Library
//!
//! Screens DEX tokens by reconciling two fraud oracles into one verdict and
//! ranking survivors with a tiered composite score.

pub mod candidates;
pub mod cli;
pub mod config;
pub mod error;
pub mod fraud;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod scoring;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Screener, ScreeningReport, TokenResult, TokenStatus};
