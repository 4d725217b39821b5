//! Fraud detection
//!
//! Two independent oracles report on the same token; the aggregator turns
//! their sometimes-contradictory readings into a single safety verdict.

pub mod aggregator;

pub use aggregator::{FraudAggregator, FraudRejection, FraudVerdict, RiskFactor};
