//! Screening pipeline
//!
//! Drives each candidate through the checks in cost order: market data first,
//! then holder concentration, source verification, both fraud oracles, and
//! finally the composite scorer. A token stops at the first stage that
//! disqualifies it, so expensive calls are only made for plausible tokens.

use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Config, ThresholdConfig};
use crate::error::{ErrorCategory, ProviderError};
use crate::fraud::FraudAggregator;
use crate::providers::Providers;
use crate::scoring::{CompositeScorer, ScoreResult};
use crate::types::{FraudSignal, MarketMetrics, ScoringInput, TokenCandidate};

pub mod stats;

pub use stats::RunStatistics;

/// Terminal outcome for one token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenStatus {
    Passed,
    Failed,
    Error,
}

impl std::fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStatus::Passed => write!(f, "PASSED"),
            TokenStatus::Failed => write!(f, "FAILED"),
            TokenStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Placement of a passing token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Listing {
    Featured,
    Visible,
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Listing::Featured => write!(f, "FEATURED"),
            Listing::Visible => write!(f, "VISIBLE"),
        }
    }
}

/// Outcome record for one screened token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenResult {
    pub symbol: String,
    pub address: String,
    pub status: TokenStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metrics: Option<MarketMetrics>,
    pub top10_concentration: Option<f64>,
    pub verified: Option<bool>,
    pub score: Option<ScoreResult>,
    pub failure_reasons: Vec<String>,
    pub risk_factors: Vec<String>,
    /// Fraud risk score, only for tokens that survived the fraud checks
    pub fraud_risk_score: Option<u32>,
    pub honeypot: bool,
    pub listing: Option<Listing>,
    /// Liquidity is fragmented across pools
    pub high_slippage: bool,
    /// Non-fatal problems, such as a degraded secondary oracle
    pub warnings: Vec<String>,
}

impl TokenResult {
    fn new(token: &TokenCandidate, status: TokenStatus, metrics: Option<MarketMetrics>) -> Self {
        Self {
            symbol: token.symbol.clone(),
            address: token.address.clone(),
            status,
            error_category: None,
            error: None,
            metrics,
            top10_concentration: None,
            verified: None,
            score: None,
            failure_reasons: Vec::new(),
            risk_factors: Vec::new(),
            fraud_risk_score: None,
            honeypot: false,
            listing: None,
            high_slippage: false,
            warnings: Vec::new(),
        }
    }

    pub fn error(
        token: &TokenCandidate,
        metrics: Option<MarketMetrics>,
        err: &ProviderError,
    ) -> Self {
        Self {
            error_category: Some(err.category()),
            error: Some(err.to_string()),
            ..Self::new(token, TokenStatus::Error, metrics)
        }
    }

    pub fn failed(token: &TokenCandidate, metrics: MarketMetrics, reasons: Vec<String>) -> Self {
        Self {
            failure_reasons: reasons,
            ..Self::new(token, TokenStatus::Failed, Some(metrics))
        }
    }

    pub fn is_featured(&self) -> bool {
        self.listing == Some(Listing::Featured)
    }

    /// Composite score, 0 for anything that did not pass
    pub fn composite_score(&self) -> f64 {
        self.score.as_ref().map(|s| s.composite_score).unwrap_or(0.0)
    }

    /// The headline reason for a failed or errored token
    pub fn reason(&self) -> Option<&str> {
        match self.status {
            TokenStatus::Error => self.error.as_deref(),
            _ => self.failure_reasons.first().map(String::as_str),
        }
    }
}

/// Everything produced by one batch run
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub results: Vec<TokenResult>,
    pub stats: RunStatistics,
    /// The run stopped before every candidate was screened
    pub cancelled: bool,
}

/// Sequential token screener
pub struct Screener {
    providers: Providers,
    thresholds: ThresholdConfig,
    aggregator: FraudAggregator,
    scorer: CompositeScorer,
    inter_token_delay: Duration,
    cancel: CancellationToken,
}

impl Screener {
    pub fn new(config: &Config, providers: Providers) -> Self {
        Self {
            providers,
            thresholds: config.thresholds.clone(),
            aggregator: FraudAggregator::new(config.fraud.clone()),
            scorer: CompositeScorer::new(config.thresholds.clone(), config.scoring.clone()),
            inter_token_delay: config.pipeline.inter_token_delay(),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop the batch when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Screen one token through every stage
    pub async fn evaluate(&self, token: &TokenCandidate) -> TokenResult {
        let address = token.address.as_str();

        // Stage 1: market data
        let market = match self.providers.market.pair_metrics(address).await {
            Ok(m) => m,
            Err(e) => {
                debug!("{}: market data unavailable: {}", token.symbol, e);
                return TokenResult::error(token, None, &e);
            }
        };
        debug!(
            "{}: liquidity ${:.0}, volume ${:.0}, pool age {:.1}d",
            token.symbol, market.liquidity_usd, market.volume_24h_usd, market.pool_age_days
        );

        // Stage 2: cheap gate before any further calls
        let gate = self
            .scorer
            .market_failures(market.liquidity_usd, market.volume_24h_usd);
        if !gate.is_empty() {
            debug!("{}: below market minimums", token.symbol);
            return TokenResult::failed(token, market, gate);
        }

        // Stage 3: holder concentration
        let top10 = match self.providers.holders.top10_concentration(address).await {
            Ok(c) => c,
            Err(e) => return TokenResult::error(token, Some(market), &e),
        };

        // Stage 4: source verification
        let verified = match self.providers.verifier.is_verified(address).await {
            Ok(v) => v,
            Err(e) => return TokenResult::error(token, Some(market), &e),
        };
        if !verified {
            let mut result =
                TokenResult::failed(token, market, vec!["Contract not verified".to_string()]);
            result.top10_concentration = Some(top10);
            result.verified = Some(false);
            return result;
        }

        let mut result = TokenResult::new(token, TokenStatus::Failed, Some(market));
        result.top10_concentration = Some(top10);
        result.verified = Some(true);

        // Stage 5: primary oracle is required
        let primary = match self.providers.primary_oracle.check_token(address).await {
            Ok(signal) => signal,
            Err(e) => {
                let err = match e {
                    ProviderError::OracleUnavailable { .. } => e,
                    other => {
                        ProviderError::oracle(self.providers.primary_oracle.name(), other.to_string())
                    }
                };
                return TokenResult::error(token, Some(market), &err);
            }
        };

        // Stage 6: secondary oracle degrades to a best-case stand-in
        let secondary = match self.providers.secondary_oracle.check_token(address).await {
            Ok(signal) => signal,
            Err(e) => {
                let warning = match e {
                    ProviderError::OracleUnavailable { .. } => e.to_string(),
                    other => format!(
                        "{} unavailable: {}",
                        self.providers.secondary_oracle.name(),
                        other
                    ),
                };
                warn!("{}: {}, assuming best case", token.symbol, warning);
                result.warnings.push(warning);
                FraudSignal::synthetic(top10)
            }
        };

        // Stage 7: fraud verdict
        let verdict = self.aggregator.evaluate(&primary, &secondary);
        result.risk_factors = verdict.risk_labels();
        if !verdict.is_safe {
            let reason = verdict
                .rejection_reason
                .clone()
                .unwrap_or_else(|| "Rejected by fraud checks".to_string());
            info!("{}: rejected by fraud checks: {}", token.symbol, reason);
            result.failure_reasons = vec![reason];
            result.honeypot = verdict.is_honeypot;
            return result;
        }
        result.fraud_risk_score = Some(verdict.risk_score);

        // Stage 8: composite score
        let score = self
            .scorer
            .score(&ScoringInput::new(verified, &market, top10));
        if score.is_safe {
            result.status = TokenStatus::Passed;
            result.listing = Some(if self.scorer.is_featured(&score) {
                Listing::Featured
            } else {
                Listing::Visible
            });
            result.high_slippage = !market.fragmentation_safe;
        } else {
            result.failure_reasons = score.failure_reasons.clone();
        }
        result.score = Some(score);

        result
    }

    /// Screen a batch in input order.
    ///
    /// `on_result` is called with each token's position and outcome as soon as
    /// it is known. The inter-token pause is skipped after the last token and
    /// cut short by cancellation.
    pub async fn run<F>(&self, tokens: &[TokenCandidate], mut on_result: F) -> ScreeningReport
    where
        F: FnMut(usize, &TokenResult),
    {
        let mut results = Vec::with_capacity(tokens.len());
        let mut stats = RunStatistics::new();
        let mut cancelled = false;

        info!(
            "Screening {} tokens (min liquidity ${:.0}, min volume ${:.0})",
            tokens.len(),
            self.thresholds.min_liquidity_usd,
            self.thresholds.min_volume_24h_usd
        );

        for (index, token) in tokens.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let result = self.evaluate(token).await;
            match result.status {
                TokenStatus::Passed => info!(
                    "{} ({}): PASSED with score {:.2}",
                    token.symbol,
                    token.address,
                    result.composite_score()
                ),
                TokenStatus::Failed => debug!(
                    "{} ({}): FAILED: {}",
                    token.symbol,
                    token.address,
                    result.reason().unwrap_or("unknown")
                ),
                TokenStatus::Error => warn!(
                    "{} ({}): ERROR: {}",
                    token.symbol,
                    token.address,
                    result.reason().unwrap_or("unknown")
                ),
            }

            stats.record(&result);
            on_result(index, &result);
            results.push(result);

            let is_last = index + 1 == tokens.len();
            if !is_last && !self.inter_token_delay.is_zero() {
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.inter_token_delay) => {}
                }
            }
        }

        if cancelled {
            warn!(
                "Screening cancelled after {}/{} tokens",
                results.len(),
                tokens.len()
            );
        } else {
            info!(
                "Screening complete: {} passed, {} failed, {} errors",
                stats.passed, stats.failed, stats.errors
            );
        }

        ScreeningReport {
            results,
            stats,
            cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        ContractVerifier, FraudOracle, HolderConcentrationProvider, MarketDataProvider,
        ProviderResult,
    };
    use crate::types::{HolderSimulation, OracleSource};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Stub<T> {
        name: &'static str,
        response: ProviderResult<T>,
        calls: AtomicUsize,
    }

    impl<T: Clone> Stub<T> {
        fn new(response: ProviderResult<T>) -> Arc<Self> {
            Self::named("stub", response)
        }

        fn named(name: &'static str, response: ProviderResult<T>) -> Arc<Self> {
            Arc::new(Self {
                name,
                response,
                calls: AtomicUsize::new(0),
            })
        }

        fn respond(&self) -> ProviderResult<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataProvider for Stub<MarketMetrics> {
        async fn pair_metrics(&self, _address: &str) -> ProviderResult<MarketMetrics> {
            self.respond()
        }
    }

    #[async_trait]
    impl HolderConcentrationProvider for Stub<f64> {
        async fn top10_concentration(&self, _address: &str) -> ProviderResult<f64> {
            self.respond()
        }
    }

    #[async_trait]
    impl ContractVerifier for Stub<bool> {
        async fn is_verified(&self, _address: &str) -> ProviderResult<bool> {
            self.respond()
        }
    }

    #[async_trait]
    impl FraudOracle for Stub<FraudSignal> {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn check_token(&self, _address: &str) -> ProviderResult<FraudSignal> {
            self.respond()
        }
    }

    /// Answers per address, with a fallback for everything else
    struct ByAddress<T> {
        responses: HashMap<String, ProviderResult<T>>,
        fallback: ProviderResult<T>,
    }

    impl<T: Clone> ByAddress<T> {
        fn new(fallback: ProviderResult<T>) -> Self {
            Self {
                responses: HashMap::new(),
                fallback,
            }
        }

        fn with(mut self, address: &str, response: ProviderResult<T>) -> Self {
            self.responses.insert(address.to_string(), response);
            self
        }

        fn respond(&self, address: &str) -> ProviderResult<T> {
            self.responses
                .get(address)
                .cloned()
                .unwrap_or_else(|| self.fallback.clone())
        }
    }

    #[async_trait]
    impl MarketDataProvider for ByAddress<MarketMetrics> {
        async fn pair_metrics(&self, address: &str) -> ProviderResult<MarketMetrics> {
            self.respond(address)
        }
    }

    #[async_trait]
    impl FraudOracle for ByAddress<FraudSignal> {
        fn name(&self) -> &'static str {
            "Scripted"
        }

        async fn check_token(&self, address: &str) -> ProviderResult<FraudSignal> {
            self.respond(address)
        }
    }

    struct Harness {
        market: Arc<Stub<MarketMetrics>>,
        holders: Arc<Stub<f64>>,
        verifier: Arc<Stub<bool>>,
        primary: Arc<Stub<FraudSignal>>,
        secondary: Arc<Stub<FraudSignal>>,
    }

    fn healthy_market() -> MarketMetrics {
        MarketMetrics {
            liquidity_usd: 2_000_000.0,
            volume_24h_usd: 300_000.0,
            fragmentation_safe: true,
            pool_age_days: 30.0,
        }
    }

    fn secondary_signal() -> FraudSignal {
        FraudSignal {
            holder_count: 12_000,
            top10_concentration: 25.0,
            ..FraudSignal::clean(OracleSource::Secondary)
        }
    }

    fn other_error() -> ProviderError {
        ProviderError::Other("request failed: timed out".to_string())
    }

    impl Harness {
        fn healthy() -> Self {
            Self {
                market: Stub::new(Ok(healthy_market())),
                holders: Stub::new(Ok(25.0)),
                verifier: Stub::new(Ok(true)),
                primary: Stub::named("Primary", Ok(FraudSignal::clean(OracleSource::Primary))),
                secondary: Stub::named("Secondary", Ok(secondary_signal())),
            }
        }

        fn screener(&self) -> Screener {
            let mut config = Config::default();
            config.pipeline.inter_token_delay_ms = 0;
            let providers = Providers {
                market: self.market.clone(),
                holders: self.holders.clone(),
                verifier: self.verifier.clone(),
                primary_oracle: self.primary.clone(),
                secondary_oracle: self.secondary.clone(),
            };
            Screener::new(&config, providers)
        }

        fn call_counts(&self) -> [usize; 5] {
            [
                self.market.calls(),
                self.holders.calls(),
                self.verifier.calls(),
                self.primary.calls(),
                self.secondary.calls(),
            ]
        }
    }

    fn token() -> TokenCandidate {
        TokenCandidate::new("0x0e09fabb73bd3ade0a17ecc321fd13a19e81ce82", "CAKE")
    }

    #[tokio::test]
    async fn test_healthy_token_passes_featured() {
        let harness = Harness::healthy();
        let result = harness.screener().evaluate(&token()).await;

        assert_eq!(result.status, TokenStatus::Passed);
        assert_eq!(result.listing, Some(Listing::Featured));
        assert!(!result.high_slippage);
        assert!(result.failure_reasons.is_empty());
        assert_eq!(result.fraud_risk_score, Some(0));

        let score = result.score.as_ref().unwrap();
        assert_eq!(score.liquidity_score, 80.0);
        let expected = 80.0 * 0.35 + 75.0 * 0.30 + 90.0 * 0.25 + 100.0 * 0.10;
        assert!((result.composite_score() - expected).abs() < 1e-9);
        assert_eq!(harness.call_counts(), [1, 1, 1, 1, 1]);
    }

    #[tokio::test]
    async fn test_low_liquidity_skips_remaining_calls() {
        let harness = Harness {
            market: Stub::new(Ok(MarketMetrics {
                liquidity_usd: 50_000.0,
                volume_24h_usd: 20_000.0,
                ..healthy_market()
            })),
            ..Harness::healthy()
        };
        let result = harness.screener().evaluate(&token()).await;

        assert_eq!(result.status, TokenStatus::Failed);
        assert_eq!(result.composite_score(), 0.0);
        assert_eq!(result.failure_reasons.len(), 1);
        assert!(result.failure_reasons[0].contains("Liquidity too low"));
        assert!(result.failure_reasons[0].contains("100000"));
        assert_eq!(harness.call_counts(), [1, 0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_market_errors_are_categorized() {
        for (err, category) in [
            (
                ProviderError::NoPairs {
                    address: "0x1".to_string(),
                },
                ErrorCategory::NoPairs,
            ),
            (
                ProviderError::NoStablecoinPairs {
                    address: "0x1".to_string(),
                },
                ErrorCategory::NoStablecoinPairs,
            ),
            (other_error(), ErrorCategory::Other),
        ] {
            let harness = Harness {
                market: Stub::new(Err(err)),
                ..Harness::healthy()
            };
            let result = harness.screener().evaluate(&token()).await;

            assert_eq!(result.status, TokenStatus::Error);
            assert_eq!(result.error_category, Some(category));
            assert!(result.metrics.is_none());
            assert_eq!(harness.call_counts(), [1, 0, 0, 0, 0]);
        }
    }

    #[tokio::test]
    async fn test_holder_error_is_terminal() {
        let harness = Harness {
            holders: Stub::new(Err(other_error())),
            ..Harness::healthy()
        };
        let result = harness.screener().evaluate(&token()).await;

        assert_eq!(result.status, TokenStatus::Error);
        assert_eq!(result.error_category, Some(ErrorCategory::Other));
        assert_eq!(harness.call_counts(), [1, 1, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_unverified_contract_fails_before_oracles() {
        let harness = Harness {
            verifier: Stub::new(Ok(false)),
            ..Harness::healthy()
        };
        let result = harness.screener().evaluate(&token()).await;

        assert_eq!(result.status, TokenStatus::Failed);
        assert_eq!(result.reason(), Some("Contract not verified"));
        assert_eq!(harness.call_counts(), [1, 1, 1, 0, 0]);
    }

    #[tokio::test]
    async fn test_primary_oracle_is_required() {
        let harness = Harness {
            primary: Stub::named("Primary", Err(other_error())),
            ..Harness::healthy()
        };
        let result = harness.screener().evaluate(&token()).await;

        assert_eq!(result.status, TokenStatus::Error);
        assert_eq!(result.error_category, Some(ErrorCategory::OracleUnavailable));
        assert!(result.error.as_deref().unwrap().starts_with("Primary unavailable"));
        assert_eq!(harness.call_counts(), [1, 1, 1, 1, 0]);
    }

    #[tokio::test]
    async fn test_secondary_oracle_failure_degrades() {
        let harness = Harness {
            secondary: Stub::named(
                "Secondary",
                Err(ProviderError::oracle("Secondary", "code 4029")),
            ),
            ..Harness::healthy()
        };
        let result = harness.screener().evaluate(&token()).await;

        assert_eq!(result.status, TokenStatus::Passed);
        assert!(result.score.is_some());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("Secondary unavailable"));
        assert_eq!(harness.call_counts(), [1, 1, 1, 1, 1]);
    }

    #[tokio::test]
    async fn test_fraud_rejection_skips_scoring() {
        let harness = Harness {
            secondary: Stub::named(
                "Secondary",
                Ok(FraudSignal {
                    cannot_sell_all: true,
                    is_proxy: true,
                    ..secondary_signal()
                }),
            ),
            ..Harness::healthy()
        };
        let result = harness.screener().evaluate(&token()).await;

        assert_eq!(result.status, TokenStatus::Failed);
        assert!(result.honeypot);
        assert!(result.score.is_none());
        assert!(result.fraud_risk_score.is_none());
        assert_eq!(result.failure_reasons.len(), 1);
    }

    #[tokio::test]
    async fn test_moderate_fail_rate_passes_with_risk() {
        let primary = FraudSignal {
            is_honeypot: true,
            holder_simulation: HolderSimulation {
                total: 40,
                successful: 39,
                failed: 1,
            },
            ..FraudSignal::clean(OracleSource::Primary)
        };
        let harness = Harness {
            primary: Stub::named("Primary", Ok(primary)),
            ..Harness::healthy()
        };
        let result = harness.screener().evaluate(&token()).await;

        assert_eq!(result.status, TokenStatus::Passed);
        assert!(!result.risk_factors.is_empty());
        assert!(result.fraud_risk_score.unwrap() > 0);
    }

    #[tokio::test]
    async fn test_fragmented_liquidity_warns_slippage() {
        let harness = Harness {
            market: Stub::new(Ok(MarketMetrics {
                fragmentation_safe: false,
                ..healthy_market()
            })),
            ..Harness::healthy()
        };
        let result = harness.screener().evaluate(&token()).await;

        assert_eq!(result.status, TokenStatus::Passed);
        assert!(result.high_slippage);
    }

    #[tokio::test]
    async fn test_scorer_hard_filter_fails_token() {
        let harness = Harness {
            market: Stub::new(Ok(MarketMetrics {
                pool_age_days: 2.0,
                ..healthy_market()
            })),
            holders: Stub::new(Ok(85.0)),
            ..Harness::healthy()
        };
        let result = harness.screener().evaluate(&token()).await;

        assert_eq!(result.status, TokenStatus::Failed);
        assert_eq!(result.composite_score(), 0.0);
        assert_eq!(result.failure_reasons.len(), 2);
        assert!(result.failure_reasons[0].contains("Holder concentration"));
        assert!(result.failure_reasons[1].contains("Pair too new"));
        assert!(result.listing.is_none());
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let harness = Harness::healthy();
        let screener = harness.screener();
        let first = tokio_test::block_on(screener.evaluate(&token()));
        let second = tokio_test::block_on(screener.evaluate(&token()));
        assert_eq!(first, second);
        assert_eq!(harness.market.calls(), 2);
    }

    #[tokio::test]
    async fn test_run_preserves_order_and_counts() {
        let harness = Harness::healthy();
        let tokens: Vec<TokenCandidate> = (0..4)
            .map(|i| TokenCandidate::new(&format!("0x{:040x}", i), &format!("T{}", i)))
            .collect();

        let mut seen = Vec::new();
        let report = harness
            .screener()
            .run(&tokens, |index, result| seen.push((index, result.symbol.clone())))
            .await;

        assert!(!report.cancelled);
        assert_eq!(report.results.len(), 4);
        assert_eq!(
            seen,
            vec![
                (0, "T0".to_string()),
                (1, "T1".to_string()),
                (2, "T2".to_string()),
                (3, "T3".to_string())
            ]
        );
        let stats = &report.stats;
        assert_eq!(stats.total, 4);
        assert_eq!(stats.passed + stats.failed + stats.errors, stats.total);
        assert_eq!(stats.featured, 4);
    }

    #[tokio::test]
    async fn test_run_honors_cancellation() {
        let harness = Harness::healthy();
        let cancel = CancellationToken::new();
        let mut config = Config::default();
        config.pipeline.inter_token_delay_ms = 60_000;
        let providers = Providers {
            market: harness.market.clone(),
            holders: harness.holders.clone(),
            verifier: harness.verifier.clone(),
            primary_oracle: harness.primary.clone(),
            secondary_oracle: harness.secondary.clone(),
        };
        let screener = Screener::new(&config, providers).with_cancellation(cancel.clone());

        let tokens = vec![token(), token(), token()];
        let report = screener.run(&tokens, |_, _| cancel.cancel()).await;

        assert!(report.cancelled);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.stats.total, 1);
        assert_eq!(harness.market.calls(), 1);
    }

    #[tokio::test]
    async fn test_run_mixed_outcomes_balance() {
        let thin = MarketMetrics {
            liquidity_usd: 50_000.0,
            ..healthy_market()
        };
        let market = ByAddress::new(Ok(healthy_market()))
            .with("0xb", Ok(thin))
            .with(
                "0xd",
                Err(ProviderError::NoPairs {
                    address: "0xd".to_string(),
                }),
            );
        let primary = ByAddress::new(Ok(FraudSignal::clean(OracleSource::Primary)))
            .with("0xe", Err(ProviderError::oracle("Primary", "timeout")));
        let secondary = ByAddress::new(Ok(secondary_signal())).with(
            "0xc",
            Ok(FraudSignal {
                cannot_buy: true,
                ..secondary_signal()
            }),
        );

        let mut config = Config::default();
        config.pipeline.inter_token_delay_ms = 0;
        let providers = Providers {
            market: Arc::new(market),
            holders: Stub::new(Ok(25.0)),
            verifier: Stub::new(Ok(true)),
            primary_oracle: Arc::new(primary),
            secondary_oracle: Arc::new(secondary),
        };
        let screener = Screener::new(&config, providers);

        let tokens: Vec<TokenCandidate> = ["0xa", "0xb", "0xc", "0xd", "0xe"]
            .iter()
            .map(|address| TokenCandidate::new(address, "TKN"))
            .collect();
        let mut seen = Vec::new();
        let report = screener
            .run(&tokens, |index, result| seen.push((index, result.status)))
            .await;

        assert_eq!(
            seen,
            vec![
                (0, TokenStatus::Passed),
                (1, TokenStatus::Failed),
                (2, TokenStatus::Failed),
                (3, TokenStatus::Error),
                (4, TokenStatus::Error),
            ]
        );

        let stats = &report.stats;
        assert_eq!(stats.total, 5);
        assert_eq!(stats.passed, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.passed + stats.failed + stats.errors, stats.total);
        assert_eq!(stats.error_categories.values().sum::<usize>(), stats.errors);
        assert_eq!(stats.error_count(ErrorCategory::NoPairs), 1);
        assert_eq!(stats.error_count(ErrorCategory::OracleUnavailable), 1);
        assert_eq!(stats.honeypot_rejected, 1);
        // Only the token without pairs lacks market data
        assert_eq!(stats.evaluated, 4);
    }

    #[tokio::test]
    async fn test_run_empty_batch() {
        let report = Harness::healthy().screener().run(&[], |_, _| {}).await;
        assert!(report.results.is_empty());
        assert_eq!(report.stats.total, 0);
        assert!(!report.cancelled);
    }
}
