//! CLI command implementations

use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::candidates;
use crate::config::Config;
use crate::pipeline::Screener;
use crate::providers::Providers;
use crate::report::{self, ResultsFile};
use crate::types::TokenCandidate;

/// Options for a batch run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip this many tokens from the start of the list
    pub offset: usize,
    /// Screen at most this many tokens
    pub limit: Option<usize>,
    /// Also export every result as JSON
    pub json: Option<String>,
    /// Do not write the results text file
    pub no_file: bool,
}

/// Screen a token list
pub async fn run(config: &Config, tokens_path: &str, options: &RunOptions) -> Result<()> {
    let all = candidates::load(tokens_path)?;
    let tokens: Vec<TokenCandidate> = all
        .into_iter()
        .skip(options.offset)
        .take(options.limit.unwrap_or(usize::MAX))
        .collect();

    if tokens.is_empty() {
        warn!("No tokens to screen in {}", tokens_path);
        return Ok(());
    }

    let providers = Providers::from_config(config)?;

    // Ctrl-C stops the batch between tokens
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received shutdown signal, stopping after the current token");
            signal_cancel.cancel();
        }
    });

    let screener = Screener::new(config, providers).with_cancellation(cancel);

    let started = Local::now();
    let mut results_file = if options.no_file {
        None
    } else {
        Some(
            ResultsFile::create(&config.pipeline.results_dir, started)
                .context("Could not create results file")?,
        )
    };

    let total = tokens.len();
    let header = report::render_header(started, total);
    print!("{}", header);
    write_results(&mut results_file, &header);

    let screening = screener
        .run(&tokens, |index, result| {
            let text = report::render_token(index, total, result);
            print!("{}", text);
            write_results(&mut results_file, &text);
        })
        .await;

    let summary = report::render_summary(&screening.stats);
    print!("{}", summary);
    write_results(&mut results_file, &summary);

    let breakdown = report::render_breakdown(
        &screening.results,
        &screening.stats,
        config.pipeline.max_error_rows,
    );
    write_results(&mut results_file, &breakdown);

    if screening.cancelled {
        warn!(
            "Run cancelled: {} of {} tokens screened",
            screening.results.len(),
            total
        );
    }

    if let Some(path) = &options.json {
        report::write_json(path, &screening)
            .with_context(|| format!("Could not write JSON report to {}", path))?;
        info!("JSON report written to {}", path);
    }

    if let Some(file) = &results_file {
        println!("\nResults saved to: {}", file.path().display());
    }

    Ok(())
}

fn write_results(file: &mut Option<ResultsFile>, text: &str) {
    if let Some(file) = file.as_mut() {
        if let Err(e) = file.write(text) {
            error!("Failed to write results file: {}", e);
        }
    }
}

/// Screen a single token and print the full evaluation
pub async fn check(config: &Config, address: &str, symbol: Option<&str>) -> Result<()> {
    if !candidates::is_valid_address(address) {
        anyhow::bail!("Invalid contract address: {}", address);
    }

    let providers = Providers::from_config(config)?;
    let screener = Screener::new(config, providers);
    let token = TokenCandidate::new(address, symbol.unwrap_or("?"));

    info!("Checking {}", address);
    let result = screener.evaluate(&token).await;

    print!("{}", report::render_token(0, 1, &result));

    if result.failure_reasons.len() > 1 {
        println!("All failure reasons:");
        for reason in &result.failure_reasons {
            println!("  - {}", reason);
        }
    }

    if let Some(score) = &result.score {
        println!(
            "Sub-scores: liquidity {:.0}, volume {:.0}, holders {:.0}, fragmentation {:.0}",
            score.liquidity_score, score.volume_score, score.holder_score, score.fragmentation_score
        );
    }

    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Config file path, falling back to defaults when absent
pub fn describe_config_source(path: &str) -> String {
    if Path::new(path).exists() {
        format!("Loaded configuration from {}", path)
    } else {
        format!("No config file at {}, using defaults and environment", path)
    }
}
