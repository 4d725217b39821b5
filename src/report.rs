//! Console and file reporting
//!
//! Plain-text rendering of per-token outcomes, the run summary and the
//! detailed breakdown, plus the timestamped results file and JSON export.

use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ErrorCategory, Result};
use crate::pipeline::{RunStatistics, ScreeningReport, TokenResult, TokenStatus};

const RULE_WIDTH: usize = 60;

fn rule(c: char) -> String {
    std::iter::repeat(c).take(RULE_WIDTH).collect()
}

/// Shorten to `max_len` characters, ending in "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

pub fn render_header(started: DateTime<Local>, total: usize) -> String {
    format!(
        "BSC Token Screening Pipeline - {}\nTotal: {} tokens\n\n",
        started.format("%Y-%m-%d %H:%M:%S"),
        total
    )
}

/// Progress line and outcome for one token
pub fn render_token(index: usize, total: usize, result: &TokenResult) -> String {
    let mut out = format!(
        "[{}/{}] {} ({})\n",
        index + 1,
        total,
        result.symbol,
        result.address
    );

    for warning in &result.warnings {
        out.push_str(&format!("  WARNING: {}\n", warning));
    }

    let Some(score) = &result.score else {
        match result.status {
            TokenStatus::Error => {
                out.push_str(&format!("  ERROR: {}\n", result.reason().unwrap_or("unknown")));
            }
            _ => {
                out.push_str(&format!("  REJECTED: {}\n", result.reason().unwrap_or("unknown")));
                if !result.risk_factors.is_empty() {
                    out.push_str(&format!(
                        "  Risk Factors: [{}]\n",
                        result.risk_factors.join(", ")
                    ));
                }
            }
        }
        out.push('\n');
        return out;
    };

    if let Some(m) = &result.metrics {
        out.push_str(&format!(
            "  Verified: {} | Liq: ${:.0} | Vol: ${:.0} | Age: {:.1}d | Frag: {} | Conc: {:.2}%\n",
            result.verified.unwrap_or(false),
            m.liquidity_usd,
            m.volume_24h_usd,
            m.pool_age_days,
            m.fragmentation_safe,
            result.top10_concentration.unwrap_or(0.0)
        ));
    }
    out.push_str(&format!(
        "  Score: {:.2} (L:{:.0} V:{:.0} H:{:.0} F:{:.0})\n",
        score.composite_score,
        score.liquidity_score,
        score.volume_score,
        score.holder_score,
        score.fragmentation_score
    ));

    if !result.risk_factors.is_empty() {
        out.push_str(&format!(
            "  Fraud Risk: [{}] (Score: {}/100)\n",
            result.risk_factors.join(", "),
            result.fraud_risk_score.unwrap_or(0)
        ));
    }

    match (result.status, result.listing) {
        (TokenStatus::Passed, Some(listing)) => {
            let slippage = if result.high_slippage {
                " (high slippage risk)"
            } else {
                ""
            };
            out.push_str(&format!("  Result: PASSED - {}{}\n", listing, slippage));
        }
        _ => {
            out.push_str(&format!(
                "  Result: REJECTED - {}\n",
                result.reason().unwrap_or("unknown")
            ));
        }
    }

    out.push('\n');
    out
}

pub fn render_summary(stats: &RunStatistics) -> String {
    let pct = RunStatistics::percent;
    let mut out = format!("\n{}\n", rule('='));
    out.push_str("                  SCREENING SUMMARY\n");
    out.push_str(&format!("{}\n\n", rule('=')));
    out.push_str(&format!("Total Tokens Processed: {}\n\n", stats.total));

    out.push_str("Data Availability:\n");
    out.push_str(&format!(
        "  - Tokens with errors: {} ({:.1}%)\n",
        stats.errors,
        pct(stats.errors, stats.total)
    ));
    for (label, category) in [
        ("No stablecoin pairs", ErrorCategory::NoStablecoinPairs),
        ("Not on DexScreener", ErrorCategory::NoPairs),
        ("Fraud API errors", ErrorCategory::OracleUnavailable),
        ("Other errors", ErrorCategory::Other),
    ] {
        out.push_str(&format!("    {}: {}\n", label, stats.error_count(category)));
    }
    out.push_str(&format!(
        "  - Tokens evaluated: {} ({:.1}%)\n\n",
        stats.evaluated,
        pct(stats.evaluated, stats.total)
    ));

    out.push_str("Evaluation Results:\n");
    if stats.evaluated > 0 {
        out.push_str(&format!(
            "  - PASSED: {} ({:.1}% of evaluated)\n",
            stats.passed,
            pct(stats.passed, stats.evaluated)
        ));
        if stats.featured > 0 {
            out.push_str(&format!("    Featured: {}\n", stats.featured));
        }
        out.push_str(&format!(
            "  - FAILED: {} ({:.1}% of evaluated)\n",
            stats.failed,
            pct(stats.failed, stats.evaluated)
        ));
        if stats.honeypot_rejected > 0 {
            out.push_str(&format!("    Honeypot/Fraud: {}\n", stats.honeypot_rejected));
        }
    } else {
        out.push_str("  No tokens were evaluated\n");
    }

    out.push_str(&format!(
        "\nFinal Whitelisted Tokens: {}/{} ({:.1}% of total)\n",
        stats.passed,
        stats.total,
        pct(stats.passed, stats.total)
    ));
    out.push_str(&format!("{}\n", rule('=')));
    out
}

/// Tables of passed, failed and (the first `max_error_rows`) errored tokens
pub fn render_breakdown(
    results: &[TokenResult],
    stats: &RunStatistics,
    max_error_rows: usize,
) -> String {
    let mut out = format!("\n\n{}\n", rule('='));
    out.push_str("                 DETAILED BREAKDOWN\n");
    out.push_str(&format!("{}\n\n", rule('=')));

    out.push_str(&format!("PASSED TOKENS ({}):\n", stats.passed));
    out.push_str(&format!("{}\n", rule('-')));
    out.push_str(&format!(
        "{:<10} | {:<42} | Score | Liquidity\n",
        "Symbol", "Address"
    ));
    out.push_str(&format!("{}\n", rule('-')));
    for r in results.iter().filter(|r| r.status == TokenStatus::Passed) {
        out.push_str(&format!(
            "{:<10} | {} | {:.2} | ${:.0}\n",
            truncate(&r.symbol, 10),
            r.address,
            r.composite_score(),
            r.metrics.map(|m| m.liquidity_usd).unwrap_or(0.0)
        ));
    }

    out.push_str(&format!("\n\nFAILED TOKENS ({}):\n", stats.failed));
    out.push_str(&format!("{}\n", rule('-')));
    out.push_str(&format!("{:<10} | {:<42} | Reason\n", "Symbol", "Address"));
    out.push_str(&format!("{}\n", rule('-')));
    for r in results.iter().filter(|r| r.status == TokenStatus::Failed) {
        out.push_str(&format!(
            "{:<10} | {} | {}\n",
            truncate(&r.symbol, 10),
            r.address,
            truncate(r.reason().unwrap_or("Unknown"), 40)
        ));
    }

    out.push_str(&format!(
        "\n\nERROR TOKENS (showing first {} of {}):\n",
        max_error_rows.min(stats.errors),
        stats.errors
    ));
    out.push_str(&format!("{}\n", rule('-')));
    out.push_str(&format!("{:<10} | {:<42} | Error\n", "Symbol", "Address"));
    out.push_str(&format!("{}\n", rule('-')));
    for r in results
        .iter()
        .filter(|r| r.status == TokenStatus::Error)
        .take(max_error_rows)
    {
        out.push_str(&format!(
            "{:<10} | {} | {}\n",
            truncate(&r.symbol, 10),
            r.address,
            truncate(r.reason().unwrap_or("Unknown"), 40)
        ));
    }

    out
}

/// Timestamped plain-text results file
pub struct ResultsFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ResultsFile {
    /// Create `<dir>/screening_results_<timestamp>.txt`, creating `dir` if needed
    pub fn create(dir: impl AsRef<Path>, started: DateTime<Local>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "screening_results_{}.txt",
            started.format("%Y-%m-%d_%H-%M-%S")
        ));
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a block and flush it, so partial runs are preserved
    pub fn write(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Write the full report as pretty JSON
pub fn write_json(path: impl AsRef<Path>, report: &ScreeningReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
