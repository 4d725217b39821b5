//! DEX Token Screener - screens BSC tokens for fraud and investability
//!
//! Combines market data, source verification, holder concentration and two
//! independent fraud oracles into a pass/fail verdict and a 0-100 score.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use dex_token_screener::cli::commands::{self, RunOptions};
use dex_token_screener::config::Config;

/// DEX Token Screener
#[derive(Parser)]
#[command(name = "screen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, env = "SCREENER_CONFIG", default_value = "screener.toml")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "SCREENER_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen every token in a token list
    Run {
        /// JSON token list (flat array or grouped by symbol)
        #[arg(short, long)]
        tokens: String,

        /// Skip this many tokens from the start of the list
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Screen at most this many tokens
        #[arg(long)]
        limit: Option<usize>,

        /// Also export all results as JSON to this file
        #[arg(long)]
        json: Option<String>,

        /// Do not write the results text file
        #[arg(long)]
        no_file: bool,
    },

    /// Screen a single token
    Check {
        /// Token contract address
        address: String,

        /// Symbol to show in the output
        #[arg(long)]
        symbol: Option<String>,
    },

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dex_token_screener=info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("{}", commands::describe_config_source(&cli.config));

    // Execute command
    let result = match cli.command {
        Commands::Run {
            tokens,
            offset,
            limit,
            json,
            no_file,
        } => {
            let options = RunOptions {
                offset,
                limit,
                json,
                no_file,
            };
            commands::run(&config, &tokens, &options).await
        }
        Commands::Check { address, symbol } => {
            commands::check(&config, &address, symbol.as_deref()).await
        }
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
