//! Swap engine CLI
//!
//! Command-line interface for quoting and executing cross-venue swaps.
//! All commands need `PRIVATE_KEY` in the environment (or a `.env` file);
//! quote-only commands use it for address derivation, never for sending.

use clap::{Parser, Subcommand};
use defi_arb_engine::{EngineConfig, Error, Network, Result, SwapEngine, SwapParams};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "arb-engine")]
#[command(about = "Cross-venue swap engine with flash-loan arbitrage")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a swap (arbitrage path when the venue gap allows it)
    Swap {
        /// Input token address
        #[arg(long)]
        input: String,

        /// Output token address
        #[arg(long)]
        output: String,

        /// Human-decimal amount of the input token
        #[arg(long)]
        amount: String,

        /// Network (ethereum, arbitrum, optimism, base, polygon)
        #[arg(short, long, default_value = "ethereum")]
        network: String,

        /// Max slippage in basis points (defaults to the configured value)
        #[arg(long)]
        slippage_bps: Option<u16>,
    },

    /// Fetch and rank quotes without executing
    Quote {
        /// Input token address
        #[arg(long)]
        input: String,

        /// Output token address
        #[arg(long)]
        output: String,

        /// Human-decimal amount of the input token
        #[arg(long)]
        amount: String,

        /// Network (ethereum, arbitrum, optimism, base, polygon)
        #[arg(short, long, default_value = "ethereum")]
        network: String,
    },

    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Load config
    let config = match cli.config {
        Some(path) => EngineConfig::from_file(&path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Swap {
            input,
            output,
            amount,
            network,
            slippage_bps,
        } => {
            let params = parse_params(&config, &input, &output, amount, &network, slippage_bps)?;
            run_swap(config, params).await?;
        }
        Commands::Quote {
            input,
            output,
            amount,
            network,
        } => {
            let params = parse_params(&config, &input, &output, amount, &network, None)?;
            run_quote(config, params).await?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config).map_err(Error::Json)?);
        }
    }

    Ok(())
}

fn parse_params(
    config: &EngineConfig,
    input: &str,
    output: &str,
    amount: String,
    network: &str,
    slippage_bps: Option<u16>,
) -> Result<SwapParams> {
    let chain = Network::parse(network)?;
    let from_token = input
        .parse()
        .map_err(|e| Error::InvalidArgument(format!("input token: {e}")))?;
    let to_token = output
        .parse()
        .map_err(|e| Error::InvalidArgument(format!("output token: {e}")))?;

    Ok(SwapParams {
        chain,
        from_token,
        to_token,
        amount,
        slippage_bps: slippage_bps.unwrap_or(config.default_slippage_bps),
    })
}

async fn run_swap(config: EngineConfig, params: SwapParams) -> Result<()> {
    let engine = SwapEngine::from_env(config)?;

    tracing::info!(
        chain = params.chain.name(),
        from = %params.from_token,
        to = %params.to_token,
        amount = %params.amount,
        "executing swap"
    );

    match engine.swap(&params).await {
        Ok(tx) => {
            println!("Swap executed");
            println!("  hash:     {}", tx.hash);
            println!("  to:       {}", tx.to);
            println!("  chain id: {}", tx.chain_id);
            Ok(())
        }
        Err(err) => {
            eprintln!("Swap failed: {err}");
            Err(err)
        }
    }
}

async fn run_quote(config: EngineConfig, params: SwapParams) -> Result<()> {
    let engine = SwapEngine::from_env(config)?;
    let ranked = engine.quotes(&params).await?;

    println!("Quotes (best first):");
    for quote in &ranked {
        println!("  {:<18} min output: {}", quote.venue.name(), quote.min_output);
    }
    Ok(())
}
