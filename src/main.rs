//! Options Hedge CLI
//!
//! # Usage
//!
//! ```bash
//! # List expirations with chain files for a ticker
//! options-hedge expirations --ticker SPY --data data/chains
//!
//! # Start an interactive hedge session
//! options-hedge hedge --ticker SPY --expiration 2026-12-18 --data data/chains
//!
//! # Same, with a config file and a fixed valuation date
//! options-hedge hedge --ticker SPY --expiration 2026-12-18 \
//!     --config config/default.toml --valuation-date 2026-11-18
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use options_hedge::cli::{HedgeController, Outcome};
use options_hedge::{HedgeConfig, HedgeSession, JsonChainProvider};

const PROMPT: &str = "(hedge)> ";

#[derive(Parser)]
#[command(name = "options-hedge")]
#[command(about = "Delta, gamma and vega neutral hedging for option positions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Chain data directory
    #[arg(long, default_value = "data/chains", global = true)]
    data: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List expirations with chain data for a ticker
    Expirations {
        /// Underlying symbol
        #[arg(short, long)]
        ticker: String,
    },

    /// Start an interactive hedge session
    Hedge {
        /// Underlying symbol
        #[arg(short, long)]
        ticker: String,

        /// Expiration date (YYYY-MM-DD)
        #[arg(short, long)]
        expiration: String,

        /// Path to a TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Value the session as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        valuation_date: Option<String>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid date: {}", s))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("options_hedge=info".parse()?))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let provider = JsonChainProvider::new(&cli.data);

    match cli.command {
        Commands::Expirations { ticker } => {
            let expirations = provider
                .available_expirations(&ticker)
                .with_context(|| format!("Failed to list expirations for {}", ticker))?;
            if expirations.is_empty() {
                println!("No chain files for {} under {}", ticker.to_uppercase(), cli.data.display());
            }
            for expiration in expirations {
                println!("{}", expiration);
            }
        }
        Commands::Hedge {
            ticker,
            expiration,
            config,
            valuation_date,
        } => {
            let config = match config {
                Some(path) => HedgeConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => HedgeConfig::default(),
            };
            let expiration = parse_date(&expiration)?;

            let mut session = HedgeSession::open(&provider, &ticker, expiration, config)
                .with_context(|| format!("Failed to open {} {}", ticker, expiration))?;
            if let Some(date) = valuation_date {
                session = session.with_valuation_date(parse_date(&date)?);
            }

            run_prompt(HedgeController::new(session))?;
        }
    }

    Ok(())
}

fn run_prompt(mut controller: HedgeController) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    if let Outcome::Output(help) = controller.handle_line("help") {
        print!("{}", help);
    }

    loop {
        print!("{}", PROMPT);
        stdout.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read input")? == 0 {
            println!();
            break;
        }

        match controller.handle_line(&line) {
            Outcome::Output(out) => print!("{}", out),
            Outcome::Quit => break,
        }
    }

    Ok(())
}
