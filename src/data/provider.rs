//! Market data providers.
//!
//! The session only needs two things from the outside world: the option
//! chain for one expiration and the current spot price. Both come through
//! [`MarketDataProvider`]. [`JsonChainProvider`] serves them from files laid
//! out as:
//!
//! ```text
//! <data_dir>/<TICKER>/<YYYY-MM-DD>.json
//! ```
//!
//! with the shape:
//!
//! ```json
//! {
//!   "spot": 101.25,
//!   "calls": [{ "strike": 100, "implied_volatility": 0.24, "last_price": 4.1 }],
//!   "puts":  [{ "strike": 100, "implied_volatility": 0.26, "last_price": 2.9 }]
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::types::{MarketSnapshot, OptionQuote, OptionsChain};

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("No option chain for {ticker} expiring {expiration}")]
    NoChain { ticker: String, expiration: NaiveDate },

    #[error("No spot price for {0}")]
    NoSpot(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of option chains and spot prices.
pub trait MarketDataProvider {
    /// Option chain for a ticker and expiration, calls and puts by ascending strike.
    fn options_chain(&self, ticker: &str, expiration: NaiveDate) -> Result<OptionsChain, MarketDataError>;

    /// Current spot price for a ticker.
    fn spot_price(&self, ticker: &str) -> Result<Decimal, MarketDataError>;

    /// Fetch everything a session needs in one go.
    fn snapshot(&self, ticker: &str, expiration: NaiveDate) -> Result<MarketSnapshot, MarketDataError> {
        let chain = self.options_chain(ticker, expiration)?;
        if chain.is_empty() {
            return Err(MarketDataError::NoChain {
                ticker: ticker.to_string(),
                expiration,
            });
        }
        let spot = self.spot_price(ticker)?;
        if spot <= Decimal::ZERO {
            return Err(MarketDataError::InvalidData(format!(
                "spot price for {} must be positive, got {}",
                ticker, spot
            )));
        }
        Ok(MarketSnapshot::new(ticker, spot, chain))
    }
}

/// On-disk layout of a chain file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainFile {
    pub spot: Decimal,
    #[serde(default)]
    pub calls: Vec<OptionQuote>,
    #[serde(default)]
    pub puts: Vec<OptionQuote>,
}

/// File-backed provider for option chains.
pub struct JsonChainProvider {
    data_dir: PathBuf,
}

impl JsonChainProvider {
    /// Create a provider rooted at a chain directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    fn chain_path(&self, ticker: &str, expiration: NaiveDate) -> PathBuf {
        self.data_dir
            .join(ticker.to_uppercase())
            .join(format!("{}.json", expiration.format("%Y-%m-%d")))
    }

    fn load_file(&self, path: &Path) -> Result<ChainFile, MarketDataError> {
        if !path.exists() {
            return Err(MarketDataError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let file: ChainFile = serde_json::from_str(&content)?;
        debug!(
            path = %path.display(),
            calls = file.calls.len(),
            puts = file.puts.len(),
            "Loaded chain file"
        );
        Ok(file)
    }

    /// List expirations available for a ticker, oldest first.
    pub fn available_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>, MarketDataError> {
        let dir = self.data_dir.join(ticker.to_uppercase());
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut expirations = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(date_str) = name.strip_suffix(".json") {
                if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
                    expirations.push(date);
                }
            }
        }
        expirations.sort();
        Ok(expirations)
    }
}

impl MarketDataProvider for JsonChainProvider {
    fn options_chain(&self, ticker: &str, expiration: NaiveDate) -> Result<OptionsChain, MarketDataError> {
        let file = self.load_file(&self.chain_path(ticker, expiration))?;
        validate_quotes(&file.calls)?;
        validate_quotes(&file.puts)?;
        Ok(OptionsChain::new(expiration, file.calls, file.puts))
    }

    fn spot_price(&self, ticker: &str) -> Result<Decimal, MarketDataError> {
        // Spot is stored alongside every chain; the nearest expiration is as good as any.
        let expirations = self.available_expirations(ticker)?;
        let expiration = expirations
            .first()
            .copied()
            .ok_or_else(|| MarketDataError::NoSpot(ticker.to_string()))?;
        Ok(self.load_file(&self.chain_path(ticker, expiration))?.spot)
    }
}

/// In-memory provider, keyed by upper-case ticker.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    snapshots: HashMap<String, MarketSnapshot>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, snapshot: MarketSnapshot) -> Self {
        self.snapshots.insert(snapshot.ticker.clone(), snapshot);
        self
    }
}

impl MarketDataProvider for StaticProvider {
    fn options_chain(&self, ticker: &str, expiration: NaiveDate) -> Result<OptionsChain, MarketDataError> {
        self.snapshots
            .get(&ticker.to_uppercase())
            .filter(|s| s.chain.expiration == expiration)
            .map(|s| s.chain.clone())
            .ok_or_else(|| MarketDataError::NoChain {
                ticker: ticker.to_string(),
                expiration,
            })
    }

    fn spot_price(&self, ticker: &str) -> Result<Decimal, MarketDataError> {
        self.snapshots
            .get(&ticker.to_uppercase())
            .map(|s| s.spot_price)
            .ok_or_else(|| MarketDataError::NoSpot(ticker.to_string()))
    }
}

fn validate_quotes(quotes: &[OptionQuote]) -> Result<(), MarketDataError> {
    for quote in quotes {
        if quote.strike <= Decimal::ZERO {
            return Err(MarketDataError::InvalidData(format!(
                "strike must be positive, got {}",
                quote.strike
            )));
        }
        if !quote.implied_volatility.is_finite() || quote.implied_volatility < 0.0 {
            return Err(MarketDataError::InvalidData(format!(
                "implied volatility at strike {} must be non-negative, got {}",
                quote.strike, quote.implied_volatility
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 20).unwrap()
    }

    fn write_chain(dir: &Path, ticker: &str, body: &str) {
        let ticker_dir = dir.join(ticker);
        std::fs::create_dir_all(&ticker_dir).unwrap();
        std::fs::write(ticker_dir.join("2026-11-20.json"), body).unwrap();
    }

    #[test]
    fn test_json_provider_loads_sorted_chain() {
        let tmp = tempfile::tempdir().unwrap();
        write_chain(
            tmp.path(),
            "SPY",
            r#"{
                "spot": 101.5,
                "calls": [
                    {"strike": 105, "implied_volatility": 0.21, "last_price": 1.2},
                    {"strike": 100, "implied_volatility": 0.23, "last_price": 3.4}
                ],
                "puts": [
                    {"strike": 95, "implied_volatility": 0.27, "last_price": 0.9}
                ]
            }"#,
        );

        let provider = JsonChainProvider::new(tmp.path());
        let snapshot = provider.snapshot("spy", expiry()).unwrap();

        assert_eq!(snapshot.ticker, "SPY");
        assert_eq!(snapshot.spot_price, dec!(101.5));
        assert_eq!(snapshot.chain.calls[0].strike, dec!(100));
        assert_eq!(snapshot.chain.puts.len(), 1);
        assert_eq!(provider.available_expirations("SPY").unwrap(), vec![expiry()]);
    }

    #[test]
    fn test_json_provider_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = JsonChainProvider::new(tmp.path());
        let err = provider.options_chain("QQQ", expiry()).unwrap_err();
        assert!(matches!(err, MarketDataError::FileNotFound(_)));
        assert!(provider.available_expirations("QQQ").unwrap().is_empty());
    }

    #[test]
    fn test_json_provider_rejects_negative_iv() {
        let tmp = tempfile::tempdir().unwrap();
        write_chain(
            tmp.path(),
            "IWM",
            r#"{"spot": 200, "calls": [{"strike": 200, "implied_volatility": -0.1}]}"#,
        );
        let provider = JsonChainProvider::new(tmp.path());
        let err = provider.options_chain("IWM", expiry()).unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidData(_)));
    }

    #[test]
    fn test_static_provider_rejects_empty_chain() {
        let provider = StaticProvider::new().with_snapshot(MarketSnapshot::new(
            "SPY",
            dec!(100),
            OptionsChain::new(expiry(), vec![], vec![]),
        ));
        let err = provider.snapshot("SPY", expiry()).unwrap_err();
        assert!(matches!(err, MarketDataError::NoChain { .. }));
    }
}
