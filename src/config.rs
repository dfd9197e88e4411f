//! Configuration for a hedge session.
//!
//! Loaded from TOML. Every section and field is optional and falls back to
//! the defaults below:
//!
//! ```toml
//! [pricing]
//! risk_free_rate = 0.0
//! dividend_yield = 0.0
//! min_days_to_expiry = 1.0
//!
//! [solver]
//! pivot_tolerance = 1e-9
//! sign_convention = "exposure"   # or "display_only"
//!
//! [session]
//! default_amount = 1000.0
//! completion = true
//! pick_strike_step = 5
//!
//! [render]
//! payoff_points = 21
//! payoff_range_pct = 20.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::greeks::GreeksCalculator;
use crate::hedge::SolverConfig;
use crate::render::RenderConfig;
use crate::session::SessionConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Black-Scholes inputs that do not come from the option chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Risk-free interest rate.
    pub risk_free_rate: f64,
    /// Continuous dividend yield.
    pub dividend_yield: f64,
    /// Floor for days to expiry, so same-day expirations stay positive.
    pub min_days_to_expiry: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            dividend_yield: 0.0,
            min_days_to_expiry: 1.0,
        }
    }
}

impl PricingConfig {
    pub fn calculator(&self) -> GreeksCalculator {
        GreeksCalculator::new(self.risk_free_rate, self.dividend_yield)
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HedgeConfig {
    pub pricing: PricingConfig,
    pub solver: SolverConfig,
    pub session: SessionConfig,
    pub render: RenderConfig,
}

impl HedgeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pricing.min_days_to_expiry > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pricing.min_days_to_expiry must be positive, got {}",
                self.pricing.min_days_to_expiry
            )));
        }
        if !(self.solver.pivot_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "solver.pivot_tolerance must be non-negative, got {}",
                self.solver.pivot_tolerance
            )));
        }
        if !(self.session.default_amount > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "session.default_amount must be positive, got {}",
                self.session.default_amount
            )));
        }
        if self.session.pick_strike_step == 0 {
            return Err(ConfigError::Invalid("session.pick_strike_step must be at least 1".into()));
        }
        if self.render.payoff_points < 2 {
            return Err(ConfigError::Invalid("render.payoff_points must be at least 2".into()));
        }
        if !(self.render.payoff_range_pct > 0.0 && self.render.payoff_range_pct < 100.0) {
            return Err(ConfigError::Invalid(format!(
                "render.payoff_range_pct must be in (0, 100), got {}",
                self.render.payoff_range_pct
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hedge::SignConvention;

    #[test]
    fn test_default_config() {
        let config = HedgeConfig::default();
        assert_eq!(config.pricing.risk_free_rate, 0.0);
        assert_eq!(config.pricing.min_days_to_expiry, 1.0);
        assert_eq!(config.solver.sign_convention, SignConvention::Exposure);
        assert_eq!(config.session.default_amount, 1000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = HedgeConfig::from_toml(
            r#"
            [pricing]
            risk_free_rate = 0.045

            [solver]
            sign_convention = "display_only"
            "#,
        )
        .unwrap();

        assert_eq!(config.pricing.risk_free_rate, 0.045);
        assert_eq!(config.pricing.dividend_yield, 0.0);
        assert_eq!(config.solver.sign_convention, SignConvention::DisplayOnly);
        assert_eq!(config.solver.pivot_tolerance, 1e-9);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_rejects_non_positive_floor() {
        let err = HedgeConfig::from_toml("[pricing]\nmin_days_to_expiry = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unknown_convention() {
        let err = HedgeConfig::from_toml("[solver]\nsign_convention = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("hedge.toml");
        std::fs::write(&path, "[session]\ndefault_amount = 250.0\n").unwrap();

        let config = HedgeConfig::from_file(&path).unwrap();
        assert_eq!(config.session.default_amount, 250.0);

        let missing = HedgeConfig::from_file(tmp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::FileNotFound(_)));
    }
}
