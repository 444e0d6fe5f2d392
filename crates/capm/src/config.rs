//! Estimator configuration.

use serde::{Deserialize, Serialize};

/// Default risk-free rate used by the Security Market Line.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.01;

/// Default number of return periods per year (daily trading days).
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

/// Parameters of the CAPM estimator.
///
/// `periods_per_year` annualizes the mean market return and must match the
/// periodicity of the input returns: 252 for daily, 52 for weekly, 12 for monthly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapmConfig {
    /// Risk-free rate, used as given
    pub risk_free_rate: f64,
    /// Annualization factor applied to the mean market return
    pub periods_per_year: f64,
}

impl CapmConfig {
    /// Create a configuration with explicit parameters.
    pub const fn new(risk_free_rate: f64, periods_per_year: f64) -> Self {
        Self {
            risk_free_rate,
            periods_per_year,
        }
    }

    /// Replace the risk-free rate.
    pub const fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    /// Replace the annualization factor.
    pub const fn with_periods_per_year(mut self, periods_per_year: f64) -> Self {
        self.periods_per_year = periods_per_year;
        self
    }
}

impl Default for CapmConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RISK_FREE_RATE, DEFAULT_PERIODS_PER_YEAR)
    }
}
