//! CAPM estimator - beta and expected return under the Security Market Line.
//!
//! Beta measures the sensitivity of an asset's returns to market returns:
//! `β = Cov(R_i, R_m) / Var(R_m)`
//!
//! The expected return follows `E[R_i] = r_f + β (r_m - r_f)` where `r_m` is the
//! mean market return annualized by [`CapmConfig::periods_per_year`].

use crate::{CapmConfig, CapmError, Result, stats};
use serde::{Deserialize, Serialize};

/// Minimum number of paired observations for a sample covariance.
pub const MIN_OBSERVATIONS: usize = 2;

/// Bare estimator output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapmEstimate {
    /// Covariance with the market divided by market variance
    pub beta: f64,
    /// Annualized expected return from the Security Market Line
    pub expected_return: f64,
}

/// CAPM estimate attached to the instrument it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapmResult {
    /// Ticker or other instrument identifier
    pub identifier: String,
    /// Market beta
    pub beta: f64,
    /// Annualized expected return
    pub expected_return: f64,
}

impl CapmResult {
    /// Attach an identifier to an estimate.
    pub fn new(identifier: impl Into<String>, estimate: CapmEstimate) -> Self {
        Self {
            identifier: identifier.into(),
            beta: estimate.beta,
            expected_return: estimate.expected_return,
        }
    }
}

/// Estimate CAPM beta and expected return from aligned return series.
///
/// Both slices must be index-aligned periodic returns of equal length with at
/// least two observations. No alignment, truncation or padding is performed.
///
/// # Errors
///
/// - [`CapmError::InputShape`] if the lengths differ.
/// - [`CapmError::InsufficientData`] if fewer than two observations are given.
/// - [`CapmError::DegenerateMarket`] if the market series is constant, or beta
///   or the expected return is otherwise not finite.
pub fn estimate(
    asset_returns: &[f64],
    market_returns: &[f64],
    config: &CapmConfig,
) -> Result<CapmEstimate> {
    if asset_returns.len() != market_returns.len() {
        return Err(CapmError::InputShape {
            asset: asset_returns.len(),
            market: market_returns.len(),
        });
    }
    if market_returns.len() < MIN_OBSERVATIONS {
        return Err(CapmError::InsufficientData {
            required: MIN_OBSERVATIONS,
            available: market_returns.len(),
        });
    }

    if stats::is_constant(market_returns) {
        return Err(CapmError::DegenerateMarket);
    }

    let cov = stats::covariance_matrix(asset_returns, market_returns);
    let market_var = cov[1][1];
    if market_var == 0.0 {
        return Err(CapmError::DegenerateMarket);
    }

    let beta = cov[0][1] / market_var;
    if !beta.is_finite() {
        return Err(CapmError::DegenerateMarket);
    }

    let rf = config.risk_free_rate;
    let rm = stats::mean(market_returns) * config.periods_per_year;
    let expected_return = rf + beta * (rm - rf);
    if !expected_return.is_finite() {
        return Err(CapmError::DegenerateMarket);
    }

    Ok(CapmEstimate {
        beta,
        expected_return,
    })
}

/// Configured CAPM estimator.
///
/// Holds a [`CapmConfig`] so the same parameters are applied to every asset in
/// an analysis run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapmEstimator {
    config: CapmConfig,
}

impl CapmEstimator {
    /// Create an estimator with the default risk-free rate and daily annualization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an estimator with the given configuration.
    pub const fn with_config(config: CapmConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub const fn config(&self) -> &CapmConfig {
        &self.config
    }

    /// Estimate beta and expected return. See [`estimate`].
    pub fn estimate(&self, asset_returns: &[f64], market_returns: &[f64]) -> Result<CapmEstimate> {
        estimate(asset_returns, market_returns, &self.config)
    }

    /// Estimate and label the result with `identifier`.
    pub fn estimate_named(
        &self,
        identifier: &str,
        asset_returns: &[f64],
        market_returns: &[f64],
    ) -> Result<CapmResult> {
        self.estimate(asset_returns, market_returns)
            .map(|estimate| CapmResult::new(identifier, estimate))
    }
}
