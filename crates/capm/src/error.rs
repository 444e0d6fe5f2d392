//! Error types for CAPM estimation and the surrounding data pipeline.

use thiserror::Error;

/// Result type for CAPM operations.
pub type Result<T> = std::result::Result<T, CapmError>;

/// Errors that can occur while building return series or estimating CAPM.
#[derive(Debug, Error)]
pub enum CapmError {
    /// Asset and market return series differ in length
    #[error("Input shape mismatch: asset has {asset} observations, market has {market}")]
    InputShape {
        /// Number of asset observations
        asset: usize,
        /// Number of market observations
        market: usize,
    },

    /// Too few observations for a sample covariance
    #[error("Insufficient data: need {required} observations, got {available}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Available number of observations
        available: usize,
    },

    /// Market returns have zero variance, so beta is undefined
    #[error("Degenerate market series: variance is zero, beta is not finite")]
    DegenerateMarket,

    /// Missing required column in input data
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Lookback horizon outside the supported range
    #[error("Invalid horizon: {0} years (expected 1..=10)")]
    InvalidHorizon(u32),

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// No symbols were selected for analysis
    #[error("No symbols selected")]
    EmptySelection,

    /// The price source could not provide data for a symbol
    #[error("Price data unavailable for {symbol}: {reason}")]
    SourceUnavailable {
        /// Symbol that was requested
        symbol: String,
        /// Why the source failed
        reason: String,
    },

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CapmError {
    /// Whether this error comes from the shape of the estimator inputs.
    pub const fn is_input_shape(&self) -> bool {
        matches!(self, Self::InputShape { .. } | Self::InsufficientData { .. })
    }
}
