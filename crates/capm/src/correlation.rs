//! Correlation matrix of asset returns.
//!
//! Correlations are taken over the dates on which every selected asset has a
//! return, so all entries of the matrix share one sample.

use crate::{
    Result,
    align::{spread_returns, values as column_values},
    stats,
};
use ndarray::Array2;
use polars::prelude::*;

/// Symmetric matrix of Pearson correlations between asset returns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    symbols: Vec<String>,
    values: Array2<f64>,
    observations: usize,
}

impl CorrelationMatrix {
    /// Build the matrix from a long return frame (`symbol`, `date`, `return`).
    ///
    /// Entries are `NaN` when fewer than two dates are shared or when either
    /// side has zero variance over the shared dates.
    pub fn from_returns(returns: &DataFrame, symbols: &[String]) -> Result<Self> {
        if symbols.is_empty() {
            return Ok(Self {
                symbols: Vec::new(),
                values: Array2::zeros((0, 0)),
                observations: 0,
            });
        }

        let shared = spread_returns(returns, symbols)?
            .sort(["date"], SortMultipleOptions::default())
            .collect()?;
        let series = symbols
            .iter()
            .map(|symbol| column_values(&shared, symbol))
            .collect::<Result<Vec<_>>>()?;

        let n = symbols.len();
        let mut values = Array2::from_elem((n, n), f64::NAN);
        if shared.height() >= 2 {
            for i in 0..n {
                for j in i..n {
                    let rho = stats::pearson_correlation(&series[i], &series[j]);
                    values[[i, j]] = rho;
                    values[[j, i]] = rho;
                }
            }
        }

        Ok(Self {
            symbols: symbols.to_vec(),
            values,
            observations: shared.height(),
        })
    }

    /// Number of dates the correlations were computed over.
    pub const fn observations(&self) -> usize {
        self.observations
    }

    /// Row and column labels.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// The raw correlation values, indexed like [`Self::symbols`].
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Correlation between two symbols, if both are present.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[[i, j]])
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the matrix has no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
