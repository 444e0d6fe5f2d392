//! Date alignment of asset returns against the market benchmark.
//!
//! Asset returns are spread into one column per symbol and inner-joined on
//! `date`, first across symbols and then with the benchmark. A date survives
//! only when every selected asset and the market have a return on it.

use crate::{
    CapmError, Result,
    returns::{MARKET_RETURN_COLUMN, RETURN_COLUMN, require_columns},
};
use polars::prelude::*;

/// Return series aligned on a shared date index.
#[derive(Debug, Clone)]
pub struct AlignedReturns {
    frame: DataFrame,
    symbols: Vec<String>,
    dates: Vec<String>,
    assets: Vec<Vec<f64>>,
    market: Vec<f64>,
}

impl AlignedReturns {
    /// Symbols in the order they were requested.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Shared trading dates, ascending.
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Returns of `symbol`, aligned with [`Self::market`].
    pub fn asset(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.assets[i].as_slice())
    }

    /// Market returns on the shared dates.
    pub fn market(&self) -> &[f64] {
        &self.market
    }

    /// Number of shared observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether no dates are shared.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Wide frame with columns `date`, one per symbol, and `market_return`.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }
}

/// Align per-symbol returns with market returns using inner-join semantics.
///
/// # Arguments
///
/// * `returns` - Long frame with columns `symbol`, `date`, `return`
/// * `market` - Frame with columns `date`, `market_return`
/// * `symbols` - Symbols to keep, in output order
///
/// # Errors
///
/// Returns [`CapmError::EmptySelection`] if `symbols` is empty and
/// [`CapmError::MissingColumn`] if either frame lacks a required column.
pub fn align_with_market(
    returns: &DataFrame,
    market: &DataFrame,
    symbols: &[String],
) -> Result<AlignedReturns> {
    require_columns(market, &["date", MARKET_RETURN_COLUMN])?;
    let wide = spread_returns(returns, symbols)?;

    let frame = wide
        .join(
            market
                .clone()
                .lazy()
                .select([col("date"), col(MARKET_RETURN_COLUMN)]),
            [col("date")],
            [col("date")],
            JoinArgs::new(JoinType::Inner),
        )
        .sort(["date"], SortMultipleOptions::default())
        .collect()?;

    let dates = frame
        .column("date")?
        .str()?
        .into_no_null_iter()
        .map(str::to_string)
        .collect();

    let assets = symbols
        .iter()
        .map(|symbol| values(&frame, symbol))
        .collect::<Result<Vec<_>>>()?;
    let market = values(&frame, MARKET_RETURN_COLUMN)?;

    Ok(AlignedReturns {
        frame,
        symbols: symbols.to_vec(),
        dates,
        assets,
        market,
    })
}

/// Spread long returns into one column per symbol, keeping only dates on which
/// every symbol has a return.
///
/// Columns are `date` followed by the symbols in order. The frame is not sorted.
pub(crate) fn spread_returns(returns: &DataFrame, symbols: &[String]) -> Result<LazyFrame> {
    require_columns(returns, &["symbol", "date", RETURN_COLUMN])?;

    let Some((first, rest)) = symbols.split_first() else {
        return Err(CapmError::EmptySelection);
    };

    let column_for = |symbol: &str| {
        returns
            .clone()
            .lazy()
            .filter(col("symbol").eq(lit(symbol)))
            .select([col("date"), col(RETURN_COLUMN).alias(symbol)])
    };

    Ok(rest.iter().fold(column_for(first.as_str()), |acc, symbol| {
        acc.join(
            column_for(symbol.as_str()),
            [col("date")],
            [col("date")],
            JoinArgs::new(JoinType::Inner),
        )
    }))
}

pub(crate) fn values(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(frame.column(name)?.f64()?.into_no_null_iter().collect())
}
