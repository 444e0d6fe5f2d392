//! Return-series construction from closing prices.
//!
//! Returns are simple period-over-period percentage changes:
//! `r_t = close_t / close_{t-1} - 1`
//!
//! The first observation of each series has no predecessor and is dropped, as
//! is any row whose close is missing. A missing close is skipped rather than
//! breaking the series, so the next return spans the gap.

use crate::{CapmError, Result};
use polars::prelude::*;

/// Columns required in a long-format price frame.
pub const PRICE_COLUMNS: &[&str] = &["symbol", "date", "close"];

/// Columns required in a benchmark price frame.
pub const BENCHMARK_COLUMNS: &[&str] = &["date", "close"];

/// Name of the per-asset return column.
pub const RETURN_COLUMN: &str = "return";

/// Name of the benchmark return column.
pub const MARKET_RETURN_COLUMN: &str = "market_return";

/// Check that every column in `required` is present in `df`.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    match required
        .iter()
        .find(|name| df.get_column_index(name).is_none())
    {
        Some(missing) => Err(CapmError::MissingColumn((*missing).to_string())),
        None => Ok(()),
    }
}

/// Compute per-symbol percentage-change returns.
///
/// # Required Columns
/// - `symbol`: Security identifier
/// - `date`: Date of observation (`%Y-%m-%d`)
/// - `close`: Closing price
///
/// # Returns
/// DataFrame with columns: `symbol`, `date`, `return`, sorted by symbol and date.
pub fn pct_change_returns(prices: &DataFrame) -> Result<DataFrame> {
    require_columns(prices, PRICE_COLUMNS)?;

    let result = prices
        .clone()
        .lazy()
        .filter(col("close").is_not_null())
        .sort(
            ["symbol", "date"],
            SortMultipleOptions::default().with_order_descending_multi([false, false]),
        )
        .with_column(col("close").cast(DataType::Float64))
        .with_column(
            col("close")
                .shift(lit(1))
                .over([col("symbol")])
                .alias("close_lag"),
        )
        .with_column(((col("close") / col("close_lag")) - lit(1.0)).alias(RETURN_COLUMN))
        .filter(
            col(RETURN_COLUMN)
                .is_not_null()
                .and(col(RETURN_COLUMN).is_finite()),
        )
        .select([col("symbol"), col("date"), col(RETURN_COLUMN)])
        .collect()?;

    Ok(result)
}

/// Compute percentage-change returns for a single benchmark series.
///
/// # Required Columns
/// - `date`: Date of observation (`%Y-%m-%d`)
/// - `close`: Index level
///
/// # Returns
/// DataFrame with columns: `date`, `market_return`, sorted by date.
pub fn benchmark_returns(benchmark: &DataFrame) -> Result<DataFrame> {
    require_columns(benchmark, BENCHMARK_COLUMNS)?;

    let result = benchmark
        .clone()
        .lazy()
        .filter(col("close").is_not_null())
        .sort(["date"], SortMultipleOptions::default())
        .with_column(col("close").cast(DataType::Float64))
        .with_column(col("close").shift(lit(1)).alias("close_lag"))
        .with_column(((col("close") / col("close_lag")) - lit(1.0)).alias(MARKET_RETURN_COLUMN))
        .filter(
            col(MARKET_RETURN_COLUMN)
                .is_not_null()
                .and(col(MARKET_RETURN_COLUMN).is_finite()),
        )
        .select([col("date"), col(MARKET_RETURN_COLUMN)])
        .collect()?;

    Ok(result)
}
