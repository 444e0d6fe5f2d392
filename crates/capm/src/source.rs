//! Price sources - the data acquisition boundary.
//!
//! A [`PriceSource`] hands back plain in-memory closing-price frames for a
//! symbol over a date window. Everything downstream works on those frames and
//! never talks to the source again.

use crate::{CapmError, Result, returns::BENCHMARK_COLUMNS};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies closing prices for an identifier over an inclusive date range.
pub trait PriceSource: Send + Sync + std::fmt::Debug {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Closing prices for `symbol` with `start <= date <= end`.
    ///
    /// Returns a DataFrame with columns `date` (`%Y-%m-%d`) and `close`, sorted by date.
    fn closes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame>;
}

/// Reads `<root>/<SYMBOL>.csv` files with a date column and a price column.
///
/// Header matching is case-insensitive. The date column is `date` or
/// `observation_date`. The price column is `close`, or else a column named
/// after the symbol. Both `Date,Open,High,Low,Close,Volume` exports and FRED
/// `observation_date,SP500` downloads work unchanged. Extra columns are ignored.
///
/// Dates must start with `%Y-%m-%d`; a trailing time such as `00:00:00` is
/// dropped. Prices that do not parse as numbers (FRED writes `.` for a missing
/// observation) become nulls.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    root: PathBuf,
}

impl CsvPriceSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the CSV files are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `symbol`.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{symbol}.csv"))
    }
}

impl PriceSource for CsvPriceSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn closes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(CapmError::SourceUnavailable {
                symbol: symbol.to_string(),
                reason: format!("{} not found", path.display()),
            });
        }

        let raw = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path))?
            .finish()?;

        let date = find_column(&raw, &["date", "observation_date"])?;
        let close = find_column(&raw, &["close", symbol])?;
        let mut normalized = raw
            .lazy()
            .select([
                col(date.as_str()).cast(DataType::String).alias("date"),
                col(close.as_str()).cast(DataType::Float64).alias("close"),
            ])
            .collect()?;

        let days: Vec<Option<String>> = normalized
            .column("date")?
            .str()?
            .into_iter()
            .map(|d| d.map(|d| d.trim().chars().take(10).collect()))
            .collect();
        normalized.with_column(Series::new("date".into(), days))?;

        window(&normalized, start, end)
    }
}

/// Price frames held in memory, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceSource {
    frames: HashMap<String, DataFrame>,
}

impl InMemoryPriceSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the `date`/`close` frame for `symbol`.
    pub fn insert(&mut self, symbol: impl Into<String>, frame: DataFrame) {
        self.frames.insert(symbol.into(), frame);
    }

    /// Builder-style [`Self::insert`].
    pub fn with(mut self, symbol: impl Into<String>, frame: DataFrame) -> Self {
        self.insert(symbol, frame);
        self
    }

    /// Number of symbols held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no symbols are held.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl PriceSource for InMemoryPriceSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn closes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        let frame = self
            .frames
            .get(symbol)
            .ok_or_else(|| CapmError::SourceUnavailable {
                symbol: symbol.to_string(),
                reason: "symbol not loaded".to_string(),
            })?;
        window(frame, start, end)
    }
}

/// Load closing prices for several symbols into one long frame.
///
/// # Returns
/// DataFrame with columns: `symbol`, `date`, `close`, in symbol order then date order.
pub fn load_prices(
    source: &dyn PriceSource,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<DataFrame> {
    if symbols.is_empty() {
        return Err(CapmError::EmptySelection);
    }

    let frames = symbols
        .iter()
        .map(|symbol| {
            let closes = source.closes(symbol, start, end)?;
            debug!(source = source.name(), %symbol, rows = closes.height(), "loaded closes");
            Ok(closes
                .lazy()
                .with_column(lit(symbol.as_str()).alias("symbol"))
                .select([col("symbol"), col("date"), col("close")]))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(concat(frames, UnionArgs::default())?.collect()?)
}

/// Restrict a `date`/`close` frame to the inclusive window, sorted by date.
fn window(frame: &DataFrame, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
    if start > end {
        return Err(CapmError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    crate::returns::require_columns(frame, BENCHMARK_COLUMNS)?;

    let result = frame
        .clone()
        .lazy()
        .filter(
            col("date")
                .gt_eq(lit(start.to_string()))
                .and(col("date").lt_eq(lit(end.to_string()))),
        )
        .sort(["date"], SortMultipleOptions::default())
        .select([col("date"), col("close")])
        .collect()?;

    Ok(result)
}

/// First column matching one of `candidates`, in candidate order.
fn find_column(df: &DataFrame, candidates: &[&str]) -> Result<String> {
    let names = df.get_column_names();
    candidates
        .iter()
        .find_map(|candidate| {
            names
                .iter()
                .find(|c| c.as_str().trim().eq_ignore_ascii_case(candidate))
        })
        .map(|c| c.to_string())
        .ok_or_else(|| CapmError::MissingColumn(candidates[0].to_string()))
}
