//! End-to-end CAPM analysis over a price source.
//!
//! Loads closes for the selected symbols and the benchmark, converts them to
//! returns, aligns everything on shared dates and runs the estimator per
//! symbol. The correlation matrix of the asset returns is computed alongside.

use crate::{
    AlignedReturns, CapmConfig, CapmError, CapmEstimator, CapmResult, CorrelationMatrix,
    Horizon, PriceSource, Result, align_with_market, benchmark_returns, load_prices,
    pct_change_returns,
};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Benchmark identifier used when none is given (FRED S&P 500 series).
pub const DEFAULT_BENCHMARK: &str = "sp500";

/// Ticker universe offered by default.
pub const DEFAULT_TICKERS: &[&str] = &[
    "TSLA", "AAPL", "NFLX", "MSFT", "MGM", "AMZN", "NVDA", "GOOGL",
];

/// What to analyze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Symbols to estimate, in display order
    pub symbols: Vec<String>,
    /// Identifier of the market benchmark series
    pub benchmark: String,
    /// Lookback horizon
    pub horizon: Horizon,
    /// Last date of the window, inclusive
    pub end: NaiveDate,
}

impl AnalysisRequest {
    /// Request against [`DEFAULT_BENCHMARK`] with the given horizon ending at `end`.
    pub fn new<S: Into<String>>(
        symbols: impl IntoIterator<Item = S>,
        horizon: Horizon,
        end: NaiveDate,
    ) -> Self {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            benchmark: DEFAULT_BENCHMARK.to_string(),
            horizon,
            end,
        }
    }

    /// Replace the benchmark identifier.
    pub fn with_benchmark(mut self, benchmark: impl Into<String>) -> Self {
        self.benchmark = benchmark.into();
        self
    }

    /// Inclusive `(start, end)` date window.
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        self.horizon.window(self.end)
    }

    /// Symbols with duplicates removed, keeping first occurrence.
    pub fn unique_symbols(&self) -> Vec<String> {
        let mut unique: Vec<String> = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            if !unique.contains(symbol) {
                unique.push(symbol.clone());
            }
        }
        unique
    }
}

/// Output of a CAPM analysis run.
#[derive(Debug, Clone)]
pub struct CapmReport {
    /// One result per symbol, in request order
    pub results: Vec<CapmResult>,
    /// Correlation of asset returns
    pub correlation: CorrelationMatrix,
    /// Long closing-price frame: `symbol`, `date`, `close`
    pub prices: DataFrame,
    /// Long return frame: `symbol`, `date`, `return`
    pub returns: DataFrame,
    /// Returns aligned with the benchmark, as fed to the estimator
    pub aligned: AlignedReturns,
}

impl CapmReport {
    /// Number of aligned observations each estimate used.
    pub fn observations(&self) -> usize {
        self.aligned.len()
    }

    /// Results as a table with columns `Stock`, `Beta`, `Expected Return`.
    pub fn results_frame(&self) -> Result<DataFrame> {
        let stocks: Vec<&str> = self.results.iter().map(|r| r.identifier.as_str()).collect();
        let betas: Vec<f64> = self.results.iter().map(|r| r.beta).collect();
        let expected: Vec<f64> = self.results.iter().map(|r| r.expected_return).collect();

        Ok(df![
            "Stock" => stocks,
            "Beta" => betas,
            "Expected Return" => expected,
        ]?)
    }
}

/// Runs the load-transform-estimate pipeline with one estimator configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapmAnalysis {
    estimator: CapmEstimator,
}

impl CapmAnalysis {
    /// Create an analysis with the given estimator configuration.
    pub const fn new(config: CapmConfig) -> Self {
        Self {
            estimator: CapmEstimator::with_config(config),
        }
    }

    /// Estimator configuration in use.
    pub const fn config(&self) -> &CapmConfig {
        self.estimator.config()
    }

    /// Run the analysis.
    ///
    /// # Errors
    ///
    /// Fails on the first symbol that cannot be loaded or estimated; no partial
    /// report is produced.
    pub fn run(&self, source: &dyn PriceSource, request: &AnalysisRequest) -> Result<CapmReport> {
        let symbols = request.unique_symbols();
        if symbols.is_empty() {
            return Err(CapmError::EmptySelection);
        }

        let (start, end) = request.window();
        debug!(
            source = source.name(),
            symbols = symbols.len(),
            benchmark = %request.benchmark,
            %start,
            %end,
            "starting capm analysis"
        );

        let prices = load_prices(source, &symbols, start, end)?;
        let benchmark = source.closes(&request.benchmark, start, end)?;

        let returns = pct_change_returns(&prices)?;
        let market = benchmark_returns(&benchmark)?;
        let aligned = align_with_market(&returns, &market, &symbols)?;

        let results = symbols
            .iter()
            .map(|symbol| {
                let asset = aligned.asset(symbol).unwrap_or_default();
                self.estimator
                    .estimate_named(symbol, asset, aligned.market())
            })
            .collect::<Result<Vec<_>>>()?;

        let correlation = CorrelationMatrix::from_returns(&returns, &symbols)?;

        info!(
            symbols = results.len(),
            observations = aligned.len(),
            horizon = %request.horizon,
            "capm analysis complete"
        );

        Ok(CapmReport {
            results,
            correlation,
            prices,
            returns,
            aligned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryPriceSource;
    use approx::assert_relative_eq;

    const MARKET_RETURNS: [f64; 8] = [0.004, -0.002, 0.007, 0.001, -0.005, 0.003, 0.006, -0.001];

    fn dates(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| {
                NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(i as u64))
                    .unwrap()
                    .format("%Y-%m-%d")
                    .to_string()
            })
            .collect()
    }

    /// Closing prices whose returns are `scale * MARKET_RETURNS`.
    fn closes(scale: f64) -> DataFrame {
        let mut prices = vec![100.0];
        for r in MARKET_RETURNS {
            let last = prices[prices.len() - 1];
            prices.push(last * (1.0 + scale * r));
        }
        df![
            "date" => dates(prices.len()),
            "close" => prices,
        ]
        .unwrap()
    }

    fn source() -> InMemoryPriceSource {
        InMemoryPriceSource::new()
            .with("sp500", closes(1.0))
            .with("AAPL", closes(1.5))
            .with("MSFT", closes(0.5))
    }

    fn request(symbols: &[&str]) -> AnalysisRequest {
        AnalysisRequest::new(
            symbols.iter().copied(),
            Horizon::years(1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
    }

    #[test]
    fn test_pipeline_recovers_betas() {
        let report = CapmAnalysis::default()
            .run(&source(), &request(&["AAPL", "MSFT"]))
            .unwrap();

        assert_eq!(report.observations(), MARKET_RETURNS.len());
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].identifier, "AAPL");
        assert_relative_eq!(report.results[0].beta, 1.5, epsilon = 1e-9);
        assert_eq!(report.results[1].identifier, "MSFT");
        assert_relative_eq!(report.results[1].beta, 0.5, epsilon = 1e-9);

        let rm = MARKET_RETURNS.iter().sum::<f64>() / MARKET_RETURNS.len() as f64 * 252.0;
        assert_relative_eq!(
            report.results[0].expected_return,
            0.01 + 1.5 * (rm - 0.01),
            epsilon = 1e-9
        );

        assert_relative_eq!(
            report.correlation.get("AAPL", "MSFT").unwrap(),
            1.0,
            epsilon = 1e-9
        );
        assert_eq!(report.prices.height(), 2 * (MARKET_RETURNS.len() + 1));
        assert_eq!(report.returns.height(), 2 * MARKET_RETURNS.len());
    }

    #[test]
    fn test_results_frame_columns() {
        let report = CapmAnalysis::default()
            .run(&source(), &request(&["MSFT"]))
            .unwrap();
        let frame = report.results_frame().unwrap();

        let names: Vec<&str> = frame
            .get_column_names()
            .iter()
            .map(|s| s.as_str())
            .collect();
        assert_eq!(names, vec!["Stock", "Beta", "Expected Return"]);
        assert_eq!(frame.height(), 1);
    }

    #[test]
    fn test_duplicate_symbols_are_collapsed() {
        let req = request(&["AAPL", "MSFT", "AAPL"]);
        assert_eq!(req.unique_symbols(), vec!["AAPL", "MSFT"]);

        let report = CapmAnalysis::default().run(&source(), &req).unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.correlation.len(), 2);
    }

    #[test]
    fn test_custom_config_is_applied() {
        let config = CapmConfig::new(0.0, 1.0);
        let report = CapmAnalysis::new(config)
            .run(&source(), &request(&["AAPL"]))
            .unwrap();

        let mean = MARKET_RETURNS.iter().sum::<f64>() / MARKET_RETURNS.len() as f64;
        assert_relative_eq!(report.results[0].expected_return, 1.5 * mean, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_selection() {
        let err = CapmAnalysis::default()
            .run(&source(), &request(&[]))
            .unwrap_err();
        assert!(matches!(err, CapmError::EmptySelection));
    }

    #[test]
    fn test_missing_benchmark() {
        let req = request(&["AAPL"]).with_benchmark("nasdaq");
        let err = CapmAnalysis::default().run(&source(), &req).unwrap_err();
        assert!(matches!(err, CapmError::SourceUnavailable { ref symbol, .. } if symbol == "nasdaq"));
    }

    #[test]
    fn test_window_outside_data_is_insufficient() {
        let req = AnalysisRequest::new(
            ["AAPL"],
            Horizon::years(1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        );
        let err = CapmAnalysis::default().run(&source(), &req).unwrap_err();
        assert!(matches!(err, CapmError::InsufficientData { available: 0, .. }));
    }
}
