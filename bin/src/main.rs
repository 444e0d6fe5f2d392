//! CLI for the capm analytics library.
//!
//! Loads closing prices from CSV files, estimates CAPM beta and expected return
//! for the selected tickers against a benchmark, and prints the results with
//! the correlation matrix of the ticker returns.

use capm::{
    AnalysisRequest, CapmAnalysis, CapmConfig, CapmEstimator, CapmReport, CapmResult,
    CorrelationMatrix, CsvPriceSource, DEFAULT_BENCHMARK, DEFAULT_TICKERS, Horizon, Result,
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "capm")]
#[command(about = "Capital Asset Pricing Model estimates for equities", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate beta and expected return for tickers from CSV price files
    Analyze {
        /// Tickers to analyze
        #[arg(required = true)]
        symbols: Vec<String>,
        /// Directory holding <SYMBOL>.csv files with date and close columns
        #[arg(long)]
        data_dir: PathBuf,
        /// Benchmark series identifier
        #[arg(long, default_value = DEFAULT_BENCHMARK)]
        benchmark: String,
        /// Lookback horizon in years
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10))]
        years: u32,
        /// Last date of the window (defaults to today)
        #[arg(long)]
        end: Option<NaiveDate>,
        #[command(flatten)]
        config: ConfigArgs,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
        /// Write prices.csv, returns.csv and aligned.csv into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Run the estimator on literal return series
    Estimate {
        /// Comma-separated asset returns
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        asset: Vec<f64>,
        /// Comma-separated market returns
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        market: Vec<f64>,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// List the default ticker universe
    Tickers,
}

#[derive(Args)]
struct ConfigArgs {
    /// Risk-free rate
    #[arg(long, default_value_t = capm::config::DEFAULT_RISK_FREE_RATE)]
    risk_free_rate: f64,
    /// Return periods per year used to annualize the market return
    #[arg(long, default_value_t = capm::config::DEFAULT_PERIODS_PER_YEAR)]
    periods_per_year: f64,
}

impl ConfigArgs {
    const fn to_config(&self) -> CapmConfig {
        CapmConfig::new(self.risk_free_rate, self.periods_per_year)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Analyze {
            symbols,
            data_dir,
            benchmark,
            years,
            end,
            config,
            json,
            export,
        } => {
            let end = end.unwrap_or_else(|| Local::now().date_naive());
            let request = AnalysisRequest::new(symbols, Horizon::years(years)?, end)
                .with_benchmark(benchmark);
            let source = CsvPriceSource::new(data_dir);
            let report = CapmAnalysis::new(config.to_config()).run(&source, &request)?;

            if let Some(dir) = export {
                export_frames(&report, &dir)?;
            }
            if json {
                println!("{}", report_json(&report, &request));
            } else {
                print_report(&report, &request);
            }
            Ok(())
        }
        Commands::Estimate {
            asset,
            market,
            config,
        } => {
            let estimate = CapmEstimator::with_config(config.to_config()).estimate(&asset, &market)?;
            println!("Beta: {:.6}", estimate.beta);
            println!("Expected Return: {:.6}", estimate.expected_return);
            Ok(())
        }
        Commands::Tickers => {
            for ticker in DEFAULT_TICKERS {
                println!("{ticker}");
            }
            Ok(())
        }
    }
}

/// Print the results table and the correlation matrix.
fn print_report(report: &CapmReport, request: &AnalysisRequest) {
    let (start, end) = request.window();
    println!(
        "CAPM Results vs {} ({} to {}, {} observations)\n",
        request.benchmark,
        start,
        end,
        report.observations()
    );
    print!("{}", format_results(&report.results));
    println!("\nCorrelation Matrix");
    print!("{}", format_correlation(&report.correlation));
}

fn format_results(results: &[CapmResult]) -> String {
    let width = results
        .iter()
        .map(|r| r.identifier.len())
        .max()
        .unwrap_or(0)
        .max("Stock".len());

    let mut out = format!("{:<width$}  {:>10}  {:>15}\n", "Stock", "Beta", "Expected Return");
    for result in results {
        out.push_str(&format!(
            "{:<width$}  {:>10.4}  {:>15.4}\n",
            result.identifier, result.beta, result.expected_return
        ));
    }
    out
}

fn format_correlation(matrix: &CorrelationMatrix) -> String {
    let width = matrix
        .symbols()
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(7);

    let mut out = format!("{:<width$}", "");
    for symbol in matrix.symbols() {
        out.push_str(&format!("  {symbol:>width$}"));
    }
    out.push('\n');

    for (i, symbol) in matrix.symbols().iter().enumerate() {
        out.push_str(&format!("{symbol:<width$}"));
        for value in matrix.values().row(i) {
            out.push_str(&format!("  {value:>width$.4}"));
        }
        out.push('\n');
    }
    out
}

fn report_json(report: &CapmReport, request: &AnalysisRequest) -> serde_json::Value {
    let (start, end) = request.window();
    let correlation: Vec<Vec<f64>> = report
        .correlation
        .values()
        .rows()
        .into_iter()
        .map(|row| row.to_vec())
        .collect();

    serde_json::json!({
        "benchmark": request.benchmark,
        "start": start,
        "end": end,
        "observations": report.observations(),
        "results": report.results,
        "correlation": {
            "symbols": report.correlation.symbols(),
            "values": correlation,
        },
    })
}

/// Write the price, return and aligned frames as CSV for external charting.
fn export_frames(report: &CapmReport, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    for (name, frame) in [
        ("prices.csv", &report.prices),
        ("returns.csv", &report.returns),
        ("aligned.csv", report.aligned.frame()),
    ] {
        let path = dir.join(name);
        let mut file = File::create(&path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame.clone())?;
        info!(path = %path.display(), rows = frame.height(), "exported frame");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use capm::CapmEstimate;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "capm", "analyze", "AAPL", "MSFT", "--data-dir", "data", "--years", "3", "--end",
            "2024-06-30",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                symbols,
                years,
                end,
                benchmark,
                config,
                json,
                ..
            } => {
                assert_eq!(symbols, vec!["AAPL", "MSFT"]);
                assert_eq!(years, 3);
                assert_eq!(end, NaiveDate::from_ymd_opt(2024, 6, 30));
                assert_eq!(benchmark, "sp500");
                assert_eq!(config.to_config(), CapmConfig::default());
                assert!(!json);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_years_out_of_range_rejected() {
        let result = Cli::try_parse_from([
            "capm", "analyze", "AAPL", "--data-dir", "data", "--years", "11",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_estimate_with_negative_returns() {
        let cli = Cli::try_parse_from([
            "capm",
            "estimate",
            "--asset",
            "0.01,-0.02,0.03",
            "--market",
            "-0.005,0.01,0.02",
            "--risk-free-rate",
            "0.02",
        ])
        .unwrap();

        match cli.command {
            Commands::Estimate {
                asset,
                market,
                config,
            } => {
                assert_eq!(asset, vec![0.01, -0.02, 0.03]);
                assert_eq!(market, vec![-0.005, 0.01, 0.02]);
                assert_eq!(config.to_config().risk_free_rate, 0.02);
            }
            _ => panic!("expected estimate"),
        }
    }

    #[test]
    fn test_format_results() {
        let results = vec![CapmResult::new(
            "AAPL",
            CapmEstimate {
                beta: 1.25,
                expected_return: 0.125,
            },
        )];
        let table = format_results(&results);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Stock"));
        assert!(lines[1].starts_with("AAPL"));
        assert!(lines[1].contains("1.2500"));
        assert!(lines[1].contains("0.1250"));
    }

    #[test]
    fn test_default_tickers() {
        assert_eq!(DEFAULT_TICKERS.len(), 8);
        assert!(DEFAULT_TICKERS.contains(&"NVDA"));
    }
}
