#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/capm/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod align;
pub mod analysis;
pub mod config;
pub mod correlation;
pub mod error;
pub mod estimator;
pub mod horizon;
pub mod returns;
pub mod source;
pub mod stats;

// Re-export core types
pub use align::{AlignedReturns, align_with_market};
pub use analysis::{AnalysisRequest, CapmAnalysis, CapmReport, DEFAULT_BENCHMARK, DEFAULT_TICKERS};
pub use config::CapmConfig;
pub use correlation::CorrelationMatrix;
pub use error::{CapmError, Result};
pub use estimator::{CapmEstimate, CapmEstimator, CapmResult, estimate};
pub use horizon::Horizon;
pub use returns::{benchmark_returns, pct_change_returns};
pub use source::{CsvPriceSource, InMemoryPriceSource, PriceSource, load_prices};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
