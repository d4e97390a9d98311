pub mod arith;
pub mod calendar;
pub mod defaults;
pub mod error;
pub mod exposure;
pub mod forecast;
pub mod history;
pub mod normalizer;
pub mod policy;
pub mod report;
pub mod scenarios;
pub mod scoring;
pub mod types;

pub use error::PortfolioRiskError;
pub use report::{
    compute_risk_report, compute_risk_report_with, PortfolioMetrics, RiskReport, RiskReportInput,
};
pub use types::*;

/// Standard result type for all portfolio-risk operations
pub type PortfolioRiskResult<T> = Result<T, PortfolioRiskError>;
