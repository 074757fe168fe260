/// Monitoring engine - probes URLs and turns responses into scored results
pub mod checker;
pub mod executor;
pub mod scoring;
pub mod summary;
pub mod types;

pub use checker::{Checker, ClientError, HttpChecker};
pub use executor::MonitoringExecutor;
pub use scoring::{PerformanceGrade, calculate_performance_score};
pub use summary::HistorySummary;
pub use types::{CheckResult, CheckStatus};
