//! WebPulse monitoring service
//!
//! Runs on-demand HTTP checks, scores them, and keeps bounded check
//! histories for registered websites.
pub mod config;
pub mod database;
pub mod history;
pub mod monitoring;
pub mod pool;
pub mod validation;

pub use config::{Config, ConfigError};
pub use database::{MonitoredWebsite, Storage, StorageError, User, WebsiteStatus, open_storage};
pub use monitoring::{CheckResult, CheckStatus, Checker, ClientError, HistorySummary, HttpChecker, MonitoringExecutor};
pub use validation::{ValidationError, ValidationResult};
