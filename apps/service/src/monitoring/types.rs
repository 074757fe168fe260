use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scoring::calculate_performance_score;

/// Share of the load time reported as (approximated) time to first byte
const TTFB_RATIO: f64 = 0.3;

/// Reachability of a checked URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The request completed, whatever the status code
    Online,
    /// The request failed (network error, timeout, abort)
    Offline,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Online => "online",
            CheckStatus::Offline => "offline",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "online" => Some(CheckStatus::Online),
            "offline" => Some(CheckStatus::Offline),
            _ => None,
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one timed GET against a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub id: Uuid,

    /// URL that was probed
    pub url: String,

    pub status: CheckStatus,

    /// HTTP status code, when the request completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Wall-clock duration of the attempt in milliseconds, set even on failure
    pub load_time: u64,

    /// Body size in bytes, from `Content-Length` or the measured body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,

    /// Failure reason, only for offline results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub timestamp: DateTime<Utc>,

    pub performance_score: u8,

    /// Approximated time to first byte, only for online results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<u64>,
}

impl CheckResult {
    /// Start a result for `url`, stamped now with a fresh id.
    ///
    /// The result starts out offline with no timing; finish it with
    /// [`CheckResult::online`] or [`CheckResult::offline`].
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            status: CheckStatus::Offline,
            status_code: None,
            load_time: 0,
            content_length: None,
            error: None,
            timestamp: Utc::now(),
            performance_score: 0,
            ttfb: None,
        }
    }

    /// Mark the check as completed with the given response measurements
    pub fn online(mut self, load_time: u64, status_code: u16, content_length: Option<u64>) -> Self {
        self.status = CheckStatus::Online;
        self.status_code = Some(status_code);
        self.load_time = load_time;
        self.content_length = content_length;
        self.error = None;
        self.performance_score = calculate_performance_score(load_time, Some(status_code));
        self.ttfb = Some(approximate_ttfb(load_time));
        self
    }

    /// Mark the check as failed after `load_time` milliseconds
    pub fn offline(mut self, load_time: u64, error: impl Into<String>) -> Self {
        self.status = CheckStatus::Offline;
        self.status_code = None;
        self.load_time = load_time;
        self.content_length = None;
        self.error = Some(error.into());
        self.performance_score = 0;
        self.ttfb = None;
        self
    }

    pub fn is_online(&self) -> bool {
        self.status == CheckStatus::Online
    }
}

/// `round(load_time * 0.3)`; a fixed estimate, not a measurement.
pub fn approximate_ttfb(load_time: u64) -> u64 {
    (load_time as f64 * TTFB_RATIO).round() as u64
}
