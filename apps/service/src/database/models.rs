use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::history::{BoundedLog, WEBSITE_HISTORY_LIMIT};
use crate::monitoring::types::{CheckResult, CheckStatus};

/// Status of a monitored website
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebsiteStatus {
    Online,
    Offline,
    /// Registered but no check has been applied yet
    Checking,
}

impl WebsiteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WebsiteStatus::Online => "online",
            WebsiteStatus::Offline => "offline",
            WebsiteStatus::Checking => "checking",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "online" => Some(WebsiteStatus::Online),
            "offline" => Some(WebsiteStatus::Offline),
            "checking" => Some(WebsiteStatus::Checking),
            _ => None,
        }
    }
}

impl From<CheckStatus> for WebsiteStatus {
    fn from(status: CheckStatus) -> Self {
        match status {
            CheckStatus::Online => WebsiteStatus::Online,
            CheckStatus::Offline => WebsiteStatus::Offline,
        }
    }
}

impl std::fmt::Display for WebsiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL tracked across repeated checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredWebsite {
    pub id: Uuid,
    pub url: String,
    pub name: String,
    pub status: WebsiteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check: Option<CheckResult>,
    /// Newest 50 results, oldest first
    #[serde(deserialize_with = "deserialize_website_history")]
    pub check_history: BoundedLog<CheckResult>,
    pub added_at: DateTime<Utc>,
}

/// Website histories are read back as plain arrays and re-bounded to their own limit
fn deserialize_website_history<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BoundedLog<CheckResult>, D::Error> {
    let entries = Vec::<CheckResult>::deserialize(deserializer)?;
    Ok(BoundedLog::from_entries(entries, WEBSITE_HISTORY_LIMIT))
}

impl MonitoredWebsite {
    /// Create a new website awaiting its first check
    pub fn new(url: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            name,
            status: WebsiteStatus::Checking,
            last_check: None,
            check_history: BoundedLog::new(WEBSITE_HISTORY_LIMIT),
            added_at: Utc::now(),
        }
    }

    /// Append a result, evicting the oldest past the limit, and mirror its status.
    ///
    /// This is the only way a website's history, last check and status change.
    pub fn apply_check(&mut self, result: CheckResult) {
        self.status = result.status.into();
        self.check_history.push(result.clone());
        self.last_check = Some(result);
    }
}

/// Account record. Passwords are stored as given; there is no auth model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl User {
    pub fn new(username: String, password: String) -> Self {
        Self { id: Uuid::new_v4(), username, password }
    }
}

/// Convert a timestamp to Unix milliseconds for storage
pub fn timestamp_to_i64(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Convert stored Unix milliseconds back to a timestamp
pub fn i64_to_timestamp(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_website_is_checking() {
        let website = MonitoredWebsite::new("https://example.com".into(), "Example".into());

        assert_eq!(website.status, WebsiteStatus::Checking);
        assert!(website.last_check.is_none());
        assert!(website.check_history.is_empty());
        assert_eq!(website.check_history.capacity(), WEBSITE_HISTORY_LIMIT);
    }

    #[test]
    fn test_apply_check_bounds_history() {
        let mut website = MonitoredWebsite::new("https://example.com".into(), "Example".into());
        let mut results = Vec::new();

        for i in 0..(WEBSITE_HISTORY_LIMIT as u64 + 20) {
            let result = if i % 2 == 0 {
                CheckResult::new("https://example.com").online(i, 200, None)
            } else {
                CheckResult::new("https://example.com").offline(i, "refused")
            };
            results.push(result.clone());
            website.apply_check(result);
            assert!(website.check_history.len() <= WEBSITE_HISTORY_LIMIT);
        }

        let expected = &results[results.len() - WEBSITE_HISTORY_LIMIT..];
        assert_eq!(website.check_history.to_vec(), expected);
        assert_eq!(website.last_check.as_ref(), website.check_history.last());
        assert_eq!(website.status, WebsiteStatus::Offline);
    }

    #[test]
    fn test_deserialized_history_keeps_website_limit() {
        let mut website = MonitoredWebsite::new("https://example.com".into(), "Example".into());
        let oversized: Vec<CheckResult> = (0..60)
            .map(|i| CheckResult::new("https://example.com").online(i, 200, None))
            .collect();

        let mut json = serde_json::to_value(&website).unwrap();
        json["checkHistory"] = serde_json::to_value(&oversized).unwrap();
        website = serde_json::from_value(json).unwrap();

        assert_eq!(website.check_history.capacity(), WEBSITE_HISTORY_LIMIT);
        assert_eq!(website.check_history.to_vec(), &oversized[10..]);
    }

    #[test]
    fn test_status_never_returns_to_checking() {
        let mut website = MonitoredWebsite::new("https://example.com".into(), "Example".into());

        website.apply_check(CheckResult::new("https://example.com").online(10, 200, None));
        assert_eq!(website.status, WebsiteStatus::Online);

        website.apply_check(CheckResult::new("https://example.com").offline(10, "down"));
        assert_eq!(website.status, WebsiteStatus::Offline);
    }

    #[test]
    fn test_website_json_shape() {
        let mut website = MonitoredWebsite::new("https://example.com".into(), "Example".into());
        let value = serde_json::to_value(&website).unwrap();
        assert_eq!(value["status"], "checking");
        assert!(value.get("lastCheck").is_none());
        assert_eq!(value["checkHistory"], serde_json::json!([]));
        assert!(value["addedAt"].as_str().is_some());

        website.apply_check(CheckResult::new("https://example.com").online(10, 200, None));
        let value = serde_json::to_value(&website).unwrap();
        assert_eq!(value["status"], "online");
        assert_eq!(value["lastCheck"]["statusCode"], 200);
        assert_eq!(value["checkHistory"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_timestamp_round_trip() {
        let now = Utc::now();
        let restored = i64_to_timestamp(timestamp_to_i64(now)).unwrap();
        assert_eq!(restored.timestamp_millis(), now.timestamp_millis());
    }
}
