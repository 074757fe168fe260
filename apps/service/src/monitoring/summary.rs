use serde::Serialize;

use super::scoring::PerformanceGrade;
use super::types::CheckResult;

/// Aggregate view over a check history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub checks: usize,
    /// Rounded mean load time in milliseconds
    pub average_load_time: u64,
    /// Rounded mean performance score
    pub average_score: u8,
    /// Rounded percentage of online checks
    pub uptime: u8,
    pub grade: PerformanceGrade,
}

impl HistorySummary {
    /// Summarize `history`; every figure is 0 for an empty history.
    pub fn from_history<'a>(history: impl IntoIterator<Item = &'a CheckResult>) -> Self {
        let mut checks = 0usize;
        let mut total_load_time = 0u128;
        let mut total_score = 0u64;
        let mut online = 0usize;

        for result in history {
            checks += 1;
            total_load_time += u128::from(result.load_time);
            total_score += u64::from(result.performance_score);
            if result.is_online() {
                online += 1;
            }
        }

        if checks == 0 {
            return Self {
                checks,
                average_load_time: 0,
                average_score: 0,
                uptime: 0,
                grade: PerformanceGrade::from_score(0),
            };
        }

        let count = checks as f64;
        let average_score = (total_score as f64 / count).round() as u8;

        Self {
            checks,
            average_load_time: (total_load_time as f64 / count).round() as u64,
            average_score,
            uptime: (online as f64 / count * 100.0).round() as u8,
            grade: PerformanceGrade::from_score(average_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let summary = HistorySummary::from_history(&[]);

        assert_eq!(summary.checks, 0);
        assert_eq!(summary.average_load_time, 0);
        assert_eq!(summary.average_score, 0);
        assert_eq!(summary.uptime, 0);
        assert_eq!(summary.grade.grade, "F");
    }

    #[test]
    fn test_mixed_history() {
        let history = vec![
            CheckResult::new("https://example.com").online(400, 200, None),
            CheckResult::new("https://example.com").online(600, 200, None),
            CheckResult::new("https://example.com").offline(30000, "Request timed out"),
        ];

        let summary = HistorySummary::from_history(&history);

        assert_eq!(summary.checks, 3);
        assert_eq!(summary.average_load_time, 10333);
        // (100 + 95 + 0) / 3 = 65
        assert_eq!(summary.average_score, 65);
        assert_eq!(summary.uptime, 67);
        assert_eq!(summary.grade.label, "Fair");
    }
}
