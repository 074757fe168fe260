use serde::Serialize;

/// Load-time thresholds in milliseconds and their deductions, largest first.
/// Only the first threshold exceeded applies.
const LOAD_TIME_PENALTIES: [(u64, u8); 5] = [(5000, 50), (3000, 35), (2000, 25), (1000, 15), (500, 5)];

/// Compute the 0–100 performance score of a check.
///
/// One load-time deduction and one status-code deduction are applied
/// independently. Status 200 and a missing status incur no status deduction;
/// neither does any code below 300.
pub fn calculate_performance_score(load_time_ms: u64, status_code: Option<u16>) -> u8 {
    let mut score: i32 = 100;

    if let Some((_, penalty)) =
        LOAD_TIME_PENALTIES.iter().find(|(threshold, _)| load_time_ms > *threshold)
    {
        score -= i32::from(*penalty);
    }

    score -= i32::from(status_penalty(status_code));

    score.clamp(0, 100) as u8
}

fn status_penalty(status_code: Option<u16>) -> u8 {
    match status_code {
        Some(200) | None => 0,
        Some(code) if code >= 500 => 30,
        Some(code) if code >= 400 => 20,
        Some(code) if code >= 300 => 10,
        Some(_) => 0,
    }
}

/// Letter grade and label for a performance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PerformanceGrade {
    pub grade: &'static str,
    pub label: &'static str,
}

impl PerformanceGrade {
    pub fn from_score(score: u8) -> Self {
        let (grade, label) = match score {
            90.. => ("A+", "Excellent"),
            80..=89 => ("A", "Great"),
            70..=79 => ("B", "Good"),
            60..=69 => ("C", "Fair"),
            50..=59 => ("D", "Poor"),
            _ => ("F", "Critical"),
        };
        Self { grade, label }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_time_deductions() {
        assert_eq!(calculate_performance_score(400, Some(200)), 100);
        assert_eq!(calculate_performance_score(500, Some(200)), 100);
        assert_eq!(calculate_performance_score(600, Some(200)), 95);
        assert_eq!(calculate_performance_score(1500, Some(200)), 85);
        assert_eq!(calculate_performance_score(2500, Some(200)), 75);
        assert_eq!(calculate_performance_score(3500, Some(200)), 65);
        assert_eq!(calculate_performance_score(6000, Some(200)), 50);
    }

    #[test]
    fn test_status_deductions() {
        assert_eq!(calculate_performance_score(400, Some(404)), 80);
        assert_eq!(calculate_performance_score(400, Some(500)), 70);
        assert_eq!(calculate_performance_score(400, Some(301)), 90);
        assert_eq!(calculate_performance_score(6000, Some(500)), 20);
    }

    #[test]
    fn test_no_deduction_below_300() {
        assert_eq!(calculate_performance_score(400, None), 100);
        assert_eq!(calculate_performance_score(400, Some(204)), 100);
        assert_eq!(calculate_performance_score(400, Some(299)), 100);
        assert_eq!(calculate_performance_score(400, Some(101)), 100);
    }

    #[test]
    fn test_deterministic_and_clamped() {
        let codes = [None, Some(100), Some(200), Some(302), Some(404), Some(503), Some(u16::MAX)];
        for load_time in [0, 1, 500, 501, 1001, 2001, 3001, 5001, u64::MAX] {
            for code in codes {
                let first = calculate_performance_score(load_time, code);
                assert_eq!(first, calculate_performance_score(load_time, code));
                assert!(first <= 100);
            }
        }
        assert_eq!(calculate_performance_score(u64::MAX, Some(599)), 20);
    }

    #[test]
    fn test_grades() {
        assert_eq!(PerformanceGrade::from_score(100).grade, "A+");
        assert_eq!(PerformanceGrade::from_score(90).label, "Excellent");
        assert_eq!(PerformanceGrade::from_score(89).grade, "A");
        assert_eq!(PerformanceGrade::from_score(75).label, "Good");
        assert_eq!(PerformanceGrade::from_score(60).grade, "C");
        assert_eq!(PerformanceGrade::from_score(50).label, "Poor");
        assert_eq!(PerformanceGrade::from_score(0).grade, "F");
    }
}
