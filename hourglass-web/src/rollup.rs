//! View-side aggregation over plans and timer entries
//!
//! Pure functions: callers load the rows, these compute the projections.
//! Nothing here is persisted.

use chrono::{DateTime, Utc};
use hourglass_common::db::models::{Plan, TimerEntry};
use hourglass_common::time::same_utc_day;
use serde::Serialize;

/// Weekly progress for one subject
#[derive(Debug, Clone, Serialize)]
pub struct SubjectSummary {
    pub subject: String,
    pub planned_weekly_hours: f64,
    pub tracked_hours: f64,
    /// Negative when the subject is over budget; that is not an error
    pub remaining_hours: f64,
}

/// Planned hours for one week of a plan
///
/// `days` is a per-month cadence; at most 7 study days fit a week.
pub fn planned_weekly_hours(plan: &Plan) -> f64 {
    plan.hours_per_day * plan.days.min(7) as f64
}

/// Total tracked hours for a subject across all entries
pub fn tracked_hours(entries: &[TimerEntry], subject: &str) -> f64 {
    entries
        .iter()
        .filter(|e| e.subject == subject)
        .map(|e| e.elapsed_hours)
        .sum()
}

/// One summary row per subject, sorted by subject name
///
/// For duplicate-subject plans the most recently created row supplies the
/// planned figure. Subjects that have timer entries but no plan appear with
/// zero planned hours.
pub fn weekly_summary(plans: &[Plan], entries: &[TimerEntry]) -> Vec<SubjectSummary> {
    let mut subjects: Vec<&str> = Vec::new();
    for plan in plans {
        if !subjects.contains(&plan.subject.as_str()) {
            subjects.push(&plan.subject);
        }
    }
    for entry in entries {
        if !subjects.contains(&entry.subject.as_str()) {
            subjects.push(&entry.subject);
        }
    }
    subjects.sort_unstable();

    subjects
        .into_iter()
        .map(|subject| {
            // Newest plan wins (plans are listed in id order)
            let planned = plans
                .iter()
                .rev()
                .find(|p| p.subject == subject)
                .map(planned_weekly_hours)
                .unwrap_or(0.0);
            let tracked = tracked_hours(entries, subject);
            SubjectSummary {
                subject: subject.to_string(),
                planned_weekly_hours: planned,
                tracked_hours: tracked,
                remaining_hours: planned - tracked,
            }
        })
        .collect()
}

/// Today's hours and the all-time rolling total for a subject
///
/// These are the two figures mirrored to the timer sheet.
pub fn daily_and_rolling(
    entries: &[TimerEntry],
    subject: &str,
    today: DateTime<Utc>,
) -> (f64, f64) {
    let mut daily = 0.0;
    let mut rolling = 0.0;
    for entry in entries.iter().filter(|e| e.subject == subject) {
        rolling += entry.elapsed_hours;
        if same_utc_day(entry.ended_at, today) {
            daily += entry.elapsed_hours;
        }
    }
    (daily, rolling)
}

/// Recompute the cumulative elapsed-hours chain per subject
///
/// Returns, for each entry in order, the running total its `total_hours`
/// column should hold. Lets callers audit stored totals against history.
pub fn running_totals(entries: &[TimerEntry]) -> Vec<f64> {
    let mut by_subject: Vec<(&str, f64)> = Vec::new();
    entries
        .iter()
        .map(|entry| {
            match by_subject.iter_mut().find(|(s, _)| *s == entry.subject) {
                Some((_, sum)) => {
                    *sum += entry.elapsed_hours;
                    *sum
                }
                None => {
                    by_subject.push((&entry.subject, entry.elapsed_hours));
                    entry.elapsed_hours
                }
            }
        })
        .collect()
}

/// Subjects present in an entry list, in first-seen order
pub fn subjects_of(entries: &[TimerEntry]) -> Vec<String> {
    let mut subjects: Vec<String> = Vec::new();
    for entry in entries {
        if !subjects.iter().any(|s| s == &entry.subject) {
            subjects.push(entry.subject.clone());
        }
    }
    subjects
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    fn plan(id: i64, subject: &str, days: i64, hours_per_day: f64) -> Plan {
        Plan {
            id,
            user_id: "u".to_string(),
            subject: subject.to_string(),
            days,
            hours_per_day,
            total_hours_day: hours_per_day,
            total_hours_month: days as f64 * hours_per_day,
            created_at: t0(),
        }
    }

    fn entry(subject: &str, elapsed: f64, ended_at: DateTime<Utc>) -> TimerEntry {
        TimerEntry {
            id: 0,
            user_id: "u".to_string(),
            subject: subject.to_string(),
            started_at: ended_at - Duration::minutes((elapsed * 60.0) as i64),
            ended_at,
            elapsed_hours: elapsed,
            planned_hours: 0.0,
            total_hours: 0.0,
            created_at: ended_at,
        }
    }

    #[test]
    fn test_planned_weekly_caps_days_at_seven() {
        assert_eq!(planned_weekly_hours(&plan(1, "Math", 5, 2.0)), 10.0);
        assert_eq!(planned_weekly_hours(&plan(1, "Math", 20, 1.5)), 10.5);
    }

    #[test]
    fn test_tracked_hours_sums_matching_subject() {
        let entries = vec![
            entry("Math", 1.5, t0()),
            entry("History", 2.0, t0()),
            entry("Math", 1.0, t0()),
        ];
        assert!((tracked_hours(&entries, "Math") - 2.5).abs() < 1e-9);
        assert_eq!(tracked_hours(&entries, "Chess"), 0.0);
    }

    #[test]
    fn test_weekly_summary_remaining_can_go_negative() {
        let plans = vec![plan(1, "Math", 2, 1.0)]; // 2 h planned per week
        let entries = vec![entry("Math", 3.0, t0())];

        let summary = weekly_summary(&plans, &entries);
        assert_eq!(summary.len(), 1);
        assert!((summary[0].remaining_hours - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_summary_newest_duplicate_plan_wins() {
        let plans = vec![plan(1, "Math", 5, 2.0), plan(2, "Math", 3, 4.0)];
        let summary = weekly_summary(&plans, &[]);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].planned_weekly_hours, 12.0);
    }

    #[test]
    fn test_weekly_summary_includes_unplanned_subjects() {
        let plans = vec![plan(1, "Math", 5, 2.0)];
        let entries = vec![entry("Chess", 1.0, t0())];

        let summary = weekly_summary(&plans, &entries);
        let subjects: Vec<&str> = summary.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Chess", "Math"]);

        let chess = &summary[0];
        assert_eq!(chess.planned_weekly_hours, 0.0);
        assert!((chess.remaining_hours - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_summary_empty_inputs() {
        assert!(weekly_summary(&[], &[]).is_empty());
    }

    #[test]
    fn test_daily_and_rolling_split() {
        let yesterday = t0() - Duration::days(1);
        let entries = vec![
            entry("Math", 2.0, yesterday),
            entry("Math", 1.5, t0()),
            entry("History", 4.0, t0()),
        ];

        let (daily, rolling) = daily_and_rolling(&entries, "Math", t0());
        assert!((daily - 1.5).abs() < 1e-9);
        assert!((rolling - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_running_totals_chain_per_subject() {
        let entries = vec![
            entry("Math", 1.5, t0()),
            entry("History", 2.0, t0()),
            entry("Math", 1.0, t0()),
        ];
        assert_eq!(running_totals(&entries), vec![1.5, 2.0, 2.5]);
        assert!(running_totals(&[]).is_empty());
    }

    #[test]
    fn test_subjects_of_first_seen_order() {
        let entries = vec![
            entry("Math", 1.0, t0()),
            entry("History", 1.0, t0()),
            entry("Math", 1.0, t0()),
        ];
        assert_eq!(subjects_of(&entries), vec!["Math", "History"]);
    }
}
