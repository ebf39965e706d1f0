//! Headline figures of the dashboard.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{to_hours, Issue};

use super::sprint::{CategoryShare, VelocityReport};

/// The sprint with the most booked hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintHighlight {
    pub number: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectOverview {
    pub average_velocity: f64,
    pub active_sprints: usize,
    /// Category with the highest average hours per sprint.
    pub main_focus: Option<CategoryShare>,
    pub most_active_sprint: Option<SprintHighlight>,
    /// Mean `totalTimeSpent` in hours over issues with booked time.
    pub average_completion_hours: f64,
    /// Issues with booked time.
    pub completed_issues: usize,
}

#[must_use]
pub fn project_overview(velocity: &VelocityReport, issues: &[Issue]) -> ProjectOverview {
    let completed: Vec<i64> = issues
        .iter()
        .map(|issue| issue.total_time_spent)
        .filter(|&spent| spent > 0)
        .collect();
    let average_completion_hours = if completed.is_empty() {
        0.0
    } else {
        completed.iter().map(|&spent| to_hours(spent)).sum::<f64>() / completed.len() as f64
    };

    ProjectOverview {
        average_velocity: velocity.average_velocity,
        active_sprints: velocity.total_sprints,
        main_focus: velocity.main_focus().cloned(),
        most_active_sprint: velocity.most_active_sprint().map(|sprint| SprintHighlight {
            number: sprint.number,
            start: sprint.start,
            end: sprint.end,
            total_hours: sprint.total_hours,
        }),
        average_completion_hours,
        completed_issues: completed.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::categorize::CategorySet;
    use crate::analytics::sprint::velocity;

    #[test]
    fn test_completion_time_ignores_unbooked_issues() {
        let issues = vec![
            Issue::new("1", ["Entwurf"]).with_times(0, 3600),
            Issue::new("2", ["Entwurf"]).with_times(3600, 0),
            Issue::new("3", Vec::<String>::new()).with_times(0, 7200),
        ];
        let overview = project_overview(&velocity(&[], &CategorySet::default(), 7), &issues);

        assert_eq!(overview.completed_issues, 2);
        assert_eq!(overview.average_completion_hours, 1.5);
        assert_eq!(overview.active_sprints, 0);
        assert!(overview.main_focus.is_none());
        assert!(overview.most_active_sprint.is_none());
    }

    #[test]
    fn test_no_issues() {
        let overview = project_overview(&velocity(&[], &CategorySet::default(), 7), &[]);
        assert_eq!(overview.average_completion_hours, 0.0);
        assert_eq!(overview.completed_issues, 0);
    }
}
