//! Booked time per issue, averaged per category.

use serde::Serialize;

use crate::model::to_hours;

use super::categorize::CategorySet;
use super::collaboration::issues_in;
use super::prepared::IssueActivity;
use super::ranking::sort_descending_by;

/// Booked effort per issue within one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueComplexity {
    /// Category name.
    pub category: String,
    /// Mean booked hours per issue.
    pub average_hours: f64,
    /// Issues with booked time in the category.
    pub total_issues: usize,
    /// Hours booked on those issues.
    pub total_hours: f64,
}

/// Issue complexity per category, highest average first.
///
/// Only categories with at least one booked issue are listed.
#[must_use]
pub fn issue_complexity(issues: &[IssueActivity], categories: &CategorySet) -> Vec<IssueComplexity> {
    let mut rows: Vec<IssueComplexity> = categories
        .iter()
        .filter_map(|(id, name)| {
            let in_category = issues_in(issues, id);
            if in_category.is_empty() {
                return None;
            }
            let seconds: i64 = in_category.iter().map(|issue| issue.seconds).sum();
            let total_hours = to_hours(seconds);
            Some(IssueComplexity {
                category: name.to_string(),
                average_hours: total_hours / in_category.len() as f64,
                total_issues: in_category.len(),
                total_hours,
            })
        })
        .collect();

    sort_descending_by(&mut rows, |row| row.average_hours);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::categorize::CategoryId;

    fn activity(iid: &str, category: usize, seconds: i64) -> IssueActivity {
        IssueActivity {
            iid: iid.to_string(),
            category: Some(CategoryId(category)),
            users: ["Alice".to_string()].into_iter().collect(),
            seconds,
        }
    }

    #[test]
    fn test_average_per_issue() {
        let issues = vec![
            activity("1", 2, 3600),
            activity("2", 2, 3 * 3600),
            activity("3", 0, 5 * 3600),
        ];
        let rows = issue_complexity(&issues, &CategorySet::default());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Requirements Engineering");
        assert_eq!(rows[0].average_hours, 5.0);
        assert_eq!(rows[1].category, "Implementation & Test");
        assert_eq!(rows[1].average_hours, 2.0);
        assert_eq!(rows[1].total_hours, 4.0);
        assert_eq!(rows[1].total_issues, 2);
    }

    #[test]
    fn test_uncategorized_issues_ignored() {
        let mut uncategorized = activity("9", 0, 3600);
        uncategorized.category = None;
        assert!(issue_complexity(&[uncategorized], &CategorySet::default()).is_empty());
    }
}
