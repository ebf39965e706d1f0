//! Estimate versus actual time per issue.
//!
//! Works on the standalone Issues collection, whose `timeEstimate` and
//! `totalTimeSpent` are maintained by the tracker, not on the timelogs.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::config::DeviationConfig;
use crate::model::{to_hours, Issue};

use super::categorize::CategorySet;
use super::ranking::descending;

/// Relative deviation of actual from estimated time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum Deviation {
    /// `(actual - estimate) / estimate * 100`.
    Finite(f64),
    /// Time was booked without any estimate.
    Unbounded,
}

impl Deviation {
    /// Deviation for an estimate and actual time in seconds.
    #[must_use]
    pub fn between(estimate: i64, actual: i64) -> Self {
        if estimate > 0 {
            Self::Finite((actual - estimate) as f64 / estimate as f64 * 100.0)
        } else if actual > 0 {
            Self::Unbounded
        } else {
            Self::Finite(0.0)
        }
    }

    /// Magnitude of a finite deviation.
    #[must_use]
    pub fn magnitude(&self) -> Option<f64> {
        match self {
            Self::Finite(percent) => Some(percent.abs()),
            Self::Unbounded => None,
        }
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(percent) => {
                let precision = f.precision().unwrap_or(2);
                write!(f, "{percent:+.precision$}%")
            }
            Self::Unbounded => f.write_str("∞"),
        }
    }
}

/// How close an estimate came.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationRating {
    Unestimated,
    Excellent,
    Good,
    Poor,
}

impl DeviationRating {
    #[must_use]
    pub fn rate(estimate: i64, deviation: Deviation, config: &DeviationConfig) -> Self {
        if estimate <= 0 {
            return Self::Unestimated;
        }
        match deviation.magnitude() {
            Some(percent) if percent <= config.excellent_percent => Self::Excellent,
            Some(percent) if percent <= config.good_percent => Self::Good,
            _ => Self::Poor,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unestimated => "unestimated",
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueDeviation {
    pub iid: String,
    pub title: String,
    pub category: String,
    pub estimate_hours: f64,
    pub actual_hours: f64,
    pub deviation: Deviation,
    pub rating: DeviationRating,
}

impl IssueDeviation {
    fn has_actual(&self) -> bool {
        self.actual_hours > 0.0
    }
}

/// Summed estimated and actual hours of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEstimate {
    pub category: String,
    pub estimated_hours: f64,
    pub actual_hours: f64,
}

/// Mean absolute deviation of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDeviation {
    pub category: String,
    pub average_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationReport {
    /// Issues ordered by [`compare_deviations`].
    pub issues: Vec<IssueDeviation>,
    pub by_category: Vec<CategoryEstimate>,
    pub average_by_category: Vec<CategoryDeviation>,
}

/// Deviation of every categorized issue that has an estimate or booked time.
#[must_use]
pub fn issue_deviations(issues: &[Issue], categories: &CategorySet, config: &DeviationConfig) -> Vec<IssueDeviation> {
    let mut rows: Vec<IssueDeviation> = issues
        .iter()
        .filter(|issue| issue.has_time_data())
        .filter_map(|issue| {
            let category = categories.categorize(&issue.labels)?;
            let deviation = Deviation::between(issue.time_estimate, issue.total_time_spent);
            Some(IssueDeviation {
                iid: issue.iid.clone(),
                title: issue.title.clone(),
                category: categories.name(category).to_string(),
                estimate_hours: to_hours(issue.time_estimate),
                actual_hours: to_hours(issue.total_time_spent),
                deviation,
                rating: DeviationRating::rate(issue.time_estimate, deviation, config),
            })
        })
        .collect();

    rows.sort_by(compare_deviations);
    rows
}

/// Issues with booked time first, then unbounded deviations, then by
/// descending absolute deviation.
#[must_use]
pub fn compare_deviations(a: &IssueDeviation, b: &IssueDeviation) -> Ordering {
    b.has_actual()
        .cmp(&a.has_actual())
        .then_with(|| b.deviation.is_unbounded().cmp(&a.deviation.is_unbounded()))
        .then_with(|| {
            descending(
                a.deviation.magnitude().unwrap_or(0.0),
                b.deviation.magnitude().unwrap_or(0.0),
            )
        })
}

/// Issue deviations together with the per-category comparisons.
#[must_use]
pub fn deviation_report(issues: &[Issue], categories: &CategorySet, config: &DeviationConfig) -> DeviationReport {
    let rows = issue_deviations(issues, categories, config);

    let mut by_category = Vec::with_capacity(categories.len());
    let mut average_by_category = Vec::with_capacity(categories.len());
    for (_, name) in categories.iter() {
        let booked: Vec<&IssueDeviation> = rows
            .iter()
            .filter(|row| row.category == name && row.has_actual())
            .collect();

        by_category.push(CategoryEstimate {
            category: name.to_string(),
            estimated_hours: booked.iter().map(|row| row.estimate_hours).sum(),
            actual_hours: booked.iter().map(|row| row.actual_hours).sum(),
        });

        let finite: Vec<f64> = booked.iter().filter_map(|row| row.deviation.magnitude()).collect();
        average_by_category.push(CategoryDeviation {
            category: name.to_string(),
            average_percent: if finite.is_empty() {
                0.0
            } else {
                finite.iter().sum::<f64>() / finite.len() as f64
            },
        });
    }

    DeviationReport {
        issues: rows,
        by_category,
        average_by_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn issue(iid: &str, labels: &[&str], estimate: i64, spent: i64) -> Issue {
        Issue::new(iid, labels.iter().copied()).with_times(estimate, spent)
    }

    #[test]
    fn test_deviation_cases() {
        assert_eq!(Deviation::between(0, 0), Deviation::Finite(0.0));
        assert_eq!(Deviation::between(0, 36_000), Deviation::Unbounded);
        assert_eq!(Deviation::between(3600, 7200), Deviation::Finite(100.0));
        assert_eq!(Deviation::between(7200, 3600), Deviation::Finite(-50.0));
    }

    #[test]
    fn test_deviation_display() {
        assert_eq!(Deviation::Finite(100.0).to_string(), "+100.00%");
        assert_eq!(format!("{:.1}", Deviation::Finite(-12.345)), "-12.3%");
        assert_eq!(Deviation::Unbounded.to_string(), "∞");
    }

    #[test]
    fn test_deviation_serializes_tagged() {
        let json = serde_json::to_value(Deviation::Unbounded).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "unbounded" }));
        let json = serde_json::to_value(Deviation::Finite(5.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "finite", "percent": 5.0 }));
    }

    #[test]
    fn test_ratings() {
        let config = DeviationConfig::default();
        let rate = |estimate, actual| DeviationRating::rate(estimate, Deviation::between(estimate, actual), &config);
        assert_eq!(rate(0, 3600), DeviationRating::Unestimated);
        assert_eq!(rate(3600, 3900), DeviationRating::Excellent);
        assert_eq!(rate(3600, 2700), DeviationRating::Good);
        assert_eq!(rate(3600, 7200), DeviationRating::Poor);
    }

    #[test]
    fn test_filter_and_sort() {
        let issues = vec![
            issue("1", &["Entwurf"], 3600, 3960),
            issue("2", &["Entwurf"], 0, 0),
            issue("3", &["bug"], 3600, 7200),
            issue("4", &["Entwurf"], 7200, 0),
            issue("5", &["Projektmanagement"], 0, 1800),
            issue("6", &["Entwurf"], 3600, 7200),
        ];
        let rows = issue_deviations(&issues, &CategorySet::default(), &DeviationConfig::default());
        let order: Vec<&str> = rows.iter().map(|row| row.iid.as_str()).collect();
        assert_eq!(order, vec!["5", "6", "1", "4"]);
    }

    #[test]
    fn test_category_comparison() {
        let issues = vec![
            issue("1", &["Entwurf"], 3600, 7200),
            issue("2", &["Entwurf"], 3600, 3600),
            issue("3", &["Entwurf"], 0, 3600),
            issue("4", &["Entwurf"], 3600, 0),
        ];
        let report = deviation_report(&issues, &CategorySet::default(), &DeviationConfig::default());

        let entwurf = &report.by_category[1];
        assert_eq!(entwurf.category, "Entwurf");
        assert_eq!(entwurf.estimated_hours, 2.0);
        assert_eq!(entwurf.actual_hours, 4.0);

        assert_eq!(report.average_by_category[1].average_percent, 50.0);
        assert_eq!(report.average_by_category[0].average_percent, 0.0);
        assert_eq!(report.by_category.len(), 4);
    }
}
