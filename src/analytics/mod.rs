//! Time tracking analytics.
//!
//! This module provides:
//! - Category, user and weekly hour totals
//! - The daily activity heatmap
//! - Sprint velocity and category distribution
//! - Collaboration pairs and team size per category
//! - Issue complexity per category
//! - Hour-of-day and weekday productivity histograms
//! - Estimate deviation per issue and category
//!
//! All aggregation goes through [`MetricsEngine::compute`], which prepares
//! the timelogs once and then runs the aggregators over the same immutable
//! data. Independent aggregators run in parallel on the rayon pool.

pub mod calendar;
pub mod categorize;
pub mod collaboration;
pub mod complexity;
pub mod deviation;
pub mod overview;
pub mod prepared;
pub mod productivity;
pub mod ranking;
pub mod sprint;
pub mod totals;

use chrono::{NaiveDate, NaiveDateTime, TimeZone};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::{Config, DeviationConfig, HeatmapConfig};
use crate::model::Snapshot;

pub use calendar::{build_heatmap, daily_seconds, intensity_level, DayCell, Heatmap, HeatmapWeek};
pub use categorize::{CategoryId, CategorySet};
pub use collaboration::{collaboration_pairs, team_sizes, CollaborationPair, TeamSize};
pub use complexity::{issue_complexity, IssueComplexity};
pub use deviation::{
    deviation_report, issue_deviations, CategoryDeviation, CategoryEstimate, Deviation, DeviationRating,
    DeviationReport, IssueDeviation,
};
pub use overview::{project_overview, ProjectOverview, SprintHighlight};
pub use prepared::{data_range, group_by_issue, prepare, IssueActivity, PrepareStats, PreparedLog};
pub use productivity::{productivity_patterns, DayBucket, HourBucket, ProductivityPatterns};
pub use sprint::{velocity, CategoryShare, CumulativePoint, Sprint, VelocityReport};
pub use totals::{category_totals, user_totals, weekly_user_hours, WeekKey, WeeklyUserHours};

/// Outcome of a computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "dashboard", rename_all = "snake_case")]
pub enum Report {
    /// There were no usable timelogs; nothing was aggregated.
    NoData,
    /// Every aggregate, computed from the same snapshot.
    Ready(Box<Dashboard>),
}

impl Report {
    /// The dashboard, if any.
    #[must_use]
    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self {
            Self::Ready(dashboard) => Some(dashboard),
            Self::NoData => None,
        }
    }

    /// Whether there was nothing to aggregate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Local timestamps of the first and last timelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataRange {
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

/// Every aggregate of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub range: DataRange,
    pub stats: PrepareStats,
    pub overview: ProjectOverview,
    pub category_totals: IndexMap<String, f64>,
    pub user_totals: IndexMap<String, f64>,
    pub weekly_user_hours: Vec<WeeklyUserHours>,
    pub heatmap: Heatmap,
    pub velocity: VelocityReport,
    pub collaborations: Vec<CollaborationPair>,
    pub team_sizes: Vec<TeamSize>,
    pub complexity: Vec<IssueComplexity>,
    pub productivity: ProductivityPatterns,
    pub deviations: DeviationReport,
}

impl Dashboard {
    /// The `n` most frequent collaboration pairs.
    #[must_use]
    pub fn top_collaborations(&self, n: usize) -> &[CollaborationPair] {
        &self.collaborations[..n.min(self.collaborations.len())]
    }

    /// The first `n` issues in deviation order.
    #[must_use]
    pub fn top_deviations(&self, n: usize) -> &[IssueDeviation] {
        let issues = &self.deviations.issues;
        &issues[..n.min(issues.len())]
    }

    /// Sum of all booked hours.
    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.user_totals.values().sum()
    }
}

/// Computes dashboards from snapshots.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    categories: CategorySet,
    sprint_length_days: u32,
    heatmap: HeatmapConfig,
    deviation: DeviationConfig,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl MetricsEngine {
    /// Create an engine for a category set, all other settings defaulted.
    #[must_use]
    pub fn new(categories: CategorySet) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            categories: CategorySet::new(config.categories.names.iter().cloned()),
            sprint_length_days: config.sprint.length_days,
            heatmap: config.heatmap.clone(),
            deviation: config.deviation.clone(),
        }
    }

    /// Override the sprint window length.
    #[must_use]
    pub fn with_sprint_length(mut self, days: u32) -> Self {
        self.sprint_length_days = days;
        self
    }

    #[must_use]
    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Compute every aggregate.
    ///
    /// Timestamps are bucketed in `tz`. `today` only anchors the heatmap
    /// window when there is no data, so results are reproducible for a fixed
    /// snapshot.
    #[instrument(skip_all, fields(issues = snapshot.issues.len(), timelogs = snapshot.timelogs.len()))]
    pub fn compute<Tz: TimeZone>(&self, snapshot: &Snapshot, tz: &Tz, today: NaiveDate) -> Report {
        if snapshot.timelogs.is_empty() {
            info!("No timelogs, nothing to aggregate");
            return Report::NoData;
        }

        let (logs, stats) = prepare(&snapshot.timelogs, &self.categories, tz);
        let Some((first, last)) = data_range(&logs) else {
            info!(skipped = stats.skipped(), "No usable timelogs, nothing to aggregate");
            return Report::NoData;
        };
        let logs = logs.as_slice();

        let (((category_totals, user_totals), (weekly, heatmap)), ((velocity, by_issue), (productivity, deviations))) =
            rayon::join(
                || {
                    rayon::join(
                        || (category_totals(logs, &self.categories), user_totals(logs)),
                        || {
                            (
                                weekly_user_hours(logs),
                                build_heatmap(&daily_seconds(logs), today, &self.heatmap),
                            )
                        },
                    )
                },
                || {
                    rayon::join(
                        || {
                            (
                                velocity(logs, &self.categories, self.sprint_length_days),
                                group_by_issue(logs),
                            )
                        },
                        || {
                            (
                                productivity_patterns(logs),
                                deviation_report(&snapshot.issues, &self.categories, &self.deviation),
                            )
                        },
                    )
                },
            );

        let collaborations = collaboration_pairs(&by_issue);
        let team_sizes = team_sizes(&by_issue, &self.categories);
        let complexity = issue_complexity(&by_issue, &self.categories);
        let overview = project_overview(&velocity, &snapshot.issues);

        debug!(
            sprints = velocity.total_sprints,
            issues = by_issue.len(),
            pairs = collaborations.len(),
            "Aggregation finished"
        );

        Report::Ready(Box::new(Dashboard {
            range: DataRange { first, last },
            stats,
            overview,
            category_totals,
            user_totals,
            weekly_user_hours: weekly,
            heatmap,
            velocity,
            collaborations,
            team_sizes,
            complexity,
            productivity,
            deviations,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Issue, Timelog};
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_empty_timelogs_is_no_data() {
        let snapshot = Snapshot::new(vec![Issue::new("1", ["Entwurf"]).with_times(3600, 0)], vec![]);
        let report = MetricsEngine::default().compute(&snapshot, &Utc, today());
        assert_eq!(report, Report::NoData);
        assert!(report.dashboard().is_none());
    }

    #[test]
    fn test_only_malformed_timelogs_is_no_data() {
        let mut log = Timelog::new("Alice", Issue::new("1", ["Entwurf"]), "2024-03-04T10:00:00Z", 60);
        log.user = None;
        let report = MetricsEngine::default().compute(&Snapshot::new(vec![], vec![log]), &Utc, today());
        assert!(report.is_empty());
    }

    #[test]
    fn test_shared_issue_scenario() {
        let issue = Issue::new("5", ["Entwurf"]);
        let snapshot = Snapshot::new(
            vec![],
            vec![
                Timelog::new("Alice", issue.clone(), "2024-03-04T10:00:00Z", 3600),
                Timelog::new("Bob", issue, "2024-03-05T14:00:00Z", 1800),
            ],
        );

        let report = MetricsEngine::default().compute(&snapshot, &Utc, today());
        let dashboard = report.dashboard().unwrap();

        assert_eq!(dashboard.category_totals["Entwurf"], 1.5);
        assert_eq!(dashboard.collaborations.len(), 1);
        assert_eq!(dashboard.collaborations[0].count, 1);
        assert_eq!(dashboard.team_sizes[0].category, "Entwurf");
        assert_eq!(dashboard.team_sizes[0].average_members, 2.0);
        assert_eq!(dashboard.complexity[0].total_hours, 1.5);
        assert_eq!(dashboard.total_hours(), 1.5);
        assert_eq!(dashboard.velocity.total_sprints, 1);
        assert_eq!(dashboard.overview.main_focus.as_ref().map(|f| f.category.as_str()), Some("Entwurf"));
    }

    #[test]
    fn test_engine_uses_configured_categories() {
        let mut config = Config::default();
        config.categories.names = vec!["Bug".to_string()];
        config.sprint.length_days = 14;
        let engine = MetricsEngine::from_config(&config);

        let snapshot = Snapshot::new(
            vec![],
            vec![Timelog::new("Alice", Issue::new("1", ["Bug"]), "2024-03-04T10:00:00Z", 7200)],
        );
        let report = engine.compute(&snapshot, &Utc, today());
        let dashboard = report.dashboard().unwrap();
        assert_eq!(dashboard.category_totals.len(), 1);
        assert_eq!(dashboard.category_totals["Bug"], 2.0);
        assert_eq!(dashboard.velocity.length_days, 14);
    }

    #[test]
    fn test_top_views_clamp() {
        let snapshot = Snapshot::new(
            vec![],
            vec![Timelog::new("Alice", Issue::new("1", ["Entwurf"]), "2024-03-04T10:00:00Z", 60)],
        );
        let report = MetricsEngine::default().compute(&snapshot, &Utc, today());
        let dashboard = report.dashboard().unwrap();
        assert!(dashboard.top_collaborations(6).is_empty());
        assert!(dashboard.top_deviations(5).is_empty());
    }
}
