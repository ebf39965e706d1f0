//! Shared preprocessing.
//!
//! Every aggregator works on [`PreparedLog`]s: timelogs that have been
//! validated, converted to local wall-clock time and assigned a category
//! exactly once. Malformed timelogs are dropped here, counted in
//! [`PrepareStats`], and never reach an aggregator.

use std::collections::BTreeSet;

use chrono::{NaiveDateTime, TimeZone};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::Timelog;

use super::categorize::{CategoryId, CategorySet};

/// Longest duration a single timelog may book: ten years of seconds.
///
/// Keeps every per-bucket sum far inside `i64`.
pub const MAX_TIMELOG_SECONDS: i64 = 10 * 366 * 24 * 3600;

/// A validated timelog in local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedLog {
    /// Booking user.
    pub user: String,
    /// Issue the time was booked on, if any.
    pub issue_iid: Option<String>,
    /// Category of the embedded issue snapshot.
    pub category: Option<CategoryId>,
    /// Local wall-clock time of `spentAt`.
    pub local: NaiveDateTime,
    /// Booked seconds.
    pub seconds: i64,
}

/// Counts from preprocessing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrepareStats {
    /// Timelogs received.
    pub timelogs_total: usize,
    /// Timelogs that passed validation.
    pub timelogs_used: usize,
    /// Timelogs dropped for a missing or empty user.
    pub skipped_missing_user: usize,
    /// Timelogs dropped for an unparseable `spentAt`.
    pub skipped_bad_timestamp: usize,
    /// Timelogs dropped for a `timeSpent` beyond [`MAX_TIMELOG_SECONDS`].
    pub skipped_bad_duration: usize,
}

impl PrepareStats {
    /// Total number of dropped timelogs.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped_missing_user + self.skipped_bad_timestamp + self.skipped_bad_duration
    }
}

/// Validate and localize timelogs.
pub fn prepare<Tz: TimeZone>(
    timelogs: &[Timelog],
    categories: &CategorySet,
    tz: &Tz,
) -> (Vec<PreparedLog>, PrepareStats) {
    let mut stats = PrepareStats {
        timelogs_total: timelogs.len(),
        ..Default::default()
    };
    let mut prepared = Vec::with_capacity(timelogs.len());

    for (index, log) in timelogs.iter().enumerate() {
        let Some(user) = log.user_name() else {
            warn!(index, "Skipping timelog without user");
            stats.skipped_missing_user += 1;
            continue;
        };

        let spent_at = match log.spent_at() {
            Ok(spent_at) => spent_at,
            Err(e) => {
                warn!(index, spent_at = %log.spent_at, error = %e, "Skipping timelog with invalid timestamp");
                stats.skipped_bad_timestamp += 1;
                continue;
            }
        };

        if log.time_spent.unsigned_abs() > MAX_TIMELOG_SECONDS.unsigned_abs() {
            warn!(index, time_spent = log.time_spent, "Skipping timelog with implausible duration");
            stats.skipped_bad_duration += 1;
            continue;
        }

        let issue = log.issue.as_ref().filter(|issue| !issue.iid.is_empty());
        prepared.push(PreparedLog {
            user: user.to_string(),
            issue_iid: issue.map(|issue| issue.iid.clone()),
            category: issue.and_then(|issue| categories.categorize(&issue.labels)),
            local: spent_at.with_timezone(tz).naive_local(),
            seconds: log.time_spent,
        });
    }

    stats.timelogs_used = prepared.len();
    debug!(
        used = stats.timelogs_used,
        skipped = stats.skipped(),
        "Timelogs prepared"
    );
    (prepared, stats)
}

/// Earliest and latest local timestamps.
#[must_use]
pub fn data_range(logs: &[PreparedLog]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = logs.iter().map(|log| log.local).min()?;
    let last = logs.iter().map(|log| log.local).max()?;
    Some((first, last))
}

/// Everything booked on one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueActivity {
    /// Issue identifier.
    pub iid: String,
    /// Category from the first timelog seen for this issue.
    pub category: Option<CategoryId>,
    /// Distinct users who booked time, sorted.
    pub users: BTreeSet<String>,
    /// Total booked seconds.
    pub seconds: i64,
}

/// Group timelogs by issue, in order of first appearance.
///
/// Timelogs without an issue are ignored. The issue snapshot can differ
/// between timelogs of the same issue; the first one decides the category.
#[must_use]
pub fn group_by_issue(logs: &[PreparedLog]) -> Vec<IssueActivity> {
    let mut groups: IndexMap<&str, IssueActivity> = IndexMap::new();

    for log in logs {
        let Some(iid) = log.issue_iid.as_deref() else {
            continue;
        };
        let activity = groups.entry(iid).or_insert_with(|| IssueActivity {
            iid: iid.to_string(),
            category: log.category,
            users: BTreeSet::new(),
            seconds: 0,
        });
        activity.users.insert(log.user.clone());
        activity.seconds += log.seconds;
    }

    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Issue;
    use chrono::{FixedOffset, NaiveDate, Utc};

    fn log(user: &str, iid: &str, labels: &[&str], spent_at: &str, seconds: i64) -> Timelog {
        Timelog::new(user, Issue::new(iid, labels.iter().copied()), spent_at, seconds)
    }

    #[test]
    fn test_prepare_localizes_and_categorizes() {
        let logs = vec![log("Alice", "5", &["Entwurf"], "2024-03-03T23:30:00Z", 3600)];
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let (prepared, stats) = prepare(&logs, &CategorySet::default(), &tz);

        assert_eq!(stats.timelogs_used, 1);
        let expected = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert_eq!(prepared[0].local, expected);
        assert_eq!(prepared[0].category, Some(CategoryId(1)));
        assert_eq!(prepared[0].issue_iid.as_deref(), Some("5"));
    }

    #[test]
    fn test_prepare_skips_malformed() {
        let mut no_user = log("Alice", "1", &[], "2024-03-03T10:00:00Z", 60);
        no_user.user = None;
        let bad_time = log("Bob", "1", &[], "03/03/2024", 60);
        let good = log("Carol", "1", &[], "2024-03-03T10:00:00Z", 60);

        let (prepared, stats) = prepare(&[no_user, bad_time, good], &CategorySet::default(), &Utc);
        assert_eq!(prepared.len(), 1);
        assert_eq!(stats.skipped_missing_user, 1);
        assert_eq!(stats.skipped_bad_timestamp, 1);
        assert_eq!(stats.skipped(), 2);
    }

    #[test]
    fn test_prepare_skips_implausible_durations() {
        let huge = i64::MAX / 2 + 1;
        let logs = vec![
            log("Alice", "1", &[], "2024-03-03T10:00:00Z", huge),
            log("Alice", "1", &[], "2024-03-03T11:00:00Z", huge),
            log("Bob", "1", &[], "2024-03-03T12:00:00Z", -huge),
            log("Carol", "1", &[], "2024-03-03T13:00:00Z", MAX_TIMELOG_SECONDS),
            log("Carol", "1", &[], "2024-03-03T14:00:00Z", -3600),
        ];

        let (prepared, stats) = prepare(&logs, &CategorySet::default(), &Utc);
        assert_eq!(stats.skipped_bad_duration, 3);
        assert_eq!(stats.skipped(), 3);
        assert_eq!(prepared.len(), 2);
        assert!(prepared.iter().all(|log| log.user == "Carol"));
    }

    #[test]
    fn test_group_by_issue_first_snapshot_decides_category() {
        let logs = vec![
            log("Bob", "7", &["Entwurf"], "2024-03-03T10:00:00Z", 60),
            log("Alice", "7", &["Projektmanagement"], "2024-03-04T10:00:00Z", 120),
            log("Bob", "8", &[], "2024-03-04T10:00:00Z", 30),
        ];
        let (prepared, _) = prepare(&logs, &CategorySet::default(), &Utc);
        let groups = group_by_issue(&prepared);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].iid, "7");
        assert_eq!(groups[0].category, Some(CategoryId(1)));
        assert_eq!(groups[0].users.iter().collect::<Vec<_>>(), vec!["Alice", "Bob"]);
        assert_eq!(groups[0].seconds, 180);
        assert_eq!(groups[1].category, None);
    }

    #[test]
    fn test_data_range() {
        assert!(data_range(&[]).is_none());

        let logs = vec![
            log("A", "1", &[], "2024-03-05T10:00:00Z", 60),
            log("A", "1", &[], "2024-03-01T10:00:00Z", 60),
        ];
        let (prepared, _) = prepare(&logs, &CategorySet::default(), &Utc);
        let (first, last) = data_range(&prepared).unwrap();
        assert!(first < last);
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
