//! Plain hour totals: per category, per user and per week and user.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::to_hours;

use super::categorize::CategorySet;
use super::prepared::PreparedLog;

/// Hours per category, every configured category present, in configured order.
///
/// Timelogs whose issue has no category contribute to no bucket.
#[must_use]
pub fn category_totals(logs: &[PreparedLog], categories: &CategorySet) -> IndexMap<String, f64> {
    let mut seconds = vec![0_i64; categories.len()];
    for log in logs {
        if let Some(slot) = log.category.and_then(|id| seconds.get_mut(id.0)) {
            *slot += log.seconds;
        }
    }

    categories
        .iter()
        .zip(seconds)
        .map(|((_, name), total)| (name.to_string(), to_hours(total)))
        .collect()
}

/// Hours per user, in order of first appearance.
#[must_use]
pub fn user_totals(logs: &[PreparedLog]) -> IndexMap<String, f64> {
    let mut seconds: IndexMap<&str, i64> = IndexMap::new();
    for log in logs {
        *seconds.entry(log.user.as_str()).or_insert(0) += log.seconds;
    }

    seconds
        .into_iter()
        .map(|(user, total)| (user.to_string(), to_hours(total)))
        .collect()
}

/// Week starting on a Sunday.
///
/// Weeks order by their starting Sunday. The label carries the ISO week
/// number of that Sunday and its calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WeekKey {
    /// The Sunday that starts the week.
    pub start: NaiveDate,
    /// Calendar year of `start`.
    pub year: i32,
    /// ISO week number of `start` (1..=53).
    pub week: u32,
}

impl WeekKey {
    /// Week containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        let start = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
        Self {
            start,
            year: start.year(),
            week: start.iso_week().week(),
        }
    }

    /// Display label, e.g. `KW 09 2024`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("KW {:02} {}", self.week, self.year)
    }
}

/// Hours per user within one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyUserHours {
    /// The week.
    pub week: WeekKey,
    /// Display label for the week.
    pub label: String,
    /// Hours per user, in order of first appearance within the week.
    pub users: IndexMap<String, f64>,
}

/// Hours per Sunday-start week and user, weeks in chronological order.
///
/// Only timelogs booked on an issue count here.
#[must_use]
pub fn weekly_user_hours(logs: &[PreparedLog]) -> Vec<WeeklyUserHours> {
    let mut weeks: BTreeMap<WeekKey, IndexMap<&str, i64>> = BTreeMap::new();
    for log in logs.iter().filter(|log| log.issue_iid.is_some()) {
        let users = weeks.entry(WeekKey::of(log.local.date())).or_default();
        *users.entry(log.user.as_str()).or_insert(0) += log.seconds;
    }

    weeks
        .into_iter()
        .map(|(week, users)| WeeklyUserHours {
            week,
            label: week.label(),
            users: users
                .into_iter()
                .map(|(user, seconds)| (user.to_string(), to_hours(seconds)))
                .collect(),
        })
        .collect()
}
