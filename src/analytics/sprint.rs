//! Sprint bucketing and velocity.
//!
//! The timeline is cut into fixed-length windows starting at local midnight
//! of the earliest timelog. Only windows that received at least one timelog
//! become sprints, and sprints are numbered densely from 1 in chronological
//! order.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::to_hours;

use super::categorize::CategorySet;
use super::prepared::PreparedLog;
use super::ranking::first_max_by_key;

/// One materialized sprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sprint {
    /// Dense sprint number, starting at 1.
    pub number: usize,
    /// First day of the window.
    pub start: NaiveDate,
    /// Day after the last day of the window.
    pub end: NaiveDate,
    /// Hours booked in the window.
    pub total_hours: f64,
    /// Hours per category, every configured category present.
    pub category_hours: IndexMap<String, f64>,
    /// Hours per user, in order of first appearance.
    pub user_hours: IndexMap<String, f64>,
    /// Timelogs in the window.
    pub log_count: usize,
}

/// Average hours per sprint for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    /// Category name.
    pub category: String,
    /// Category hours averaged over all sprints.
    pub hours: f64,
}

/// Running total after a sprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    /// Sprint number, starting at 1.
    pub sprint: usize,
    /// Hours booked up to and including this sprint.
    pub total_hours: f64,
}

/// Sprints plus the figures derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocityReport {
    /// Length of each window in days.
    pub length_days: u32,
    pub sprints: Vec<Sprint>,
    pub total_sprints: usize,
    /// Mean total hours over materialized sprints; 0 without sprints.
    pub average_velocity: f64,
    /// Per category: summed sprint hours over the number of sprints.
    pub category_distribution: Vec<CategoryShare>,
    pub cumulative: Vec<CumulativePoint>,
}

impl VelocityReport {
    /// Category with the highest average hours per sprint.
    ///
    /// `None` when no category received any time.
    #[must_use]
    pub fn main_focus(&self) -> Option<&CategoryShare> {
        first_max_by_key(&self.category_distribution, |share| share.hours).filter(|share| share.hours > 0.0)
    }

    /// Sprint with the most booked hours; the earliest wins ties.
    #[must_use]
    pub fn most_active_sprint(&self) -> Option<&Sprint> {
        first_max_by_key(&self.sprints, |sprint| sprint.total_hours)
    }
}

#[derive(Default)]
struct Bucket<'a> {
    seconds: i64,
    category_seconds: Vec<i64>,
    user_seconds: IndexMap<&'a str, i64>,
    log_count: usize,
}

/// Bucket timelogs into sprints of `length_days`.
///
/// A zero length is treated as one day.
#[must_use]
pub fn velocity(logs: &[PreparedLog], categories: &CategorySet, length_days: u32) -> VelocityReport {
    let length = i64::from(length_days.max(1));
    let sprints = match logs.iter().map(|log| log.local.date()).min() {
        Some(origin) => build_sprints(logs, categories, origin, length),
        None => Vec::new(),
    };

    let total_sprints = sprints.len();
    let total_hours: f64 = sprints.iter().map(|sprint| sprint.total_hours).sum();
    let average_velocity = if total_sprints == 0 {
        0.0
    } else {
        total_hours / total_sprints as f64
    };

    let category_distribution = categories
        .iter()
        .map(|(_, name)| {
            let hours: f64 = sprints
                .iter()
                .map(|sprint| sprint.category_hours.get(name).copied().unwrap_or(0.0))
                .sum();
            CategoryShare {
                category: name.to_string(),
                hours: if total_sprints == 0 {
                    0.0
                } else {
                    hours / total_sprints as f64
                },
            }
        })
        .collect();

    let mut running = 0.0;
    let cumulative = sprints
        .iter()
        .map(|sprint| {
            running += sprint.total_hours;
            CumulativePoint {
                sprint: sprint.number,
                total_hours: running,
            }
        })
        .collect();

    VelocityReport {
        length_days: length_days.max(1),
        sprints,
        total_sprints,
        average_velocity,
        category_distribution,
        cumulative,
    }
}

fn build_sprints(logs: &[PreparedLog], categories: &CategorySet, origin: NaiveDate, length: i64) -> Vec<Sprint> {
    let mut buckets: BTreeMap<i64, Bucket<'_>> = BTreeMap::new();

    for log in logs {
        let index = (log.local.date() - origin).num_days() / length;
        let bucket = buckets.entry(index).or_insert_with(|| Bucket {
            category_seconds: vec![0; categories.len()],
            ..Default::default()
        });
        bucket.seconds += log.seconds;
        bucket.log_count += 1;
        if let Some(slot) = log.category.and_then(|id| bucket.category_seconds.get_mut(id.0)) {
            *slot += log.seconds;
        }
        *bucket.user_seconds.entry(log.user.as_str()).or_insert(0) += log.seconds;
    }

    buckets
        .into_iter()
        .enumerate()
        .map(|(position, (index, bucket))| {
            let start = origin + Duration::days(index * length);
            Sprint {
                number: position + 1,
                start,
                end: start + Duration::days(length),
                total_hours: to_hours(bucket.seconds),
                category_hours: categories
                    .iter()
                    .zip(bucket.category_seconds)
                    .map(|((_, name), seconds)| (name.to_string(), to_hours(seconds)))
                    .collect(),
                user_hours: bucket
                    .user_seconds
                    .into_iter()
                    .map(|(user, seconds)| (user.to_string(), to_hours(seconds)))
                    .collect(),
                log_count: bucket.log_count,
            }
        })
        .collect()
}
