//! Daily activity heatmap.
//!
//! The grid is dense and anchored to the data: it spans from one padding
//! period before the first logged day to one padding period after the last,
//! widened back to a Sunday, in rows of exactly seven days. Days without
//! bookings are present with zero seconds.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::Serialize;

use crate::config::HeatmapConfig;
use crate::model::{to_hours, SECONDS_PER_HOUR};

use super::prepared::PreparedLog;

/// One calendar day of the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    /// The local calendar date.
    pub date: NaiveDate,
    /// Seconds booked on this day.
    pub seconds: i64,
    /// Hours booked on this day.
    pub hours: f64,
    /// Day of the week.
    pub weekday: Weekday,
    /// ISO week number.
    pub iso_week: u32,
    /// Calendar month (1..=12).
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Intensity level from 0 (nothing booked) to 4.
    pub level: u8,
}

/// Seven consecutive days starting on a Sunday.
pub type HeatmapWeek = [DayCell; 7];

/// The dense heatmap grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    /// First day of the requested window, before widening to Sunday.
    pub window_start: NaiveDate,
    /// Last day of the requested window.
    pub window_end: NaiveDate,
    /// Week rows in chronological order.
    pub weeks: Vec<HeatmapWeek>,
}

impl Heatmap {
    /// Iterate all cells in chronological order.
    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flat_map(|week| week.iter())
    }

    /// Number of days with a positive booking.
    #[must_use]
    pub fn active_days(&self) -> usize {
        self.days().filter(|day| day.seconds > 0).count()
    }
}

/// Seconds booked per local calendar date.
#[must_use]
pub fn daily_seconds(logs: &[PreparedLog]) -> BTreeMap<NaiveDate, i64> {
    let mut days = BTreeMap::new();
    for log in logs {
        *days.entry(log.local.date()).or_insert(0) += log.seconds;
    }
    days
}

/// Build the heatmap grid.
///
/// Without any booked day the window is the `fallback_months` ending on
/// `today`.
#[must_use]
pub fn build_heatmap(days: &BTreeMap<NaiveDate, i64>, today: NaiveDate, config: &HeatmapConfig) -> Heatmap {
    let padding = Months::new(config.padding_months);
    let (window_start, window_end) = match (days.keys().next(), days.keys().next_back()) {
        (Some(&first), Some(&last)) => (
            first.checked_sub_months(padding).unwrap_or(first),
            last.checked_add_months(padding).unwrap_or(last),
        ),
        _ => (
            today
                .checked_sub_months(Months::new(config.fallback_months))
                .unwrap_or(today),
            today,
        ),
    };

    let mut current = window_start - Duration::days(i64::from(window_start.weekday().num_days_from_sunday()));
    let mut weeks = Vec::new();

    while current <= window_end {
        let week: HeatmapWeek = std::array::from_fn(|offset| {
            let date = current + Duration::days(offset as i64);
            let seconds = days.get(&date).copied().unwrap_or(0);
            DayCell {
                date,
                seconds,
                hours: to_hours(seconds),
                weekday: date.weekday(),
                iso_week: date.iso_week().week(),
                month: date.month(),
                year: date.year(),
                level: intensity_level(seconds, config),
            }
        });
        weeks.push(week);
        current += Duration::days(7);
    }

    Heatmap {
        window_start,
        window_end,
        weeks,
    }
}

/// Intensity level for a day's booked seconds.
#[must_use]
pub fn intensity_level(seconds: i64, config: &HeatmapConfig) -> u8 {
    if seconds <= 0 {
        return 0;
    }
    let hours = seconds as f64 / SECONDS_PER_HOUR as f64;
    let [low, mid, high] = config.level_thresholds_hours;
    if hours < low {
        1
    } else if hours < mid {
        2
    } else if hours < high {
        3
    } else {
        4
    }
}
