//! Hour-of-day and day-of-week histograms.

use chrono::{Datelike, Timelike, Weekday};
use serde::Serialize;

use crate::model::to_hours;

use super::prepared::PreparedLog;
use super::ranking::peak_index;

/// Weekdays in bucket order, Sunday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Hours booked in one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourBucket {
    /// Local hour of day (0..=23).
    pub hour: u32,
    /// Hours booked in that hour.
    pub hours: f64,
}

/// Hours booked on one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayBucket {
    /// Local weekday.
    pub weekday: Weekday,
    /// Hours booked on that weekday.
    pub hours: f64,
}

/// When work gets booked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityPatterns {
    /// 24 buckets, hour 0 first.
    pub hourly: Vec<HourBucket>,
    /// 7 buckets, Sunday first.
    pub weekly: Vec<DayBucket>,
    pub peak_hour: HourBucket,
    pub peak_day: DayBucket,
}

/// Build both histograms. Empty buckets are present with zero hours.
#[must_use]
pub fn productivity_patterns(logs: &[PreparedLog]) -> ProductivityPatterns {
    let mut by_hour = [0_i64; 24];
    let mut by_day = [0_i64; 7];

    for log in logs {
        by_hour[log.local.hour() as usize] += log.seconds;
        by_day[log.local.weekday().num_days_from_sunday() as usize] += log.seconds;
    }

    let hourly: Vec<HourBucket> = by_hour
        .iter()
        .zip(0_u32..)
        .map(|(&seconds, hour)| HourBucket {
            hour,
            hours: to_hours(seconds),
        })
        .collect();
    let weekly: Vec<DayBucket> = WEEKDAYS
        .iter()
        .zip(by_day)
        .map(|(&weekday, seconds)| DayBucket {
            weekday,
            hours: to_hours(seconds),
        })
        .collect();

    let hour_values: Vec<f64> = hourly.iter().map(|bucket| bucket.hours).collect();
    let day_values: Vec<f64> = weekly.iter().map(|bucket| bucket.hours).collect();
    let peak_hour = hourly[peak_index(&hour_values)];
    let peak_day = weekly[peak_index(&day_values)];

    ProductivityPatterns {
        hourly,
        weekly,
        peak_hour,
        peak_day,
    }
}
