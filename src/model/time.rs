//! Second/hour conversion used by every aggregate.

/// Seconds in one hour.
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Seconds in one minute.
pub const SECONDS_PER_MINUTE: i64 = 60;

/// Convert a second count to fractional hours.
#[must_use]
pub fn to_hours(seconds: i64) -> f64 {
    seconds as f64 / SECONDS_PER_HOUR as f64
}

/// Format a second count as `HH:MMh`.
///
/// Negative values are formatted with a leading minus sign.
#[must_use]
pub fn format_hhmm(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();
    let hours = seconds / SECONDS_PER_HOUR as u64;
    let minutes = (seconds % SECONDS_PER_HOUR as u64) / SECONDS_PER_MINUTE as u64;
    format!("{sign}{hours:02}:{minutes:02}h")
}
