//! Timelog records.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{seconds_or_zero, Issue, UnknownFields};

/// The user who booked a timelog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name.
    pub name: String,

    /// Unknown fields for forward compatibility.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// A single time entry.
///
/// `user` and `issue` are optional because the API returns `null` for
/// deleted users and for time booked on merge requests. A timelog without a
/// user is treated as malformed; one without an issue still counts toward
/// user, calendar and productivity views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timelog {
    /// Who booked the time.
    #[serde(default)]
    pub user: Option<User>,

    /// Snapshot of the issue the time was booked on.
    #[serde(default)]
    pub issue: Option<Issue>,

    /// When the work happened, as an RFC 3339 timestamp.
    #[serde(default)]
    pub spent_at: String,

    /// Booked time in seconds. Usually positive; corrections may be negative.
    #[serde(default, deserialize_with = "seconds_or_zero")]
    pub time_spent: i64,

    /// Unknown fields for forward compatibility.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

impl Timelog {
    /// Create a timelog for `user` on `issue`.
    pub fn new(user: impl Into<String>, issue: Issue, spent_at: impl Into<String>, time_spent: i64) -> Self {
        Self {
            user: Some(User {
                name: user.into(),
                extra: UnknownFields::new(),
            }),
            issue: Some(issue),
            spent_at: spent_at.into(),
            time_spent,
            extra: UnknownFields::new(),
        }
    }

    /// Name of the booking user, if present and non-empty.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|user| user.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Parse `spent_at`.
    pub fn spent_at(&self) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(self.spent_at.trim())
    }
}
