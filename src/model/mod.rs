//! Data model for project-management time-tracking exports.
//!
//! This module provides strongly-typed structures for the two collections
//! the engine consumes:
//! - [`Issue`]: the standalone issue list with estimates and spent time
//! - [`Timelog`]: individual time entries, each carrying a snapshot of its issue
//!
//! Both mirror the shape of the GitLab GraphQL API and accept the
//! connection-style `{ "nodes": [...] }` wrappers it returns. Unknown fields
//! are preserved so a snapshot can be re-serialized without loss.

pub mod issue;
pub mod snapshot;
pub mod time;
pub mod timelog;

pub use issue::*;
pub use snapshot::*;
pub use time::*;
pub use timelog::*;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Raw JSON value map that preserves unknown fields for forward compatibility.
pub type UnknownFields = IndexMap<String, Value>;

/// Deserialize a seconds counter where the API may send `null`.
pub(crate) fn seconds_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Seconds>::deserialize(deserializer)? {
        Some(Seconds::Int(value)) => value,
        Some(Seconds::Float(value)) => value.round() as i64,
        None => 0,
    })
}

/// Deserialize an identifier that may be sent as a string or a number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(value) => value,
        Id::Number(value) => value.to_string(),
    })
}
