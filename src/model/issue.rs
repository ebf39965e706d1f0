//! Issue records and their label sets.

use serde::{Deserialize, Serialize, Serializer};

use super::{seconds_or_zero, string_or_number, UnknownFields};

/// An issue as returned by the project-management API.
///
/// The same shape is used for the standalone issue list and for the issue
/// snapshot embedded in every timelog. The two are fetched independently,
/// so their numbers may disagree slightly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Project-scoped issue identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub iid: String,

    /// Issue title.
    #[serde(default)]
    pub title: String,

    /// Estimated effort in seconds (0 = unestimated).
    #[serde(default, deserialize_with = "seconds_or_zero")]
    pub time_estimate: i64,

    /// Total time spent in seconds, as reported by the issue itself.
    #[serde(default, deserialize_with = "seconds_or_zero")]
    pub total_time_spent: i64,

    /// Label titles in API order.
    #[serde(default)]
    pub labels: Labels,

    /// Unknown fields for forward compatibility.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

impl Issue {
    /// Create an issue with the given identifier and labels.
    pub fn new(iid: impl Into<String>, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            iid: iid.into(),
            labels: labels.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set estimate and spent time, both in seconds.
    #[must_use]
    pub fn with_times(mut self, time_estimate: i64, total_time_spent: i64) -> Self {
        self.time_estimate = time_estimate;
        self.total_time_spent = total_time_spent;
        self
    }

    /// Whether the issue carries any estimate or spent time.
    #[must_use]
    pub fn has_time_data(&self) -> bool {
        self.time_estimate > 0 || self.total_time_spent > 0
    }
}

/// Ordered list of label titles.
///
/// Accepts a bare string array, an array of `{ "title": ... }` objects, or a
/// GraphQL connection `{ "nodes": [{ "title": ... }] }`. Always serializes
/// as a bare string array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "LabelsRepr")]
pub struct Labels(Vec<String>);

impl Labels {
    /// Iterate label titles in their given order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the issue has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Labels {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Labels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.0)
    }
}

#[derive(Deserialize)]
struct LabelNode {
    title: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelsRepr {
    Titles(Vec<String>),
    Nodes(Vec<LabelNode>),
    Connection { nodes: Option<Vec<LabelNode>> },
    Missing,
}

impl From<LabelsRepr> for Labels {
    fn from(repr: LabelsRepr) -> Self {
        match repr {
            LabelsRepr::Titles(titles) => Self(titles),
            LabelsRepr::Nodes(nodes) | LabelsRepr::Connection { nodes: Some(nodes) } => {
                Self(nodes.into_iter().map(|node| node.title).collect())
            }
            LabelsRepr::Connection { nodes: None } | LabelsRepr::Missing => Self::default(),
        }
    }
}
