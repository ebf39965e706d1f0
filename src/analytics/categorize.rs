//! Label-to-category assignment.
//!
//! An issue belongs to at most one category: the first of its labels, in
//! the order the API returned them, whose title equals a configured
//! category name. Every category-keyed aggregate goes through
//! [`CategorySet::categorize`] so they all agree on the assignment.

use serde::Serialize;

use crate::model::Labels;

/// Index of a category within its [`CategorySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CategoryId(pub usize);

/// The closed, ordered set of known categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    /// Create a set from category names, dropping later duplicates.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self { names: unique }
    }

    /// Category for a label set, or `None` when no label matches.
    #[must_use]
    pub fn categorize(&self, labels: &Labels) -> Option<CategoryId> {
        labels.iter().find_map(|label| self.id_of(label))
    }

    /// Look up a category by exact name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<CategoryId> {
        self.names.iter().position(|known| known == name).map(CategoryId)
    }

    /// Name of a category.
    ///
    /// Ids only come from this set, so an unknown id yields an empty name.
    #[must_use]
    pub fn name(&self, id: CategoryId) -> &str {
        self.names.get(id.0).map_or("", String::as_str)
    }

    /// All categories in configured order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| (CategoryId(index), name.as_str()))
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::new(crate::config::CategoryConfig::default().names)
    }
}
