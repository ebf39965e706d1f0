//! Who works with whom.

use indexmap::IndexMap;
use serde::Serialize;

use super::categorize::{CategoryId, CategorySet};
use super::prepared::IssueActivity;
use super::ranking::sort_descending_by;

/// Two users who both booked time on the same issues.
///
/// `source` sorts before `target`, so a pair is never reported twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollaborationPair {
    pub source: String,
    pub target: String,
    /// Number of distinct issues both users booked time on.
    pub count: u32,
}

/// Count shared issues per user pair, most frequent first.
///
/// Pairs keep their first-seen order on equal counts.
#[must_use]
pub fn collaboration_pairs(issues: &[IssueActivity]) -> Vec<CollaborationPair> {
    let mut counts: IndexMap<&str, IndexMap<&str, u32>> = IndexMap::new();

    for issue in issues {
        let members: Vec<&str> = issue.users.iter().map(String::as_str).collect();
        for (i, &source) in members.iter().enumerate() {
            for &target in &members[i + 1..] {
                *counts.entry(source).or_default().entry(target).or_insert(0) += 1;
            }
        }
    }

    let mut pairs: Vec<CollaborationPair> = counts
        .into_iter()
        .flat_map(|(source, targets)| {
            targets.into_iter().map(move |(target, count)| CollaborationPair {
                source: source.to_string(),
                target: target.to_string(),
                count,
            })
        })
        .collect();

    sort_descending_by(&mut pairs, |pair| f64::from(pair.count));
    pairs
}

/// Average number of people per issue within a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSize {
    pub category: String,
    pub average_members: f64,
    /// Distinct issues in the category that have timelogs.
    pub total_issues: usize,
    /// Distinct users across those issues.
    pub total_members: usize,
}

/// Team size per category, largest average first.
///
/// Only categories with at least one booked issue are listed.
#[must_use]
pub fn team_sizes(issues: &[IssueActivity], categories: &CategorySet) -> Vec<TeamSize> {
    let mut sizes: Vec<TeamSize> = categories
        .iter()
        .filter_map(|(id, name)| {
            let in_category = issues_in(issues, id);
            if in_category.is_empty() {
                return None;
            }

            let member_sum: usize = in_category.iter().map(|issue| issue.users.len()).sum();
            let mut members: Vec<&str> = in_category
                .iter()
                .flat_map(|issue| issue.users.iter().map(String::as_str))
                .collect();
            members.sort_unstable();
            members.dedup();

            Some(TeamSize {
                category: name.to_string(),
                average_members: member_sum as f64 / in_category.len() as f64,
                total_issues: in_category.len(),
                total_members: members.len(),
            })
        })
        .collect();

    sort_descending_by(&mut sizes, |size| size.average_members);
    sizes
}

pub(crate) fn issues_in(issues: &[IssueActivity], id: CategoryId) -> Vec<&IssueActivity> {
    issues.iter().filter(|issue| issue.category == Some(id)).collect()
}
