//! Selection and ordering rules shared by the aggregators.
//!
//! Every "pick the biggest" decision in the engine keeps the first item on
//! ties, and every descending sort is stable, so results depend only on
//! input order and never on hash iteration.

use std::cmp::Ordering;

/// The first item with the strictly greatest key.
///
/// Later items replace the current best only when their key is strictly
/// greater, so the earliest of several equal maxima wins. Incomparable keys
/// (NaN) never win.
pub fn first_max_by_key<T, I, F>(items: I, key: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> f64,
{
    let mut best: Option<(T, f64)> = None;
    for item in items {
        let value = key(&item);
        let replace = match &best {
            Some((_, best_value)) => value > *best_value,
            None => !value.is_nan(),
        };
        if replace {
            best = Some((item, value));
        }
    }
    best.map(|(item, _)| item)
}

/// Index of the first strictly greatest value; 0 for an empty slice.
#[must_use]
pub fn peak_index(values: &[f64]) -> usize {
    first_max_by_key(values.iter().enumerate(), |(_, value)| **value)
        .map_or(0, |(index, _)| index)
}

/// Stable sort by a float key, largest first.
pub fn sort_descending_by<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| descending(key(a), key(b)));
}

/// Compare two floats so that larger values come first.
#[must_use]
pub fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
