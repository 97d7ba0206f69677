//! Song ordering rules.
//!
//! Positions only need to be consistently orderable: they may start at any
//! value and contain gaps. Ties are broken by creation time, then id, so two
//! readers always see the same order.

use std::cmp::Ordering;

use crate::models::SongPosition;
use crate::types::{DbId, Timestamp};

/// An item that carries a display position.
pub trait Positioned {
    fn position(&self) -> i32;

    /// Secondary sort key used when two positions are equal.
    fn tie_break(&self) -> (Timestamp, DbId);
}

/// Canonical display order of two positioned items.
pub fn compare<T: Positioned>(a: &T, b: &T) -> Ordering {
    a.position()
        .cmp(&b.position())
        .then_with(|| a.tie_break().cmp(&b.tie_break()))
}

/// Sort items into canonical display order, in place.
pub fn sort_by_position<T: Positioned>(items: &mut [T]) {
    items.sort_by(compare);
}

/// Position for a song appended without an explicit position.
///
/// One past the current maximum, or 1 for an empty setlist.
pub fn next_position(current_max: Option<i32>) -> i32 {
    current_max.map_or(1, |max| max.saturating_add(1))
}

/// Move the element at `from` to index `to`, shifting the others.
///
/// Out-of-range indices leave the slice unchanged and return `false`.
pub fn move_item<T>(items: &mut [T], from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from < to {
        items[from..=to].rotate_left(1);
    } else if from > to {
        items[to..=from].rotate_right(1);
    }
    true
}

/// Build a reorder request that numbers `ids` from 1 in the given order.
pub fn sequential_positions<I>(ids: I) -> Vec<SongPosition>
where
    I: IntoIterator<Item = DbId>,
{
    ids.into_iter()
        .zip(1..)
        .map(|(id, position)| SongPosition { id, position })
        .collect()
}
