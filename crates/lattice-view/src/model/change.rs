//! Typed change descriptions.
//!
//! A [`Change`] describes one structural edit to an ordered sequence, and a
//! [`ChangeSet`] is an ordered list of them. The view engine uses change sets
//! to plan the reordering it performs when a sort is applied or an item is
//! refreshed; they are computation artifacts and are never persisted.

use std::fmt;

/// Why an item appears in a change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeReason {
    /// The item was inserted.
    Add,
    /// The item was removed.
    Remove,
    /// The item replaced a previous item at the same index.
    Replace,
    /// The item moved from one index to another.
    Move,
    /// The item was re-evaluated in place.
    Refresh,
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Move => "move",
            Self::Refresh => "refresh",
        };
        f.write_str(name)
    }
}

/// A single immutable change to an ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Change<T> {
    reason: ChangeReason,
    item: T,
    current_index: usize,
    previous_index: Option<usize>,
    previous_item: Option<T>,
}

impl<T> Change<T> {
    /// An insertion of `item` at `index`.
    pub fn add(item: T, index: usize) -> Self {
        Self {
            reason: ChangeReason::Add,
            item,
            current_index: index,
            previous_index: None,
            previous_item: None,
        }
    }

    /// A removal of `item` from `index`.
    pub fn remove(item: T, index: usize) -> Self {
        Self {
            reason: ChangeReason::Remove,
            item,
            current_index: index,
            previous_index: None,
            previous_item: None,
        }
    }

    /// `item` replacing `previous` at `index`.
    pub fn replace(item: T, previous: T, index: usize) -> Self {
        Self {
            reason: ChangeReason::Replace,
            item,
            current_index: index,
            previous_index: None,
            previous_item: Some(previous),
        }
    }

    /// `item` moving from `previous_index` to `current_index`.
    pub fn moved(item: T, current_index: usize, previous_index: usize) -> Self {
        Self {
            reason: ChangeReason::Move,
            item,
            current_index,
            previous_index: Some(previous_index),
            previous_item: None,
        }
    }

    /// `item` re-evaluated at `index` without moving.
    pub fn refresh(item: T, index: usize) -> Self {
        Self {
            reason: ChangeReason::Refresh,
            item,
            current_index: index,
            previous_index: None,
            previous_item: None,
        }
    }

    /// The kind of change.
    pub fn reason(&self) -> ChangeReason {
        self.reason
    }

    /// The affected item.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// The index the item occupies after the change.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The index the item occupied before a move.
    pub fn previous_index(&self) -> Option<usize> {
        self.previous_index
    }

    /// The item that was replaced.
    pub fn previous_item(&self) -> Option<&T> {
        self.previous_item.as_ref()
    }
}

/// An ordered, immutable sequence of [`Change`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet<T> {
    changes: Vec<Change<T>>,
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
        }
    }
}

impl<T> ChangeSet<T> {
    /// An empty change set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterate over the changes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Change<T>> {
        self.changes.iter()
    }

    /// Number of changes with the given reason.
    pub fn count(&self, reason: ChangeReason) -> usize {
        self.changes.iter().filter(|c| c.reason == reason).count()
    }

    /// Number of additions.
    pub fn adds(&self) -> usize {
        self.count(ChangeReason::Add)
    }

    /// Number of removals.
    pub fn removes(&self) -> usize {
        self.count(ChangeReason::Remove)
    }

    /// Number of replacements.
    pub fn replaces(&self) -> usize {
        self.count(ChangeReason::Replace)
    }

    /// Number of moves.
    pub fn moves(&self) -> usize {
        self.count(ChangeReason::Move)
    }

    /// Number of refreshes.
    pub fn refreshes(&self) -> usize {
        self.count(ChangeReason::Refresh)
    }
}

impl<T: Clone> ChangeSet<T> {
    /// Plan the moves that turn `current` into `target`.
    ///
    /// Target positions are visited left to right. For each one, the target
    /// item is located in a working copy of `current` (searching only the
    /// not-yet-placed suffix) and, if it is elsewhere, a move is recorded and
    /// the working copy is updated by removing and reinserting the item.
    /// Applying the returned moves in order to `current` with
    /// remove-then-insert semantics yields `target`.
    ///
    /// `target` must be a permutation of `current` under `eq`; target items
    /// with no remaining match are skipped.
    pub fn minimal_moves<F>(current: &[T], target: &[T], eq: F) -> Self
    where
        F: Fn(&T, &T) -> bool,
    {
        let mut working: Vec<T> = current.to_vec();
        let mut changes = Vec::new();

        for (index, wanted) in target.iter().enumerate() {
            if index >= working.len() {
                break;
            }
            let Some(offset) = working[index..].iter().position(|x| eq(x, wanted)) else {
                continue;
            };
            let found = index + offset;
            if found != index {
                let item = working.remove(found);
                working.insert(index, item);
                changes.push(Change::moved(wanted.clone(), index, found));
            }
        }

        Self { changes }
    }
}

impl<T> FromIterator<Change<T>> for ChangeSet<T> {
    fn from_iter<I: IntoIterator<Item = Change<T>>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for ChangeSet<T> {
    type Item = Change<T>;
    type IntoIter = std::vec::IntoIter<Change<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ChangeSet<T> {
    type Item = &'a Change<T>;
    type IntoIter = std::slice::Iter<'a, Change<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_moves(mut items: Vec<i32>, changes: &ChangeSet<i32>) -> Vec<i32> {
        for change in changes {
            let from = change.previous_index().unwrap();
            let item = items.remove(from);
            items.insert(change.current_index(), item);
        }
        items
    }

    #[test]
    fn test_change_accessors() {
        let change = Change::moved("a", 0, 3);
        assert_eq!(change.reason(), ChangeReason::Move);
        assert_eq!(*change.item(), "a");
        assert_eq!(change.current_index(), 0);
        assert_eq!(change.previous_index(), Some(3));
        assert!(change.previous_item().is_none());

        let replaced = Change::replace("b", "a", 2);
        assert_eq!(replaced.previous_item(), Some(&"a"));
        assert_eq!(replaced.reason().to_string(), "replace");
    }

    #[test]
    fn test_counts_per_reason() {
        let set: ChangeSet<i32> = vec![
            Change::add(1, 0),
            Change::add(2, 1),
            Change::remove(3, 0),
            Change::moved(4, 0, 2),
            Change::refresh(5, 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 5);
        assert_eq!(set.adds(), 2);
        assert_eq!(set.removes(), 1);
        assert_eq!(set.moves(), 1);
        assert_eq!(set.refreshes(), 1);
        assert_eq!(set.replaces(), 0);
    }

    #[test]
    fn test_minimal_moves_already_sorted() {
        let items = vec![1, 2, 3, 4];
        let set = ChangeSet::minimal_moves(&items, &items, |a, b| a == b);
        assert!(set.is_empty());
    }

    #[test]
    fn test_minimal_moves_single_displacement() {
        let current = vec![1, 2, 4, 3, 5];
        let target = vec![1, 2, 3, 4, 5];
        let set = ChangeSet::minimal_moves(&current, &target, |a, b| a == b);

        assert_eq!(set.moves(), 1);
        let change = set.iter().next().unwrap();
        assert_eq!(*change.item(), 3);
        assert_eq!(change.current_index(), 2);
        assert_eq!(change.previous_index(), Some(3));
        assert_eq!(apply_moves(current, &set), target);
    }

    #[test]
    fn test_minimal_moves_reaches_target() {
        let current = vec![5, 3, 8, 1, 9];
        let mut target = current.clone();
        target.sort();
        let set = ChangeSet::minimal_moves(&current, &target, |a, b| a == b);

        assert_eq!(set.moves(), 2);
        assert_eq!(apply_moves(current, &set), target);
    }

    #[test]
    fn test_minimal_moves_reversed() {
        let current: Vec<i32> = (0..6).collect();
        let target: Vec<i32> = (0..6).rev().collect();
        let set = ChangeSet::minimal_moves(&current, &target, |a, b| a == b);

        assert_eq!(set.moves(), 5);
        assert_eq!(apply_moves(current, &set), target);
    }

    #[test]
    fn test_minimal_moves_with_duplicates() {
        let current = vec![2, 1, 2, 1];
        let target = vec![1, 1, 2, 2];
        let set = ChangeSet::minimal_moves(&current, &target, |a, b| a == b);
        assert_eq!(apply_moves(current, &set), target);
    }
}
