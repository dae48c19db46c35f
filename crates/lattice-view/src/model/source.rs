//! The authoritative source store behind a filtered view.
//!
//! [`SourceStore<T>`] holds every item in insertion order, regardless of
//! whether it passes the filter, together with a per-position visibility mask
//! recording the filter result from the last time each item was evaluated.
//! The active filter and comparator live beside the items so that all of
//! them are guarded by the same lock.
//!
//! User callbacks (filter, comparator) are always evaluated before anything is
//! written, so a panicking callback leaves the store exactly as it was.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// A shared filter predicate.
pub type FilterFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A shared total-order comparator.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Outcome of re-evaluating one item against the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reevaluation {
    /// Position of the item in the source.
    pub position: usize,
    /// Visibility before the refresh.
    pub was_visible: bool,
    /// Visibility after the refresh.
    pub is_visible: bool,
}

/// Lock-guarded source state: items, visibility mask, filter and comparator.
///
/// `visible[i]` is the filter result for `items[i]`; both vectors always have
/// the same length.
pub(crate) struct SourceState<T> {
    items: Vec<T>,
    visible: Vec<bool>,
    filter: Option<FilterFn<T>>,
    compare: Option<CompareFn<T>>,
}

impl<T: Clone + PartialEq> SourceState<T> {
    fn new(filter: Option<FilterFn<T>>, compare: Option<CompareFn<T>>) -> Self {
        Self {
            items: Vec::new(),
            visible: Vec::new(),
            filter,
            compare,
        }
    }

    fn passes(&self, item: &T) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(item))
    }

    fn evaluate(&self, items: &[T]) -> Vec<bool> {
        items.iter().map(|item| self.passes(item)).collect()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    pub fn filter(&self) -> Option<&FilterFn<T>> {
        self.filter.as_ref()
    }

    pub fn compare(&self) -> Option<&CompareFn<T>> {
        self.compare.as_ref()
    }

    pub fn position(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|x| x == item)
    }

    /// Number of visible items strictly before `position`.
    pub fn visible_before(&self, position: usize) -> usize {
        self.visible[..position.min(self.visible.len())]
            .iter()
            .filter(|v| **v)
            .count()
    }

    /// Visible items in source order, sorted by the comparator when one is
    /// set (stable, so ties keep source order).
    pub fn visible_snapshot(&self) -> Vec<T> {
        let mut visible: Vec<T> = self
            .items
            .iter()
            .zip(&self.visible)
            .filter(|(_, v)| **v)
            .map(|(item, _)| item.clone())
            .collect();
        if let Some(compare) = &self.compare {
            visible.sort_by(|a, b| compare(a, b));
        }
        visible
    }

    /// Replace the entire content.
    pub fn load(&mut self, items: Vec<T>) {
        let visible = self.evaluate(&items);
        self.items = items;
        self.visible = visible;
    }

    /// Append one item. Returns whether it passes the filter.
    pub fn add(&mut self, item: T) -> bool {
        let passes = self.passes(&item);
        self.items.push(item);
        self.visible.push(passes);
        passes
    }

    /// Append several items. Returns how many of them pass the filter.
    pub fn add_range(&mut self, items: Vec<T>) -> usize {
        let visible = self.evaluate(&items);
        let passing = visible.iter().filter(|v| **v).count();
        self.items.extend(items);
        self.visible.extend(visible);
        passing
    }

    /// Remove the first item equal to `item`.
    ///
    /// Returns `None` if absent, otherwise whether the removed item was
    /// visible.
    pub fn remove(&mut self, item: &T) -> Option<bool> {
        let position = self.position(item)?;
        self.items.remove(position);
        Some(self.visible.remove(position))
    }

    /// Remove every item matching `predicate`.
    ///
    /// Returns the number removed and the visible subset of the removed items,
    /// in source order.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> (usize, Vec<T>)
    where
        F: FnMut(&T) -> bool,
    {
        let matches: Vec<bool> = self.items.iter().map(&mut predicate).collect();
        let removed = matches.iter().filter(|m| **m).count();
        if removed == 0 {
            return (0, Vec::new());
        }

        let mut visible_removed = Vec::new();
        let items = std::mem::take(&mut self.items);
        let visible = std::mem::take(&mut self.visible);
        for ((item, was_visible), matched) in items.into_iter().zip(visible).zip(matches) {
            if matched {
                if was_visible {
                    visible_removed.push(item);
                }
            } else {
                self.items.push(item);
                self.visible.push(was_visible);
            }
        }
        (removed, visible_removed)
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.visible.clear();
    }

    /// Replace the filter and re-evaluate every item.
    ///
    /// The new filter is only installed once every item has been evaluated.
    pub fn set_filter(&mut self, filter: Option<FilterFn<T>>) {
        let visible = match &filter {
            Some(filter) => self.items.iter().map(|item| filter(item)).collect(),
            None => vec![true; self.items.len()],
        };
        self.filter = filter;
        self.visible = visible;
    }

    /// Replace the comparator.
    pub fn set_compare(&mut self, compare: Option<CompareFn<T>>) {
        self.compare = compare;
    }

    /// Re-evaluate every item against the current filter.
    pub fn reevaluate_all(&mut self) {
        self.visible = self.evaluate(&self.items);
    }

    /// Re-evaluate the first item equal to `item`.
    pub fn reevaluate(&mut self, item: &T) -> Option<Reevaluation> {
        let position = self.position(item)?;
        let is_visible = self.passes(&self.items[position]);
        let was_visible = std::mem::replace(&mut self.visible[position], is_visible);
        Some(Reevaluation {
            position,
            was_visible,
            is_visible,
        })
    }
}

/// Authoritative item storage for a filtered view.
///
/// All access goes through one `parking_lot::Mutex`. The lock is held only for
/// in-memory bookkeeping; view updates are computed under it but executed
/// after it is released.
pub struct SourceStore<T> {
    state: Mutex<SourceState<T>>,
}

impl<T: Clone + PartialEq> SourceStore<T> {
    /// Create an empty store with the given filter and comparator.
    pub fn new(filter: Option<FilterFn<T>>, compare: Option<CompareFn<T>>) -> Self {
        Self {
            state: Mutex::new(SourceState::new(filter, compare)),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SourceState<T>> {
        self.state.lock()
    }

    /// Replace the entire content.
    pub fn load(&self, items: Vec<T>) {
        self.lock().load(items);
    }

    /// Append one item. Returns whether it passes the filter.
    pub fn add(&self, item: T) -> bool {
        self.lock().add(item)
    }

    /// Append several items. Returns how many pass the filter.
    pub fn add_range(&self, items: Vec<T>) -> usize {
        self.lock().add_range(items)
    }

    /// Remove the first item equal to `item`. Returns `true` if found.
    pub fn remove(&self, item: &T) -> bool {
        self.lock().remove(item).is_some()
    }

    /// Remove every item matching `predicate`. Returns the number removed.
    pub fn remove_where<F>(&self, predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.lock().remove_where(predicate).0
    }

    /// Remove every item.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// A copy of every item in insertion order.
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().items().to_vec()
    }

    /// Number of items, visible or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of items passing the filter.
    pub fn visible_len(&self) -> usize {
        self.lock().visible_len()
    }

    /// Returns `true` if an equal item is stored.
    pub fn contains(&self, item: &T) -> bool {
        self.lock().position(item).is_some()
    }

    /// The visible items, ordered by the comparator if one is set.
    pub fn visible_snapshot(&self) -> Vec<T> {
        self.lock().visible_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn even() -> Option<FilterFn<i32>> {
        Some(Arc::new(|x: &i32| x % 2 == 0))
    }

    fn descending() -> Option<CompareFn<i32>> {
        Some(Arc::new(|a: &i32, b: &i32| b.cmp(a)))
    }

    #[test]
    fn test_load_and_counts() {
        let store = SourceStore::new(even(), None);
        store.load((1..=10).collect());

        assert_eq!(store.len(), 10);
        assert_eq!(store.visible_len(), 5);
        assert_eq!(store.visible_snapshot(), vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_visible_snapshot_sorted() {
        let store = SourceStore::new(even(), descending());
        store.load(vec![4, 1, 8, 2, 7]);
        assert_eq!(store.visible_snapshot(), vec![8, 4, 2]);
        assert_eq!(store.snapshot(), vec![4, 1, 8, 2, 7]);
    }

    #[test]
    fn test_add_reports_visibility() {
        let store = SourceStore::new(even(), None);
        assert!(store.add(2));
        assert!(!store.add(3));
        assert_eq!(store.add_range(vec![4, 5, 6]), 2);
        assert_eq!(store.len(), 5);
        assert_eq!(store.visible_len(), 3);
    }

    #[test]
    fn test_remove_first_equal() {
        let store = SourceStore::new(even(), None);
        store.load(vec![1, 2, 3, 2]);

        {
            let mut state = store.lock();
            assert_eq!(state.remove(&2), Some(true));
            assert_eq!(state.remove(&3), Some(false));
            assert_eq!(state.remove(&42), None);
            assert_eq!(state.items(), &[1, 2]);
            assert_eq!(state.visible_before(1), 0);
        }

        assert!(store.remove(&2));
        assert!(!store.contains(&2));
    }

    #[test]
    fn test_remove_where_splits_visible() {
        let store = SourceStore::new(even(), None);
        store.load((1..=10).collect());

        let (removed, visible) = store.lock().remove_where(|x| *x > 6);
        assert_eq!(removed, 4);
        assert_eq!(visible, vec![8, 10]);
        assert_eq!(store.snapshot(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(store.visible_len(), 3);

        assert_eq!(store.remove_where(|x| *x > 100), 0);
    }

    #[test]
    fn test_set_filter_reevaluates() {
        let store = SourceStore::new(None, None);
        store.load((1..=6).collect());
        assert_eq!(store.visible_len(), 6);

        store.lock().set_filter(even());
        assert_eq!(store.visible_len(), 3);

        store.lock().set_filter(None);
        assert_eq!(store.visible_len(), 6);
    }

    #[test]
    fn test_panicking_filter_leaves_state_unchanged() {
        let store = Arc::new(SourceStore::new(even(), None));
        store.load((1..=4).collect());

        let shared = store.clone();
        let result = std::thread::spawn(move || {
            let exploding: FilterFn<i32> = Arc::new(|x| {
                if *x == 3 {
                    panic!("bad filter");
                }
                true
            });
            shared.lock().set_filter(Some(exploding));
        })
        .join();

        assert!(result.is_err());
        assert_eq!(store.visible_snapshot(), vec![2, 4]);
        assert!(!store.add(5));
    }

    #[test]
    fn test_reevaluate_tracks_transition() {
        let threshold = Arc::new(std::sync::atomic::AtomicI32::new(5));
        let t = threshold.clone();
        let filter: FilterFn<i32> =
            Arc::new(move |x| *x > t.load(std::sync::atomic::Ordering::SeqCst));
        let store = SourceStore::new(Some(filter), None);
        store.load(vec![3, 6, 9]);

        threshold.store(7, std::sync::atomic::Ordering::SeqCst);
        let outcome = store.lock().reevaluate(&6).unwrap();
        assert_eq!(
            outcome,
            Reevaluation {
                position: 1,
                was_visible: true,
                is_visible: false
            }
        );
        assert!(store.lock().reevaluate(&42).is_none());
        assert_eq!(store.visible_len(), 1);
    }
}
