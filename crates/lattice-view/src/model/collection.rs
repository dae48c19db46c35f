//! Observable collection with batched change notification.
//!
//! [`ObservableCollection<T>`] is an ordered, indexable sequence that emits a
//! [`CollectionChange`] on its [`changed`](ObservableCollection::changed)
//! signal after every mutating call. Bulk operations emit exactly one
//! notification summarizing the whole operation, no matter how many elements
//! they touch.
//!
//! Arguments are validated before anything is mutated; an invalid call leaves
//! the collection unchanged and emits nothing.
//!
//! # Example
//!
//! ```
//! use lattice_view::model::{CollectionChange, ObservableCollection};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let collection = ObservableCollection::new();
//! let notifications = Arc::new(AtomicUsize::new(0));
//!
//! let counter = notifications.clone();
//! collection.changed().connect(move |_change: &CollectionChange<i32>| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! collection.add_range(vec![3, 1, 2]);
//! collection.sort_by(|a, b| a.cmp(b));
//!
//! assert_eq!(collection.to_vec(), vec![1, 2, 3]);
//! assert_eq!(notifications.load(Ordering::SeqCst), 2);
//! ```

use std::cmp::Ordering;
use std::sync::Arc;

use lattice_view_core::logging::targets;
use lattice_view_core::{Result, Signal, check_index, check_insert_index, check_range};
use parking_lot::RwLock;

/// The net effect of one mutating call on an [`ObservableCollection`].
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionChange<T> {
    /// `items` were inserted contiguously starting at `index`.
    Add { items: Vec<T>, index: usize },
    /// `items` were removed, in the order they were found.
    ///
    /// `index` is set when the removed items were contiguous.
    Remove { items: Vec<T>, index: Option<usize> },
    /// `item` moved from `old_index` to `new_index`.
    Move {
        item: T,
        old_index: usize,
        new_index: usize,
    },
    /// The contents changed wholesale; observers should re-read everything.
    Reset,
}

/// Discriminant of a [`CollectionChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Items were added.
    Add,
    /// Items were removed.
    Remove,
    /// An item moved.
    Move,
    /// The collection was reset.
    Reset,
}

impl<T> CollectionChange<T> {
    /// The kind of notification.
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Add { .. } => ChangeKind::Add,
            Self::Remove { .. } => ChangeKind::Remove,
            Self::Move { .. } => ChangeKind::Move,
            Self::Reset => ChangeKind::Reset,
        }
    }

    /// Number of elements the notification describes (0 for `Reset`).
    pub fn item_count(&self) -> usize {
        match self {
            Self::Add { items, .. } | Self::Remove { items, .. } => items.len(),
            Self::Move { .. } => 1,
            Self::Reset => 0,
        }
    }
}

/// An ordered collection that notifies observers once per mutating call.
///
/// Storage is guarded by a `RwLock`; the lock is never held while the
/// notification is emitted, so observers may read the collection from their
/// slot.
pub struct ObservableCollection<T> {
    items: RwLock<Vec<T>>,
    changed: Arc<Signal<CollectionChange<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Default for ObservableCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableCollection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a collection with initial contents (no notification).
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            changed: Arc::new(Signal::new()),
        }
    }

    /// The change notification signal.
    pub fn changed(&self) -> &Arc<Signal<CollectionChange<T>>> {
        &self.changed
    }

    /// Number of notifications emitted so far.
    pub fn notification_count(&self) -> u64 {
        self.changed.emission_count()
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns a clone of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// Returns a snapshot of all items.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Runs `f` with a read-only view of the items.
    pub fn with_items<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        f(&self.items.read())
    }

    // -------------------------------------------------------------------------
    // Single-element edits
    // -------------------------------------------------------------------------

    /// Appends an item.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.items.write();
            items.push(item.clone());
            items.len() - 1
        };
        self.notify(CollectionChange::Add {
            items: vec![item],
            index,
        });
    }

    /// Inserts an item at `index` (`0..=len`).
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        {
            let mut items = self.items.write();
            check_insert_index(index, items.len())?;
            items.insert(index, item.clone());
        }
        self.notify(CollectionChange::Add {
            items: vec![item],
            index,
        });
        Ok(())
    }

    /// Removes and returns the item at `index`.
    pub fn remove_at(&self, index: usize) -> Result<T> {
        let removed = {
            let mut items = self.items.write();
            check_index(index, items.len())?;
            items.remove(index)
        };
        self.notify(CollectionChange::Remove {
            items: vec![removed.clone()],
            index: Some(index),
        });
        Ok(removed)
    }

    /// Moves the item at `old_index` to `new_index`.
    ///
    /// The item is removed first and then inserted at `new_index`, so both
    /// indices refer to positions in a collection of the current length.
    /// Equal indices are a no-op and emit nothing.
    pub fn move_item(&self, old_index: usize, new_index: usize) -> Result<()> {
        let item = {
            let mut items = self.items.write();
            check_index(old_index, items.len())?;
            check_index(new_index, items.len())?;
            if old_index == new_index {
                return Ok(());
            }
            let item = items.remove(old_index);
            items.insert(new_index, item.clone());
            item
        };
        self.notify(CollectionChange::Move {
            item,
            old_index,
            new_index,
        });
        Ok(())
    }

    /// Removes every item (one `Reset`).
    pub fn clear(&self) {
        self.items.write().clear();
        self.notify(CollectionChange::Reset);
    }

    // -------------------------------------------------------------------------
    // Bulk edits (one notification each)
    // -------------------------------------------------------------------------

    /// Appends all items with a single `Add` notification.
    ///
    /// An empty input changes nothing and emits nothing.
    pub fn add_range<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let added: Vec<T> = items.into_iter().collect();
        if added.is_empty() {
            return;
        }
        let index = {
            let mut items = self.items.write();
            let index = items.len();
            items.extend(added.iter().cloned());
            index
        };
        self.notify(CollectionChange::Add {
            items: added,
            index,
        });
    }

    /// Inserts all items at `index` with a single `Add` notification.
    pub fn insert_range<I>(&self, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let added: Vec<T> = items.into_iter().collect();
        {
            let mut items = self.items.write();
            check_insert_index(index, items.len())?;
            if added.is_empty() {
                return Ok(());
            }
            items.splice(index..index, added.iter().cloned());
        }
        self.notify(CollectionChange::Add {
            items: added,
            index,
        });
        Ok(())
    }

    /// Replaces the entire contents with a single `Reset` notification.
    pub fn replace_all<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let replacement: Vec<T> = items.into_iter().collect();
        let count = replacement.len();
        *self.items.write() = replacement;
        tracing::trace!(target: targets::COLLECTION, count, "replaced collection contents");
        self.notify(CollectionChange::Reset);
    }

    /// Removes `count` items starting at `index` and inserts `items` there,
    /// with a single `Reset` notification.
    pub fn replace_range<I>(&self, index: usize, count: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let replacement: Vec<T> = items.into_iter().collect();
        {
            let mut items = self.items.write();
            check_range(index, count, items.len())?;
            items.splice(index..index + count, replacement);
        }
        self.notify(CollectionChange::Reset);
        Ok(())
    }

    /// Sorts the items in place with a single `Reset` notification.
    pub fn sort_by<F>(&self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.items.write().sort_by(compare);
        self.notify(CollectionChange::Reset);
    }

    /// Sorts the items by a key with a single `Reset` notification.
    pub fn sort_by_key<K, F>(&self, key: F)
    where
        F: FnMut(&T) -> K,
        K: Ord,
    {
        self.items.write().sort_by_key(key);
        self.notify(CollectionChange::Reset);
    }

    /// Removes every item matching `predicate` with a single `Remove`
    /// notification. Returns the number of items removed.
    pub fn remove_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = Vec::new();
        self.items.write().retain(|item| {
            if predicate(item) {
                removed.push(item.clone());
                false
            } else {
                true
            }
        });
        self.notify_removed(removed)
    }

    /// Performs several edits while notifications are suppressed, then emits
    /// a single `Reset`.
    ///
    /// If `f` panics, suppression is lifted and the lock released before the
    /// panic continues; no notification is emitted in that case.
    pub fn batch_update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut BatchEditor<'_, T>) -> R,
    {
        let result = {
            let _suppressed = SuppressGuard::new(&self.changed);
            let mut items = self.items.write();
            let mut editor = BatchEditor { items: &mut *items };
            f(&mut editor)
        };
        self.notify(CollectionChange::Reset);
        result
    }

    fn notify_removed(&self, removed: Vec<T>) -> usize {
        let count = removed.len();
        if count > 0 {
            self.notify(CollectionChange::Remove {
                items: removed,
                index: None,
            });
        }
        count
    }

    fn notify(&self, change: CollectionChange<T>) {
        tracing::trace!(target: targets::COLLECTION, kind = ?change.kind(), count = change.item_count(), "collection changed");
        self.changed.emit(change);
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> ObservableCollection<T> {
    /// Returns `true` if an equal item is present.
    pub fn contains(&self, item: &T) -> bool {
        self.items.read().contains(item)
    }

    /// Index of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.read().iter().position(|x| x == item)
    }

    /// Removes the first item equal to `item`. Returns `true` if one was found.
    pub fn remove_item(&self, item: &T) -> bool {
        let index = {
            let mut items = self.items.write();
            match items.iter().position(|x| x == item) {
                Some(index) => {
                    items.remove(index);
                    index
                }
                None => return false,
            }
        };
        self.notify(CollectionChange::Remove {
            items: vec![item.clone()],
            index: Some(index),
        });
        true
    }

    /// Removes one occurrence of each of `items` with a single `Remove`
    /// notification carrying the removed elements in the order they were
    /// found in the collection. Items not present are ignored.
    ///
    /// Returns the number of items removed.
    pub fn remove_range<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut pending: Vec<T> = items.into_iter().collect();
        if pending.is_empty() {
            return 0;
        }
        let mut removed = Vec::new();
        self.items.write().retain(|item| {
            if pending.is_empty() {
                return true;
            }
            match pending.iter().position(|p| p == item) {
                Some(at) => {
                    pending.swap_remove(at);
                    removed.push(item.clone());
                    false
                }
                None => true,
            }
        });
        self.notify_removed(removed)
    }
}

/// Mutable access to a collection's items during [`ObservableCollection::batch_update`].
pub struct BatchEditor<'a, T> {
    items: &'a mut Vec<T>,
}

impl<T> BatchEditor<'_, T> {
    /// Appends an item.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Inserts an item at `index` (`0..=len`).
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        check_insert_index(index, self.items.len())?;
        self.items.insert(index, item);
        Ok(())
    }

    /// Removes the item at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        check_index(index, self.items.len())?;
        Ok(self.items.remove(index))
    }

    /// Keeps only the items matching `predicate`.
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.items.retain(predicate);
    }

    /// Appends every item.
    pub fn extend<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.items.extend(items);
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of items currently held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no items are held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items as a slice.
    pub fn as_slice(&self) -> &[T] {
        self.items
    }
}

/// Blocks a signal for its lifetime, restoring the previous state on drop.
struct SuppressGuard<'a, A: 'static> {
    signal: &'a Signal<A>,
    was_blocked: bool,
}

impl<'a, A: 'static> SuppressGuard<'a, A> {
    fn new(signal: &'a Signal<A>) -> Self {
        let was_blocked = signal.is_blocked();
        signal.set_blocked(true);
        Self {
            signal,
            was_blocked,
        }
    }
}

impl<A: 'static> Drop for SuppressGuard<'_, A> {
    fn drop(&mut self) {
        self.signal.set_blocked(self.was_blocked);
    }
}

/// A read-only handle to an [`ObservableCollection`].
///
/// Observers receive this handle; it exposes reads and the change signal but
/// no way to mutate the underlying storage.
pub struct ReadOnlyCollection<T> {
    inner: Arc<ObservableCollection<T>>,
}

impl<T> Clone for ReadOnlyCollection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ReadOnlyCollection<T> {
    /// Wrap a shared collection.
    pub fn new(inner: Arc<ObservableCollection<T>>) -> Self {
        Self { inner }
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns a clone of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.get(index)
    }

    /// Returns a snapshot of all items.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.to_vec()
    }

    /// Runs `f` with a read-only view of the items.
    pub fn with_items<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        self.inner.with_items(f)
    }

    /// The change notification signal.
    pub fn changed(&self) -> &Arc<Signal<CollectionChange<T>>> {
        self.inner.changed()
    }

    /// Number of notifications emitted so far.
    pub fn notification_count(&self) -> u64 {
        self.inner.notification_count()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> ReadOnlyCollection<T> {
    /// Returns `true` if an equal item is present.
    pub fn contains(&self, item: &T) -> bool {
        self.inner.contains(item)
    }

    /// Index of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.inner.index_of(item)
    }
}

static_assertions::assert_impl_all!(ObservableCollection<String>: Send, Sync);
static_assertions::assert_impl_all!(ReadOnlyCollection<String>: Send, Sync, Clone);
