//! The filtered, sorted view engine.
//!
//! [`FilteredView<T>`] owns a [`SourceStore`] and an [`ObservableCollection`]
//! and keeps the latter equal to `sort(filter(source))`. Every mutating call
//! updates the source under its lock, decides how the view has to change and
//! hands that work to the configured [`Dispatcher`]:
//!
//! | Call | View update |
//! |------|-------------|
//! | `load`, `add_range`, `filter`, `clear_filter`, `clear_sort`, `refresh_all` | full rebuild (one reset) |
//! | `add` | insert at the binary-search position (or source position if unsorted) |
//! | `remove` | remove at the item's view index |
//! | `remove_where` | one bulk remove of the visible matches |
//! | `sort`, `sort_by`, `sort_by_key`, `resort` | minimal moves, or one reset when too many |
//! | `refresh` | remove, insert or move the one item |
//!
//! # Ordering
//!
//! View updates are queued in an engine-local outbox while the source lock is
//! held, then a drain job is handed to the dispatcher. Whichever drain runs
//! first applies every queued update in order, so observers see view states in
//! the same order the mutating calls were made, even when the updates complete
//! after the calls return.
//!
//! # Divergence
//!
//! A filter or comparator that panics, or a view update that fails, leaves the
//! view possibly out of step with the source. The engine records this and the
//! next mutating call performs a full rebuild instead of its incremental plan.
//!
//! # Example
//!
//! ```
//! use lattice_view::model::FilteredView;
//!
//! let view = FilteredView::new();
//! view.load(vec![5, 3, 8, 1, 9]).unwrap();
//! view.filter(|x: &i32| *x > 2).unwrap();
//! view.sort().unwrap();
//!
//! assert_eq!(view.items(), vec![3, 5, 8, 9]);
//! assert_eq!(view.source_count(), 5);
//! assert_eq!(view.filtered_out_count(), 1);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicBool};

#[cfg(feature = "tokio")]
use lattice_view_core::CancellationToken;
use lattice_view_core::logging::targets;
use lattice_view_core::{Dispatcher, ImmediateDispatcher, PerfSpan, Result, ViewError};
use parking_lot::Mutex;

use super::change::ChangeSet;
use super::collection::{ObservableCollection, ReadOnlyCollection};
use super::config::{FilteredViewBuilder, ViewConfig};
use super::source::{CompareFn, FilterFn, Reevaluation, SourceState, SourceStore};

type ViewJob<T> = Box<dyn FnOnce(&ObservableCollection<T>) -> Result<()> + Send>;

/// Raises a divergence flag if dropped while the thread is unwinding.
struct PanicSentinel<'a> {
    diverged: &'a AtomicBool,
}

impl<'a> PanicSentinel<'a> {
    fn new(diverged: &'a AtomicBool) -> Self {
        Self { diverged }
    }
}

impl Drop for PanicSentinel<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.diverged.store(true, atomic::Ordering::SeqCst);
        }
    }
}

/// FIFO of pending view updates, shared with the drain jobs.
struct Outbox<T> {
    name: String,
    view: Arc<ObservableCollection<T>>,
    jobs: Mutex<VecDeque<(&'static str, ViewJob<T>)>>,
    draining: Mutex<()>,
    diverged: AtomicBool,
}

impl<T: Clone + Send + Sync + 'static> Outbox<T> {
    fn push(&self, operation: &'static str, job: ViewJob<T>) {
        self.jobs.lock().push_back((operation, job));
    }

    fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    fn next_job(&self) -> Option<(&'static str, ViewJob<T>)> {
        self.jobs.lock().pop_front()
    }

    /// Apply queued updates in order.
    ///
    /// Only one drain runs at a time. A drain that finds another one active
    /// returns immediately; the active drain re-checks the queue after
    /// releasing its guard, so no update is left behind.
    fn drain(&self) {
        loop {
            let Some(guard) = self.draining.try_lock() else {
                return;
            };
            while let Some((operation, job)) = self.next_job() {
                let _sentinel = PanicSentinel::new(&self.diverged);
                if let Err(error) = job(&self.view) {
                    tracing::warn!(
                        target: targets::VIEW,
                        view = %self.name,
                        operation,
                        %error,
                        "view update failed, next mutation will rebuild"
                    );
                    self.diverged.store(true, atomic::Ordering::SeqCst);
                }
            }
            drop(guard);
            if self.is_empty() {
                return;
            }
        }
    }
}

/// A filtered, optionally sorted, observable view over a mutable source.
///
/// `FilteredView` is `Send + Sync`; mutating calls may come from any thread.
/// The view itself is only mutated on the dispatcher's consumer context.
/// Observers subscribe through [`view`](Self::view).
///
/// After [`dispose`](Self::dispose) every mutating call is a no-op that
/// returns the neutral value.
pub struct FilteredView<T> {
    config: ViewConfig,
    source: SourceStore<T>,
    outbox: Arc<Outbox<T>>,
    dispatcher: Arc<dyn Dispatcher>,
    disposed: AtomicBool,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Default for FilteredView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> FilteredView<T> {
    /// An empty view with no filter, no sort and an [`ImmediateDispatcher`].
    pub fn new() -> Self {
        Self::from_parts(
            ViewConfig::default(),
            SourceStore::new(None, None),
            Arc::new(ImmediateDispatcher::new()),
        )
    }

    /// An empty view whose updates run on `dispatcher`.
    pub fn with_dispatcher<D: Dispatcher + 'static>(dispatcher: D) -> Self {
        Self::from_parts(
            ViewConfig::default(),
            SourceStore::new(None, None),
            Arc::new(dispatcher),
        )
    }

    /// Start configuring a view.
    pub fn builder() -> FilteredViewBuilder<T> {
        FilteredViewBuilder::new()
    }

    /// Assemble a view. The view collection starts out equal to the store's
    /// visible snapshot without any notification.
    pub(crate) fn from_parts(
        config: ViewConfig,
        source: SourceStore<T>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        let initial = source.visible_snapshot();
        let outbox = Outbox {
            name: config.name.clone(),
            view: Arc::new(ObservableCollection::from_vec(initial)),
            jobs: Mutex::new(VecDeque::new()),
            draining: Mutex::new(()),
            diverged: AtomicBool::new(false),
        };
        Self {
            config,
            source,
            outbox: Arc::new(outbox),
            dispatcher,
            disposed: AtomicBool::new(false),
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The configured name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The active configuration.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// A read-only handle to the view, for observers.
    pub fn view(&self) -> ReadOnlyCollection<T> {
        ReadOnlyCollection::new(Arc::clone(&self.outbox.view))
    }

    /// A snapshot of the view.
    pub fn items(&self) -> Vec<T> {
        self.outbox.view.to_vec()
    }

    /// Number of items in the view.
    pub fn count(&self) -> usize {
        self.outbox.view.len()
    }

    /// Number of items in the source, visible or not.
    pub fn source_count(&self) -> usize {
        self.source.len()
    }

    /// Number of source items the filter currently rejects.
    pub fn filtered_out_count(&self) -> usize {
        let state = self.source.lock();
        state.len() - state.visible_len()
    }

    /// A snapshot of the source in insertion order.
    pub fn source_snapshot(&self) -> Vec<T> {
        self.source.snapshot()
    }

    /// Returns `true` while a filter is active.
    pub fn is_filtered(&self) -> bool {
        self.source.lock().filter().is_some()
    }

    /// Returns `true` while a comparator is active.
    pub fn is_sorted(&self) -> bool {
        self.source.lock().compare().is_some()
    }

    /// Returns `true` once [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(atomic::Ordering::Acquire)
    }

    // -------------------------------------------------------------------------
    // Source mutations
    // -------------------------------------------------------------------------

    /// Replace the entire source content and rebuild the view.
    pub fn load<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        let Some(_recover) = self.begin("load") else {
            return Ok(());
        };
        let _sentinel = PanicSentinel::new(&self.outbox.diverged);
        {
            let mut state = self.source.lock();
            state.load(items);
            self.enqueue_rebuild(&state, "load");
        }
        self.schedule()
    }

    /// Append one item. If it passes the filter it is inserted into the view
    /// at its sorted position, or at its source position when unsorted.
    pub fn add(&self, item: T) -> Result<()> {
        let Some(recover) = self.begin("add") else {
            return Ok(());
        };
        let _sentinel = PanicSentinel::new(&self.outbox.diverged);
        {
            let mut state = self.source.lock();
            let visible = state.add(item.clone());
            if recover {
                self.enqueue_rebuild(&state, "add");
            } else if visible {
                let position = state.len() - 1;
                self.enqueue_insert(&state, item, position, "add");
            } else {
                tracing::trace!(target: targets::VIEW, view = %self.config.name, "added item is filtered out");
            }
        }
        self.schedule()
    }

    /// Append several items and rebuild the view.
    ///
    /// An empty input changes nothing and emits nothing.
    pub fn add_range<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return Ok(());
        }
        let Some(_recover) = self.begin("add_range") else {
            return Ok(());
        };
        let _sentinel = PanicSentinel::new(&self.outbox.diverged);
        {
            let mut state = self.source.lock();
            let passing = state.add_range(items);
            tracing::trace!(target: targets::VIEW, view = %self.config.name, passing, "added range");
            self.enqueue_rebuild(&state, "add_range");
        }
        self.schedule()
    }

    /// Remove the first source item equal to `item`.
    ///
    /// Returns `true` if the item was in the source, whether or not it was
    /// visible.
    pub fn remove(&self, item: &T) -> Result<bool> {
        let Some(recover) = self.begin("remove") else {
            return Ok(false);
        };
        let _sentinel = PanicSentinel::new(&self.outbox.diverged);
        let found = {
            let mut state = self.source.lock();
            let outcome = state.remove(item);
            if recover {
                self.enqueue_rebuild(&state, "remove");
            } else if outcome == Some(true) {
                self.enqueue_remove(item.clone(), "remove");
            }
            outcome.is_some()
        };
        self.schedule()?;
        Ok(found)
    }

    /// Remove every source item matching `predicate`.
    ///
    /// The visible matches leave the view in one bulk removal. Returns the
    /// number of source items removed.
    pub fn remove_where<F>(&self, predicate: F) -> Result<usize>
    where
        F: FnMut(&T) -> bool,
    {
        let Some(recover) = self.begin("remove_where") else {
            return Ok(0);
        };
        let _sentinel = PanicSentinel::new(&self.outbox.diverged);
        let removed = {
            let mut state = self.source.lock();
            let (removed, visible) = state.remove_where(predicate);
            if recover {
                self.enqueue_rebuild(&state, "remove_where");
            } else if !visible.is_empty() {
                let expected = visible.len();
                self.outbox.push(
                    "remove_where",
                    Box::new(move |view: &ObservableCollection<T>| {
                        if view.remove_range(visible) == expected {
                            Ok(())
                        } else {
                            Err(ViewError::ItemNotFound)
                        }
                    }),
                );
            }
            removed
        };
        self.schedule()?;
        Ok(removed)
    }

    /// Remove every source item and clear the view.
    pub fn clear(&self) -> Result<()> {
        let Some(_recover) = self.begin("clear") else {
            return Ok(());
        };
        {
            let mut state = self.source.lock();
            state.clear();
            self.outbox.push(
                "clear",
                Box::new(|view: &ObservableCollection<T>| {
                    view.clear();
                    Ok(())
                }),
            );
        }
        self.schedule()
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    /// Install `predicate` as the filter and rebuild the view.
    pub fn filter<F>(&self, predicate: F) -> Result<()>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.replace_filter(Some(Arc::new(predicate)), "filter")
    }

    /// Remove the filter and rebuild the view.
    ///
    /// Rebuilds (and notifies) even when no filter was active.
    pub fn clear_filter(&self) -> Result<()> {
        self.replace_filter(None, "clear_filter")
    }

    fn replace_filter(&self, filter: Option<FilterFn<T>>, operation: &'static str) -> Result<()> {
        let Some(_recover) = self.begin(operation) else {
            return Ok(());
        };
        let _sentinel = PanicSentinel::new(&self.outbox.diverged);
        {
            let mut state = self.source.lock();
            state.set_filter(filter);
            self.enqueue_rebuild(&state, operation);
        }
        self.schedule()
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Sort by the item type's natural order.
    pub fn sort(&self) -> Result<()>
    where
        T: Ord,
    {
        self.sort_by(|a: &T, b: &T| a.cmp(b))
    }

    /// Install `compare` as the comparator and reorder the view.
    ///
    /// The view is reordered with the fewest moves that sort it; if that
    /// takes more moves than the configured budget allows, the view is reset
    /// to the sorted order instead.
    pub fn sort_by<F>(&self, compare: F) -> Result<()>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.apply_sort(Some(Arc::new(compare)), "sort")
    }

    /// Sort by a key extracted from each item.
    pub fn sort_by_key<K, F>(&self, key: F) -> Result<()>
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.sort_by(move |a: &T, b: &T| key(a).cmp(&key(b)))
    }

    /// Re-apply the active comparator. Does nothing when unsorted.
    pub fn resort(&self) -> Result<()> {
        self.apply_sort(None, "resort")
    }

    /// Remove the comparator and rebuild the view in source order.
    ///
    /// Rebuilds (and notifies) even when no comparator was active.
    pub fn clear_sort(&self) -> Result<()> {
        let Some(_recover) = self.begin("clear_sort") else {
            return Ok(());
        };
        let _sentinel = PanicSentinel::new(&self.outbox.diverged);
        {
            let mut state = self.source.lock();
            state.set_compare(None);
            self.enqueue_rebuild(&state, "clear_sort");
        }
        self.schedule()
    }

    fn apply_sort(&self, compare: Option<CompareFn<T>>, operation: &'static str) -> Result<()> {
        let Some(recover) = self.begin(operation) else {
            return Ok(());
        };
        let _sentinel = PanicSentinel::new(&self.outbox.diverged);
        {
            let mut state = self.source.lock();
            if compare.is_some() {
                state.set_compare(compare);
            }
            if recover {
                self.enqueue_rebuild(&state, operation);
            } else if let Some(compare) = state.compare() {
                let compare = Arc::clone(compare);
                let config = self.config.clone();
                self.outbox.push(
                    operation,
                    Box::new(move |view: &ObservableCollection<T>| {
                        apply_sort_plan(view, &compare, &config)
                    }),
                );
            } else {
                tracing::debug!(target: targets::VIEW, view = %self.config.name, operation, "no comparator active");
            }
        }
        self.schedule()
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    /// Re-evaluate one item after it changed in place.
    ///
    /// The item leaves the view if it no longer passes the filter, enters it
    /// if it now does, and moves to its new sorted position if it stays
    /// visible under an active comparator. Returns `true` if the item was in
    /// the source.
    pub fn refresh(&self, item: &T) -> Result<bool> {
        let Some(recover) = self.begin("refresh") else {
            return Ok(false);
        };
        let _sentinel = PanicSentinel::new(&self.outbox.diverged);
        let found = {
            let mut state = self.source.lock();
            let outcome = state.reevaluate(item);
            if recover {
                self.enqueue_rebuild(&state, "refresh");
            } else if let Some(outcome) = outcome {
                self.enqueue_refresh(&state, outcome);
            }
            outcome.is_some()
        };
        self.schedule()?;
        Ok(found)
    }

    /// Refresh several items one after another.
    ///
    /// Each item is handled exactly like [`refresh`](Self::refresh) and
    /// produces its own notification. Returns how many were in the source.
    pub fn refresh_items<I>(&self, items: I) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut found = 0;
        for item in items {
            if self.refresh(item.borrow())? {
                found += 1;
            }
        }
        Ok(found)
    }

    /// Re-evaluate every item and rebuild the view.
    pub fn refresh_all(&self) -> Result<()> {
        let Some(_recover) = self.begin("refresh_all") else {
            return Ok(());
        };
        let _sentinel = PanicSentinel::new(&self.outbox.diverged);
        {
            let mut state = self.source.lock();
            state.reevaluate_all();
            self.enqueue_rebuild(&state, "refresh_all");
        }
        self.schedule()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Clear the source and the view and make the engine inert.
    ///
    /// Idempotent. Updates dispatched before this call may still be applied
    /// after it returns; the clear is queued behind them. Observers are
    /// disconnected once the clear has been delivered.
    pub fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, atomic::Ordering::AcqRel) {
            return Ok(());
        }
        {
            let mut state = self.source.lock();
            state.clear();
            self.outbox.push(
                "dispose",
                Box::new(|view: &ObservableCollection<T>| {
                    view.clear();
                    view.changed().disconnect_all();
                    Ok(())
                }),
            );
        }
        tracing::debug!(target: targets::VIEW, view = %self.config.name, "disposed");
        self.schedule()
    }

    /// Fetch the source content on the tokio runtime and load it.
    ///
    /// `fetch` runs as a spawned task. Cancellation observed before the fetch
    /// starts or after it completes returns [`ViewError::Cancelled`]; a failed
    /// fetch returns [`ViewError::Fetch`]. In both cases nothing is mutated.
    #[cfg(feature = "tokio")]
    pub async fn load_async<F, E>(&self, fetch: F, cancel: &CancellationToken) -> Result<()>
    where
        F: Future<Output = std::result::Result<Vec<T>, E>> + Send + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
    {
        if cancel.is_cancelled() {
            tracing::debug!(target: targets::VIEW, view = %self.config.name, "load cancelled before fetch");
            return Err(ViewError::Cancelled);
        }

        let items = tokio::spawn(fetch)
            .await
            .map_err(ViewError::fetch)?
            .map_err(ViewError::fetch)?;

        if cancel.is_cancelled() {
            tracing::debug!(target: targets::VIEW, view = %self.config.name, "load cancelled after fetch");
            return Err(ViewError::Cancelled);
        }
        self.load(items)
    }

    // -------------------------------------------------------------------------
    // Planning helpers (called with the source lock held)
    // -------------------------------------------------------------------------

    /// Returns `None` when disposed; otherwise whether a previous failure
    /// requires this call to rebuild.
    fn begin(&self, operation: &'static str) -> Option<bool> {
        if self.is_disposed() {
            tracing::debug!(
                target: targets::VIEW,
                view = %self.config.name,
                operation,
                "ignoring mutation on disposed view"
            );
            return None;
        }
        let recover = self.outbox.diverged.swap(false, atomic::Ordering::SeqCst);
        if recover {
            tracing::warn!(
                target: targets::VIEW,
                view = %self.config.name,
                operation,
                "view diverged from source, rebuilding"
            );
        }
        Some(recover)
    }

    fn schedule(&self) -> Result<()> {
        if self.outbox.is_empty() {
            return Ok(());
        }
        let outbox = Arc::clone(&self.outbox);
        self.dispatcher.invoke(Box::new(move || outbox.drain()))
    }

    fn enqueue_rebuild(&self, state: &SourceState<T>, operation: &'static str) {
        let _span = PerfSpan::new("rebuild");
        let target = state.visible_snapshot();
        tracing::debug!(
            target: targets::VIEW,
            view = %self.config.name,
            operation,
            visible = target.len(),
            source = state.len(),
            "full rebuild"
        );
        self.outbox.push(
            operation,
            Box::new(move |view: &ObservableCollection<T>| {
                view.replace_all(target);
                Ok(())
            }),
        );
    }

    fn enqueue_insert(
        &self,
        state: &SourceState<T>,
        item: T,
        position: usize,
        operation: &'static str,
    ) {
        let job: ViewJob<T> = match state.compare() {
            Some(compare) => {
                let compare = Arc::clone(compare);
                Box::new(move |view: &ObservableCollection<T>| {
                    let index = view.with_items(|items| {
                        items.partition_point(|x| compare(x, &item) != Ordering::Greater)
                    });
                    view.insert(index, item)
                })
            }
            None => {
                let index = state.visible_before(position);
                Box::new(move |view: &ObservableCollection<T>| view.insert(index, item))
            }
        };
        tracing::trace!(target: targets::VIEW, view = %self.config.name, operation, "incremental insert");
        self.outbox.push(operation, job);
    }

    fn enqueue_remove(&self, item: T, operation: &'static str) {
        tracing::trace!(target: targets::VIEW, view = %self.config.name, operation, "incremental remove");
        self.outbox.push(
            operation,
            Box::new(move |view: &ObservableCollection<T>| {
                let index = view.index_of(&item).ok_or(ViewError::ItemNotFound)?;
                view.remove_at(index).map(drop)
            }),
        );
    }

    fn enqueue_refresh(&self, state: &SourceState<T>, outcome: Reevaluation) {
        let item = state.items()[outcome.position].clone();
        match (outcome.was_visible, outcome.is_visible) {
            (true, false) => self.enqueue_remove(item, "refresh"),
            (false, true) => self.enqueue_insert(state, item, outcome.position, "refresh"),
            (true, true) => {
                if let Some(compare) = state.compare() {
                    let compare = Arc::clone(compare);
                    self.outbox.push(
                        "refresh",
                        Box::new(move |view: &ObservableCollection<T>| {
                            reposition(view, &item, &compare)
                        }),
                    );
                }
            }
            (false, false) => {}
        }
    }
}

/// Move `item` to the slot before the first other element ordered after it,
/// unless it already sits between its neighbours.
fn reposition<T>(view: &ObservableCollection<T>, item: &T, compare: &CompareFn<T>) -> Result<()>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let current = view.index_of(item).ok_or(ViewError::ItemNotFound)?;
    let target = view.with_items(|items| {
        let after_previous = current == 0 || compare(&items[current - 1], item) != Ordering::Greater;
        let before_next = items
            .get(current + 1)
            .is_none_or(|next| compare(next, item) != Ordering::Less);
        if after_previous && before_next {
            return current;
        }
        items
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != current)
            .position(|(_, other)| compare(other, item) == Ordering::Greater)
            .unwrap_or(items.len() - 1)
    });
    if target != current {
        tracing::trace!(target: targets::VIEW, from = current, to = target, "repositioning refreshed item");
        view.move_item(current, target)?;
    }
    Ok(())
}

/// Bring the view into `compare` order with individual moves, or reset it
/// when the plan exceeds the move budget.
fn apply_sort_plan<T>(
    view: &ObservableCollection<T>,
    compare: &CompareFn<T>,
    config: &ViewConfig,
) -> Result<()>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let _span = PerfSpan::new("sort_diff");
    let current = view.to_vec();
    let mut target = current.clone();
    target.sort_by(|a, b| compare(a, b));

    let plan = ChangeSet::minimal_moves(&current, &target, |a, b| a == b);
    let moves = plan.moves();
    if plan.is_empty() {
        tracing::debug!(target: targets::VIEW, view = %config.name, "view already in order");
        return Ok(());
    }
    if config.exceeds_move_budget(moves, current.len()) {
        tracing::debug!(
            target: targets::VIEW,
            view = %config.name,
            moves,
            len = current.len(),
            "sort exceeds move budget, resetting"
        );
        view.replace_all(target);
        return Ok(());
    }

    tracing::debug!(target: targets::VIEW, view = %config.name, moves, "applying sort as moves");
    for change in &plan {
        if let Some(from) = change.previous_index() {
            view.move_item(from, change.current_index())?;
        }
    }
    Ok(())
}

impl<T> fmt::Debug for FilteredView<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredView")
            .field("name", &self.config.name)
            .field("count", &self.count())
            .field("source_count", &self.source_count())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(FilteredView<String>: Send, Sync);
