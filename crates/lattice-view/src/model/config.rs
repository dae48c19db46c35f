//! Configuration for filtered views.
//!
//! [`ViewConfig`] carries the tunables of a view; [`FilteredViewBuilder`]
//! assembles a [`FilteredView`] with its initial filter, comparator,
//! dispatcher and content in one step.

use std::cmp::Ordering;
use std::sync::Arc;

use lattice_view_core::{Dispatcher, ImmediateDispatcher};

use super::filtered_view::FilteredView;
use super::source::{CompareFn, FilterFn, SourceStore};

/// Default name used in log output when none is configured.
pub const DEFAULT_VIEW_NAME: &str = "filtered-view";

/// Default divisor for the sort move budget.
///
/// A sort plan needing more than `len / 3` moves is replaced by one reset.
pub const DEFAULT_SORT_RESET_DIVISOR: usize = 3;

/// Tunables for a [`FilteredView`](super::FilteredView).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// Name attached to every log event the view emits.
    pub name: String,
    /// A sort is applied as individual moves only while the move count stays
    /// at or below `len / sort_reset_divisor`; otherwise the view is reset.
    pub sort_reset_divisor: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_VIEW_NAME.to_string(),
            sort_reset_divisor: DEFAULT_SORT_RESET_DIVISOR,
        }
    }
}

impl ViewConfig {
    /// Default configuration with a custom name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if applying `moves` individual moves to a view of `len`
    /// items costs more than a single reset.
    pub fn exceeds_move_budget(&self, moves: usize, len: usize) -> bool {
        moves > len / self.sort_reset_divisor.max(1)
    }
}

/// Builder for [`FilteredView`].
///
/// The built view starts out consistent with the initial items; no
/// notification is emitted for the initial content.
///
/// ```
/// use lattice_view::model::FilteredViewBuilder;
///
/// let view = FilteredViewBuilder::new()
///     .name("evens")
///     .filter(|x: &i32| x % 2 == 0)
///     .sort_by(|a: &i32, b: &i32| b.cmp(a))
///     .items(1..=6)
///     .build();
///
/// assert_eq!(view.items(), vec![6, 4, 2]);
/// assert_eq!(view.name(), "evens");
/// ```
pub struct FilteredViewBuilder<T> {
    config: ViewConfig,
    filter: Option<FilterFn<T>>,
    compare: Option<CompareFn<T>>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    items: Vec<T>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Default for FilteredViewBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> FilteredViewBuilder<T> {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: ViewConfig::default(),
            filter: None,
            compare: None,
            dispatcher: None,
            items: Vec::new(),
        }
    }

    /// Sets the name used in log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the filter predicate.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(predicate));
        self
    }

    /// Sets the sort comparator.
    pub fn sort_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.compare = Some(Arc::new(compare));
        self
    }

    /// Sorts by a key extracted from each item.
    pub fn sort_by_key<K, F>(self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.sort_by(move |a: &T, b: &T| key(a).cmp(&key(b)))
    }

    /// Sets the dispatcher view updates run on.
    ///
    /// Defaults to an [`ImmediateDispatcher`].
    pub fn dispatcher<D: Dispatcher + 'static>(mut self, dispatcher: D) -> Self {
        self.dispatcher = Some(Arc::new(dispatcher));
        self
    }

    /// Sets the divisor of the sort move budget.
    pub fn sort_reset_divisor(mut self, divisor: usize) -> Self {
        self.config.sort_reset_divisor = divisor;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the initial source content.
    pub fn items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.items = items.into_iter().collect();
        self
    }

    /// Builds the view.
    pub fn build(self) -> FilteredView<T> {
        let source = SourceStore::new(self.filter, self.compare);
        source.load(self.items);
        let dispatcher: Arc<dyn Dispatcher> = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(ImmediateDispatcher::new()),
        };
        FilteredView::from_parts(self.config, source, dispatcher)
    }
}
