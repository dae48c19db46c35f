//! Model layer for Lattice View.
//!
//! This module provides the filtered/sorted view engine and the pieces it is
//! built from.
//!
//! # Core Types
//!
//! - `FilteredView`: The engine. Owns the source and keeps the view equal to
//!   `sort(filter(source))`
//! - `SourceStore`: Authoritative item storage with a visibility mask
//! - `ObservableCollection`: The notification sink; one notification per call
//! - `ReadOnlyCollection`: What observers hold
//! - `Change` / `ChangeSet`: Typed edits, used to plan minimal reorderings
//! - `ViewConfig` / `FilteredViewBuilder`: Configuration
//!
//! # Architecture Overview
//!
//! ```text
//! caller ──> FilteredView ──lock──> SourceStore
//!                 │
//!                 └──outbox──> Dispatcher ──> ObservableCollection ──> observers
//! ```
//!
//! Source updates happen under the store's lock on the calling thread. View
//! updates are queued while that lock is held and applied later, in order, on
//! the dispatcher's consumer context.

mod change;
mod collection;
mod config;
mod filtered_view;
mod source;

pub use change::{Change, ChangeReason, ChangeSet};
pub use collection::{
    BatchEditor, ChangeKind, CollectionChange, ObservableCollection, ReadOnlyCollection,
};
pub use config::{
    DEFAULT_SORT_RESET_DIVISOR, DEFAULT_VIEW_NAME, FilteredViewBuilder, ViewConfig,
};
pub use filtered_view::FilteredView;
pub use source::{CompareFn, FilterFn, SourceStore};
