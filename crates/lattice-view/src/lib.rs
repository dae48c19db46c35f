//! Lattice View - filtered, sorted, observable views over a mutable collection.
//!
//! This is the main crate. It re-exports the runtime primitives from
//! `lattice-view-core` and adds the model layer:
//!
//! - [`model::FilteredView`]: maintains `sort(filter(source))` incrementally
//! - [`model::ObservableCollection`]: batched change notification
//! - [`model::SourceStore`]: the lock-guarded source of truth
//!
//! # Example
//!
//! ```
//! use lattice_view::prelude::*;
//!
//! let view = FilteredView::builder()
//!     .filter(|x: &i32| *x > 5)
//!     .items(1..=10)
//!     .build();
//!
//! view.view().changed().connect(|change: &CollectionChange<i32>| {
//!     println!("view changed: {:?}", change.kind());
//! });
//!
//! view.add(42).unwrap();
//! assert_eq!(view.count(), 6);
//! assert_eq!(view.filtered_out_count(), 5);
//! ```
//!
//! # Features
//!
//! - `tokio` (default): enables [`model::FilteredView::load_async`].

pub use lattice_view_core::*;

pub mod model;
pub mod prelude;
