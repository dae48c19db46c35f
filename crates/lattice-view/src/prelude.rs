//! Prelude module for Lattice View.
//!
//! ```ignore
//! use lattice_view::prelude::*;
//! ```

// ============================================================================
// Runtime
// ============================================================================

pub use crate::{
    CancellationToken, Dispatcher, ImmediateDispatcher, QueueDispatcher, Result, ViewError,
    WorkerDispatcher,
};
pub use crate::signal::{ConnectionGuard, ConnectionId, Signal};

// ============================================================================
// Model
// ============================================================================

pub use crate::model::{
    CollectionChange, FilteredView, FilteredViewBuilder, ObservableCollection,
    ReadOnlyCollection, ViewConfig,
};
