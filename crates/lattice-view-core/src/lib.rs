//! Core runtime for Lattice View.
//!
//! This crate provides the building blocks the view engine is assembled from:
//!
//! - **Signal/Slot System**: Type-safe change notification ([`Signal`])
//! - **Dispatchers**: The single logical consumer that serializes view
//!   mutations ([`Dispatcher`], [`ImmediateDispatcher`], [`QueueDispatcher`],
//!   [`WorkerDispatcher`])
//! - **Cancellation**: Cooperative cancellation for asynchronous loads
//!   ([`CancellationToken`])
//! - **Thread Affinity**: Tracking which thread owns a consumer context
//! - **Errors**: The [`ViewError`] taxonomy shared by every crate
//! - **Logging**: `tracing` targets and performance spans
//!
//! # Signal Example
//!
//! ```
//! use lattice_view_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

pub mod cancel;
pub mod dispatcher;
mod error;
pub mod invocation;
pub mod logging;
pub mod signal;
pub mod thread_check;

pub use cancel::CancellationToken;
pub use dispatcher::{Dispatcher, ImmediateDispatcher, QueueDispatcher, WorkerDispatcher};
pub use error::{Result, ViewError, check_index, check_insert_index, check_range};
pub use invocation::Job;
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
