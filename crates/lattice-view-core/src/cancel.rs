//! Cooperative cancellation.
//!
//! A [`CancellationToken`] is a shared flag that long-running work checks at
//! safe points. Cancellation never interrupts work already in progress.
//!
//! ```
//! use lattice_view_core::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let child = token.child();
//!
//! assert!(!child.is_cancelled());
//! token.cancel();
//! assert!(child.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable cancellation flag.
///
/// Clones share the same flag. Child tokens created with
/// [`child`](Self::child) also observe their parent's cancellation, but
/// cancelling a child does not affect the parent.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

#[derive(Debug)]
struct CancellationState {
    cancelled: AtomicBool,
    parent: Option<CancellationToken>,
}

impl CancellationToken {
    /// Create a new cancellation token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationState {
                cancelled: AtomicBool::new(false),
                parent: None,
            }),
        }
    }

    /// Create a child token that is cancelled whenever this token is.
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(CancellationState {
                cancelled: AtomicBool::new(false),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
            || self
                .inner
                .parent
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Reset the token to non-cancelled state.
    ///
    /// Only this token's own flag is cleared; a cancelled parent still
    /// cancels it.
    pub fn reset(&self) {
        self.inner.cancelled.store(false, Ordering::Release);
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
