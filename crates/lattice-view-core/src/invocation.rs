//! Deferred invocations and completion signalling.
//!
//! A [`QueuedInvocation`] wraps a closure posted to a dispatcher so it can be
//! executed later on the consumer context. Blocking callers pair it with a
//! [`CompletionHandle`]/[`CompletionWaiter`] to wait until it has run.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// A unit of work handed to a dispatcher.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A type-erased queued invocation that can be executed later.
pub struct QueuedInvocation {
    /// The actual invocation closure.
    invoke: Job,
    /// Optional completion notifier for blocking callers.
    completion: Option<CompletionHandle>,
}

impl QueuedInvocation {
    /// Create a new queued invocation.
    pub fn new<F>(invoke: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            invoke: Box::new(invoke),
            completion: None,
        }
    }

    /// Create a new queued invocation from an already boxed job.
    pub fn from_job(job: Job) -> Self {
        Self {
            invoke: job,
            completion: None,
        }
    }

    /// Create a new queued invocation with a completion handle for blocking.
    pub fn with_completion<F>(invoke: F, completion: CompletionHandle) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            invoke: Box::new(invoke),
            completion: Some(completion),
        }
    }

    /// Execute the invocation.
    ///
    /// The completion handle is signalled even if the closure panics, so a
    /// blocked waiter is never left hanging.
    pub fn execute(self) {
        let _completion = self.completion.map(CompletionOnDrop);
        (self.invoke)();
    }
}

struct CompletionOnDrop(CompletionHandle);

impl Drop for CompletionOnDrop {
    fn drop(&mut self) {
        self.0.signal_done();
    }
}

/// A handle for signaling completion of a blocking invocation.
pub struct CompletionHandle {
    inner: Arc<CompletionState>,
}

impl CompletionHandle {
    /// Signal that the invocation is complete.
    fn signal_done(&self) {
        let mut done = self.inner.done.lock();
        *done = true;
        self.inner.condvar.notify_all();
    }
}

/// A waiter for blocking on invocation completion.
pub struct CompletionWaiter {
    inner: Arc<CompletionState>,
}

impl CompletionWaiter {
    /// Wait for the invocation to complete.
    ///
    /// # Warning
    ///
    /// Waiting on the consumer thread for work queued to that same thread
    /// deadlocks.
    pub fn wait(self) {
        let mut done = self.inner.done.lock();
        while !*done {
            self.inner.condvar.wait(&mut done);
        }
    }

    /// Wait for the invocation to complete with a timeout.
    ///
    /// Returns `true` if the invocation completed, `false` if the timeout elapsed.
    pub fn wait_timeout(self, timeout: Duration) -> bool {
        let mut done = self.inner.done.lock();
        if *done {
            return true;
        }
        let result = self.inner.condvar.wait_for(&mut done, timeout);
        *done || !result.timed_out()
    }
}

struct CompletionState {
    done: Mutex<bool>,
    condvar: Condvar,
}

/// Create a completion handle/waiter pair for blocking invocations.
pub fn completion_pair() -> (CompletionHandle, CompletionWaiter) {
    let state = Arc::new(CompletionState {
        done: Mutex::new(false),
        condvar: Condvar::new(),
    });

    (
        CompletionHandle {
            inner: state.clone(),
        },
        CompletionWaiter { inner: state },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_execute() {
        let executed = Arc::new(AtomicBool::new(false));

        let executed_clone = executed.clone();
        let invocation = QueuedInvocation::new(move || {
            executed_clone.store(true, Ordering::SeqCst);
        });

        invocation.execute();
        assert!(executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_completion_with_invocation() {
        let executed = Arc::new(AtomicBool::new(false));
        let (handle, waiter) = completion_pair();

        let executed_clone = executed.clone();
        let invocation = QueuedInvocation::with_completion(
            move || {
                executed_clone.store(true, Ordering::SeqCst);
            },
            handle,
        );

        let thread = std::thread::spawn(move || invocation.execute());

        waiter.wait();
        thread.join().unwrap();

        assert!(executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_completion_signalled_on_panic() {
        let (handle, waiter) = completion_pair();
        let invocation = QueuedInvocation::with_completion(|| panic!("slot failed"), handle);

        let result = std::thread::spawn(move || invocation.execute()).join();
        assert!(result.is_err());
        assert!(waiter.wait_timeout(Duration::from_secs(1)));
    }

    #[test]
    fn test_completion_timeout() {
        let (_handle, waiter) = completion_pair();
        assert!(!waiter.wait_timeout(Duration::from_millis(10)));
    }
}
