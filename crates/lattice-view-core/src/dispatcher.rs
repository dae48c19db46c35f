//! Dispatchers: the single logical consumer on which view mutations run.
//!
//! A [`Dispatcher`] accepts jobs and runs them on one execution context in
//! submission order. The view engine never assumes a particular threading
//! primitive behind it; it only asks whether the calling thread already is
//! the consumer context and otherwise posts work.
//!
//! # Implementations
//!
//! - [`ImmediateDispatcher`]: every caller counts as the consumer; jobs run
//!   inline. Suitable for single-threaded use and tests.
//! - [`QueueDispatcher`]: models a UI event loop. Jobs posted from any thread
//!   are queued until the owning thread calls
//!   [`process_pending`](QueueDispatcher::process_pending).
//! - [`WorkerDispatcher`]: a dedicated consumer thread draining a channel.
//!
//! # Example
//!
//! ```
//! use lattice_view_core::dispatcher::{Dispatcher, QueueDispatcher};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let dispatcher = Arc::new(QueueDispatcher::new());
//! let counter = Arc::new(AtomicUsize::new(0));
//!
//! let remote = dispatcher.clone();
//! let remote_counter = counter.clone();
//! std::thread::spawn(move || {
//!     remote
//!         .invoke(Box::new(move || {
//!             remote_counter.fetch_add(1, Ordering::SeqCst);
//!         }))
//!         .unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! // Nothing ran yet: the job waits for the owning thread.
//! assert_eq!(counter.load(Ordering::SeqCst), 0);
//! assert_eq!(dispatcher.process_pending(), 1);
//! assert_eq!(counter.load(Ordering::SeqCst), 1);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::error::{Result, ViewError};
use crate::invocation::{Job, QueuedInvocation, completion_pair};
use crate::logging::targets;
use crate::thread_check::ThreadAffinity;

/// The scheduling capability consumed by the view engine.
///
/// Implementations must run posted jobs strictly in submission order on a
/// single logical consumer context.
pub trait Dispatcher: Send + Sync {
    /// Returns `true` if the calling thread already is the consumer context.
    fn is_current(&self) -> bool;

    /// Queue a job for later execution on the consumer context.
    fn post(&self, job: Job) -> Result<()>;

    /// Run a job on the consumer context.
    ///
    /// Runs inline when already on the consumer context, otherwise posts.
    fn invoke(&self, job: Job) -> Result<()> {
        if self.is_current() {
            job();
            Ok(())
        } else {
            self.post(job)
        }
    }
}

impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    fn is_current(&self) -> bool {
        (**self).is_current()
    }

    fn post(&self, job: Job) -> Result<()> {
        (**self).post(job)
    }

    fn invoke(&self, job: Job) -> Result<()> {
        (**self).invoke(job)
    }
}

/// A dispatcher that runs every job immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateDispatcher;

impl ImmediateDispatcher {
    /// Create a new immediate dispatcher.
    pub fn new() -> Self {
        Self
    }
}

impl Dispatcher for ImmediateDispatcher {
    fn is_current(&self) -> bool {
        true
    }

    fn post(&self, job: Job) -> Result<()> {
        job();
        Ok(())
    }
}

/// A dispatcher bound to the thread that created it, pumped manually.
///
/// Jobs posted from other threads wait in a FIFO queue until the owning
/// thread calls [`process_pending`](Self::process_pending). Invoking from the
/// owning thread first drains the queue and then runs the job inline, which
/// keeps submission order intact.
pub struct QueueDispatcher {
    sender: Sender<QueuedInvocation>,
    receiver: Receiver<QueuedInvocation>,
    affinity: ThreadAffinity,
}

impl Default for QueueDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueDispatcher {
    /// Create a queue dispatcher owned by the current thread.
    pub fn new() -> Self {
        Self::with_affinity(ThreadAffinity::current())
    }

    /// Create a queue dispatcher owned by the given thread.
    pub fn with_affinity(affinity: ThreadAffinity) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            affinity,
        }
    }

    /// The thread affinity of the consumer context.
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    /// Number of queued jobs that have not run yet.
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Run every queued job in order, including jobs queued while draining.
    ///
    /// Returns the number of jobs executed.
    ///
    /// # Panics
    ///
    /// Panics if called from a thread other than the owning thread.
    pub fn process_pending(&self) -> usize {
        self.affinity
            .assert_same_thread_with_msg("QueueDispatcher::process_pending called off its thread");

        let mut executed = 0;
        while let Ok(invocation) = self.receiver.try_recv() {
            invocation.execute();
            executed += 1;
        }
        if executed > 0 {
            tracing::trace!(target: targets::DISPATCH, executed, "processed queued jobs");
        }
        executed
    }
}

impl Dispatcher for QueueDispatcher {
    fn is_current(&self) -> bool {
        self.affinity.is_same_thread()
    }

    fn post(&self, job: Job) -> Result<()> {
        self.sender
            .send(QueuedInvocation::from_job(job))
            .map_err(|_| ViewError::Dispatch("queue dispatcher receiver dropped".into()))
    }

    fn invoke(&self, job: Job) -> Result<()> {
        if self.is_current() {
            self.process_pending();
            job();
            Ok(())
        } else {
            self.post(job)
        }
    }
}

enum WorkerMessage {
    Run(QueuedInvocation),
    Shutdown,
}

/// A dispatcher backed by a dedicated consumer thread.
///
/// Jobs run on the worker thread in submission order. A job that panics is
/// logged and the worker keeps serving later jobs.
pub struct WorkerDispatcher {
    sender: Sender<WorkerMessage>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
    running: Arc<AtomicBool>,
}

impl WorkerDispatcher {
    /// Start a worker dispatcher with a default thread name.
    pub fn new() -> std::io::Result<Self> {
        Self::with_name("lattice-view-dispatch")
    }

    /// Start a worker dispatcher whose thread carries the given name.
    pub fn with_name(name: impl Into<String>) -> std::io::Result<Self> {
        let (sender, receiver) = unbounded();
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = running.clone();

        let handle = thread::Builder::new().name(name.into()).spawn(move || {
            worker_loop(receiver);
            thread_running.store(false, Ordering::Release);
        })?;
        let thread_id = handle.thread().id();

        Ok(Self {
            sender,
            handle: Mutex::new(Some(handle)),
            thread_id,
            running,
        })
    }

    /// Check if the worker thread is still accepting jobs.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The id of the consumer thread.
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Block until every job posted before this call has run.
    ///
    /// Calling this from the worker thread itself returns immediately, since
    /// waiting there would deadlock.
    pub fn flush(&self) -> Result<()> {
        if self.is_current() {
            return Ok(());
        }
        let (handle, waiter) = completion_pair();
        self.sender
            .send(WorkerMessage::Run(QueuedInvocation::with_completion(|| {}, handle)))
            .map_err(|_| ViewError::Dispatch("worker dispatcher has shut down".into()))?;
        waiter.wait();
        Ok(())
    }

    /// Like [`flush`](Self::flush), giving up after `timeout`.
    ///
    /// Returns `Ok(false)` if the timeout elapsed first.
    pub fn flush_timeout(&self, timeout: Duration) -> Result<bool> {
        if self.is_current() {
            return Ok(true);
        }
        let (handle, waiter) = completion_pair();
        self.sender
            .send(WorkerMessage::Run(QueuedInvocation::with_completion(|| {}, handle)))
            .map_err(|_| ViewError::Dispatch("worker dispatcher has shut down".into()))?;
        Ok(waiter.wait_timeout(timeout))
    }

    /// Stop accepting jobs, run what is already queued, and join the thread.
    ///
    /// Returns `true` if this call joined the thread.
    pub fn shutdown(&self) -> bool {
        self.running.store(false, Ordering::Release);
        let _ = self.sender.send(WorkerMessage::Shutdown);

        let handle = self.handle.lock().take();
        match handle {
            Some(h) if h.thread().id() != thread::current().id() => h.join().is_ok(),
            _ => false,
        }
    }
}

impl Dispatcher for WorkerDispatcher {
    fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    fn post(&self, job: Job) -> Result<()> {
        if !self.is_running() {
            return Err(ViewError::Dispatch("worker dispatcher has shut down".into()));
        }
        self.sender
            .send(WorkerMessage::Run(QueuedInvocation::from_job(job)))
            .map_err(|_| ViewError::Dispatch("worker dispatcher has shut down".into()))
    }
}

impl Drop for WorkerDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(receiver: Receiver<WorkerMessage>) {
    while let Ok(message) = receiver.recv() {
        match message {
            WorkerMessage::Run(invocation) => run_guarded(invocation),
            WorkerMessage::Shutdown => {
                // Drain what was queued before the shutdown request.
                while let Ok(WorkerMessage::Run(invocation)) = receiver.try_recv() {
                    run_guarded(invocation);
                }
                break;
            }
        }
    }
}

fn run_guarded(invocation: QueuedInvocation) {
    if panic::catch_unwind(AssertUnwindSafe(|| invocation.execute())).is_err() {
        tracing::error!(target: targets::DISPATCH, "dispatched job panicked");
    }
}

static_assertions::assert_impl_all!(QueueDispatcher: Send, Sync);
static_assertions::assert_impl_all!(WorkerDispatcher: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_immediate_runs_inline() {
        let dispatcher = ImmediateDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        dispatcher
            .invoke(Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        assert!(dispatcher.is_current());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_queue_dispatcher_fifo() {
        let dispatcher = Arc::new(QueueDispatcher::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let remote = dispatcher.clone();
        let remote_order = order.clone();
        thread::spawn(move || {
            for i in 0..5 {
                let o = remote_order.clone();
                remote.invoke(Box::new(move || o.lock().push(i))).unwrap();
            }
        })
        .join()
        .unwrap();

        assert_eq!(dispatcher.pending_count(), 5);
        assert!(order.lock().is_empty());

        // Invoking on the owning thread drains earlier jobs first.
        let o = order.clone();
        dispatcher.invoke(Box::new(move || o.lock().push(99))).unwrap();

        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4, 99]);
        assert_eq!(dispatcher.pending_count(), 0);
    }

    #[test]
    fn test_queue_dispatcher_not_current_elsewhere() {
        let dispatcher = Arc::new(QueueDispatcher::new());
        let remote = dispatcher.clone();
        let current = thread::spawn(move || remote.is_current()).join().unwrap();
        assert!(!current);
        assert!(dispatcher.is_current());
    }

    #[test]
    fn test_worker_dispatcher_runs_on_worker_thread() {
        let dispatcher = WorkerDispatcher::with_name("test-worker").unwrap();
        let seen = Arc::new(Mutex::new(None));

        let s = seen.clone();
        dispatcher
            .invoke(Box::new(move || {
                *s.lock() = Some(thread::current().id());
            }))
            .unwrap();
        dispatcher.flush().unwrap();

        assert_eq!(*seen.lock(), Some(dispatcher.thread_id()));
        assert!(!dispatcher.is_current());
    }

    #[test]
    fn test_worker_dispatcher_order_and_shutdown() {
        let dispatcher = WorkerDispatcher::new().unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..100 {
            let o = order.clone();
            dispatcher.post(Box::new(move || o.lock().push(i))).unwrap();
        }

        assert!(dispatcher.shutdown());
        assert_eq!(*order.lock(), (0..100).collect::<Vec<_>>());
        assert!(!dispatcher.is_running());
        assert!(dispatcher.post(Box::new(|| {})).is_err());
    }

    #[test]
    fn test_worker_survives_panicking_job() {
        let dispatcher = WorkerDispatcher::new().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        dispatcher.post(Box::new(|| panic!("job failed"))).unwrap();
        let c = counter.clone();
        dispatcher
            .post(Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        assert!(dispatcher.flush_timeout(Duration::from_secs(5)).unwrap());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
