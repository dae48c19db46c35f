//! Integration tests for views driven from several threads.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lattice_view::model::{CollectionChange, FilteredView};
use lattice_view::{QueueDispatcher, ViewError, WorkerDispatcher};
use parking_lot::Mutex;

#[test]
fn test_queue_dispatcher_defers_view_updates() {
    let dispatcher = Arc::new(QueueDispatcher::new());
    let view = Arc::new(
        FilteredView::builder()
            .dispatcher(dispatcher.clone())
            .sort_by(|a: &u32, b: &u32| a.cmp(b))
            .build(),
    );

    let workers: Vec<_> = (0..4u32)
        .map(|t| {
            let view = view.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    view.add(t * 25 + i).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    // Source updates are synchronous, view updates wait for the owner thread.
    assert_eq!(view.source_count(), 100);
    assert_eq!(view.count(), 0);

    dispatcher.process_pending();

    assert_eq!(view.items(), (0..100).collect::<Vec<_>>());
}

#[test]
fn test_queue_dispatcher_preserves_call_order() {
    let dispatcher = Arc::new(QueueDispatcher::new());
    let view = Arc::new(FilteredView::with_dispatcher(dispatcher.clone()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    view.view()
        .changed()
        .connect(move |change: &CollectionChange<i32>| sink.lock().push(change.clone()));

    let remote = view.clone();
    thread::spawn(move || {
        remote.add(1).unwrap();
        remote.remove(&1).unwrap();
        remote.add(2).unwrap();
    })
    .join()
    .unwrap();

    dispatcher.process_pending();

    assert_eq!(view.items(), vec![2]);
    assert_eq!(
        *events.lock(),
        vec![
            CollectionChange::Add {
                items: vec![1],
                index: 0
            },
            CollectionChange::Remove {
                items: vec![1],
                index: Some(0)
            },
            CollectionChange::Add {
                items: vec![2],
                index: 0
            },
        ]
    );
}

#[test]
fn test_queue_dispatcher_owner_thread_runs_inline() {
    let dispatcher = Arc::new(QueueDispatcher::new());
    let view = FilteredView::with_dispatcher(dispatcher.clone());

    view.load(vec![3, 1, 2]).unwrap();

    assert_eq!(view.items(), vec![3, 1, 2]);
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn test_worker_dispatcher_applies_updates_on_worker_thread() {
    let dispatcher = Arc::new(WorkerDispatcher::with_name("view-consumer").unwrap());
    let view = Arc::new(
        FilteredView::builder()
            .dispatcher(dispatcher.clone())
            .filter(|x: &u32| x % 2 == 0)
            .build(),
    );

    let seen_threads = Arc::new(Mutex::new(Vec::new()));
    let sink = seen_threads.clone();
    view.view().changed().connect(move |_: &CollectionChange<u32>| {
        sink.lock().push(thread::current().id());
    });

    let workers: Vec<_> = (0..4u32)
        .map(|t| {
            let view = view.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    view.add(t * 50 + i).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert!(dispatcher.flush_timeout(Duration::from_secs(10)).unwrap());

    let expected: Vec<u32> = view
        .source_snapshot()
        .into_iter()
        .filter(|x| x % 2 == 0)
        .collect();
    assert_eq!(view.items(), expected);
    assert_eq!(view.count(), 100);

    let seen = seen_threads.lock();
    assert_eq!(seen.len(), 100);
    assert!(seen.iter().all(|id| *id == dispatcher.thread_id()));
}

#[test]
fn test_immediate_dispatcher_concurrent_callers() {
    let view = Arc::new(
        FilteredView::builder()
            .sort_by(|a: &u32, b: &u32| b.cmp(a))
            .build(),
    );

    let workers: Vec<_> = (0..8u32)
        .map(|t| {
            let view = view.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    view.add(t * 50 + i).unwrap();
                }
                view.remove_where(|x| *x == t * 50).unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let mut expected: Vec<u32> = (0..400).filter(|x| x % 50 != 0).collect();
    expected.reverse();
    assert_eq!(view.items(), expected);
}

#[test]
fn test_shut_down_dispatcher_reports_error() {
    let dispatcher = Arc::new(WorkerDispatcher::new().unwrap());
    let view = FilteredView::with_dispatcher(dispatcher.clone());
    dispatcher.shutdown();

    let err = view.add(1).unwrap_err();

    assert!(matches!(err, ViewError::Dispatch(_)));
    assert_eq!(view.source_count(), 1);
}
