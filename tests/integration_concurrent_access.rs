/// Concurrent access integration tests
///
/// These tests verify that `SyncContainer` serializes resolution: every
/// dependency is still constructed once even when many threads race for it.

use ferrous_injector::{Container, DiError, Resolver, SyncContainer, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

// ===== Test Services =====

#[derive(Debug)]
pub struct CounterService {
    id: usize,
    thread_id: String,
}

fn counted_container(builds: Arc<AtomicUsize>) -> SyncContainer {
    let container = Container::new();
    container
        .register("counter")
        .unwrap()
        .using_factory(move |_| {
            let id = builds.fetch_add(1, Ordering::SeqCst);
            Ok(Value::new(CounterService {
                id,
                thread_id: format!("created-by-{:?}", thread::current().id()),
            }))
        })
        .unwrap();
    SyncContainer::new(container)
}

// ===== Tests =====

#[test]
fn test_concurrent_first_access_builds_once() {
    const THREADS: usize = 16;

    let builds = Arc::new(AtomicUsize::new(0));
    let shared = counted_container(builds.clone());
    let barrier = Barrier::new(THREADS);

    let instances: Vec<Arc<CounterService>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let shared = &shared;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    shared.get_as::<CounterService>("counter").unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    for instance in &instances {
        assert!(Arc::ptr_eq(instance, &instances[0]));
        assert_eq!(instance.id, 0);
    }
    assert!(instances[0].thread_id.starts_with("created-by-"));
}

#[test]
fn test_concurrent_registration_and_lookup() {
    const THREADS: usize = 8;

    let shared = SyncContainer::new(Container::new());
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for i in 0..THREADS {
            let shared = &shared;
            let barrier = &barrier;
            s.spawn(move || {
                shared
                    .register(format!("svc{}", i), |d| d.as_constant(i))
                    .unwrap();
                barrier.wait();
                // Every thread can see every other thread's registration
                for j in 0..THREADS {
                    let value = shared.get_as::<usize>(&format!("svc{}", j)).unwrap();
                    assert_eq!(*value, j);
                }
            });
        }
    });

    assert_eq!(shared.len(), THREADS);
    assert_eq!(shared.describe().len(), THREADS);
}

#[test]
fn test_racing_duplicate_registration_has_one_winner() {
    const THREADS: usize = 8;

    let shared = SyncContainer::new(Container::new());
    let barrier = Barrier::new(THREADS);

    let results: Vec<Result<(), DiError>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let shared = &shared;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    shared.register("leader", |d| d.as_constant(i))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, DiError::AlreadyRegistered(_))));
    assert!(shared.get("leader").unwrap().is_some());
}

#[test]
fn test_cycle_detection_under_lock() {
    let shared = SyncContainer::new(Container::new());
    for (name, dep) in [("a", "b"), ("b", "a")] {
        shared
            .register(name, |d| {
                d.using_factory(|call| Ok(call.arg_value(0)?.clone()))?
                    .with_args([dep])?;
                Ok(())
            })
            .unwrap();
    }

    let errors: Vec<DiError> = thread::scope(|s| {
        let shared = &shared;
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(move || shared.get("a").unwrap_err()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for error in errors {
        assert_eq!(error, DiError::Circular(vec!["a".into(), "b".into(), "a".into()]));
    }
    assert!(shared.is_empty());
}

#[test]
fn test_with_gives_exclusive_access() {
    let shared = SyncContainer::from(Container::new());
    shared.register("n", |d| d.as_constant(10u32)).unwrap();

    let doubled = shared.with(|container| {
        let n = container.get_as::<u32>("n").unwrap();
        *n * 2
    });
    assert_eq!(doubled, 20);

    let container = shared.into_inner();
    assert!(container.is_resolved("n"));
}
