// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{Error, WorkerPool};

fn counter_job(counter: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn runs_every_job() {
    let pool = WorkerPool::new(3).unwrap();
    assert_eq!(pool.threads(), 3);
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..20 {
        pool.submit(counter_job(&counter)).unwrap();
    }
    pool.wait_idle();
    assert_eq!(counter.load(Ordering::SeqCst), 20);
    assert_eq!(pool.pending(), 0);
}

#[test]
fn at_least_one_thread() {
    let pool = WorkerPool::new(0).unwrap();
    assert_eq!(pool.threads(), 1);
}

#[test]
fn closed_pool_rejects_jobs() {
    let pool = WorkerPool::new(1).unwrap();
    pool.close();
    assert!(pool.is_closed());
    let counter = Arc::new(AtomicUsize::new(0));
    assert!(matches!(
        pool.submit(counter_job(&counter)),
        Err(Error::PoolClosed)
    ));
}

#[test]
fn panicking_job_keeps_worker() {
    let pool = WorkerPool::new(1).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    pool.submit(|| panic!("job failed")).unwrap();
    pool.submit(counter_job(&counter)).unwrap();
    pool.wait_idle();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn drop_finishes_queued_jobs() {
    let pool = WorkerPool::new(1).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..5 {
        let job = counter_job(&counter);
        pool.submit(move || {
            thread::sleep(Duration::from_millis(2));
            job();
        })
        .unwrap();
    }
    drop(pool);
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[test]
fn named_workers() {
    let pool = WorkerPool::new(2).unwrap();
    let names = Arc::new(Mutex::new(Vec::new()));
    for _ in 0..4 {
        let names = Arc::clone(&names);
        pool.submit(move || {
            let name = thread::current().name().map(str::to_string);
            names.lock().push(name);
        })
        .unwrap();
    }
    pool.wait_idle();
    let names = names.lock();
    assert_eq!(names.len(), 4);
    assert!(names
        .iter()
        .all(|name| name.as_deref().is_some_and(|name| name.starts_with("placard-worker-"))));
}
