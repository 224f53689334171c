// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::Error;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct QueueState {
    queue: VecDeque<Job>,
    running: usize,
    closed: bool,
}

#[derive(Default)]
struct SharedQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
    idle: Condvar,
}

/// A fixed set of named threads running layout and raster jobs.
///
/// One pool is usually shared by every surface of an application. Jobs run
/// in submission order. Dropping the pool closes it, lets the workers finish
/// the jobs already queued and joins them.
pub struct WorkerPool {
    queue: Arc<SharedQueue>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts a pool with `threads` workers, at least one.
    pub fn new(threads: usize) -> Result<Self, Error> {
        let threads = threads.max(1);
        let mut pool = Self {
            queue: Arc::new(SharedQueue::default()),
            workers: Vec::with_capacity(threads),
        };
        for index in 0..threads {
            let queue = Arc::clone(&pool.queue);
            // Workers already started are joined when `pool` drops on error.
            let handle = thread::Builder::new()
                .name(format!("placard-worker-{index}"))
                .spawn(move || work(&queue))?;
            pool.workers.push(handle);
        }
        log::debug!("started worker pool with {threads} threads");
        Ok(pool)
    }

    /// Returns the number of worker threads.
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Queues `job` to run on a worker.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<(), Error> {
        let mut state = self.queue.state.lock();
        if state.closed {
            return Err(Error::PoolClosed);
        }
        state.queue.push_back(Box::new(job));
        drop(state);
        self.queue.ready.notify_one();
        Ok(())
    }

    /// Returns the number of jobs waiting for a worker.
    pub fn pending(&self) -> usize {
        self.queue.state.lock().queue.len()
    }

    /// Blocks until every queued job has finished.
    pub fn wait_idle(&self) {
        let mut state = self.queue.state.lock();
        while !state.queue.is_empty() || state.running > 0 {
            self.queue.idle.wait(&mut state);
        }
    }

    /// Stops accepting jobs. Queued jobs still run.
    pub fn close(&self) {
        let mut state = self.queue.state.lock();
        state.closed = true;
        drop(state);
        self.queue.ready.notify_all();
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.queue.state.lock().closed
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.workers.len())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::warn!("worker thread panicked outside of a job");
            }
        }
        log::debug!("worker pool shut down");
    }
}

fn work(queue: &SharedQueue) {
    loop {
        let job = {
            let mut state = queue.state.lock();
            while state.queue.is_empty() && !state.closed {
                queue.ready.wait(&mut state);
            }
            let Some(job) = state.queue.pop_front() else {
                break;
            };
            state.running += 1;
            job
        };

        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            log::error!("render job panicked");
        }

        let mut state = queue.state.lock();
        state.running -= 1;
        if state.queue.is_empty() && state.running == 0 {
            queue.idle.notify_all();
        }
    }
}
