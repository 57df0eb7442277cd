//! Fixed-size worker pool with future-based task handles

use crate::error::{RuntimeError, RuntimeResult};
use futures::channel::oneshot;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Sizing and health thresholds for a [`WorkerPool`].
///
/// Crossing a threshold logs a warning; the pool never rejects work for
/// load reasons.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads (at least one).
    pub workers: usize,
    /// Queue depth above which enqueues log a warning.
    pub warn_queue_depth: usize,
    /// Task duration above which completion logs a warning.
    pub warn_task_duration: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            warn_queue_depth: 512,
            warn_task_duration: Duration::from_secs(1),
        }
    }
}

#[derive(Default)]
struct PoolState {
    queue: VecDeque<Job>,
    active: usize,
    shutdown: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    /// Signaled when work arrives or shutdown begins.
    available: Condvar,
    /// Signaled when the pool drains to fully idle.
    idle: Condvar,
    config: PoolConfig,
}

/// Fixed-size thread pool with an unbounded task queue.
///
/// `spawn` hands back a [`TaskHandle`] that is both a `Future` and a
/// blocking join point. `shutdown` drains the queue and joins the workers;
/// `wait_idle` blocks until the queue and the active-task count are both
/// zero.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Start a pool with the given configuration.
    pub fn new(config: PoolConfig) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState::default()),
            available: Condvar::new(),
            idle: Condvar::new(),
            config,
        });
        let count = shared.config.workers.max(1);
        let workers = (0..count)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || worker_loop(&shared))
            })
            .collect();
        Self {
            shared,
            workers: Mutex::new(workers),
        }
    }

    /// Enqueue a task and return its handle.
    ///
    /// The queue is unbounded; the only rejection is a pool that has been
    /// shut down. Exceeding the configured queue depth logs a warning.
    pub fn spawn<T, F>(&self, task: F) -> RuntimeResult<TaskHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let job: Job = Box::new(move || {
            let value = task();
            let _ = sender.send(value);
        });

        let depth = {
            let mut state = self.shared.state.lock();
            if state.shutdown {
                return Err(RuntimeError::PoolClosed);
            }
            state.queue.push_back(job);
            state.queue.len()
        };
        self.shared.available.notify_one();

        if depth > self.shared.config.warn_queue_depth {
            log::warn!(
                "worker pool queue depth {} exceeds threshold {}",
                depth,
                self.shared.config.warn_queue_depth
            );
        }
        Ok(TaskHandle { receiver })
    }

    /// Number of tasks waiting in the queue.
    pub fn queue_depth(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Number of tasks currently executing.
    pub fn active_count(&self) -> usize {
        self.shared.state.lock().active
    }

    /// Block until the queue is empty and no task is executing.
    pub fn wait_idle(&self) {
        let mut state = self.shared.state.lock();
        while !(state.queue.is_empty() && state.active == 0) {
            self.shared.idle.wait(&mut state);
        }
    }

    /// Drain the remaining queue and join every worker. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
        }
        self.shared.available.notify_all();
        let workers = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut state = shared.state.lock();
            loop {
                if let Some(job) = state.queue.pop_front() {
                    state.active += 1;
                    break job;
                }
                if state.shutdown {
                    return;
                }
                shared.available.wait(&mut state);
            }
        };

        let started = Instant::now();
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            log::error!("worker task panicked; its handle reports cancellation");
        }
        let elapsed = started.elapsed();
        if elapsed > shared.config.warn_task_duration {
            log::warn!(
                "worker task ran {}ms, over the {}ms threshold",
                elapsed.as_millis(),
                shared.config.warn_task_duration.as_millis()
            );
        }

        let mut state = shared.state.lock();
        state.active -= 1;
        if state.queue.is_empty() && state.active == 0 {
            shared.idle.notify_all();
        }
    }
}

/// Handle to a spawned task.
///
/// Awaiting (or joining) yields the task's value, or
/// [`RuntimeError::TaskCanceled`] if the task panicked or was dropped
/// unexecuted.
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Block the current thread until the task completes.
    pub fn join(self) -> RuntimeResult<T> {
        futures::executor::block_on(self.receiver).map_err(|_| RuntimeError::TaskCanceled)
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = RuntimeResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| RuntimeError::TaskCanceled))
    }
}
