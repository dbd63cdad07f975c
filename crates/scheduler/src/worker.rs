//! Render worker pool.
//!
//! Workers pull tasks from a shared [`RenderQueue`], make sure the task's page
//! is open, and hand the task to the executor callback that does the actual
//! rasterization. Pages that fail to open are logged and their tasks dropped.

use crate::collab::{PageOpener, RenderTask};
use crate::queue::RenderQueue;
use std::io;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Rasterizes one task. Called on a worker thread.
pub type RenderExecutor = Arc<dyn Fn(&RenderTask) + Send + Sync>;

/// Shared page lookup used by every worker.
pub type SharedPages = Arc<dyn PageOpener + Send + Sync>;

/// Configuration for the render worker pool.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of worker threads to spawn.
    /// Default: number of logical CPU cores.
    pub num_workers: usize,

    /// Time a worker sleeps when the queue is empty.
    /// Default: 10ms.
    pub poll_interval: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus(),
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl WorkerPoolConfig {
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Self::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Pool of threads draining a [`RenderQueue`].
pub struct RenderWorkerPool {
    workers: Vec<Worker>,
    shutdown: Arc<AtomicBool>,
}

impl RenderWorkerPool {
    /// Spawn the workers.
    ///
    /// # Errors
    /// Returns an error if a thread cannot be spawned; workers that already
    /// started are stopped first.
    pub fn new(
        queue: RenderQueue,
        pages: SharedPages,
        executor: RenderExecutor,
        config: WorkerPoolConfig,
    ) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut pool = Self {
            workers: Vec::with_capacity(config.num_workers),
            shutdown: Arc::clone(&shutdown),
        };

        for id in 0..config.num_workers {
            let worker = Worker::spawn(
                id,
                queue.clone(),
                Arc::clone(&pages),
                Arc::clone(&executor),
                Arc::clone(&shutdown),
                config.poll_interval,
            );
            match worker {
                Ok(worker) => pool.workers.push(worker),
                Err(err) => {
                    pool.stop();
                    return Err(err);
                }
            }
        }

        log::debug!("started {} render workers", pool.workers.len());
        Ok(pool)
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Stop all workers and wait for them to finish their current task.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        for worker in self.workers.drain(..) {
            worker.join();
        }
    }
}

impl Drop for RenderWorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(
        id: usize,
        queue: RenderQueue,
        pages: SharedPages,
        executor: RenderExecutor,
        shutdown: Arc<AtomicBool>,
        poll_interval: Duration,
    ) -> io::Result<Self> {
        let thread = thread::Builder::new()
            .name(format!("pagestrip-render-{}", id))
            .spawn(move || Self::run(&queue, pages.as_ref(), &executor, &shutdown, poll_interval))?;

        Ok(Self {
            id,
            thread: Some(thread),
        })
    }

    fn run(
        queue: &RenderQueue,
        pages: &(dyn PageOpener + Send + Sync),
        executor: &RenderExecutor,
        shutdown: &AtomicBool,
        poll_interval: Duration,
    ) {
        while !shutdown.load(Ordering::Acquire) {
            let Some(task) = queue.pop() else {
                thread::sleep(poll_interval);
                continue;
            };

            match pages.open_page(task.page) {
                Ok(()) => executor(&task),
                Err(err) => {
                    log::warn!("dropping render task for page {}: {}", task.page, err);
                }
            }
        }
    }

    fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("render worker {} panicked", self.id);
            }
        }
    }
}

/// Number of logical CPU cores, used as the default worker count.
fn num_cpus() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
