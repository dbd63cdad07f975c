//! Priority queue of render tasks.
//!
//! Tasks come out by ascending priority order, so thumbnails (order 0) go
//! first and then tiles in the order the scheduler visited them. Tasks with
//! the same order come out in submission order.

use crate::collab::{RenderSink, RenderTask};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct QueuedTask {
    task: RenderTask,
    /// Insertion order (used for FIFO within the same priority)
    insertion_order: u64,
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max heap: the lowest order and the earliest
        // insertion must compare greatest.
        other
            .task
            .cache_order
            .cmp(&self.task.cache_order)
            .then_with(|| other.insertion_order.cmp(&self.insertion_order))
    }
}

struct QueueState {
    heap: BinaryHeap<QueuedTask>,
    insertion_counter: u64,
}

/// Thread-safe render task queue.
#[derive(Clone)]
pub struct RenderQueue {
    state: Arc<Mutex<QueueState>>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                insertion_counter: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, task: RenderTask) {
        let mut state = self.lock();
        let insertion_order = state.insertion_counter;
        state.insertion_counter += 1;
        state.heap.push(QueuedTask {
            task,
            insertion_order,
        });
    }

    /// Take the most important task.
    pub fn pop(&self) -> Option<RenderTask> {
        self.lock().heap.pop().map(|queued| queued.task)
    }

    pub fn peek(&self) -> Option<RenderTask> {
        self.lock().heap.peek().map(|queued| queued.task.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().heap.is_empty()
    }

    pub fn clear(&self) {
        self.lock().heap.clear();
    }

    /// Drop every pending task of a page. Returns how many were removed.
    pub fn remove_page(&self, page: u32) -> usize {
        let mut state = self.lock();
        let original_len = state.heap.len();
        state.heap.retain(|queued| queued.task.page != page);
        original_len - state.heap.len()
    }

    /// Pending tasks in arbitrary order.
    pub fn tasks(&self) -> Vec<RenderTask> {
        self.lock()
            .heap
            .iter()
            .map(|queued| queued.task.clone())
            .collect()
    }
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for RenderQueue {
    fn submit(&self, task: RenderTask) {
        self.push(task);
    }
}

impl std::fmt::Debug for RenderQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderQueue")
            .field("len", &self.len())
            .finish()
    }
}
