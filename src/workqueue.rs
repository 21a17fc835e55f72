use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::error::{EngineError, Result};

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Thread-safe pending-operation queue for a fixed pool of workers.
///
/// Workers receive an explicit handle (usually an `Arc<WorkQueue<T>>`) and
/// drain it until it is empty or closed; there is no global shared state.
/// Producers may keep pushing while workers drain.
#[derive(Debug)]
pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    /// Creates an empty, open queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Enqueues an item. Fails with `Conflict` once the queue is closed.
    pub fn push(&self, item: T) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(EngineError::Conflict("work queue is closed".into()));
        }
        state.items.push_back(item);
        self.available.notify_one();
        Ok(())
    }

    /// Pops the next item without blocking.
    pub fn try_pop(&self) -> Option<T> {
        self.state.lock().items.pop_front()
    }

    /// Pops the next item, blocking until one is available. Returns `None`
    /// once the queue is closed and drained.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Closes the queue: no further pushes, blocked workers drain and exit.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.available.notify_all();
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Whether no items are pending.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }
}
