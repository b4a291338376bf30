//! Shared task queue and termination barrier for threaded search
//!
//! Workers block here when they run out of local work. A depth pass is finished
//! exactly when every worker is idle and the queue is empty; both conditions are
//! observed together under the queue lock, so a task can never be in flight
//! while quiescence is declared.

use log::trace;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::iddfs::Frontier;
use crate::snapshot::Task;

struct QueueState<E> {
    tasks: VecDeque<Task<E>>,
    /// Set once by the worker that observes quiescence
    quiescent: bool,
}

/// FIFO of pending tasks plus the idle-worker count
pub struct TaskQueue<E> {
    state: Mutex<QueueState<E>>,
    available: Condvar,
    /// Workers currently waiting for a task. Only modified with `state` locked;
    /// read without the lock as a publishing hint.
    idle: AtomicUsize,
    workers: usize,
}

impl<E> TaskQueue<E> {
    pub fn new(workers: usize) -> Self {
        assert!(workers > 0, "task queue needs at least one worker");
        TaskQueue {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                quiescent: false,
            }),
            available: Condvar::new(),
            idle: AtomicUsize::new(0),
            workers,
        }
    }

    /// Queues the root task before any worker starts
    pub fn seed(&self, task: Task<E>) {
        let mut state = self.state.lock();
        state.tasks.push_back(task);
        state.quiescent = false;
    }

    /// Blocks until a task is available or the pass is over
    ///
    /// Returns `None` once every worker is idle and no task remains. The calling
    /// worker counts as idle from entry until it receives a task.
    pub fn next_task(&self) -> Option<Task<E>> {
        let mut state = self.state.lock();
        let idle = self.idle.fetch_add(1, Ordering::AcqRel) + 1;

        if idle == self.workers && state.tasks.is_empty() {
            trace!("quiescent: {} workers idle, queue empty", idle);
            state.quiescent = true;
            self.available.notify_all();
            return None;
        }

        loop {
            if let Some(task) = state.tasks.pop_front() {
                self.idle.fetch_sub(1, Ordering::AcqRel);
                return Some(task);
            }
            if state.quiescent {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Ends the pass early, releasing every waiting worker
    ///
    /// Pending tasks are dropped. Used when a worker dies mid-pass, since the
    /// idle count could otherwise never reach the worker total.
    pub fn abort(&self) {
        let mut state = self.state.lock();
        state.tasks.clear();
        state.quiescent = true;
        drop(state);
        self.available.notify_all();
    }

    pub fn idle_workers(&self) -> usize {
        self.idle.load(Ordering::Acquire)
    }

    pub fn pending(&self) -> usize {
        self.state.lock().tasks.len()
    }
}

impl<E> Frontier<E> for TaskQueue<E> {
    fn wants_work(&self) -> bool {
        self.idle.load(Ordering::Acquire) > 0
    }

    /// Accepts the task only while fewer tasks are pending than workers are idle
    fn publish(&self, task: Task<E>) -> Result<(), Task<E>> {
        let mut state = self.state.lock();
        if state.quiescent || state.tasks.len() >= self.idle.load(Ordering::Acquire) {
            return Err(task);
        }
        state.tasks.push_back(task);
        drop(state);

        self.available.notify_one();
        Ok(())
    }
}
