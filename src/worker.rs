// Worker thread body for threaded search
//
// A worker owns a private clone of the simulation. It repeatedly takes a task
// from the shared queue and runs the search core on it; the core decides, child
// by child, whether to recurse locally or publish to idle workers.

use log::{debug, error};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::iddfs::Searcher;
use crate::profiler;
use crate::queue::TaskQueue;
use crate::simulation::Simulation;
use crate::solution::SolutionSet;
use crate::stats::SearchStats;

/// What one worker produced during a depth pass
#[derive(Debug)]
pub struct WorkerReport {
    pub id: usize,
    /// True if any subtree this worker expanded produced a solution
    pub found: bool,
    pub solutions: SolutionSet,
    pub stats: SearchStats,
}

pub struct Worker<S: Simulation> {
    id: usize,
    sim: S,
}

impl<S: Simulation> Worker<S> {
    pub fn new(id: usize, sim: S) -> Self {
        Worker { id, sim }
    }

    /// Processes tasks until the queue reports quiescence
    pub fn run(self, queue: &TaskQueue<S::Entity>, cancel: &AtomicBool) -> WorkerReport {
        let _guard = AbortOnPanic { queue, cancel };
        let mut searcher = Searcher::new(&self.sim, queue, cancel);
        let mut found = false;

        while let Some(task) = queue.next_task() {
            if searcher.expand_task(task) {
                found = true;
            }
        }

        profiler::merge_thread_local();
        let (solutions, stats) = searcher.into_results();
        debug!("worker {} finished: {}", self.id, stats);

        WorkerReport {
            id: self.id,
            found,
            solutions,
            stats,
        }
    }
}

/// Releases the other workers if this one unwinds out of the simulation
struct AbortOnPanic<'a, E> {
    queue: &'a TaskQueue<E>,
    cancel: &'a AtomicBool,
}

impl<E> Drop for AbortOnPanic<'_, E> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("worker panicked, abandoning depth pass");
            self.cancel.store(true, Ordering::Relaxed);
            self.queue.abort();
        }
    }
}
