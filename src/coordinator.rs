//! Iterative deepening driver
//!
//! `Solver` runs one full depth-bounded search per depth, from
//! `search.initial_depth` up to the requested maximum, and stops at the first
//! depth that yields a solution unless exhaustive mode is requested. Each depth
//! pass is either sequential or spread over a scoped thread pool that is started
//! and joined within the pass.

use log::{debug, info};
use std::panic;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::iddfs::{Inline, Searcher};
use crate::profiler;
use crate::queue::TaskQueue;
use crate::simulation::Simulation;
use crate::snapshot::{Snapshot, Task};
use crate::solution::SolutionSet;
use crate::solution_log::SolutionLog;
use crate::stats::SearchStats;
use crate::worker::{Worker, WorkerReport};

/// How a single depth pass is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Plain recursion on the calling thread
    Sequential,
    /// Shared task queue drained by a pool of worker threads
    Threaded { workers: usize },
}

/// State shared between the depth loop and the deadline watchdog
#[derive(Debug, Default)]
struct SharedSearchState {
    /// Flag indicating search completion
    search_complete: AtomicBool,
    /// Current search depth being explored
    current_depth: AtomicU32,
}

/// Diagnostics for one depth pass
#[derive(Debug, Clone)]
pub struct DepthReport {
    pub depth: u32,
    /// Wall-clock time of this pass alone
    pub elapsed: Duration,
    pub solutions: usize,
    pub stats: SearchStats,
    /// The pass was interrupted and may have missed solutions
    pub cancelled: bool,
}

/// Everything a search run produced
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    pub solutions: SolutionSet,
    pub depths: Vec<DepthReport>,
    pub cancelled: bool,
}

impl SearchReport {
    /// First depth that produced a solution
    pub fn solved_depth(&self) -> Option<u32> {
        self.depths.iter().find(|d| d.solutions > 0).map(|d| d.depth)
    }

    pub fn stats(&self) -> SearchStats {
        let mut total = SearchStats::default();
        for depth in &self.depths {
            total.merge(&depth.stats);
        }
        total
    }

    pub fn elapsed(&self) -> Duration {
        self.depths.iter().map(|d| d.elapsed).sum()
    }
}

/// Result of a single depth pass
#[derive(Debug, Default)]
pub struct DepthOutcome {
    pub found: bool,
    pub solutions: SolutionSet,
    pub stats: SearchStats,
}

/// Iterative deepening search over a simulation
pub struct Solver<S: Simulation> {
    sim: S,
    config: Config,
    log: SolutionLog,
}

impl<S: Simulation> Solver<S> {
    /// Creates a solver with the given configuration
    ///
    /// # Arguments
    /// * `sim` - Simulation cloned once per worker thread
    /// * `config` - Static configuration that does not change during the solver's lifetime
    pub fn new(sim: S, config: Config) -> Self {
        profiler::configure(config.profiling.enabled);
        let log = SolutionLog::new(config.debug.enabled, &config.debug.log_file_path);
        Solver { sim, config, log }
    }

    pub fn with_log(mut self, log: SolutionLog) -> Self {
        self.log = log;
        self
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        Self::determine_strategy(&self.config)
    }

    /// Every solution found, from the first successful depth on
    pub fn search(&self, initial: &Snapshot<S::Entity>, max_depth: u32, exhaustive: bool) -> SolutionSet {
        self.run(initial, max_depth, exhaustive).solutions
    }

    /// Same as `search`, with per-depth diagnostics
    pub fn run(&self, initial: &Snapshot<S::Entity>, max_depth: u32, exhaustive: bool) -> SearchReport {
        let cancel = AtomicBool::new(false);
        self.run_with_cancel(initial, max_depth, exhaustive, &cancel)
    }

    /// Runs until done or until `cancel` is set
    ///
    /// Another thread may set `cancel` at any time. If `timing.time_budget_ms`
    /// is non-zero a watchdog sets it once the budget is spent. Solutions found
    /// before cancellation are kept.
    pub fn run_with_cancel(
        &self,
        initial: &Snapshot<S::Entity>,
        max_depth: u32,
        exhaustive: bool,
        cancel: &AtomicBool,
    ) -> SearchReport {
        let shared = SharedSearchState::default();
        let Some(budget) = self.config.timing.time_budget() else {
            return self.iterate(initial, max_depth, exhaustive, cancel, &shared);
        };

        let polling_interval = self.config.timing.polling_interval();
        let start_time = Instant::now();
        thread::scope(|scope| {
            let shared = &shared;
            scope.spawn(move || watch_deadline(shared, cancel, start_time, budget, polling_interval));
            self.iterate(initial, max_depth, exhaustive, cancel, shared)
        })
    }

    fn iterate(
        &self,
        initial: &Snapshot<S::Entity>,
        max_depth: u32,
        exhaustive: bool,
        cancel: &AtomicBool,
        shared: &SharedSearchState,
    ) -> SearchReport {
        let start_time = Instant::now();
        let strategy = self.strategy();
        if profiler::is_profiling_enabled() {
            profiler::reset();
        }
        info!(
            "Selected strategy: {:?} (max depth {}, exhaustive {})",
            strategy, max_depth, exhaustive
        );

        let mut report = SearchReport::default();
        for depth in self.config.search.initial_depth..=max_depth {
            if cancel.load(Ordering::Acquire) {
                report.cancelled = true;
                break;
            }

            info!("depth {}...", depth);
            shared.current_depth.store(depth, Ordering::Release);

            let pass_start = Instant::now();
            let outcome = self.search_depth_with(strategy, initial, depth, cancel);
            let elapsed = pass_start.elapsed();
            let interrupted = cancel.load(Ordering::Acquire);

            info!("  elapsed time: {:.3} [s]", elapsed.as_secs_f64());
            debug!("  {}", outcome.stats);
            self.announce(depth, &outcome.solutions);

            report.depths.push(DepthReport {
                depth,
                elapsed,
                solutions: outcome.solutions.len(),
                stats: outcome.stats,
                cancelled: interrupted,
            });
            report.solutions.append(outcome.solutions);

            if interrupted {
                info!("Stopping search: cancelled during depth {}", depth);
                report.cancelled = true;
                break;
            }
            if outcome.found && !exhaustive {
                break;
            }
        }

        shared.search_complete.store(true, Ordering::Release);
        info!(
            "Search complete: {} solution(s) in {:.3} [s]",
            report.solutions.len(),
            start_time.elapsed().as_secs_f64()
        );

        if profiler::is_profiling_enabled() && self.config.profiling.log_to_stderr {
            profiler::print_report(start_time.elapsed().as_millis() as u64);
        }
        report
    }

    /// Logs and records the solutions of one depth
    fn announce(&self, depth: u32, solutions: &SolutionSet) {
        if solutions.is_empty() {
            return;
        }
        info!("  found {} solution(s) at depth {}", solutions.len(), depth);

        let limit = self.config.output.max_printed_solutions;
        for solution in solutions.iter().take(limit) {
            info!("  inputs: {}", solution.to_codes());
        }
        if solutions.len() > limit {
            info!("  ... and {} more", solutions.len() - limit);
        }

        for solution in solutions {
            self.log.record(depth, solution);
        }
    }

    /// Runs one full pass with the configured strategy
    pub fn search_depth(&self, initial: &Snapshot<S::Entity>, depth: u32, cancel: &AtomicBool) -> DepthOutcome {
        self.search_depth_with(self.strategy(), initial, depth, cancel)
    }

    fn search_depth_with(
        &self,
        strategy: ExecutionStrategy,
        initial: &Snapshot<S::Entity>,
        depth: u32,
        cancel: &AtomicBool,
    ) -> DepthOutcome {
        match strategy {
            ExecutionStrategy::Sequential => self.sequential_search(initial, depth, cancel),
            ExecutionStrategy::Threaded { workers } => self.threaded_search(initial, depth, workers, cancel),
        }
    }

    fn sequential_search(&self, initial: &Snapshot<S::Entity>, depth: u32, cancel: &AtomicBool) -> DepthOutcome {
        let mut searcher = Searcher::new(&self.sim, &Inline, cancel);
        let found = searcher.expand_task(Task::root(initial.clone(), depth));
        profiler::merge_thread_local();

        let (solutions, stats) = searcher.into_results();
        DepthOutcome {
            found,
            solutions,
            stats,
        }
    }

    /// Seeds the root task and runs `workers` threads until quiescence
    fn threaded_search(
        &self,
        initial: &Snapshot<S::Entity>,
        depth: u32,
        workers: usize,
        cancel: &AtomicBool,
    ) -> DepthOutcome {
        let queue = TaskQueue::new(workers);
        queue.seed(Task::root(initial.clone(), depth));
        let queue = &queue;

        let mut reports: Vec<WorkerReport> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|id| {
                    let worker = Worker::new(id, self.sim.clone());
                    scope.spawn(move || worker.run(queue, cancel))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect()
        });

        reports.sort_by_key(|r| r.id);
        let mut outcome = DepthOutcome::default();
        for report in reports {
            debug!(
                "  worker {}: {} solution(s), {} task(s) taken",
                report.id,
                report.solutions.len(),
                report.stats.tasks_taken
            );
            outcome.found |= report.found;
            outcome.stats.merge(&report.stats);
            outcome.solutions.append(report.solutions);
        }
        outcome
    }

    /// Determines the execution strategy from the configured worker count
    fn determine_strategy(config: &Config) -> ExecutionStrategy {
        let workers = config.threads.resolved_workers();
        if workers >= config.threads.min_workers_for_parallel {
            ExecutionStrategy::Threaded { workers }
        } else {
            ExecutionStrategy::Sequential
        }
    }
}

/// Polls until the search completes or the budget runs out
fn watch_deadline(
    shared: &SharedSearchState,
    cancel: &AtomicBool,
    start_time: Instant,
    budget: Duration,
    polling_interval: Duration,
) {
    loop {
        thread::sleep(polling_interval);

        if shared.search_complete.load(Ordering::Acquire) {
            return;
        }
        if start_time.elapsed() >= budget {
            info!(
                "Stopping search: time budget of {}ms exhausted at depth {}",
                budget.as_millis(),
                shared.current_depth.load(Ordering::Acquire)
            );
            cancel.store(true, Ordering::Release);
            return;
        }
    }
}
