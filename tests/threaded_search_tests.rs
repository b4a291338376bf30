// Integration tests for threaded search
//
// Tests that distributing work over a pool never changes the answer and always
// terminates:
// - same unordered solution set for 1 and N workers
// - every (workers, depth) pass in 1..=8 x 0..=20 finishes within a time bound
// - external cancellation and the time budget release every worker

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tas_search::config::Config;
use tas_search::coordinator::Solver;
use tas_search::worlds::corridor::Corridor;
use tas_search::worlds::graph::{Estimate, GraphWorld};
use tas_search::worlds::line::LineWorld;

fn config(workers: usize) -> Config {
    let mut config = Config::default_hardcoded();
    config.threads.workers = workers;
    config.threads.min_workers_for_parallel = 1;
    config
}

#[test]
fn test_graph_solutions_independent_of_worker_count() {
    for seed in 0..6 {
        let world = GraphWorld::random(seed, 12, 3).unwrap();
        let root = world.start();
        let baseline = Solver::new(world.clone(), config(1)).search(&root, 8, true);

        for workers in [2, 4, 8] {
            let solutions = Solver::new(world.clone(), config(workers)).search(&root, 8, true);
            assert_eq!(solutions.len(), baseline.len(), "seed {} workers {}", seed, workers);
            assert_eq!(
                solutions.to_unordered(),
                baseline.to_unordered(),
                "seed {} workers {}",
                seed,
                workers
            );
        }
    }
}

#[test]
fn test_unpruned_graph_solutions_independent_of_worker_count() {
    let world = GraphWorld::random(42, 8, 2).unwrap().with_estimate(Estimate::Zero);
    let root = world.start();
    let baseline = Solver::new(world.clone(), config(1)).search(&root, 9, true);

    let threaded = Solver::new(world, config(6)).search(&root, 9, true);
    assert_eq!(threaded.to_unordered(), baseline.to_unordered());
}

#[test]
fn test_corridor_solutions_independent_of_worker_count() {
    let world = Corridor::from_layout("p.^..b..^^.E", 1).unwrap().forward_only(true);
    let root = world.initial_state();
    let baseline = Solver::new(world.clone(), config(1)).search(&root, 11, true);
    assert!(!baseline.is_empty());

    for workers in [3, 8] {
        let solutions = Solver::new(world.clone(), config(workers)).search(&root, 11, true);
        assert_eq!(solutions.to_unordered(), baseline.to_unordered(), "{} workers", workers);
    }
}

#[test]
fn test_every_pool_size_and_depth_terminates() {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let world = LineWorld::new(14);
        let root = world.start(0);
        let cancel = AtomicBool::new(false);
        for workers in 1..=8 {
            let solver = Solver::new(world, config(workers));
            for depth in 0..=20 {
                let outcome = solver.search_depth(&root, depth, &cancel);
                assert_eq!(outcome.found, depth >= 14, "workers {} depth {}", workers, depth);
            }
        }
        tx.send(()).ok();
    });

    rx.recv_timeout(Duration::from_secs(120))
        .expect("threaded search did not terminate in time");
}

#[test]
fn test_external_cancel_stops_all_workers() {
    let world = LineWorld::new(5);
    let root = world.start(0);
    let cancel = AtomicBool::new(false);
    let solver = Solver::new(world, config(4));

    let started = Instant::now();
    let report = thread::scope(|scope| {
        scope.spawn(|| {
            thread::sleep(Duration::from_millis(50));
            cancel.store(true, Ordering::Release);
        });
        solver.run_with_cancel(&root, 60, true, &cancel)
    });

    assert!(report.cancelled);
    assert!(started.elapsed() < Duration::from_secs(30));
    // Partial results are still genuine solutions
    for solution in &report.solutions {
        assert!(solution.frames() >= 5);
    }
}

#[test]
fn test_time_budget_applies_to_threaded_search() {
    let world = LineWorld::new(5);
    let mut config = config(4);
    config.timing.time_budget_ms = 80;
    config.timing.polling_interval_ms = 5;

    let started = Instant::now();
    let report = Solver::new(world, config).run(&world.start(0), 60, true);

    assert!(report.cancelled);
    assert!(started.elapsed() < Duration::from_secs(30));
}
