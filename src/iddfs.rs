//! Depth-bounded branch-and-bound search core
//!
//! One `Searcher::expand` call explores the subtree under a snapshot with a fixed
//! frame budget. The same code runs in sequential mode and inside every worker
//! thread; the only difference is the `Frontier` it may hand children to.

use log::debug;
use std::iter;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::action::Action;
use crate::profile;
use crate::profiler::Category;
use crate::simulation::Simulation;
use crate::snapshot::{Snapshot, Task};
use crate::solution::{Solution, SolutionSet};
use crate::stats::SearchStats;

/// Destination for child nodes that another worker could expand
pub trait Frontier<E> {
    /// Lock-free hint: is anyone waiting for work right now
    fn wants_work(&self) -> bool;

    /// Hands a task to another worker, or gives it back when nobody should take it
    fn publish(&self, task: Task<E>) -> Result<(), Task<E>>;
}

/// Frontier for single-threaded search: every child is expanded inline
#[derive(Debug, Default, Clone, Copy)]
pub struct Inline;

impl<E> Frontier<E> for Inline {
    fn wants_work(&self) -> bool {
        false
    }

    fn publish(&self, task: Task<E>) -> Result<(), Task<E>> {
        Err(task)
    }
}

/// Search core bound to one simulation instance and one frontier
pub struct Searcher<'a, S: Simulation, F: Frontier<S::Entity>> {
    sim: &'a S,
    frontier: &'a F,
    cancel: &'a AtomicBool,
    solutions: SolutionSet,
    stats: SearchStats,
}

impl<'a, S, F> Searcher<'a, S, F>
where
    S: Simulation,
    F: Frontier<S::Entity>,
{
    pub fn new(sim: &'a S, frontier: &'a F, cancel: &'a AtomicBool) -> Self {
        Searcher {
            sim,
            frontier,
            cancel,
            solutions: SolutionSet::new(),
            stats: SearchStats::default(),
        }
    }

    /// Explores every path of exactly `remaining` frames below `state`
    ///
    /// Records each path ending in a goal and returns whether this subtree
    /// produced one. Children published to the frontier do not contribute to the
    /// return value; whoever expands them records their solutions.
    ///
    /// `inputs` holds the path from the root to `state` and is restored to that
    /// content before returning.
    pub fn expand(&mut self, state: &Snapshot<S::Entity>, remaining: u32, inputs: &mut Vec<Action>) -> bool {
        if self.cancel.load(Ordering::Relaxed) {
            return false;
        }
        self.stats.nodes_visited += 1;

        if remaining == 0 {
            self.stats.goal_checks += 1;
            let reached = profile!(Category::GoalCheck, self.sim.is_goal(state));
            if reached {
                self.record(inputs);
            }
            return reached;
        }

        if self.sim.is_failure(state) {
            self.stats.failure_prunes += 1;
            return false;
        }

        let within_budget = match profile!(Category::Heuristic, self.sim.heuristic_lower_bound(state)) {
            Some(bound) => bound <= remaining,
            None => false,
        };
        if !within_budget {
            self.stats.heuristic_prunes += 1;
            return false;
        }

        self.stats.nodes_expanded += 1;
        let actions = profile!(Category::LegalActions, self.sim.legal_actions(state));
        let mark = inputs.len();
        let mut found = false;

        for action in actions {
            let transition = profile!(Category::Apply, self.sim.apply(state, action));
            let forced = transition.forced_frames;

            // Budget first: the markers are only written for branches that fit
            let child_remaining = match forced.checked_add(1).and_then(|cost| remaining.checked_sub(cost)) {
                Some(left) => left,
                None => {
                    self.stats.forced_frame_cutoffs += 1;
                    continue;
                }
            };

            inputs.push(action);
            inputs.extend(iter::repeat(Action::NONE).take(forced as usize));

            let mut child = transition.state;
            if self.frontier.wants_work() {
                let task = Task::new(child, child_remaining, inputs.clone());
                match self.frontier.publish(task) {
                    Ok(()) => {
                        self.stats.tasks_published += 1;
                        inputs.truncate(mark);
                        continue;
                    }
                    Err(task) => child = task.snapshot,
                }
            }

            if self.expand(&child, child_remaining, inputs) {
                found = true;
            }
            inputs.truncate(mark);
        }

        debug_assert_eq!(inputs.len(), mark, "input path leaked across siblings");
        found
    }

    /// Expands a task pulled from a queue, using its path as the backtracking buffer
    pub fn expand_task(&mut self, task: Task<S::Entity>) -> bool {
        let Task {
            snapshot,
            remaining,
            mut inputs,
        } = task;
        self.stats.tasks_taken += 1;
        self.expand(&snapshot, remaining, &mut inputs)
    }

    fn record(&mut self, inputs: &[Action]) {
        debug!("  inputs: {} ({} frames)", crate::action::format_codes(inputs), inputs.len());
        self.stats.solutions += 1;
        self.solutions.push(Solution::new(inputs.to_vec()));
    }

    pub fn solutions(&self) -> &SolutionSet {
        &self.solutions
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn into_results(self) -> (SolutionSet, SearchStats) {
        (self.solutions, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Transition;
    use crate::snapshot::ProgressFlags;
    use crate::worlds::graph::{Estimate, GraphWorld};
    use crate::worlds::line::LineWorld;
    use parking_lot::Mutex;

    #[test]
    fn test_depth_zero_checks_goal_only() {
        let world = LineWorld::new(5);
        let cancel = AtomicBool::new(false);
        let mut searcher = Searcher::new(&world, &Inline, &cancel);
        let mut inputs = Vec::new();

        assert!(!searcher.expand(&world.start(0), 0, &mut inputs));
        assert!(searcher.expand(&world.start(5), 0, &mut inputs));
        assert_eq!(searcher.solutions().len(), 1);
        assert!(searcher.solutions().first().unwrap().inputs.is_empty());
        assert_eq!(searcher.stats().goal_checks, 2);
    }

    #[test]
    fn test_expand_restores_input_buffer() {
        let world = LineWorld::new(5);
        let cancel = AtomicBool::new(false);
        let mut searcher = Searcher::new(&world, &Inline, &cancel);

        let prefix = vec![Action::NONE, Action::RIGHT];
        for depth in 0..8 {
            let mut inputs = prefix.clone();
            searcher.expand(&world.start(0), depth, &mut inputs);
            assert_eq!(inputs, prefix, "buffer changed after depth {}", depth);
        }
    }

    #[test]
    fn test_heuristic_prunes_hopeless_budget() {
        let world = LineWorld::new(5);
        let cancel = AtomicBool::new(false);
        let mut searcher = Searcher::new(&world, &Inline, &cancel);

        assert!(!searcher.expand(&world.start(0), 4, &mut Vec::new()));
        assert_eq!(searcher.stats().nodes_expanded, 0);
        assert_eq!(searcher.stats().heuristic_prunes, 1);
    }

    #[test]
    fn test_cancelled_search_visits_nothing() {
        let world = LineWorld::new(5);
        let cancel = AtomicBool::new(true);
        let mut searcher = Searcher::new(&world, &Inline, &cancel);

        assert!(!searcher.expand(&world.start(0), 5, &mut Vec::new()));
        assert_eq!(searcher.stats().nodes_visited, 0);
    }

    /// Frontier that accepts every child, for checking published paths
    struct Collect(Mutex<Vec<(u32, Vec<Action>)>>);

    impl<E> Frontier<E> for Collect {
        fn wants_work(&self) -> bool {
            true
        }

        fn publish(&self, task: Task<E>) -> Result<(), Task<E>> {
            self.0.lock().push((task.remaining, task.inputs));
            Ok(())
        }
    }

    #[test]
    fn test_published_children_carry_their_paths() {
        let world = LineWorld::new(5);
        let cancel = AtomicBool::new(false);
        let frontier = Collect(Mutex::new(Vec::new()));
        let mut searcher = Searcher::new(&world, &frontier, &cancel);

        let mut inputs = vec![Action::RIGHT];
        let found = searcher.expand(&world.start(1), 4, &mut inputs);

        assert!(!found, "published children do not count as local successes");
        assert_eq!(inputs, vec![Action::RIGHT]);
        let published = frontier.0.lock().clone();
        assert_eq!(
            published,
            vec![
                (3, vec![Action::RIGHT, Action::NONE]),
                (3, vec![Action::RIGHT, Action::RIGHT]),
            ]
        );
        assert_eq!(searcher.stats().tasks_published, 2);
    }

    #[test]
    fn test_forced_frames_past_budget_are_cut_off() {
        // 0 -(right dash, two frozen frames)-> 1 (goal)
        let world = GraphWorld::from_edges(2, &[(0, Action::DASH | Action::RIGHT, 1, 2)], &[1], &[])
            .unwrap()
            .with_estimate(Estimate::Zero);
        let cancel = AtomicBool::new(false);
        let mut searcher = Searcher::new(&world, &Inline, &cancel);
        let prefix = vec![Action::JUMP];

        for budget in [1, 2] {
            let mut inputs = prefix.clone();
            assert!(!searcher.expand(&world.start(), budget, &mut inputs));
            assert_eq!(inputs, prefix, "buffer changed after budget {}", budget);
        }
        assert_eq!(searcher.stats().forced_frame_cutoffs, 2);
        assert!(searcher.solutions().is_empty());

        let mut inputs = prefix.clone();
        assert!(searcher.expand(&world.start(), 3, &mut inputs));
        assert_eq!(inputs, prefix);
        assert_eq!(searcher.stats().forced_frame_cutoffs, 2);
        assert_eq!(
            searcher.solutions().first().map(|s| s.inputs.clone()),
            Some(vec![Action::JUMP, Action::DASH | Action::RIGHT, Action::NONE, Action::NONE])
        );

        // Budget 4 leaves one frame at the goal node, which has no inputs
        assert!(!searcher.expand(&world.start(), 4, &mut Vec::new()));
        assert_eq!(searcher.solutions().len(), 1);
    }

    /// Every input freezes the game for `self.0` frames
    #[derive(Clone)]
    struct LongFreeze(u32);

    impl Simulation for LongFreeze {
        type Entity = u8;

        fn apply(&self, state: &Snapshot<u8>, _action: Action) -> Transition<u8> {
            Transition {
                state: state.clone(),
                forced_frames: self.0,
            }
        }

        fn is_failure(&self, _state: &Snapshot<u8>) -> bool {
            false
        }

        fn is_goal(&self, _state: &Snapshot<u8>) -> bool {
            true
        }

        fn heuristic_lower_bound(&self, _state: &Snapshot<u8>) -> Option<u32> {
            Some(0)
        }

        fn legal_actions(&self, _state: &Snapshot<u8>) -> Vec<Action> {
            vec![Action::DASH]
        }
    }

    #[test]
    fn test_huge_freeze_is_cut_off_without_writing_markers() {
        let root = Snapshot::new(vec![0u8], ProgressFlags::default());
        let cancel = AtomicBool::new(false);

        for forced in [u32::MAX - 1, u32::MAX] {
            let world = LongFreeze(forced);
            let mut searcher = Searcher::new(&world, &Inline, &cancel);
            let mut inputs = Vec::new();

            assert!(!searcher.expand(&root, 3, &mut inputs));
            assert_eq!(searcher.stats().forced_frame_cutoffs, 1);
            assert!(inputs.is_empty());
            assert_eq!(inputs.capacity(), 0, "markers were written for a cut-off branch");
            assert!(searcher.solutions().is_empty());
        }
    }
}
