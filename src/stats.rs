// Search counters
//
// Each worker accumulates its own counters without synchronization; the
// coordinator merges them once the workers have been joined.

use std::fmt;

/// Node and work-distribution counters for one search pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Calls into the search core, one per visited node
    pub nodes_visited: u64,
    /// Nodes whose children were generated
    pub nodes_expanded: u64,
    /// Leaves checked against the goal condition
    pub goal_checks: u64,
    /// Nodes pruned because the heuristic exceeded the remaining budget
    pub heuristic_prunes: u64,
    /// Nodes pruned because the subject is dead or absent
    pub failure_prunes: u64,
    /// Children abandoned because forced frames overran the budget
    pub forced_frame_cutoffs: u64,
    /// Children handed to the shared queue instead of expanded inline
    pub tasks_published: u64,
    /// Tasks pulled from the shared queue
    pub tasks_taken: u64,
    /// Solutions recorded
    pub solutions: u64,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes_visited += other.nodes_visited;
        self.nodes_expanded += other.nodes_expanded;
        self.goal_checks += other.goal_checks;
        self.heuristic_prunes += other.heuristic_prunes;
        self.failure_prunes += other.failure_prunes;
        self.forced_frame_cutoffs += other.forced_frame_cutoffs;
        self.tasks_published += other.tasks_published;
        self.tasks_taken += other.tasks_taken;
        self.solutions += other.solutions;
    }

    /// Total pruned nodes and children, for any reason
    pub fn pruned(&self) -> u64 {
        self.heuristic_prunes + self.failure_prunes + self.forced_frame_cutoffs
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited={} expanded={} goal_checks={} pruned={} (heuristic={}, failure={}, forced={}) published={} taken={} solutions={}",
            self.nodes_visited,
            self.nodes_expanded,
            self.goal_checks,
            self.pruned(),
            self.heuristic_prunes,
            self.failure_prunes,
            self.forced_frame_cutoffs,
            self.tasks_published,
            self.tasks_taken,
            self.solutions
        )
    }
}
