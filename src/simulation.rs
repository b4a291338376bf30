// Contract between the search and a deterministic simulation
//
// The search core only ever talks to a simulation through this trait. It never
// looks inside entities, never inspects rooms or tiles, and never keeps hidden
// state between calls.

use std::fmt::Debug;

use crate::action::Action;
use crate::snapshot::Snapshot;

/// Result of advancing the simulation by one logical step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<E> {
    /// State after the input frame and every automatically advanced frame
    pub state: Snapshot<E>,
    /// Frames the simulation advanced on its own while paused (freeze, cutscene)
    pub forced_frames: u32,
}

/// Deterministic frame-stepped simulation driven by the search
///
/// Implementations are cloned once per worker thread, so each worker owns a
/// private instance. All methods must be pure functions of their arguments:
/// repeated calls with the same snapshot and action yield identical results.
///
/// Preconditions the search relies on without checking:
/// - `heuristic_lower_bound` never overestimates the frames remaining to a goal
/// - `heuristic_lower_bound` is `None` whenever `is_failure` holds
/// - `apply` is deterministic
pub trait Simulation: Clone + Send {
    /// Opaque world object carried inside snapshots
    type Entity: Clone + Debug + Send;

    /// Advances one frame under `action`, then keeps stepping while the
    /// simulation reports itself paused, counting those frames
    fn apply(&self, state: &Snapshot<Self::Entity>, action: Action) -> Transition<Self::Entity>;

    /// True when the tracked subject is absent or dead
    fn is_failure(&self, state: &Snapshot<Self::Entity>) -> bool;

    /// True when the terminal condition holds
    fn is_goal(&self, state: &Snapshot<Self::Entity>) -> bool;

    /// Admissible lower bound on frames to any goal; `None` means unreachable
    fn heuristic_lower_bound(&self, state: &Snapshot<Self::Entity>) -> Option<u32>;

    /// Reduced set of actions worth exploring, in exploration order
    fn legal_actions(&self, state: &Snapshot<Self::Entity>) -> Vec<Action>;

    /// One-line picture of `state` for frame-by-frame replay output
    fn render(&self, state: &Snapshot<Self::Entity>) -> String {
        format!("{:?}", state.entities())
    }
}
