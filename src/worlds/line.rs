// One-dimensional counter world
//
// A single walker stands on a line of cells 0..=goal. "no input" stays put,
// "right" advances one cell and saturates at the goal. No forced frames.

use crate::action::Action;
use crate::simulation::{Simulation, Transition};
use crate::snapshot::{ProgressFlags, Snapshot};

/// Position of the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Walker(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWorld {
    goal: u8,
}

impl LineWorld {
    pub fn new(goal: u8) -> Self {
        LineWorld { goal }
    }

    /// Snapshot with the walker at `position` (clamped to the goal)
    pub fn start(&self, position: u8) -> Snapshot<Walker> {
        Snapshot::new(vec![Walker(position.min(self.goal))], ProgressFlags::default())
    }

    /// Snapshot without a walker, the failure state
    pub fn empty(&self) -> Snapshot<Walker> {
        Snapshot::new(Vec::new(), ProgressFlags::default())
    }

    pub fn position(state: &Snapshot<Walker>) -> Option<u8> {
        state.entities().first().map(|w| w.0)
    }
}

impl Simulation for LineWorld {
    type Entity = Walker;

    fn apply(&self, state: &Snapshot<Walker>, action: Action) -> Transition<Walker> {
        let next = match Self::position(state) {
            Some(pos) if action.contains(Action::RIGHT) => self.start(pos.saturating_add(1)),
            _ => state.clone(),
        };
        Transition {
            state: next,
            forced_frames: 0,
        }
    }

    fn is_failure(&self, state: &Snapshot<Walker>) -> bool {
        Self::position(state).is_none()
    }

    fn is_goal(&self, state: &Snapshot<Walker>) -> bool {
        Self::position(state) == Some(self.goal)
    }

    fn heuristic_lower_bound(&self, state: &Snapshot<Walker>) -> Option<u32> {
        Self::position(state).map(|pos| u32::from(self.goal.saturating_sub(pos)))
    }

    fn legal_actions(&self, state: &Snapshot<Walker>) -> Vec<Action> {
        if self.is_failure(state) {
            Vec::new()
        } else {
            vec![Action::NONE, Action::RIGHT]
        }
    }
}
