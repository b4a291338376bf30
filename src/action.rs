// Input encoding for the search
// An action is the button state held for one frame, packed as a bitmask

use serde::{Deserialize, Serialize};
use std::fmt;

/// Button state for a single frame
///
/// The search treats actions as opaque symbols; the bit layout only matters to
/// simulations and to the label table used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(u8);

impl Action {
    pub const NONE: Action = Action(0);
    pub const LEFT: Action = Action(1 << 0);
    pub const RIGHT: Action = Action(1 << 1);
    pub const UP: Action = Action(1 << 2);
    pub const DOWN: Action = Action(1 << 3);
    pub const JUMP: Action = Action(1 << 4);
    pub const DASH: Action = Action(1 << 5);

    /// Mask of every button bit
    pub const ALL_BUTTONS: u8 = 0b11_1111;

    /// Builds an action from a raw button code, rejecting unknown bits
    pub const fn from_bits(bits: u8) -> Option<Action> {
        if bits & !Self::ALL_BUTTONS == 0 {
            Some(Action(bits))
        } else {
            None
        }
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Action) -> Action {
        Action(self.0 | other.0)
    }

    pub const fn contains(self, other: Action) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Horizontal direction held: -1 for left, 1 for right, 0 for neither or both
    pub fn horizontal(self) -> i32 {
        match (self.contains(Action::LEFT), self.contains(Action::RIGHT)) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    /// Vertical direction held: -1 for up, 1 for down, 0 for neither or both
    pub fn vertical(self) -> i32 {
        match (self.contains(Action::UP), self.contains(Action::DOWN)) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    /// Human-readable label, if this code is one of the named inputs
    pub fn label(self) -> Option<&'static str> {
        LABELS
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, label)| *label)
    }
}

impl std::ops::BitOr for Action {
    type Output = Action;

    fn bitor(self, rhs: Action) -> Action {
        self.union(rhs)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "buttons {:#08b}", self.0),
        }
    }
}

/// Fixed code-to-label table for reporting
const LABELS: [(u8, &str); 15] = [
    (0, "no input"),
    (1, "left"),
    (2, "right"),
    (16, "neutral jump"),
    (17, "jump left"),
    (18, "jump right"),
    (32, "empty dash"),
    (33, "left dash"),
    (34, "right dash"),
    (36, "up dash"),
    (37, "up-left dash"),
    (38, "up-right dash"),
    (40, "down dash"),
    (41, "down-left dash"),
    (42, "down-right dash"),
];

/// Renders an input path as a comma-separated English sentence
pub fn describe_inputs(inputs: &[Action]) -> String {
    inputs
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders an input path as comma-separated raw button codes
pub fn format_codes(inputs: &[Action]) -> String {
    inputs
        .iter()
        .map(|a| a.bits().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Default reduced action set for a platformer-style simulation
///
/// Always includes "no input". Horizontal movement adds left/right, a jump adds
/// the neutral and directional jumps, and a dash adds all nine dash directions.
/// Down without a dash, or up without a dash, is never worth exploring.
pub fn allowable_actions(h_movement: bool, can_jump: bool, can_dash: bool) -> Vec<Action> {
    let mut actions = vec![Action::NONE];

    if h_movement {
        actions.extend([Action::LEFT, Action::RIGHT]);
    }

    if can_jump {
        actions.push(Action::JUMP);
        if h_movement {
            actions.extend([Action::JUMP | Action::LEFT, Action::JUMP | Action::RIGHT]);
        }
    }

    if can_dash {
        for vertical in [Action::NONE, Action::UP, Action::DOWN] {
            for horizontal in [Action::NONE, Action::LEFT, Action::RIGHT] {
                actions.push(Action::DASH | vertical | horizontal);
            }
        }
    }

    actions
}
