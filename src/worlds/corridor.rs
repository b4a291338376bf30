// Side-scrolling corridor with spikes, jumps, dashes and balloons
//
// Layout characters:
//   p  start cell        .  floor
//   ^  spikes            b  balloon (refills dashes once, then pops)
//   E  exit
//
// The runner moves one cell per frame. A jump keeps it airborne for two more
// frames, during which spikes below are harmless. A dash covers four cells
// (three on a diagonal) and freezes the game for two frames afterwards.
// Touching the ground on spikes kills the runner; reaching the exit replaces it
// with a spawn marker, which is the goal.

use crate::action::{allowable_actions, Action};
use crate::error::WorldError;
use crate::simulation::{Simulation, Transition};
use crate::snapshot::{ProgressFlags, Snapshot};

const DASH_DISTANCE: i32 = 4;
const DIAGONAL_DASH_DISTANCE: i32 = 3;
const DASH_FREEZE_FRAMES: u32 = 2;
const JUMP_AIRTIME: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tile {
    Floor,
    Spikes,
    Exit,
}

/// Objects living in a corridor snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Runner { x: u16, airtime: u8, dashes: u8 },
    Balloon { x: u16 },
    /// Left behind when the runner reaches the exit
    Spawn { x: u16 },
}

#[derive(Debug, Clone)]
pub struct Corridor {
    tiles: Vec<Tile>,
    start: u16,
    exit: u16,
    balloons: Vec<u16>,
    max_dashes: u8,
    forward_only: bool,
}

impl Corridor {
    /// Parses a one-line layout; whitespace is ignored
    pub fn from_layout(layout: &str, max_dashes: u8) -> Result<Self, WorldError> {
        let mut tiles = Vec::new();
        let mut start = None;
        let mut exit = None;
        let mut balloons = Vec::new();

        for (column, ch) in layout.chars().filter(|c| !c.is_whitespace()).enumerate() {
            let x = u16::try_from(column)
                .map_err(|_| WorldError::InvalidParameter(format!("layout longer than {} cells", u16::MAX)))?;
            let tile = match ch {
                '.' => Tile::Floor,
                '^' => Tile::Spikes,
                'b' => {
                    balloons.push(x);
                    Tile::Floor
                }
                'p' => {
                    if start.replace(x).is_some() {
                        return Err(WorldError::DuplicateStart);
                    }
                    Tile::Floor
                }
                'E' => {
                    exit.get_or_insert(x);
                    Tile::Exit
                }
                other => return Err(WorldError::UnknownTile { ch: other, column }),
            };
            tiles.push(tile);
        }

        let start = start.ok_or(WorldError::MissingStart)?;
        let exit = exit.ok_or(WorldError::MissingExit)?;
        if exit <= start {
            return Err(WorldError::InvalidParameter(
                "exit must lie to the right of the start".to_string(),
            ));
        }

        Ok(Corridor {
            tiles,
            start,
            exit,
            balloons,
            max_dashes,
            forward_only: false,
        })
    }

    /// Drop every input holding left from the explored action set
    pub fn forward_only(mut self, enabled: bool) -> Self {
        self.forward_only = enabled;
        self
    }

    pub fn initial_state(&self) -> Snapshot<Piece> {
        let mut entities = vec![Piece::Runner {
            x: self.start,
            airtime: 0,
            dashes: self.max_dashes,
        }];
        entities.extend(self.balloons.iter().map(|&x| Piece::Balloon { x }));

        let flags = ProgressFlags {
            max_djump: self.max_dashes,
            ..ProgressFlags::default()
        };
        Snapshot::new(entities, flags)
    }

    /// (x, airtime, dashes) of the runner, if alive and still in the corridor
    pub fn runner(state: &Snapshot<Piece>) -> Option<(u16, u8, u8)> {
        state.entities().iter().find_map(|piece| match *piece {
            Piece::Runner { x, airtime, dashes } => Some((x, airtime, dashes)),
            _ => None,
        })
    }

    fn has_spawned(state: &Snapshot<Piece>) -> bool {
        state.contains(|piece| matches!(piece, Piece::Spawn { .. }))
    }
}

impl Simulation for Corridor {
    type Entity = Piece;

    fn apply(&self, state: &Snapshot<Piece>, action: Action) -> Transition<Piece> {
        let Some((x, airtime, dashes)) = Self::runner(state) else {
            return Transition {
                state: state.clone(),
                forced_frames: 0,
            };
        };
        let (entities, mut flags) = state.clone().into_parts();

        let dashing = action.contains(Action::DASH) && dashes > 0;
        let (dx, airtime, mut dashes, forced_frames) = if dashing {
            flags.has_dashed = true;
            let reach = if action.vertical() == 0 {
                DASH_DISTANCE
            } else {
                DIAGONAL_DASH_DISTANCE
            };
            let lifted = match action.vertical() {
                -1 => JUMP_AIRTIME,
                1 => 0,
                _ => airtime.saturating_sub(1),
            };
            (action.horizontal() * reach, lifted, dashes - 1, DASH_FREEZE_FRAMES)
        } else if action.contains(Action::JUMP) && airtime == 0 {
            (action.horizontal(), JUMP_AIRTIME, dashes, 0)
        } else {
            (action.horizontal(), airtime.saturating_sub(1), dashes, 0)
        };

        let last = i32::try_from(self.tiles.len().saturating_sub(1)).unwrap_or(i32::MAX);
        let next_x = (i32::from(x) + dx).clamp(0, last);
        let next_x = u16::try_from(next_x).unwrap_or(u16::MAX);

        let mut reached_exit = false;
        let mut alive = true;
        if next_x >= self.exit {
            reached_exit = true;
        } else if airtime == 0 {
            if self.tiles[usize::from(next_x)] == Tile::Spikes {
                alive = false;
            } else {
                dashes = flags.max_djump;
            }
        }

        let mut popped = false;
        let mut next = Vec::with_capacity(entities.len());
        for piece in entities {
            match piece {
                Piece::Runner { .. } if reached_exit => next.push(Piece::Spawn { x: self.exit }),
                // re-inserted below when it survives the frame
                Piece::Runner { .. } => {}
                Piece::Balloon { x: bx } if alive && !reached_exit && bx == next_x && !popped => {
                    popped = true;
                }
                other => next.push(other),
            }
        }
        if popped {
            dashes = flags.max_djump;
        }
        if alive && !reached_exit {
            next.insert(
                0,
                Piece::Runner {
                    x: next_x,
                    airtime,
                    dashes,
                },
            );
        }

        Transition {
            state: Snapshot::new(next, flags),
            forced_frames,
        }
    }

    fn is_failure(&self, state: &Snapshot<Piece>) -> bool {
        Self::runner(state).is_none() && !Self::has_spawned(state)
    }

    fn is_goal(&self, state: &Snapshot<Piece>) -> bool {
        Self::has_spawned(state)
    }

    /// Fastest travel is a chain of dashes: four cells every three frames
    fn heuristic_lower_bound(&self, state: &Snapshot<Piece>) -> Option<u32> {
        if Self::has_spawned(state) {
            return Some(0);
        }
        let (x, _, _) = Self::runner(state)?;
        let distance = u32::from(self.exit.saturating_sub(x));
        Some((3 * distance).div_ceil(4))
    }

    fn legal_actions(&self, state: &Snapshot<Piece>) -> Vec<Action> {
        if Self::has_spawned(state) {
            return vec![Action::NONE];
        }
        let Some((_, airtime, dashes)) = Self::runner(state) else {
            return Vec::new();
        };

        let mut actions = allowable_actions(true, airtime == 0, dashes > 0);
        if self.forward_only {
            actions.retain(|action| !action.contains(Action::LEFT));
        }
        actions
    }

    /// Draws the layout with the current pieces on top
    fn render(&self, state: &Snapshot<Piece>) -> String {
        let mut cells: Vec<char> = self
            .tiles
            .iter()
            .map(|tile| match tile {
                Tile::Floor => '.',
                Tile::Spikes => '^',
                Tile::Exit => 'E',
            })
            .collect();

        for piece in state.entities() {
            let (x, ch) = match *piece {
                Piece::Balloon { x } => (x, 'b'),
                Piece::Runner { x, airtime: 0, .. } => (x, 'p'),
                Piece::Runner { x, .. } => (x, 'j'),
                Piece::Spawn { x } => (x, '*'),
            };
            if let Some(cell) = cells.get_mut(usize::from(x)) {
                *cell = ch;
            }
        }

        let mut out: String = cells.into_iter().collect();
        let flags = state.flags();
        out.push_str(&format!("  dashed={}", flags.has_dashed));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(world: &Corridor, state: &Snapshot<Piece>, action: Action) -> Snapshot<Piece> {
        world.apply(state, action).state
    }

    #[test]
    fn test_layout_errors() {
        assert_eq!(Corridor::from_layout("..E", 1).unwrap_err(), WorldError::MissingStart);
        assert_eq!(Corridor::from_layout("p..", 1).unwrap_err(), WorldError::MissingExit);
        assert_eq!(Corridor::from_layout("p.pE", 1).unwrap_err(), WorldError::DuplicateStart);
        assert_eq!(
            Corridor::from_layout("p.#E", 1).unwrap_err(),
            WorldError::UnknownTile { ch: '#', column: 2 }
        );
        assert!(matches!(
            Corridor::from_layout("E.p", 1),
            Err(WorldError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let world = Corridor::from_layout("p . ^ E", 0).unwrap();
        assert_eq!(world.tiles.len(), 4);
        assert_eq!(world.exit, 3);
    }

    #[test]
    fn test_walking_onto_spikes_is_fatal() {
        let world = Corridor::from_layout("p^E", 1).unwrap();
        let dead = step(&world, &world.initial_state(), Action::RIGHT);
        assert!(world.is_failure(&dead));
        assert_eq!(world.heuristic_lower_bound(&dead), None);
        assert!(world.legal_actions(&dead).is_empty());
    }

    #[test]
    fn test_jump_clears_spikes() {
        let world = Corridor::from_layout("p^E", 1).unwrap();
        let airborne = step(&world, &world.initial_state(), Action::JUMP | Action::RIGHT);
        assert_eq!(Corridor::runner(&airborne), Some((1, 2, 1)));
        assert!(!world.is_failure(&airborne));

        let done = step(&world, &airborne, Action::RIGHT);
        assert!(world.is_goal(&done));
        assert!(!world.is_failure(&done));
        assert_eq!(world.legal_actions(&done), vec![Action::NONE]);
    }

    #[test]
    fn test_dash_freezes_and_spends_charge() {
        let world = Corridor::from_layout("p.......E", 1).unwrap();
        let t = world.apply(&world.initial_state(), Action::DASH | Action::RIGHT);
        assert_eq!(t.forced_frames, DASH_FREEZE_FRAMES);
        assert!(t.state.flags().has_dashed);
        // Grounded after the dash, so the charge comes straight back
        assert_eq!(Corridor::runner(&t.state), Some((4, 0, 1)));

        let lifted = world.apply(&world.initial_state(), Action::DASH | Action::UP | Action::RIGHT);
        assert_eq!(Corridor::runner(&lifted.state), Some((3, 2, 0)));
    }

    #[test]
    fn test_dash_without_charge_is_a_plain_move() {
        let world = Corridor::from_layout("p....E", 0).unwrap();
        let t = world.apply(&world.initial_state(), Action::DASH | Action::RIGHT);
        assert_eq!(t.forced_frames, 0);
        assert_eq!(Corridor::runner(&t.state), Some((1, 0, 0)));
        assert!(!t.state.flags().has_dashed);
    }

    #[test]
    fn test_balloon_refills_and_pops() {
        let world = Corridor::from_layout("p.b....E", 1).unwrap();
        let up = step(&world, &world.initial_state(), Action::DASH | Action::UP);
        assert_eq!(Corridor::runner(&up), Some((0, 2, 0)));

        let drifting = step(&world, &up, Action::RIGHT);
        let on_balloon = step(&world, &drifting, Action::RIGHT);
        assert_eq!(Corridor::runner(&on_balloon), Some((2, 0, 1)));
        assert!(!on_balloon.contains(|p| matches!(p, Piece::Balloon { .. })));
    }

    #[test]
    fn test_heuristic_never_exceeds_dash_chain() {
        let world = Corridor::from_layout("p.......E", 1).unwrap();
        // Eight cells take two dashes and their freezes
        assert_eq!(world.heuristic_lower_bound(&world.initial_state()), Some(6));
    }

    #[test]
    fn test_forward_only_drops_left_inputs() {
        let world = Corridor::from_layout("p..E", 1).unwrap().forward_only(true);
        let actions = world.legal_actions(&world.initial_state());
        assert!(actions.iter().all(|a| !a.contains(Action::LEFT)));
        assert_eq!(actions.len(), 10);
    }

    #[test]
    fn test_render_marks_pieces() {
        let world = Corridor::from_layout("p.b^E", 1).unwrap();
        assert_eq!(world.render(&world.initial_state()), "p.b^E  dashed=false");
    }
}
