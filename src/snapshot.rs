// Search nodes
//
// A Snapshot is an owned, point-in-time copy of the simulated world. The search
// never mutates one in place: every transition builds a new Snapshot, and a Task
// takes ownership of the Snapshot it carries.

use crate::action::Action;

/// Scalar progress flags owned by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProgressFlags {
    /// Dash charges restored on landing
    pub max_djump: u8,
    pub has_dashed: bool,
    pub has_key: bool,
    pub got_fruit: bool,
}

/// Immutable copy of simulation state used as a search tree node
///
/// Entity order is preserved exactly as the simulation produced it. Entities are
/// held by value, so cloning a Snapshot never shares substructure with the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot<E> {
    entities: Vec<E>,
    flags: ProgressFlags,
}

impl<E> Snapshot<E> {
    pub fn new(entities: Vec<E>, flags: ProgressFlags) -> Self {
        Snapshot { entities, flags }
    }

    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    pub fn flags(&self) -> ProgressFlags {
        self.flags
    }

    /// First entity matching the predicate, in simulation order
    pub fn find<P>(&self, predicate: P) -> Option<&E>
    where
        P: Fn(&E) -> bool,
    {
        self.entities.iter().find(|e| predicate(e))
    }

    pub fn contains<P>(&self, predicate: P) -> bool
    where
        P: Fn(&E) -> bool,
    {
        self.entities.iter().any(predicate)
    }

    /// Consumes the snapshot, handing its parts to a simulation building the next one
    pub fn into_parts(self) -> (Vec<E>, ProgressFlags) {
        (self.entities, self.flags)
    }
}

/// One frontier node waiting to be expanded by some worker
#[derive(Debug)]
pub struct Task<E> {
    pub snapshot: Snapshot<E>,
    pub remaining: u32,
    pub inputs: Vec<Action>,
}

impl<E> Task<E> {
    pub fn new(snapshot: Snapshot<E>, remaining: u32, inputs: Vec<Action>) -> Self {
        Task {
            snapshot,
            remaining,
            inputs,
        }
    }

    /// Root task for one iterative-deepening pass
    pub fn root(snapshot: Snapshot<E>, depth: u32) -> Self {
        Task::new(snapshot, depth, Vec::new())
    }
}
