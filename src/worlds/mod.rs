//! Small deterministic simulations for exercising the solver.
//!
//! `line` is the minimal counter from the documentation examples, `corridor` a
//! one-dimensional platformer with dash freeze frames, and `graph` a seeded
//! random transition graph used for admissibility and threading checks.

pub mod corridor;
pub mod graph;
pub mod line;

use std::fmt;
use std::str::FromStr;

use crate::config::WorldConfig;
use crate::error::WorldError;
use crate::simulation::Simulation;
use crate::snapshot::Snapshot;

use corridor::Corridor;
use graph::GraphWorld;
use line::LineWorld;

/// World selector used by the binaries and Search.toml
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldKind {
    Line,
    Corridor,
    Graph,
}

impl FromStr for WorldKind {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(WorldKind::Line),
            "corridor" => Ok(WorldKind::Corridor),
            "graph" => Ok(WorldKind::Graph),
            _ => Err(WorldError::UnknownWorld(s.to_string())),
        }
    }
}

impl fmt::Display for WorldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorldKind::Line => "line",
            WorldKind::Corridor => "corridor",
            WorldKind::Graph => "graph",
        };
        f.write_str(name)
    }
}

/// Receives a concrete world together with its starting snapshot
///
/// The binaries are generic over the simulation type; this lets them pick the
/// world at run time without boxing it.
pub trait WorldVisitor {
    type Output;

    fn visit<S>(self, world: S, root: Snapshot<S::Entity>) -> Self::Output
    where
        S: Simulation + Sync,
        S::Entity: Sync;
}

/// Builds the world described by `config` and hands it to `visitor`
pub fn visit_world<V: WorldVisitor>(config: &WorldConfig, visitor: V) -> Result<V::Output, WorldError> {
    match config.kind.parse::<WorldKind>()? {
        WorldKind::Line => {
            let world = LineWorld::new(config.line_goal);
            let root = world.start(0);
            Ok(visitor.visit(world, root))
        }
        WorldKind::Corridor => {
            let world = Corridor::from_layout(&config.corridor_layout, config.corridor_max_dashes)?
                .forward_only(config.corridor_forward_only);
            let root = world.initial_state();
            Ok(visitor.visit(world, root))
        }
        WorldKind::Graph => {
            let world = GraphWorld::random(config.graph_seed, config.graph_nodes, config.graph_branching)?;
            let root = world.start();
            Ok(visitor.visit(world, root))
        }
    }
}
