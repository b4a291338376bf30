// Seeded random transition graph
//
// Nodes are states, each outgoing edge is labelled with a distinct action and may
// carry forced frames. Entering a deadly node removes the visitor. The heuristic
// is derived from exact shortest distances to the goal set, so admissibility can
// be checked against brute force.

use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::action::Action;
use crate::error::WorldError;
use crate::simulation::{Simulation, Transition};
use crate::snapshot::{ProgressFlags, Snapshot};

/// Actions a random graph draws its edge labels from
const PALETTE: [Action; 6] = [
    Action::RIGHT,
    Action::JUMP.union(Action::RIGHT),
    Action::DASH.union(Action::RIGHT),
    Action::NONE,
    Action::LEFT,
    Action::DASH.union(Action::UP).union(Action::RIGHT),
];

/// The single entity of a graph snapshot: the node being visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Visitor(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub action: Action,
    pub target: u16,
    pub forced_frames: u32,
}

/// How the lower bound is derived from the exact distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Estimate {
    #[default]
    Halved,
    Exact,
    /// Always 0, which disables heuristic pruning
    Zero,
}

#[derive(Debug, Clone)]
pub struct GraphWorld {
    edges: Vec<Vec<Edge>>,
    goal: Vec<bool>,
    deadly: Vec<bool>,
    distance: Vec<Option<u32>>,
    estimate: Estimate,
}

impl GraphWorld {
    /// Builds a graph from `(from, action, to, forced_frames)` edges
    pub fn from_edges(
        nodes: usize,
        edges: &[(u16, Action, u16, u32)],
        goals: &[u16],
        deadly: &[u16],
    ) -> Result<Self, WorldError> {
        if nodes == 0 || nodes > usize::from(u16::MAX) {
            return Err(WorldError::InvalidParameter(format!(
                "graph needs between 1 and {} nodes, got {}",
                u16::MAX,
                nodes
            )));
        }
        let check = |node: u16| -> Result<usize, WorldError> {
            let index = usize::from(node);
            if index < nodes {
                Ok(index)
            } else {
                Err(WorldError::InvalidParameter(format!("node {} out of range", node)))
            }
        };

        let mut adjacency = vec![Vec::new(); nodes];
        for &(from, action, target, forced_frames) in edges {
            let out: &mut Vec<Edge> = &mut adjacency[check(from)?];
            check(target)?;
            if out.iter().any(|e| e.action == action) {
                return Err(WorldError::InvalidParameter(format!(
                    "node {} has two edges for input {}",
                    from, action
                )));
            }
            out.push(Edge {
                action,
                target,
                forced_frames,
            });
        }

        let mut goal = vec![false; nodes];
        for &node in goals {
            goal[check(node)?] = true;
        }
        let mut dead = vec![false; nodes];
        for &node in deadly {
            dead[check(node)?] = true;
        }

        let distance = shortest_distances(&adjacency, &goal, &dead);
        Ok(GraphWorld {
            edges: adjacency,
            goal,
            deadly: dead,
            distance,
            estimate: Estimate::default(),
        })
    }

    /// Random graph reproducible from `seed`
    ///
    /// Node 0 is the start and the last node is always a goal. Every node gets
    /// between one and `branching` edges with distinct actions.
    pub fn random(seed: u64, nodes: usize, branching: usize) -> Result<Self, WorldError> {
        if nodes < 2 {
            return Err(WorldError::InvalidParameter(format!(
                "random graph needs at least 2 nodes, got {}",
                nodes
            )));
        }
        if branching == 0 || branching > PALETTE.len() {
            return Err(WorldError::InvalidParameter(format!(
                "branching must be between 1 and {}, got {}",
                PALETTE.len(),
                branching
            )));
        }
        let node_count = u16::try_from(nodes)
            .map_err(|_| WorldError::InvalidParameter(format!("too many nodes: {}", nodes)))?;

        let mut rng = StdRng::seed_from_u64(seed);
        let last = node_count - 1;
        let mut goals = vec![last];
        if nodes > 3 && rng.random_bool(0.5) {
            goals.push(rng.random_range(1..last));
        }

        let deadly: Vec<u16> = (1..last)
            .filter(|n| !goals.contains(n))
            .filter(|_| rng.random_bool(0.1))
            .collect();

        let mut edges = Vec::new();
        for from in 0..node_count {
            let mut palette = PALETTE;
            palette.shuffle(&mut rng);
            let count = rng.random_range(1..=branching);
            for &action in &palette[..count] {
                let target = rng.random_range(0..node_count);
                let forced = if rng.random_bool(0.25) {
                    rng.random_range(1..=2)
                } else {
                    0
                };
                edges.push((from, action, target, forced));
            }
        }

        Self::from_edges(nodes, &edges, &goals, &deadly)
    }

    pub fn with_estimate(mut self, estimate: Estimate) -> Self {
        self.estimate = estimate;
        self
    }

    pub fn start(&self) -> Snapshot<Visitor> {
        self.at(0)
    }

    pub fn at(&self, node: u16) -> Snapshot<Visitor> {
        Snapshot::new(vec![Visitor(node)], ProgressFlags::default())
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self, node: u16) -> &[Edge] {
        self.edges.get(usize::from(node)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_deadly(&self, node: u16) -> bool {
        self.deadly.get(usize::from(node)).copied().unwrap_or(false)
    }

    /// Fewest frames from `node` to any goal, counting forced frames
    pub fn distance(&self, node: u16) -> Option<u32> {
        self.distance.get(usize::from(node)).copied().flatten()
    }

    fn visitor(state: &Snapshot<Visitor>) -> Option<u16> {
        state.entities().first().map(|v| v.0)
    }
}

/// Multi-source Dijkstra over reversed edges, starting from every goal node
fn shortest_distances(adjacency: &[Vec<Edge>], goal: &[bool], deadly: &[bool]) -> Vec<Option<u32>> {
    let mut reverse: Vec<Vec<(usize, u32)>> = vec![Vec::new(); adjacency.len()];
    for (from, out) in adjacency.iter().enumerate() {
        for edge in out {
            let to = usize::from(edge.target);
            if !deadly[to] {
                reverse[to].push((from, edge.forced_frames + 1));
            }
        }
    }

    let mut distance = vec![None; adjacency.len()];
    let mut heap = BinaryHeap::new();
    for node in (0..adjacency.len()).filter(|&n| goal[n] && !deadly[n]) {
        distance[node] = Some(0);
        heap.push(Reverse((0u32, node)));
    }

    while let Some(Reverse((dist, node))) = heap.pop() {
        if distance[node].is_some_and(|best| dist > best) {
            continue;
        }
        for &(prev, cost) in &reverse[node] {
            let candidate = dist.saturating_add(cost);
            if distance[prev].map_or(true, |best| candidate < best) {
                distance[prev] = Some(candidate);
                heap.push(Reverse((candidate, prev)));
            }
        }
    }
    distance
}

impl Simulation for GraphWorld {
    type Entity = Visitor;

    fn apply(&self, state: &Snapshot<Visitor>, action: Action) -> Transition<Visitor> {
        let edge = Self::visitor(state).and_then(|node| self.edges(node).iter().find(|e| e.action == action));
        match edge {
            Some(edge) if self.is_deadly(edge.target) => Transition {
                state: Snapshot::new(Vec::new(), state.flags()),
                forced_frames: edge.forced_frames,
            },
            Some(edge) => Transition {
                state: self.at(edge.target),
                forced_frames: edge.forced_frames,
            },
            None => Transition {
                state: state.clone(),
                forced_frames: 0,
            },
        }
    }

    fn is_failure(&self, state: &Snapshot<Visitor>) -> bool {
        Self::visitor(state).is_none()
    }

    fn is_goal(&self, state: &Snapshot<Visitor>) -> bool {
        Self::visitor(state).is_some_and(|node| self.goal.get(usize::from(node)).copied().unwrap_or(false))
    }

    fn heuristic_lower_bound(&self, state: &Snapshot<Visitor>) -> Option<u32> {
        let node = Self::visitor(state)?;
        match self.estimate {
            Estimate::Zero => Some(0),
            Estimate::Exact => self.distance(node),
            Estimate::Halved => self.distance(node).map(|d| d / 2),
        }
    }

    fn legal_actions(&self, state: &Snapshot<Visitor>) -> Vec<Action> {
        match Self::visitor(state) {
            Some(node) => self.edges(node).iter().map(|e| e.action).collect(),
            None => Vec::new(),
        }
    }
}
