// Integration tests for the simulation contract of the bundled worlds
//
// Tests checked against brute force over the full reachable state space:
// - the heuristic never exceeds the true fewest frames to a goal
// - the heuristic is infinite exactly where failure holds
// - apply is deterministic
// - the first successful depth equals the true shortest distance

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::Hash;

use tas_search::config::Config;
use tas_search::coordinator::Solver;
use tas_search::simulation::Simulation;
use tas_search::snapshot::Snapshot;
use tas_search::worlds::corridor::Corridor;
use tas_search::worlds::graph::GraphWorld;

/// Every state reachable from `root`, with its outgoing (cost, successor) edges
fn explore<S>(sim: &S, root: &Snapshot<S::Entity>) -> HashMap<Snapshot<S::Entity>, Vec<(u32, Snapshot<S::Entity>)>>
where
    S: Simulation,
    S::Entity: Hash + Eq,
{
    let mut graph = HashMap::new();
    let mut pending = VecDeque::from([root.clone()]);

    while let Some(state) = pending.pop_front() {
        if graph.contains_key(&state) {
            continue;
        }
        let mut edges = Vec::new();
        if !sim.is_failure(&state) {
            for action in sim.legal_actions(&state) {
                let t = sim.apply(&state, action);
                edges.push((t.forced_frames + 1, t.state.clone()));
                pending.push_back(t.state);
            }
        }
        graph.insert(state, edges);
    }
    graph
}

/// Fewest frames from each state to a goal, by repeated relaxation
fn true_distances<S>(
    sim: &S,
    graph: &HashMap<Snapshot<S::Entity>, Vec<(u32, Snapshot<S::Entity>)>>,
) -> HashMap<Snapshot<S::Entity>, u32>
where
    S: Simulation,
    S::Entity: Hash + Eq,
{
    let mut distance: HashMap<Snapshot<S::Entity>, u32> = graph
        .keys()
        .filter(|s| sim.is_goal(s))
        .map(|s| (s.clone(), 0))
        .collect();

    loop {
        let mut changed = false;
        for (state, edges) in graph {
            for (cost, next) in edges {
                if let Some(&d) = distance.get(next) {
                    let candidate = d + cost;
                    if distance.get(state).map_or(true, |&best| candidate < best) {
                        distance.insert(state.clone(), candidate);
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            return distance;
        }
    }
}

fn assert_admissible<S>(sim: &S, root: &Snapshot<S::Entity>)
where
    S: Simulation,
    S::Entity: Hash + Eq,
{
    let graph = explore(sim, root);
    let distance = true_distances(sim, &graph);

    for state in graph.keys() {
        let bound = sim.heuristic_lower_bound(state);
        if sim.is_failure(state) {
            assert_eq!(bound, None, "failure state must be unreachable: {:?}", state);
        }
        if let Some(&truth) = distance.get(state) {
            let bound = bound.unwrap_or_else(|| panic!("infinite bound on solvable state {:?}", state));
            assert!(bound <= truth, "bound {} exceeds true distance {} at {:?}", bound, truth, state);
        }
    }
}

#[test]
fn test_corridor_heuristic_is_admissible() {
    for layout in ["p^E", "p.^^.E", "p.b.^^^..E", "p..^.^^..^^^...E"] {
        for dashes in 0..=2 {
            let world = Corridor::from_layout(layout, dashes).unwrap();
            assert_admissible(&world, &world.initial_state());
        }
    }
}

#[test]
fn test_graph_heuristic_is_admissible() {
    for seed in 0..20 {
        let world = GraphWorld::random(seed, 16, 4).unwrap();
        assert_admissible(&world, &world.start());
    }
}

#[test]
fn test_graph_distance_matches_brute_force() {
    for seed in 0..20 {
        let world = GraphWorld::random(seed, 16, 4).unwrap();
        let graph = explore(&world, &world.start());
        let distance = true_distances(&world, &graph);
        assert_eq!(distance.get(&world.start()).copied(), world.distance(0), "seed {}", seed);
    }
}

#[test]
fn test_apply_is_deterministic() {
    let world = Corridor::from_layout("p.b.^^^..E", 1).unwrap();
    let graph = explore(&world, &world.initial_state());
    for state in graph.keys() {
        for action in world.legal_actions(state) {
            assert_eq!(world.apply(state, action), world.apply(state, action));
        }
    }
}

#[test]
fn test_first_solution_depth_is_shortest_distance() {
    let mut solved = BTreeMap::new();
    for seed in 0..12 {
        let world = GraphWorld::random(seed, 14, 3).unwrap();
        let report = Solver::new(world.clone(), Config::default_hardcoded()).run(&world.start(), 14, false);

        match world.distance(0) {
            Some(d) if d <= 14 => {
                assert_eq!(report.solved_depth(), Some(d), "seed {}", seed);
                for solution in &report.solutions {
                    assert_eq!(solution.frames(), d as usize);
                }
                solved.insert(seed, d);
            }
            _ => assert!(report.solutions.is_empty(), "seed {}", seed),
        }
    }
    assert!(!solved.is_empty(), "no seed produced a solvable graph");
}

#[test]
fn test_corridor_first_solution_depth_is_shortest_distance() {
    let world = Corridor::from_layout("p.b.^^^..E", 1).unwrap();
    let graph = explore(&world, &world.initial_state());
    let truth = true_distances(&world, &graph)
        .get(&world.initial_state())
        .copied()
        .expect("layout is solvable");

    let report = Solver::new(world.clone(), Config::default_hardcoded()).run(&world.initial_state(), 20, false);
    assert_eq!(report.solved_depth(), Some(truth));
}
