// Command-line search driver
//
// Builds the world described by Search.toml (plus command-line overrides), runs
// iterative deepening and prints every solution in button codes and English.
// Exit status: 0 when a solution was found, 1 when none was, 2 on bad input.

use clap::Parser;
use log::{error, info};
use std::env;
use std::path::PathBuf;
use std::process;

use tas_search::config::Config;
use tas_search::coordinator::Solver;
use tas_search::simulation::Simulation;
use tas_search::snapshot::Snapshot;
use tas_search::worlds::{visit_world, WorldKind, WorldVisitor};

#[derive(Parser, Debug)]
#[command(name = "tas-search")]
#[command(about = "Find the shortest input paths through a deterministic world")]
#[command(version)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "Search.toml")]
    config: PathBuf,

    /// World to search: line, corridor or graph
    #[arg(short, long)]
    world: Option<WorldKind>,

    /// Deepest depth to try
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// First depth to try
    #[arg(long)]
    initial_depth: Option<u32>,

    /// Worker threads (0 = one per CPU)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Keep searching deeper depths after the first solution
    #[arg(short, long)]
    exhaustive: bool,

    /// Stop after this many milliseconds (0 = no limit)
    #[arg(long)]
    time_budget_ms: Option<u64>,

    /// Corridor layout, e.g. "p..^^..E"
    #[arg(long)]
    layout: Option<String>,

    /// Seed for the random graph world
    #[arg(long)]
    seed: Option<u64>,

    /// Goal cell of the line world
    #[arg(long)]
    goal: Option<u8>,

    /// Write every solution to this JSONL file
    #[arg(long)]
    log_file: Option<String>,

    /// Time simulation calls and print a report to stderr
    #[arg(long)]
    profile: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(world) = self.world {
            config.world.kind = world.to_string();
        }
        if let Some(depth) = self.max_depth {
            config.search.max_depth = depth;
        }
        if let Some(depth) = self.initial_depth {
            config.search.initial_depth = depth;
        }
        if let Some(workers) = self.workers {
            config.threads.workers = workers;
        }
        if self.exhaustive {
            config.search.exhaustive = true;
        }
        if let Some(budget) = self.time_budget_ms {
            config.timing.time_budget_ms = budget;
        }
        if let Some(layout) = &self.layout {
            config.world.corridor_layout = layout.clone();
        }
        if let Some(seed) = self.seed {
            config.world.graph_seed = seed;
        }
        if let Some(goal) = self.goal {
            config.world.line_goal = goal;
        }
        if let Some(path) = &self.log_file {
            config.debug.enabled = true;
            config.debug.log_file_path = path.clone();
        }
        if self.profile {
            config.profiling.enabled = true;
        }
    }
}

/// Runs the solver on whichever world the config selects
struct SearchCommand {
    config: Config,
}

impl WorldVisitor for SearchCommand {
    type Output = i32;

    fn visit<S>(self, world: S, root: Snapshot<S::Entity>) -> i32
    where
        S: Simulation + Sync,
        S::Entity: Sync,
    {
        let max_depth = self.config.search.max_depth;
        let exhaustive = self.config.search.exhaustive;
        let print_labels = self.config.output.print_labels;
        let limit = self.config.output.max_printed_solutions;

        let solver = Solver::new(world, self.config);
        let report = solver.run(&root, max_depth, exhaustive);

        println!();
        match report.solutions.shortest() {
            Some(shortest) => println!(
                "Shortest solution: {} frames ({} solution(s) in total)",
                shortest.frames(),
                report.solutions.len()
            ),
            None if report.cancelled => println!("No solution found before the time budget ran out"),
            None => println!("No solution found up to depth {}", max_depth),
        }

        for (index, solution) in report.solutions.iter().take(limit).enumerate() {
            println!("[{}] {} frames: {}", index + 1, solution.frames(), solution.to_codes());
            if print_labels {
                println!("    {}", solution.to_english());
            }
        }
        if report.solutions.len() > limit {
            println!("... {} more not shown", report.solutions.len() - limit);
        }
        println!("{}", report.stats());
        println!(
            "Search time: {:.3} [s] over {} depth(s)",
            report.elapsed().as_secs_f64(),
            report.depths.len()
        );

        if report.solutions.is_empty() {
            1
        } else {
            0
        }
    }
}

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args = Args::parse();

    let mut config = Config::from_file_or_default(&args.config);
    args.apply_overrides(&mut config);
    if let Err(e) = config.validate() {
        error!("{}", e);
        process::exit(2);
    }

    info!("Searching world '{}'", config.world.kind);
    let world_config = config.world.clone();
    match visit_world(&world_config, SearchCommand { config }) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    }
}
