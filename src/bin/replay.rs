// Standalone replay tool for solution logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Every logged input path is stepped through the world again and must reach the
// goal on its last frame. Exits with status 1 if any entry fails to replay.

use clap::Parser;
use std::path::PathBuf;
use std::process;

use tas_search::config::Config;
use tas_search::replay::ReplayEngine;
use tas_search::simulation::Simulation;
use tas_search::snapshot::Snapshot;
use tas_search::worlds::{visit_world, WorldKind, WorldVisitor};

#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Re-validate the solutions in a JSONL solution log")]
#[command(version)]
struct Args {
    /// JSONL log written by tas-search --log-file
    log_file: PathBuf,

    /// Path to the configuration the log was produced with
    #[arg(short, long, default_value = "Search.toml")]
    config: PathBuf,

    /// World the log belongs to (defaults to world.kind from the config)
    #[arg(short, long)]
    world: Option<WorldKind>,

    /// Corridor layout override
    #[arg(long)]
    layout: Option<String>,

    /// Random graph seed override
    #[arg(long)]
    seed: Option<u64>,

    /// Line world goal override
    #[arg(long)]
    goal: Option<u8>,

    /// Only replay solutions logged at these depths (comma-separated)
    #[arg(long, value_delimiter = ',')]
    depths: Vec<u32>,

    /// Show detailed output for each entry, including a frame-by-frame view
    #[arg(short, long)]
    verbose: bool,
}

struct ReplayCommand {
    log_file: PathBuf,
    depths: Vec<u32>,
    verbose: bool,
}

impl WorldVisitor for ReplayCommand {
    type Output = i32;

    fn visit<S>(self, world: S, root: Snapshot<S::Entity>) -> i32
    where
        S: Simulation + Sync,
        S::Entity: Sync,
    {
        let engine = ReplayEngine::new(world, root, self.verbose);

        let entries = match engine.load_log_file(&self.log_file) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Error loading log file: {}", e);
                return 1;
            }
        };
        if entries.is_empty() {
            eprintln!("Error: Log file is empty");
            return 1;
        }
        println!("Loaded {} log entries\n", entries.len());

        let results = if self.depths.is_empty() {
            engine.replay_all(&entries)
        } else {
            engine.replay_depths(&entries, &self.depths)
        };
        engine.print_report(&results);

        if self.verbose {
            for logged in &entries {
                if !self.depths.is_empty() && !self.depths.contains(&logged.entry.depth) {
                    continue;
                }
                println!("Line {} (depth {}):", logged.line, logged.entry.depth);
                match engine.watch_entry(logged) {
                    Ok(frames) => frames.iter().for_each(|frame| println!("{}", frame)),
                    Err(e) => println!("  {}", e),
                }
                println!();
            }
        }

        let stats = engine.generate_stats(&results);
        if stats.invalid > 0 {
            1
        } else {
            0
        }
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let mut config = Config::from_file(&args.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", args.config.display(), e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });
    if let Some(world) = args.world {
        config.world.kind = world.to_string();
    }
    if let Some(layout) = &args.layout {
        config.world.corridor_layout = layout.clone();
    }
    if let Some(seed) = args.seed {
        config.world.graph_seed = seed;
    }
    if let Some(goal) = args.goal {
        config.world.line_goal = goal;
    }

    println!("Replay log file: {}", args.log_file.display());
    println!("World: {}", config.world.kind);

    let command = ReplayCommand {
        log_file: args.log_file,
        depths: args.depths,
        verbose: args.verbose,
    };
    match visit_world(&config.world, command) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}
