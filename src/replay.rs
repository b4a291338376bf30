// Replay module for validating input paths and solution logs
//
// This module provides functionality to:
// 1. Replay an input path frame by frame against a simulation
// 2. Parse JSONL solution logs
// 3. Re-validate every logged solution (in parallel)
// 4. Generate a summary report

use log::{info, warn};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::action::Action;
use crate::error::{LogError, ReplayError};
use crate::simulation::Simulation;
use crate::snapshot::Snapshot;
use crate::solution::Solution;
use crate::solution_log::LogEntry;

/// Where a replay ended up
#[derive(Debug, Clone)]
pub struct ReplayOutcome<E> {
    /// Frames consumed, forced frames included
    pub frames: usize,
    pub final_state: Snapshot<E>,
    pub reached_goal: bool,
}

/// Steps `inputs` through the simulation starting at `root`
///
/// Each input frame is applied with `apply`; the forced frames it reports must
/// be matched by "no input" markers in the path.
pub fn replay_inputs<S: Simulation>(
    sim: &S,
    root: &Snapshot<S::Entity>,
    inputs: &[Action],
) -> Result<ReplayOutcome<S::Entity>, ReplayError> {
    step_inputs(sim, root, inputs, |_, _, _| {})
}

/// Replays `inputs` and draws the state after every applied input
///
/// One line per input that reached `apply`: frame number, the input's label and
/// the simulation's picture of the resulting state. Frozen frames are skipped.
pub fn watch_inputs<S: Simulation>(
    sim: &S,
    root: &Snapshot<S::Entity>,
    inputs: &[Action],
) -> Result<Vec<String>, ReplayError> {
    let mut lines = vec![format!("{:>5}  {:<16} {}", 0, "start", sim.render(root))];
    step_inputs(sim, root, inputs, |frame, action, state| {
        let label = action.label().map_or_else(|| action.bits().to_string(), str::to_string);
        lines.push(format!("{:>5}  {:<16} {}", frame, label, sim.render(state)));
    })?;
    Ok(lines)
}

fn step_inputs<S, F>(
    sim: &S,
    root: &Snapshot<S::Entity>,
    inputs: &[Action],
    mut on_step: F,
) -> Result<ReplayOutcome<S::Entity>, ReplayError>
where
    S: Simulation,
    F: FnMut(usize, Action, &Snapshot<S::Entity>),
{
    let mut state = root.clone();
    let mut frame = 0;

    while frame < inputs.len() {
        let action = inputs[frame];
        let transition = sim.apply(&state, action);
        frame += 1;

        for skipped in 0..transition.forced_frames {
            match inputs.get(frame) {
                None => {
                    return Err(ReplayError::TruncatedForcedFrames {
                        frame,
                        missing: transition.forced_frames - skipped,
                    })
                }
                Some(found) if !found.is_none() => {
                    return Err(ReplayError::InputDuringForcedFrame { frame, found: *found })
                }
                Some(_) => frame += 1,
            }
        }
        state = transition.state;
        on_step(frame, action, &state);
    }

    let reached_goal = sim.is_goal(&state);
    Ok(ReplayOutcome {
        frames: frame,
        final_state: state,
        reached_goal,
    })
}

/// Checks that `solution` reaches a goal on its final frame
///
/// Returns the number of frames consumed.
pub fn validate_solution<S: Simulation>(
    sim: &S,
    root: &Snapshot<S::Entity>,
    solution: &Solution,
) -> Result<usize, ReplayError> {
    let outcome = replay_inputs(sim, root, &solution.inputs)?;
    if outcome.reached_goal {
        Ok(outcome.frames)
    } else {
        Err(ReplayError::GoalNotReached { frames: outcome.frames })
    }
}

/// Result of replaying a single log entry
#[derive(Debug, Clone)]
pub struct ReplayResult {
    /// 1-based line in the log file
    pub line: usize,
    pub depth: u32,
    pub frames: usize,
    pub valid: bool,
    pub error: Option<String>,
    pub replay_time_us: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub valid_rate: f64,
}

/// A log entry paired with its line number
#[derive(Debug, Clone)]
pub struct LoggedSolution {
    pub line: usize,
    pub entry: LogEntry,
}

/// Replay engine for checking solution logs against a simulation
pub struct ReplayEngine<S: Simulation> {
    sim: S,
    root: Snapshot<S::Entity>,
    verbose: bool,
}

impl<S> ReplayEngine<S>
where
    S: Simulation + Sync,
    S::Entity: Sync,
{
    /// Creates a new replay engine
    ///
    /// # Arguments
    /// * `sim` - The simulation the log was produced with
    /// * `root` - The snapshot every logged path starts from
    /// * `verbose` - Log each entry as it is replayed
    pub fn new(sim: S, root: Snapshot<S::Entity>, verbose: bool) -> Self {
        ReplayEngine { sim, root, verbose }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LoggedSolution>, LogError> {
        let reader = BufReader::new(File::open(log_path.as_ref())?);
        let mut entries = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line_num = index + 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line).map_err(|source| LogError::Parse {
                line: line_num,
                source,
            })?;
            entries.push(LoggedSolution { line: line_num, entry });
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry
    pub fn replay_entry(&self, logged: &LoggedSolution) -> ReplayResult {
        let start_time = Instant::now();
        let checked = self.check_entry(logged);
        let replay_time_us = start_time.elapsed().as_micros();

        let result = match checked {
            Ok(frames) => ReplayResult {
                line: logged.line,
                depth: logged.entry.depth,
                frames,
                valid: true,
                error: None,
                replay_time_us,
            },
            Err(e) => ReplayResult {
                line: logged.line,
                depth: logged.entry.depth,
                frames: logged.entry.frames,
                valid: false,
                error: Some(e),
                replay_time_us,
            },
        };

        if self.verbose {
            match &result.error {
                None => info!(
                    "Line {}: ✓ VALID - depth {}, {} frames ({}us)",
                    result.line, result.depth, result.frames, result.replay_time_us
                ),
                Some(e) => warn!("Line {}: ✗ INVALID - {}", result.line, e),
            }
        }
        result
    }

    fn check_entry(&self, logged: &LoggedSolution) -> Result<usize, String> {
        let inputs = logged.entry.actions(logged.line).map_err(|e| e.to_string())?;
        if inputs.len() != logged.entry.frames {
            return Err(ReplayError::FrameCountMismatch {
                logged: logged.entry.frames,
                actual: inputs.len(),
            }
            .to_string());
        }
        validate_solution(&self.sim, &self.root, &Solution::new(inputs)).map_err(|e| e.to_string())
    }

    /// Frame-by-frame view of one logged path
    pub fn watch_entry(&self, logged: &LoggedSolution) -> Result<Vec<String>, LogError> {
        let inputs = logged.entry.actions(logged.line)?;
        Ok(watch_inputs(&self.sim, &self.root, &inputs).unwrap_or_else(|e| vec![format!("stopped: {}", e)]))
    }

    /// Replays all entries, in parallel, keeping log order in the output
    pub fn replay_all(&self, entries: &[LoggedSolution]) -> Vec<ReplayResult> {
        entries.par_iter().map(|logged| self.replay_entry(logged)).collect()
    }

    /// Replays only the entries logged at one of `depths`
    pub fn replay_depths(&self, entries: &[LoggedSolution], depths: &[u32]) -> Vec<ReplayResult> {
        let selected: Vec<LoggedSolution> = entries
            .iter()
            .filter(|logged| depths.contains(&logged.entry.depth))
            .cloned()
            .collect();
        if selected.is_empty() {
            warn!("No log entries at depth(s) {:?}", depths);
        }
        self.replay_all(&selected)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total = results.len();
        let valid = results.iter().filter(|r| r.valid).count();
        let valid_rate = if total > 0 {
            (valid as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total,
            valid,
            invalid: total - valid,
            valid_rate,
        }
    }

    /// Prints a report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Solutions: {}", stats.total);
        println!("Valid:           {} ({:.1}%)", stats.valid, stats.valid_rate);
        println!("Invalid:         {}", stats.invalid);
        println!("═══════════════════════════════════════════════════════════\n");

        if let Some(shortest) = results.iter().filter(|r| r.valid).map(|r| r.frames).min() {
            let avg_time: f64 =
                results.iter().map(|r| r.replay_time_us as f64).sum::<f64>() / results.len() as f64;
            println!("Shortest Valid Solution:    {} frames", shortest);
            println!("Average Replay Time:        {:.1}us\n", avg_time);
        }

        let invalid: Vec<_> = results.iter().filter(|r| !r.valid).collect();
        if !invalid.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  INVALID SOLUTIONS");
            println!("═══════════════════════════════════════════════════════════");
            for result in invalid {
                println!(
                    "Line {} (depth {}): {}",
                    result.line,
                    result.depth,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            println!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worlds::corridor::Corridor;
    use crate::worlds::line::LineWorld;

    #[test]
    fn test_replay_counts_every_frame() {
        let world = LineWorld::new(3);
        let inputs = [Action::RIGHT, Action::NONE, Action::RIGHT, Action::RIGHT];
        let outcome = replay_inputs(&world, &world.start(0), &inputs).unwrap();
        assert_eq!(outcome.frames, 4);
        assert!(outcome.reached_goal);
    }

    #[test]
    fn test_forced_frames_require_no_input_markers() {
        let world = Corridor::from_layout("p...E", 1).unwrap();
        let root = world.initial_state();
        let dash = Action::DASH | Action::RIGHT;

        let good = Solution::new(vec![dash, Action::NONE, Action::NONE]);
        assert_eq!(validate_solution(&world, &root, &good), Ok(3));

        let pressed = [dash, Action::RIGHT, Action::NONE];
        assert_eq!(
            replay_inputs(&world, &root, &pressed).unwrap_err(),
            ReplayError::InputDuringForcedFrame {
                frame: 1,
                found: Action::RIGHT
            }
        );

        let cut = [dash, Action::NONE];
        assert_eq!(
            replay_inputs(&world, &root, &cut).unwrap_err(),
            ReplayError::TruncatedForcedFrames { frame: 2, missing: 1 }
        );
    }

    #[test]
    fn test_short_path_is_not_a_solution() {
        let world = LineWorld::new(3);
        let solution = Solution::new(vec![Action::RIGHT, Action::RIGHT]);
        assert_eq!(
            validate_solution(&world, &world.start(0), &solution),
            Err(ReplayError::GoalNotReached { frames: 2 })
        );
    }

    fn logged(line: usize, inputs: Vec<u8>, frames: usize) -> LoggedSolution {
        LoggedSolution {
            line,
            entry: LogEntry {
                depth: frames as u32,
                frames,
                inputs,
                english: String::new(),
                timestamp: String::new(),
            },
        }
    }

    #[test]
    fn test_replay_all_flags_bad_entries() {
        let world = LineWorld::new(2);
        let engine = ReplayEngine::new(world, world.start(0), false);
        let entries = vec![
            logged(1, vec![2, 2], 2),
            logged(2, vec![2, 0], 2),
            logged(3, vec![2, 99], 2),
            logged(4, vec![0, 2, 2], 2),
        ];

        let results = engine.replay_all(&entries);
        let valid: Vec<bool> = results.iter().map(|r| r.valid).collect();
        assert_eq!(valid, vec![true, false, false, false]);
        assert_eq!(results[2].line, 3);

        let stats = engine.generate_stats(&results);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.invalid, 3);
        assert!((stats.valid_rate - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_replay_depths_filters_entries() {
        let world = LineWorld::new(2);
        let engine = ReplayEngine::new(world, world.start(0), false);
        let entries = vec![logged(1, vec![2, 2], 2), logged(2, vec![0, 2, 2], 3)];

        let results = engine.replay_depths(&entries, &[3]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].line, 2);
        assert!(results[0].valid);
    }

    #[test]
    fn test_watch_draws_state_after_each_input() {
        let world = Corridor::from_layout("p...E", 1).unwrap();
        let root = world.initial_state();
        let dash = Action::DASH | Action::RIGHT;

        let lines = watch_inputs(&world, &root, &[dash, Action::NONE, Action::NONE]).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("p...E  dashed=false"), "{}", lines[0]);
        assert!(lines[1].trim_start().starts_with("3  right dash"), "{}", lines[1]);
        assert!(lines[1].ends_with("....*  dashed=true"), "{}", lines[1]);

        assert_eq!(
            watch_inputs(&world, &root, &[dash]).unwrap_err(),
            ReplayError::TruncatedForcedFrames { frame: 1, missing: 2 }
        );
    }

    #[test]
    fn test_watch_entry_stops_at_bad_input() {
        let world = LineWorld::new(2);
        let engine = ReplayEngine::new(world, world.start(0), true);

        let frames = engine.watch_entry(&logged(1, vec![2, 2], 2)).unwrap();
        assert_eq!(frames.last().map(String::as_str), Some("    2  right            [Walker(2)]"));
        assert!(engine.watch_entry(&logged(2, vec![2, 99], 2)).is_err());
    }
}
