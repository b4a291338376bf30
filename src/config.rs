// Configuration module for reading Search.toml
// This module provides sectioned configuration for the solver and the demo binaries

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub search: SearchConfig,
    pub threads: ThreadsConfig,
    pub timing: TimingConfig,
    pub output: OutputConfig,
    pub debug: DebugConfig,
    pub profiling: ProfilingConfig,
    pub world: WorldConfig,
}

/// Iterative deepening bounds
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub max_depth: u32,
    pub initial_depth: u32,
    pub exhaustive: bool,
}

/// Worker pool sizing
#[derive(Debug, Deserialize, Clone)]
pub struct ThreadsConfig {
    /// 0 means one worker per available CPU
    pub workers: usize,
    pub min_workers_for_parallel: usize,
}

impl ThreadsConfig {
    /// Worker count after resolving 0 to the CPU count
    pub fn resolved_workers(&self) -> usize {
        if self.workers == 0 {
            rayon::current_num_threads().max(1)
        } else {
            self.workers
        }
    }
}

/// Deadline handling
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// 0 disables the deadline
    pub time_budget_ms: u64,
    pub polling_interval_ms: u64,
}

impl TimingConfig {
    pub fn time_budget(&self) -> Option<Duration> {
        if self.time_budget_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.time_budget_ms))
        }
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms.max(1))
    }
}

/// Console reporting
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub print_labels: bool,
    pub max_printed_solutions: usize,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

/// Performance profiling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ProfilingConfig {
    pub enabled: bool,
    pub log_to_stderr: bool,
}

/// Defaults for the synthetic worlds used by the binaries
#[derive(Debug, Deserialize, Clone)]
pub struct WorldConfig {
    pub kind: String,
    pub line_goal: u8,
    pub corridor_layout: String,
    pub corridor_max_dashes: u8,
    /// Skip inputs holding left in the corridor
    pub corridor_forward_only: bool,
    pub graph_seed: u64,
    pub graph_nodes: usize,
    pub graph_branching: usize,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Search.toml configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints; also run after command-line overrides
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.initial_depth > self.search.max_depth {
            return Err(ConfigError::Invalid {
                field: "search.initial_depth",
                reason: format!(
                    "{} exceeds search.max_depth {}",
                    self.search.initial_depth, self.search.max_depth
                ),
            });
        }
        if self.threads.min_workers_for_parallel == 0 {
            return Err(ConfigError::Invalid {
                field: "threads.min_workers_for_parallel",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Search.toml
    pub fn default_hardcoded() -> Self {
        Config {
            search: SearchConfig {
                max_depth: 50,
                initial_depth: 0,
                exhaustive: false,
            },
            threads: ThreadsConfig {
                workers: 1,
                min_workers_for_parallel: 2,
            },
            timing: TimingConfig {
                time_budget_ms: 0,
                polling_interval_ms: 50,
            },
            output: OutputConfig {
                print_labels: true,
                max_printed_solutions: 20,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "solutions.jsonl".to_string(),
            },
            profiling: ProfilingConfig {
                enabled: false,
                log_to_stderr: true,
            },
            world: WorldConfig {
                kind: "corridor".to_string(),
                line_goal: 5,
                corridor_layout: "p..^^..b...^^^..^..E".to_string(),
                corridor_max_dashes: 1,
                corridor_forward_only: true,
                graph_seed: 7,
                graph_nodes: 24,
                graph_branching: 3,
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path.as_ref()).unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load {} ({}), using hardcoded defaults",
                path.as_ref().display(),
                e
            );
            Self::default_hardcoded()
        })
    }
}
