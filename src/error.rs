//! Error types for the fallible edges of the crate.
//!
//! The search itself never fails: pruned and exhausted branches are ordinary
//! outcomes. Errors only come from configuration, log files, replays and
//! world construction.

use thiserror::Error;

use crate::action::Action;

/// Errors loading Search.toml
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors writing or reading JSONL solution logs
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to access log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse JSON on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown button code {code} on line {line}")]
    UnknownCode { line: usize, code: u8 },
}

/// Reasons an input path does not replay cleanly
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("Frame {frame}: expected no input during a forced frame, found {found}")]
    InputDuringForcedFrame { frame: usize, found: Action },

    #[error("Input path ends during {missing} forced frame(s) after frame {frame}")]
    TruncatedForcedFrames { frame: usize, missing: u32 },

    #[error("Path ends after {frames} frames without reaching a goal")]
    GoalNotReached { frames: usize },

    #[error("Log records {logged} frames but the path has {actual}")]
    FrameCountMismatch { logged: usize, actual: usize },
}

/// Errors building a synthetic world
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("Layout has no start cell 'p'")]
    MissingStart,

    #[error("Layout has no exit cell 'E'")]
    MissingExit,

    #[error("Layout has more than one start cell")]
    DuplicateStart,

    #[error("Unknown layout character '{ch}' at column {column}")]
    UnknownTile { ch: char, column: usize },

    #[error("Unknown world '{0}' (expected line, corridor or graph)")]
    UnknownWorld(String),

    #[error("Invalid world parameter: {0}")]
    InvalidParameter(String),
}
