// Solution logging module
//
// Every accepted input path is appended to a JSONL file as soon as its depth pass
// completes, so long exhaustive runs leave a usable record even if interrupted.
// The replay tool reads the same format back.

use log::{error, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::action::Action;
use crate::error::LogError;
use crate::solution::Solution;

/// A single line of the solution log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub depth: u32,
    pub frames: usize,
    /// Raw button codes, forced frames included as 0
    pub inputs: Vec<u8>,
    pub english: String,
    pub timestamp: String,
}

impl LogEntry {
    pub fn new(depth: u32, solution: &Solution) -> Self {
        LogEntry {
            depth,
            frames: solution.frames(),
            inputs: solution.inputs.iter().map(|a| a.bits()).collect(),
            english: solution.to_english(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Decodes the stored button codes
    ///
    /// `line` is only used for error reporting.
    pub fn actions(&self, line: usize) -> Result<Vec<Action>, LogError> {
        self.inputs
            .iter()
            .map(|&code| Action::from_bits(code).ok_or(LogError::UnknownCode { line, code }))
            .collect()
    }
}

/// Shared solution log writer
/// Cloning shares the underlying file
#[derive(Clone)]
pub struct SolutionLog {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl SolutionLog {
    /// Creates a solution log, truncating the file if it exists
    ///
    /// Failing to open the file is logged and yields a disabled log; the search
    /// itself does not depend on it.
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match Self::create(log_file_path) {
            Ok(log) => {
                info!("Solution logging enabled: {}", log_file_path);
                log
            }
            Err(e) => {
                error!("Failed to create solution log '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Opens the log file, reporting failures to the caller
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, LogError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(SolutionLog {
            file: Arc::new(Mutex::new(Some(file))),
            enabled: true,
        })
    }

    /// Creates a disabled solution log (no-op)
    pub fn disabled() -> Self {
        SolutionLog {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    /// Appends one solution found at `depth`
    pub fn record(&self, depth: u32, solution: &Solution) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.write_entry(&LogEntry::new(depth, solution)) {
            error!("Failed to write solution log entry: {}", e);
        }
    }

    fn write_entry(&self, entry: &LogEntry) -> Result<(), LogError> {
        let mut guard = self.file.lock();
        if let Some(file) = guard.as_mut() {
            let mut line = serde_json::to_string(entry)?;
            line.push('\n');
            file.write_all(line.as_bytes())?;
            // Flush so an interrupted run keeps every completed line
            file.flush()?;
        }
        Ok(())
    }
}
