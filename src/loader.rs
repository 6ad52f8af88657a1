//! This module provides the `MachineLoader` struct, responsible for loading machine
//! descriptions from JSON files, strings and already-parsed values.

use crate::types::{Machine, MachineDescription, MachineError, Mode};
use std::fs;
use std::path::{Path, PathBuf};

/// `MachineLoader` is a utility struct for loading machines.
///
/// A description is a JSON object with exactly the keys `blank`, `start state`,
/// `final states` and `table`:
///
/// ```json
/// {
///   "blank": "_",
///   "start state": "q0",
///   "final states": ["qf"],
///   "table": {
///     "q0": { "0": "R", "_": { "write": "1", "L": "qf" } }
///   }
/// }
/// ```
pub struct MachineLoader;

impl MachineLoader {
    /// Loads a single machine from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` if the file is read and holds a valid description.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::Description)` if a required field is missing or has the wrong type.
    pub fn load_machine(path: &Path, mode: Mode) -> Result<Machine, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::load_machine_from_str(&content, mode)
    }

    /// Loads a single machine from JSON text.
    pub fn load_machine_from_str(content: &str, mode: Mode) -> Result<Machine, MachineError> {
        let description: MachineDescription = serde_json::from_str(content)?;
        Machine::from_description(description, mode)
    }

    /// Loads a single machine from an already-parsed JSON value.
    pub fn load_machine_from_value(
        value: serde_json::Value,
        mode: Mode,
    ) -> Result<Machine, MachineError> {
        let description: MachineDescription = serde_json::from_value(value)?;
        Machine::from_description(description, mode)
    }

    /// Loads every `.json` file in `directory`, sorted by path.
    ///
    /// Directories and other files are skipped. Each file gets its own result, so one bad
    /// description does not hide the others.
    pub fn load_machines(
        directory: &Path,
        mode: Mode,
    ) -> Vec<Result<(PathBuf, Machine), MachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                        paths.push(path);
                    }
                }
                Err(e) => results.push(Err(MachineError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        paths.sort();
        tracing::debug!(directory = %directory.display(), count = paths.len(), "loading machines");

        results.extend(paths.into_iter().map(|path| {
            Self::load_machine(&path, mode)
                .map(|machine| (path.clone(), machine))
                .map_err(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "skipping machine");
                    e
                })
        }));

        results
    }
}
