//! This module provides the `ConfigLoader` struct, responsible for loading machine definitions
//! from configuration files and strings.

use crate::machine::TuringMachine;
use crate::types::TuringMachineError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extensions recognized as machine configuration files.
const CONFIG_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// `ConfigLoader` is a utility struct for loading Turing Machine definitions.
/// It provides methods to load machines from individual files, from string content,
/// and to discover and load every configuration file within a directory.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a single machine from the specified configuration file.
    ///
    /// # Returns
    ///
    /// * `Ok(TuringMachine)` if the file is read, parsed and validated.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or is empty.
    /// * `Err(TuringMachineError::ParseError)` or `ValidationError` for invalid content.
    pub fn load_machine(path: &Path) -> Result<TuringMachine, TuringMachineError> {
        debug!(path = %path.display(), "loading machine configuration");

        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Err(TuringMachineError::FileError(format!(
                "{}: configuration file is empty",
                path.display()
            )));
        }

        Self::load_from_string(&content)
    }

    /// Loads a single machine from configuration text, e.g. read from standard input.
    pub fn load_from_string(content: &str) -> Result<TuringMachine, TuringMachineError> {
        TuringMachine::from_yaml(content)
    }

    /// Loads every configuration file (`.yaml` or `.yml`) in a directory.
    ///
    /// Directories and files with other extensions are skipped. Each loaded file yields
    /// its own result, so one invalid file does not hide the others.
    pub fn load_machines(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, TuringMachine), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();
                if path.is_dir() || !is_config_file(&path) {
                    return None;
                }

                Some(Self::load_machine(&path).map(|machine| (path, machine)))
            })
            .collect();

        // Directory order is platform dependent.
        results.sort_by_key(|result| result.as_ref().ok().map(|(path, _)| path.clone()));
        results
    }
}

fn is_config_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CONFIG_EXTENSIONS.contains(&ext))
}
