use crate::machine::TuringMachine;
use crate::types::TuringMachineError;
use serde::Serialize;
use tracing::error;

// Built-in machine definitions
const MACHINE_TEXTS: [&str; 3] = [
    include_str!("../machines/anbn.yaml"),
    include_str!("../machines/binary-increment.yaml"),
    include_str!("../machines/rotate-first.yaml"),
];

struct CatalogEntry {
    name: String,
    text: &'static str,
    machine: TuringMachine,
}

lazy_static::lazy_static! {
    static ref CATALOG: Vec<CatalogEntry> = load_catalog();
}

fn load_catalog() -> Vec<CatalogEntry> {
    MACHINE_TEXTS
        .iter()
        .enumerate()
        .filter_map(|(index, text)| match TuringMachine::from_yaml(text) {
            Ok(machine) => Some(CatalogEntry {
                name: machine
                    .name()
                    .map_or_else(|| format!("machine {}", index + 1), str::to_string),
                text,
                machine,
            }),
            Err(e) => {
                error!(index, error = %e, "failed to load built-in machine");
                None
            }
        })
        .collect()
}

/// Access to the machines embedded in the library.
pub struct MachineCatalog;

impl MachineCatalog {
    /// Get the number of built-in machines
    pub fn count() -> usize {
        CATALOG.len()
    }

    /// List all machine names
    pub fn names() -> Vec<String> {
        CATALOG.iter().map(|entry| entry.name.clone()).collect()
    }

    /// Get a machine by its index
    pub fn get_by_index(index: usize) -> Result<TuringMachine, TuringMachineError> {
        CATALOG
            .get(index)
            .map(|entry| entry.machine.clone())
            .ok_or_else(|| {
                TuringMachineError::UnknownMachine(format!("index {} out of range", index))
            })
    }

    /// Get a machine by its name; the comparison ignores case.
    pub fn get_by_name(name: &str) -> Result<TuringMachine, TuringMachineError> {
        CATALOG
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .map(|entry| entry.machine.clone())
            .ok_or_else(|| TuringMachineError::UnknownMachine(name.to_string()))
    }

    /// Get information about a machine by its index
    pub fn info(index: usize) -> Result<MachineInfo, TuringMachineError> {
        let entry = CATALOG.get(index).ok_or_else(|| {
            TuringMachineError::UnknownMachine(format!("index {} out of range", index))
        })?;
        let summary = entry.machine.summary();

        Ok(MachineInfo {
            index,
            name: entry.name.clone(),
            initial_state: entry.machine.initial_state().to_string(),
            state_count: summary.state_count,
            transition_count: summary.transition_count,
            simulation_strings: entry.machine.simulation_strings().to_vec(),
        })
    }

    /// Search for machines by name
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        CATALOG
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the configuration text of a machine by its index
    pub fn text_by_index(index: usize) -> Result<&'static str, TuringMachineError> {
        CATALOG.get(index).map(|entry| entry.text).ok_or_else(|| {
            TuringMachineError::UnknownMachine(format!("index {} out of range", index))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub state_count: usize,
    pub transition_count: usize,
    pub simulation_strings: Vec<String>,
}
