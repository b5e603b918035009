//! This crate provides the core logic for a deterministic single-tape Turing Machine simulator.
//! It includes modules for parsing and validating machine configurations, executing input
//! strings step by step, exporting transition graphs, and a catalog of built-in machines.

pub mod analyzer;
pub mod dot;
pub mod executor;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod simulator;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the validation entry points from the analyzer module.
pub use analyzer::{analyze, AnalysisError, AnalysisWarning};
pub use dot::to_dot;
/// Re-exports the execution engine and its result types.
pub use executor::{execute, ExecutionResult, ExecutionStats, Executor, HaltReason};
pub use loader::ConfigLoader;
/// Re-exports the machine definition and its transition function types.
pub use machine::{MachineSummary, Transition, TransitionKey, TuringMachine};
pub use parser::parse;
pub use programs::{MachineCatalog, MachineInfo};
pub use simulator::{BatchSummary, Simulator};
pub use tape::Tape;
/// Re-exports the shared vocabulary types and limits.
pub use types::{
    Direction, MachineConfig, Symbol, TransitionRecord, TuringMachineError, BLANK_GLYPH,
    MAX_CONFIG_SIZE, MAX_EXECUTION_STEPS,
};
