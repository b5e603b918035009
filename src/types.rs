//! This module defines the core data structures and types used throughout the Turing Machine
//! simulator, including symbols, raw and validated configurations, transitions, and error types.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::analyzer::AnalysisError;
use crate::Rule;

/// The glyph used to display a blank cell.
pub const BLANK_GLYPH: char = '␣';
/// The maximum allowed size for a machine configuration in bytes.
pub const MAX_CONFIG_SIZE: usize = 65536; // 64KB
/// The default number of transitions applied before a run is declared non-terminating.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// A single tape cell value.
///
/// `Blank` is a tag of its own rather than an empty string, so an alphabet can never
/// confuse a real character with the empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// The empty cell.
    Blank,
    /// A written character.
    Mark(char),
}

impl Symbol {
    /// Returns `true` for the blank cell.
    pub fn is_blank(&self) -> bool {
        matches!(self, Symbol::Blank)
    }

    /// Returns the written character, if any.
    pub fn as_char(&self) -> Option<char> {
        match self {
            Symbol::Blank => None,
            Symbol::Mark(c) => Some(*c),
        }
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol::Mark(c)
    }
}

impl From<Option<char>> for Symbol {
    fn from(c: Option<char>) -> Self {
        c.map_or(Symbol::Blank, Symbol::Mark)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Blank => write!(f, "{BLANK_GLYPH}"),
            Symbol::Mark(c) => write!(f, "{c}"),
        }
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Symbol::Blank => serializer.serialize_none(),
            Symbol::Mark(c) => serializer.serialize_char(*c),
        }
    }
}

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// The head offset applied by this direction.
    pub fn offset(&self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }

    /// The single-letter form used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::Stay => "S",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    /// Supports 'L' or '<' for Left, 'R' or '>' for Right, and 'S' or '-' for Stay.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" | "<" => Ok(Direction::Left),
            "R" | ">" => Ok(Direction::Right),
            "S" | "-" => Ok(Direction::Stay),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The untyped shape of a configuration file, as read by the parser.
///
/// Every field is optional so that the analyzer can report exactly what is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    pub name: Option<String>,
    pub states: Option<RawStates>,
    pub alphabet: Option<Vec<Option<String>>>,
    pub tape_alphabet: Option<Vec<Option<String>>>,
    pub delta: Option<Vec<RawTransition>>,
    pub simulation_strings: Option<Vec<Option<String>>>,
}

/// The `q_states` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStates {
    pub list: Option<Vec<Option<String>>>,
    pub initial: Option<String>,
    pub finals: Option<Vec<Option<String>>>,
}

/// One entry of the `delta` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTransition {
    pub params: Option<RawParams>,
    pub output: Option<RawOutput>,
}

/// The left-hand side of a transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams {
    pub state: Option<String>,
    pub cache: Option<String>,
    pub symbol: Option<String>,
}

/// The right-hand side of a transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOutput {
    pub state: Option<String>,
    pub cache: Option<String>,
    pub symbol: Option<String>,
    pub displacement: Option<String>,
}

/// A validated machine configuration.
///
/// Produced by [`crate::analyzer::analyze`]; every state referenced by a transition is a
/// member of `states` and every symbol is at most one character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineConfig {
    pub name: Option<String>,
    pub states: Vec<String>,
    pub initial_state: String,
    pub final_states: Vec<String>,
    pub alphabet: Vec<Symbol>,
    pub tape_alphabet: Vec<Symbol>,
    pub transitions: Vec<TransitionRecord>,
    pub simulation_strings: Vec<String>,
}

/// A typed transition record in declaration order.
///
/// `None` symbols and empty memory values are still unnormalized here; the machine
/// definition turns them into `Symbol::Blank` and the empty register value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub state: String,
    pub cache_read: Option<String>,
    pub read: Option<char>,
    pub next_state: String,
    pub cache_write: Option<String>,
    pub write: Option<char>,
    pub direction: Direction,
}

/// Represents various errors that can occur while loading a Turing Machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates an error during the parsing of a machine configuration.
    #[error("Configuration parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates that a parsed configuration is structurally or logically invalid.
    #[error("Configuration validation failed:\n{}", format_errors(.0))]
    ValidationError(Vec<AnalysisError>),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates a lookup of a built-in machine that does not exist.
    #[error("Unknown machine: {0}")]
    UnknownMachine(String),
    /// Indicates a configuration text larger than `MAX_CONFIG_SIZE`.
    #[error("Configuration is too large: {0} bytes (limit {MAX_CONFIG_SIZE})")]
    ConfigTooLarge(usize),
}

fn format_errors(errors: &[AnalysisError]) -> String {
    errors
        .iter()
        .map(|e| format!(" - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
