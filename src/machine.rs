//! This module defines the `TuringMachine` struct, the immutable definition of a single-tape
//! machine: its states, alphabets and transition function. A definition is built once from a
//! validated [`MachineConfig`] and shared read-only by every execution.

use crate::parser::parse;
use crate::types::{Direction, MachineConfig, Symbol, TuringMachineError};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// The lookup key of the transition function: control state, memory value and the symbol
/// under the head.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TransitionKey {
    pub state: String,
    pub cache: String,
    pub symbol: Symbol,
}

impl TransitionKey {
    pub fn new(state: &str, cache: &str, symbol: Symbol) -> Self {
        Self {
            state: state.to_string(),
            cache: cache.to_string(),
            symbol,
        }
    }
}

/// The right-hand side of the transition function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// The control state entered.
    pub next_state: String,
    /// The memory value stored; empty means no value.
    pub next_cache: String,
    /// The symbol written under the head.
    pub write: Symbol,
    /// The head movement applied after writing.
    pub direction: Direction,
}

/// Size counters of a machine definition, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MachineSummary {
    pub state_count: usize,
    pub transition_count: usize,
    pub alphabet_size: usize,
    pub tape_alphabet_size: usize,
    pub final_state_count: usize,
    pub simulation_string_count: usize,
}

/// Represents a deterministic single-tape Turing Machine with a memory register.
///
/// The transition function is a finite partial mapping; a missing entry means the machine
/// halts.
#[derive(Debug, Clone, PartialEq)]
pub struct TuringMachine {
    name: Option<String>,
    states: Vec<String>,
    initial_state: String,
    final_states: Vec<String>,
    alphabet: Vec<Symbol>,
    tape_alphabet: Vec<Symbol>,
    delta: HashMap<TransitionKey, Transition>,
    simulation_strings: Vec<String>,
}

impl TuringMachine {
    /// Creates a new `TuringMachine` from a validated configuration.
    ///
    /// Transition records are inserted in declaration order, so a later record with the
    /// same key replaces an earlier one. Absent symbols become [`Symbol::Blank`] and absent
    /// memory values become the empty value.
    pub fn new(config: MachineConfig) -> Self {
        let mut delta = HashMap::with_capacity(config.transitions.len());

        for record in config.transitions {
            let key = TransitionKey {
                state: record.state,
                cache: record.cache_read.unwrap_or_default(),
                symbol: Symbol::from(record.read),
            };
            let transition = Transition {
                next_state: record.next_state,
                next_cache: record.cache_write.unwrap_or_default(),
                write: Symbol::from(record.write),
                direction: record.direction,
            };

            if let Some(previous) = delta.insert(key.clone(), transition) {
                debug!(?key, ?previous, "transition overridden by a later record");
            }
        }

        Self {
            name: config.name,
            states: config.states,
            initial_state: config.initial_state,
            final_states: config.final_states,
            alphabet: config.alphabet,
            tape_alphabet: config.tape_alphabet,
            delta,
            simulation_strings: config.simulation_strings,
        }
    }

    /// Parses, validates and builds a machine from configuration text.
    pub fn from_yaml(input: &str) -> Result<Self, TuringMachineError> {
        parse(input).map(Self::new)
    }

    /// Finds the transition for a control state, memory value and symbol.
    ///
    /// # Returns
    ///
    /// * `Some(&Transition)` if the transition function is defined for the triple.
    /// * `None` if no move is defined, which halts the machine.
    pub fn transition_for(&self, state: &str, cache: &str, symbol: Symbol) -> Option<&Transition> {
        self.delta.get(&TransitionKey::new(state, cache, symbol))
    }

    /// Checks whether a state is an accepting state.
    pub fn is_final(&self, state: &str) -> bool {
        self.final_states.iter().any(|s| s == state)
    }

    /// Returns the machine name, if the configuration declared one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn final_states(&self) -> &[String] {
        &self.final_states
    }

    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    pub fn tape_alphabet(&self) -> &[Symbol] {
        &self.tape_alphabet
    }

    /// Returns the input strings declared by the configuration, in order.
    pub fn simulation_strings(&self) -> &[String] {
        &self.simulation_strings
    }

    /// Returns every transition, sorted by key.
    pub fn transitions(&self) -> Vec<(&TransitionKey, &Transition)> {
        let mut transitions: Vec<_> = self.delta.iter().collect();
        transitions.sort_by(|a, b| a.0.cmp(b.0));
        transitions
    }

    /// Returns the size counters of this definition.
    pub fn summary(&self) -> MachineSummary {
        MachineSummary {
            state_count: self.states.len(),
            transition_count: self.delta.len(),
            alphabet_size: self.alphabet.len(),
            tape_alphabet_size: self.tape_alphabet.len(),
            final_state_count: self.final_states.len(),
            simulation_string_count: self.simulation_strings.len(),
        }
    }
}
