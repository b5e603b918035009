//! This module validates parsed machine configurations before a machine is built. It checks
//! that required sections and fields exist, that state references resolve, that alphabets are
//! consistent and that every symbol fits in a single tape cell. All errors are collected so a
//! configuration can be fixed in one pass.

use crate::types::{
    Direction, MachineConfig, RawConfig, RawStates, RawTransition, Symbol, TransitionRecord,
    TuringMachineError,
};
use std::collections::HashSet;
use thiserror::Error;

/// Represents the errors that make a configuration unusable.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AnalysisError {
    /// A required top-level section is absent.
    #[error("missing required section '{0}'")]
    MissingSection(String),
    /// A required field of `q_states` is absent.
    #[error("missing '{0}' in q_states")]
    MissingStateField(String),
    /// An entry of `q_list` has no name.
    #[error("state {0} in q_list has no name")]
    EmptyStateName(usize),
    /// The initial state is not a member of `q_list`.
    #[error("initial state '{0}' is not in q_list")]
    UndefinedInitialState(String),
    /// A final state is not a member of `q_list`.
    #[error("final state '{0}' is not in q_list")]
    UndefinedFinalState(String),
    /// `q_list` contains the same state more than once.
    #[error("q_list contains duplicate states")]
    DuplicateStates,
    /// The input alphabet has no symbols.
    #[error("the input alphabet is empty")]
    EmptyAlphabet,
    /// The tape alphabet has no symbols.
    #[error("the tape alphabet is empty")]
    EmptyTapeAlphabet,
    /// A symbol of the input alphabet is missing from the tape alphabet.
    #[error("symbol '{0}' of the alphabet is not in tape_alphabet")]
    SymbolNotInTapeAlphabet(String),
    /// A symbol is longer than one character.
    #[error("symbol '{0}' must be a single character")]
    InvalidSymbol(String),
    /// A transition lacks its `params` or `output` block.
    #[error("transition {index}: missing '{part}'")]
    MissingTransitionPart { index: usize, part: String },
    /// A transition lacks a required field.
    #[error("transition {index}: missing '{field}'")]
    MissingTransitionField { index: usize, field: String },
    /// A transition references a state that is not in `q_list`.
    #[error("transition {index}: state '{state}' does not exist")]
    UndefinedTransitionState { index: usize, state: String },
    /// A transition has a displacement other than L, R or S.
    #[error("transition {index}: invalid displacement '{value}'")]
    InvalidDisplacement { index: usize, value: String },
}

/// Findings that do not prevent a machine from being built.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AnalysisWarning {
    /// The transition table is empty.
    #[error("no transitions are defined (delta is empty)")]
    EmptyTransitionTable,
    /// A simulation string uses a symbol outside the input alphabet.
    #[error("simulation string {index} ('{input}') contains undefined symbol '{symbol}'")]
    UndefinedInputSymbol {
        index: usize,
        input: String,
        symbol: char,
    },
}

/// The validated `q_states` section.
struct States {
    list: Vec<String>,
    initial: String,
    finals: Vec<String>,
}

/// Analyzes a raw configuration and converts it into a typed [`MachineConfig`].
///
/// Missing top-level sections are reported on their own; otherwise every state, alphabet
/// and transition problem is collected.
///
/// # Returns
///
/// * `Ok(MachineConfig)` if no errors are found.
/// * `Err(TuringMachineError::ValidationError)` with every error found otherwise.
pub fn analyze(raw: &RawConfig) -> Result<MachineConfig, TuringMachineError> {
    let mut errors = check_structure(raw);

    let (Some(raw_states), Some(alphabet), Some(tape_alphabet), Some(delta)) = (
        &raw.states,
        &raw.alphabet,
        &raw.tape_alphabet,
        &raw.delta,
    ) else {
        return Err(TuringMachineError::ValidationError(errors));
    };

    let states = check_states(raw_states, &mut errors);
    let (alphabet, tape_alphabet) = check_alphabets(alphabet, tape_alphabet, &mut errors);
    let transitions = check_transitions(
        delta,
        states.as_ref().map(|s| s.list.as_slice()),
        &mut errors,
    );

    let simulation_strings = raw
        .simulation_strings
        .iter()
        .flatten()
        .map(|input| input.clone().unwrap_or_default())
        .collect();

    match states {
        Some(states) if errors.is_empty() => Ok(MachineConfig {
            name: raw.name.clone(),
            states: states.list,
            initial_state: states.initial,
            final_states: states.finals,
            alphabet,
            tape_alphabet,
            transitions,
            simulation_strings,
        }),
        _ => Err(TuringMachineError::ValidationError(errors)),
    }
}

/// Reports non-fatal issues of a validated configuration.
pub fn warnings(config: &MachineConfig) -> Vec<AnalysisWarning> {
    let mut warnings = Vec::new();

    if config.transitions.is_empty() {
        warnings.push(AnalysisWarning::EmptyTransitionTable);
    }

    for (index, input) in config.simulation_strings.iter().enumerate() {
        if let Some(symbol) = input
            .chars()
            .find(|c| !config.alphabet.contains(&Symbol::Mark(*c)))
        {
            warnings.push(AnalysisWarning::UndefinedInputSymbol {
                index,
                input: input.clone(),
                symbol,
            });
        }
    }

    warnings
}

/// Checks that the required top-level sections are present.
fn check_structure(raw: &RawConfig) -> Vec<AnalysisError> {
    [
        ("q_states", raw.states.is_some()),
        ("alphabet", raw.alphabet.is_some()),
        ("tape_alphabet", raw.tape_alphabet.is_some()),
        ("delta", raw.delta.is_some()),
    ]
    .into_iter()
    .filter(|(_, present)| !present)
    .map(|(section, _)| AnalysisError::MissingSection(section.to_string()))
    .collect()
}

/// Checks the `q_states` section.
///
/// If a field is missing, only the missing fields are reported and `None` is returned.
fn check_states(raw: &RawStates, errors: &mut Vec<AnalysisError>) -> Option<States> {
    let raw_finals = raw.finals.as_ref().filter(|finals| !finals.is_empty());

    let (Some(list), Some(initial), Some(finals)) = (&raw.list, &raw.initial, raw_finals) else {
        for (field, present) in [
            ("q_list", raw.list.is_some()),
            ("initial", raw.initial.is_some()),
            ("final", raw_finals.is_some()),
        ] {
            if !present {
                errors.push(AnalysisError::MissingStateField(field.to_string()));
            }
        }
        return None;
    };

    let list: Vec<String> = list
        .iter()
        .enumerate()
        .filter_map(|(i, state)| match state {
            Some(state) if !state.is_empty() => Some(state.clone()),
            _ => {
                errors.push(AnalysisError::EmptyStateName(i));
                None
            }
        })
        .collect();

    if !list.contains(initial) {
        errors.push(AnalysisError::UndefinedInitialState(initial.clone()));
    }

    let finals: Vec<String> = finals.iter().map(|f| f.clone().unwrap_or_default()).collect();
    for state in finals.iter().filter(|f| !list.contains(f)) {
        errors.push(AnalysisError::UndefinedFinalState(state.clone()));
    }

    let unique: HashSet<&String> = list.iter().collect();
    if unique.len() != list.len() {
        errors.push(AnalysisError::DuplicateStates);
    }

    Some(States {
        list,
        initial: initial.clone(),
        finals,
    })
}

/// Checks both alphabets and that the input alphabet is contained in the tape alphabet.
fn check_alphabets(
    alphabet: &[Option<String>],
    tape_alphabet: &[Option<String>],
    errors: &mut Vec<AnalysisError>,
) -> (Vec<Symbol>, Vec<Symbol>) {
    if alphabet.is_empty() {
        errors.push(AnalysisError::EmptyAlphabet);
    }
    if tape_alphabet.is_empty() {
        errors.push(AnalysisError::EmptyTapeAlphabet);
    }

    let alphabet = check_symbols(alphabet, errors);
    let tape_alphabet = check_symbols(tape_alphabet, errors);

    for symbol in alphabet.iter().filter(|s| !s.is_blank()) {
        if !tape_alphabet.contains(symbol) {
            errors.push(AnalysisError::SymbolNotInTapeAlphabet(symbol.to_string()));
        }
    }

    (alphabet, tape_alphabet)
}

fn check_symbols(values: &[Option<String>], errors: &mut Vec<AnalysisError>) -> Vec<Symbol> {
    values
        .iter()
        .filter_map(|value| record_symbol(value.as_deref(), errors))
        .map(Symbol::from)
        .collect()
}

/// Checks every transition record, returning the ones that are well formed.
fn check_transitions(
    delta: &[RawTransition],
    states: Option<&[String]>,
    errors: &mut Vec<AnalysisError>,
) -> Vec<TransitionRecord> {
    delta
        .iter()
        .enumerate()
        .filter_map(|(index, transition)| check_transition(index, transition, states, errors))
        .collect()
}

fn check_transition(
    index: usize,
    transition: &RawTransition,
    states: Option<&[String]>,
    errors: &mut Vec<AnalysisError>,
) -> Option<TransitionRecord> {
    let (Some(params), Some(output)) = (&transition.params, &transition.output) else {
        let part = if transition.params.is_none() {
            "params"
        } else {
            "output"
        };
        errors.push(AnalysisError::MissingTransitionPart {
            index,
            part: part.to_string(),
        });
        return None;
    };

    let state =
        check_transition_state(index, params.state.as_ref(), "initial_state", states, errors);
    let next_state =
        check_transition_state(index, output.state.as_ref(), "final_state", states, errors);

    let direction = match output.displacement.as_deref() {
        None => {
            errors.push(AnalysisError::MissingTransitionField {
                index,
                field: "tape_displacement".to_string(),
            });
            None
        }
        Some(value) => value
            .parse::<Direction>()
            .map_err(|value| errors.push(AnalysisError::InvalidDisplacement { index, value }))
            .ok(),
    };

    let read = record_symbol(params.symbol.as_deref(), errors);
    let write = record_symbol(output.symbol.as_deref(), errors);

    Some(TransitionRecord {
        state: state?,
        cache_read: params.cache.clone(),
        read: read?,
        next_state: next_state?,
        cache_write: output.cache.clone(),
        write: write?,
        direction: direction?,
    })
}

/// Checks that a transition's state is present and, when `q_list` is known, a member of it.
fn check_transition_state(
    index: usize,
    state: Option<&String>,
    field: &str,
    states: Option<&[String]>,
    errors: &mut Vec<AnalysisError>,
) -> Option<String> {
    let Some(state) = state else {
        errors.push(AnalysisError::MissingTransitionField {
            index,
            field: field.to_string(),
        });
        return None;
    };

    if states.is_some_and(|states| !states.contains(state)) {
        errors.push(AnalysisError::UndefinedTransitionState {
            index,
            state: state.clone(),
        });
        return None;
    }

    Some(state.clone())
}

/// Converts a symbol value, recording an error for values longer than one character.
///
/// Absent and empty values stand for the blank symbol and yield `Some(None)`.
fn record_symbol(value: Option<&str>, errors: &mut Vec<AnalysisError>) -> Option<Option<char>> {
    let value = value.unwrap_or_default();
    let mut chars = value.chars();

    match (chars.next(), chars.next()) {
        (None, _) => Some(None),
        (Some(c), None) => Some(Some(c)),
        _ => {
            errors.push(AnalysisError::InvalidSymbol(value.to_string()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawOutput, RawParams};

    fn s(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn create_transition(from: &str, read: &str, to: &str, write: &str, dir: &str) -> RawTransition {
        RawTransition {
            params: Some(RawParams {
                state: s(from),
                cache: None,
                symbol: s(read),
            }),
            output: Some(RawOutput {
                state: s(to),
                cache: None,
                symbol: s(write),
                displacement: s(dir),
            }),
        }
    }

    fn create_test_config() -> RawConfig {
        RawConfig {
            name: s("Test Machine"),
            states: Some(RawStates {
                list: Some(vec![s("q0"), s("q1")]),
                initial: s("q0"),
                finals: Some(vec![s("q1")]),
            }),
            alphabet: Some(vec![s("a")]),
            tape_alphabet: Some(vec![s("a"), None]),
            delta: Some(vec![create_transition("q0", "a", "q1", "a", "R")]),
            simulation_strings: Some(vec![s("a"), None]),
        }
    }

    fn expect_errors(raw: &RawConfig) -> Vec<AnalysisError> {
        match analyze(raw) {
            Err(TuringMachineError::ValidationError(errors)) => errors,
            other => panic!("Expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = analyze(&create_test_config()).unwrap();

        assert_eq!(config.states, vec!["q0", "q1"]);
        assert_eq!(config.tape_alphabet, vec![Symbol::Mark('a'), Symbol::Blank]);
        assert_eq!(config.simulation_strings, vec!["a", ""]);
        assert_eq!(config.transitions[0].direction, Direction::Right);
        assert!(warnings(&config).is_empty());
    }

    #[test]
    fn test_missing_sections_reported_together() {
        let raw = RawConfig {
            states: None,
            delta: None,
            ..create_test_config()
        };

        assert_eq!(
            expect_errors(&raw),
            vec![
                AnalysisError::MissingSection("q_states".to_string()),
                AnalysisError::MissingSection("delta".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_state_fields() {
        let mut raw = create_test_config();
        raw.states = Some(RawStates {
            list: Some(vec![s("q0")]),
            initial: None,
            finals: Some(Vec::new()),
        });

        assert_eq!(
            expect_errors(&raw),
            vec![
                AnalysisError::MissingStateField("initial".to_string()),
                AnalysisError::MissingStateField("final".to_string()),
            ]
        );
    }

    #[test]
    fn test_undefined_initial_and_final_states() {
        let mut raw = create_test_config();
        raw.states = Some(RawStates {
            list: Some(vec![s("q0"), s("q1"), s("q1")]),
            initial: s("start"),
            finals: Some(vec![s("accept")]),
        });

        let errors = expect_errors(&raw);
        assert!(errors.contains(&AnalysisError::UndefinedInitialState("start".to_string())));
        assert!(errors.contains(&AnalysisError::UndefinedFinalState("accept".to_string())));
        assert!(errors.contains(&AnalysisError::DuplicateStates));
    }

    #[test]
    fn test_alphabet_errors() {
        let mut raw = create_test_config();
        raw.alphabet = Some(vec![s("a"), s("b"), None]);
        raw.tape_alphabet = Some(vec![s("a"), s("long")]);

        let errors = expect_errors(&raw);
        assert!(errors.contains(&AnalysisError::SymbolNotInTapeAlphabet("b".to_string())));
        assert!(errors.contains(&AnalysisError::InvalidSymbol("long".to_string())));
        // Blank entries of the input alphabet are not required on the tape alphabet.
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_empty_alphabets() {
        let mut raw = create_test_config();
        raw.alphabet = Some(Vec::new());
        raw.tape_alphabet = Some(Vec::new());

        let errors = expect_errors(&raw);
        assert!(errors.contains(&AnalysisError::EmptyAlphabet));
        assert!(errors.contains(&AnalysisError::EmptyTapeAlphabet));
    }

    #[test]
    fn test_transition_errors() {
        let mut raw = create_test_config();
        raw.delta = Some(vec![
            create_transition("q0", "a", "nowhere", "a", "R"),
            create_transition("q0", "a", "q1", "a", "X"),
            RawTransition {
                params: None,
                output: None,
            },
            RawTransition {
                params: Some(RawParams::default()),
                output: Some(RawOutput::default()),
            },
        ]);

        let errors = expect_errors(&raw);
        assert!(errors.contains(&AnalysisError::UndefinedTransitionState {
            index: 0,
            state: "nowhere".to_string()
        }));
        assert!(errors.contains(&AnalysisError::InvalidDisplacement {
            index: 1,
            value: "X".to_string()
        }));
        assert!(errors.contains(&AnalysisError::MissingTransitionPart {
            index: 2,
            part: "params".to_string()
        }));
        for field in ["initial_state", "final_state", "tape_displacement"] {
            assert!(errors.contains(&AnalysisError::MissingTransitionField {
                index: 3,
                field: field.to_string()
            }));
        }
    }

    #[test]
    fn test_blank_symbols_in_transitions() {
        let mut raw = create_test_config();
        raw.delta = Some(vec![create_transition("q0", "", "q1", "", "S")]);

        let config = analyze(&raw).unwrap();
        assert_eq!(config.transitions[0].read, None);
        assert_eq!(config.transitions[0].write, None);
    }

    #[test]
    fn test_warnings() {
        let mut raw = create_test_config();
        raw.delta = Some(Vec::new());
        raw.simulation_strings = Some(vec![s("aza")]);

        let config = analyze(&raw).unwrap();
        assert_eq!(
            warnings(&config),
            vec![
                AnalysisWarning::EmptyTransitionTable,
                AnalysisWarning::UndefinedInputSymbol {
                    index: 0,
                    input: "aza".to_string(),
                    symbol: 'z'
                },
            ]
        );
    }
}
