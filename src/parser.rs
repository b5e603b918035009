//! This module provides the parser for machine configuration files, utilizing the `pest` crate.
//! The grammar in `grammar.pest` covers the YAML subset used by configuration files; this module
//! turns its parse tree into a [`RawConfig`] and hands that to the analyzer.

use crate::{
    analyzer::{analyze, warnings},
    types::{
        MachineConfig, RawConfig, RawOutput, RawParams, RawStates, RawTransition,
        TuringMachineError, MAX_CONFIG_SIZE,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;
use tracing::warn;

/// Plain scalars that YAML reads as null.
const NULL_SCALARS: [&str; 4] = ["~", "null", "Null", "NULL"];

/// Derives a `PestParser` for the configuration grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct ConfigParser;

/// Parses and validates a configuration text.
///
/// This is the main entry point for reading machine definitions. The text is parsed into a
/// [`RawConfig`], which is then validated by [`analyze`]. Non-fatal findings are logged.
///
/// # Returns
///
/// * `Ok(MachineConfig)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if the configuration fails validation.
pub fn parse(input: &str) -> Result<MachineConfig, TuringMachineError> {
    let raw = parse_raw(input)?;
    let config = analyze(&raw)?;

    for warning in warnings(&config) {
        warn!(%warning, "configuration warning");
    }

    Ok(config)
}

/// Parses a configuration text into its untyped shape without validating it.
pub fn parse_raw(input: &str) -> Result<RawConfig, TuringMachineError> {
    if input.len() > MAX_CONFIG_SIZE {
        return Err(TuringMachineError::ConfigTooLarge(input.len()));
    }

    let mut pairs = ConfigParser::parse(Rule::document, input)
        .map_err(|e| TuringMachineError::ParseError(Box::new(e)))?;

    match pairs.next() {
        Some(root) => parse_document(root),
        None => Ok(RawConfig::default()),
    }
}

/// Walks the top-level sections, rejecting any that is declared twice.
fn parse_document(pair: Pair<Rule>) -> Result<RawConfig, TuringMachineError> {
    let mut config = RawConfig::default();
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let rule = p.as_rule();
        check_unique_rule(rule, p.as_span(), &mut seen)?;

        match rule {
            Rule::name => config.name = first_scalar(p),
            Rule::q_states => config.states = Some(parse_states(p)?),
            Rule::alphabet => config.alphabet = Some(parse_sequence_field(p)),
            Rule::tape_alphabet => config.tape_alphabet = Some(parse_sequence_field(p)),
            Rule::simulation_strings => {
                config.simulation_strings = Some(parse_sequence_field(p));
            }
            Rule::delta => config.delta = Some(parse_delta(p)?),
            Rule::unknown_section => {
                let key = p.into_inner().next().map_or("", |k| k.as_str());
                warn!(key, "ignoring unknown configuration section");
            }
            _ => {}
        }
    }

    Ok(config)
}

/// Parses the `q_states` section.
fn parse_states(pair: Pair<Rule>) -> Result<RawStates, TuringMachineError> {
    let mut states = RawStates::default();
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        check_unique_rule(p.as_rule(), p.as_span(), &mut seen)?;

        match p.as_rule() {
            Rule::state_list => states.list = Some(parse_sequence_field(p)),
            Rule::start_state => states.initial = first_scalar(p),
            Rule::accept_states => states.finals = Some(parse_accept_states(p)),
            _ => {}
        }
    }

    Ok(states)
}

/// `final` is either a single state or a sequence of states.
fn parse_accept_states(pair: Pair<Rule>) -> Vec<Option<String>> {
    match pair.into_inner().next() {
        Some(inner) if inner.as_rule() == Rule::sequence => parse_sequence(inner),
        Some(inner) => vec![parse_scalar(inner)],
        None => Vec::new(),
    }
}

/// Parses the `delta` section into its transition entries.
fn parse_delta(pair: Pair<Rule>) -> Result<Vec<RawTransition>, TuringMachineError> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::transition)
        .map(parse_transition)
        .collect()
}

/// Parses a single `- params: ... output: ...` entry.
fn parse_transition(pair: Pair<Rule>) -> Result<RawTransition, TuringMachineError> {
    let mut transition = RawTransition::default();
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        check_unique_rule(p.as_rule(), p.as_span(), &mut seen)?;

        match p.as_rule() {
            Rule::params => {
                let mut params = RawParams::default();
                for field in p.into_inner() {
                    check_unique_rule(field.as_rule(), field.as_span(), &mut seen)?;
                    match field.as_rule() {
                        Rule::from_state => params.state = first_scalar(field),
                        Rule::cache_in => params.cache = first_scalar(field),
                        Rule::tape_input => params.symbol = first_scalar(field),
                        _ => {}
                    }
                }
                transition.params = Some(params);
            }
            Rule::output => {
                let mut output = RawOutput::default();
                for field in p.into_inner() {
                    check_unique_rule(field.as_rule(), field.as_span(), &mut seen)?;
                    match field.as_rule() {
                        Rule::to_state => output.state = first_scalar(field),
                        Rule::cache_out => output.cache = first_scalar(field),
                        Rule::tape_output => output.symbol = first_scalar(field),
                        Rule::displacement => output.displacement = first_scalar(field),
                        _ => {}
                    }
                }
                transition.output = Some(output);
            }
            _ => {}
        }
    }

    Ok(transition)
}

/// Parses a `key: <sequence>` field.
fn parse_sequence_field(pair: Pair<Rule>) -> Vec<Option<String>> {
    pair.into_inner()
        .next()
        .map(parse_sequence)
        .unwrap_or_default()
}

/// Parses a flow or block sequence; an empty entry yields `None`.
fn parse_sequence(pair: Pair<Rule>) -> Vec<Option<String>> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::item)
        .map(|item| item.into_inner().next().and_then(parse_scalar))
        .collect()
}

/// Returns the scalar value of a `key: value` field, if present.
fn first_scalar(pair: Pair<Rule>) -> Option<String> {
    pair.into_inner().next().and_then(parse_scalar)
}

/// Converts a scalar pair into its string value.
///
/// Quoted scalars are unescaped and may be empty; plain null markers become `None`.
fn parse_scalar(pair: Pair<Rule>) -> Option<String> {
    match pair.as_rule() {
        Rule::single_quoted => Some(inner_str(pair).replace("''", "'")),
        Rule::double_quoted => Some(unescape_double(&inner_str(pair))),
        Rule::plain => {
            let text = pair.as_str();
            (!NULL_SCALARS.contains(&text)).then(|| text.to_string())
        }
        _ => None,
    }
}

/// Extracts the inner string content from a quoted scalar.
fn inner_str(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Resolves the escapes of a double-quoted scalar.
fn unescape_double(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks that a keyed rule appears at most once in its enclosing block.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    let Some(key) = rule_key(rule) else {
        return Ok(());
    };

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{key}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// The configuration key a rule corresponds to, for keyed rules.
fn rule_key(rule: Rule) -> Option<&'static str> {
    let key = match rule {
        Rule::name => "name",
        Rule::q_states => "q_states",
        Rule::alphabet => "alphabet",
        Rule::tape_alphabet => "tape_alphabet",
        Rule::delta => "delta",
        Rule::simulation_strings => "simulation_strings",
        Rule::state_list => "q_list",
        Rule::start_state => "initial",
        Rule::accept_states => "final",
        Rule::params => "params",
        Rule::output => "output",
        Rule::from_state => "initial_state",
        Rule::cache_in | Rule::cache_out => "mem_cache_value",
        Rule::tape_input => "tape_input",
        Rule::to_state => "final_state",
        Rule::tape_output => "tape_output",
        Rule::displacement => "tape_displacement",
        _ => return None,
    };

    Some(key)
}
