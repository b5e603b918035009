//! The execution engine. It runs one input string on a [`TuringMachine`] until the machine
//! halts or the step budget is used up, recording an instantaneous description after every
//! applied transition together with run statistics.

use crate::machine::{TransitionKey, TuringMachine};
use crate::tape::Tape;
use crate::types::{Symbol, MAX_EXECUTION_STEPS};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, debug_span};

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HaltReason {
    /// The machine entered, or started in, a final state.
    FinalState,
    /// No transition is defined for the current configuration.
    NoTransition { state: String, symbol: Symbol },
    /// The step budget was used up.
    StepLimit { budget: usize },
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::FinalState => write!(f, "final state reached"),
            HaltReason::NoTransition { state, symbol } => {
                write!(f, "no transition from state '{state}' on symbol '{symbol}'")
            }
            HaltReason::StepLimit { .. } => {
                write!(f, "step limit exceeded (possible infinite loop)")
            }
        }
    }
}

/// Statistics of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStats {
    /// Number of transitions applied.
    pub steps: usize,
    /// Wall-clock duration of the run.
    pub execution_time: Duration,
    /// The largest number of materialized cells seen.
    pub max_tape_size: usize,
    /// How often each state was entered; the initial state counts once at the start.
    pub states_visited: BTreeMap<String, usize>,
    /// Number of distinct transition keys applied.
    pub unique_transitions: usize,
    /// The state the machine stopped in.
    pub final_state: String,
}

impl ExecutionStats {
    /// Visited states ordered by visit count, most visited first; ties by name.
    pub fn most_visited(&self) -> Vec<(&str, usize)> {
        let mut states: Vec<_> = self
            .states_visited
            .iter()
            .map(|(state, count)| (state.as_str(), *count))
            .collect();
        states.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        states
    }
}

/// The outcome of running one input string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    /// The input string the run started from.
    pub input: String,
    /// Whether the input was accepted.
    pub accepted: bool,
    /// Instantaneous descriptions, starting with the initial configuration.
    pub trace: Vec<String>,
    /// Why the run stopped.
    pub halt: HaltReason,
    pub stats: ExecutionStats,
    /// The tape content when the run stopped, without trailing blanks.
    pub final_tape: String,
}

impl ExecutionResult {
    /// The human-readable halt message.
    pub fn message(&self) -> String {
        self.halt.to_string()
    }

    /// Whether the machine changed the tape content.
    pub fn tape_modified(&self) -> bool {
        self.final_tape != self.input
    }
}

/// Runs input strings on a machine with a fixed step budget.
///
/// An `Executor` only borrows the machine; every call to [`Executor::execute`] owns its own
/// tape and statistics, so runs are independent.
#[derive(Debug, Clone, Copy)]
pub struct Executor<'m> {
    machine: &'m TuringMachine,
    step_budget: usize,
}

impl<'m> Executor<'m> {
    /// Creates an executor with the default budget of `MAX_EXECUTION_STEPS`.
    pub fn new(machine: &'m TuringMachine) -> Self {
        Self {
            machine,
            step_budget: MAX_EXECUTION_STEPS,
        }
    }

    /// Sets the maximum number of transitions applied per run.
    pub fn with_step_budget(mut self, step_budget: usize) -> Self {
        self.step_budget = step_budget;
        self
    }

    /// The maximum number of transitions applied per run.
    pub fn step_budget(&self) -> usize {
        self.step_budget
    }

    /// Runs the machine on `input` until it halts or the step budget is used up.
    ///
    /// Halting is never an error: rejection, a missing transition and budget exhaustion
    /// are all reported through [`ExecutionResult::accepted`] and [`ExecutionResult::halt`].
    pub fn execute(&self, input: &str) -> ExecutionResult {
        let span = debug_span!("execute", input, budget = self.step_budget);
        let _enter = span.enter();

        let machine = self.machine;
        let mut run = Run::new(machine, input);

        while run.steps < self.step_budget {
            run.tape.normalize();
            let symbol = run.tape.read();

            let Some(transition) = machine.transition_for(&run.state, &run.cache, symbol) else {
                let halt = if machine.is_final(&run.state) {
                    HaltReason::FinalState
                } else {
                    HaltReason::NoTransition {
                        state: run.state.clone(),
                        symbol,
                    }
                };
                let accepted = machine.is_final(&run.state);
                return run.finish(accepted, halt);
            };

            run.transitions_used
                .insert(TransitionKey::new(&run.state, &run.cache, symbol));

            run.tape.write(transition.write);
            run.state.clone_from(&transition.next_state);
            run.cache.clone_from(&transition.next_cache);
            run.tape.shift(transition.direction);

            run.steps += 1;
            run.max_tape_size = run.max_tape_size.max(run.tape.len());
            *run.states_visited.entry(run.state.clone()).or_insert(0) += 1;
            run.record();

            if machine.is_final(&run.state) {
                return run.finish(true, HaltReason::FinalState);
            }
        }

        let budget = self.step_budget;
        run.finish(false, HaltReason::StepLimit { budget })
    }
}

/// Runs `input` on `machine` with the given step budget.
pub fn execute(machine: &TuringMachine, input: &str, step_budget: usize) -> ExecutionResult {
    Executor::new(machine)
        .with_step_budget(step_budget)
        .execute(input)
}

/// Renders the control part of an instantaneous description: the state, followed by the
/// memory value in brackets when it is not empty.
pub fn control_label(state: &str, cache: &str) -> String {
    if cache.is_empty() {
        state.to_string()
    } else {
        format!("{state}[{cache}]")
    }
}

/// The mutable state of one run. Dropped once its result is built.
struct Run {
    input: String,
    tape: Tape,
    state: String,
    cache: String,
    steps: usize,
    max_tape_size: usize,
    states_visited: BTreeMap<String, usize>,
    transitions_used: HashSet<TransitionKey>,
    trace: Vec<String>,
    started: Instant,
}

impl Run {
    fn new(machine: &TuringMachine, input: &str) -> Self {
        let tape = Tape::new(input);
        let state = machine.initial_state().to_string();

        let mut run = Self {
            input: input.to_string(),
            max_tape_size: tape.len(),
            tape,
            states_visited: BTreeMap::from([(state.clone(), 1)]),
            state,
            cache: String::new(),
            steps: 0,
            transitions_used: HashSet::new(),
            trace: Vec::new(),
            started: Instant::now(),
        };
        run.record();
        run
    }

    /// Appends the instantaneous description of the current configuration.
    fn record(&mut self) {
        let description = self
            .tape
            .describe(&control_label(&self.state, &self.cache));
        self.trace.push(description);
    }

    fn finish(self, accepted: bool, halt: HaltReason) -> ExecutionResult {
        debug!(accepted, steps = self.steps, %halt, "machine halted");

        ExecutionResult {
            final_tape: self.tape.content(),
            stats: ExecutionStats {
                steps: self.steps,
                execution_time: self.started.elapsed(),
                max_tape_size: self.max_tape_size,
                states_visited: self.states_visited,
                unique_transitions: self.transitions_used.len(),
                final_state: self.state,
            },
            input: self.input,
            accepted,
            trace: self.trace,
            halt,
        }
    }
}
