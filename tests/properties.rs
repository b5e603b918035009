//! Property-based tests for the execution engine.
//!
//! Machines are generated over a fixed set of states, register values and symbols with a
//! random partial transition function, then run on random inputs.

use proptest::prelude::*;
use tmsim::tape::trim;
use tmsim::{
    execute, Direction, HaltReason, MachineConfig, Symbol, TransitionRecord, TuringMachine,
};

const STATES: [&str; 4] = ["q0", "q1", "q2", "q3"];
const CACHES: [&str; 2] = ["", "x"];
const READS: [Option<char>; 3] = [Some('a'), Some('b'), None];

prop_compose! {
    fn arbitrary_direction()(variant in 0..3u8) -> Direction {
        match variant {
            0 => Direction::Left,
            1 => Direction::Right,
            _ => Direction::Stay,
        }
    }
}

prop_compose! {
    fn arbitrary_write()(variant in 0..3usize) -> Option<char> {
        READS[variant]
    }
}

fn cache_value(index: usize) -> Option<String> {
    match CACHES[index] {
        "" => None,
        value => Some(value.to_string()),
    }
}

prop_compose! {
    /// One optional move per (state, register, symbol) triple; `q3` is the only final state.
    fn arbitrary_machine()(
        moves in prop::collection::vec(
            prop::option::of((
                0..STATES.len(),
                0..CACHES.len(),
                arbitrary_write(),
                arbitrary_direction(),
            )),
            STATES.len() * CACHES.len() * READS.len(),
        )
    ) -> TuringMachine {
        let transitions = moves
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                let state = i / (CACHES.len() * READS.len());
                let cache = (i / READS.len()) % CACHES.len();
                entry.map(|(next, next_cache, write, direction)| TransitionRecord {
                    state: STATES[state].to_string(),
                    cache_read: cache_value(cache),
                    read: READS[i % READS.len()],
                    next_state: STATES[next].to_string(),
                    cache_write: cache_value(next_cache),
                    write,
                    direction,
                })
            })
            .collect();

        build_machine(transitions)
    }
}

prop_compose! {
    /// Every move reads the register value `x`, which the machine never starts with.
    fn register_gated_machine()(
        moves in prop::collection::vec(
            (0..STATES.len(), arbitrary_write(), arbitrary_direction()),
            STATES.len() * READS.len(),
        )
    ) -> TuringMachine {
        let transitions = moves
            .into_iter()
            .enumerate()
            .map(|(i, (next, write, direction))| TransitionRecord {
                state: STATES[i / READS.len()].to_string(),
                cache_read: Some("x".to_string()),
                read: READS[i % READS.len()],
                next_state: STATES[next].to_string(),
                cache_write: None,
                write,
                direction,
            })
            .collect();

        build_machine(transitions)
    }
}

fn build_machine(transitions: Vec<TransitionRecord>) -> TuringMachine {
    TuringMachine::new(MachineConfig {
        name: None,
        states: STATES.iter().map(|s| s.to_string()).collect(),
        initial_state: "q0".to_string(),
        final_states: vec!["q3".to_string()],
        alphabet: vec![Symbol::Mark('a'), Symbol::Mark('b')],
        tape_alphabet: vec![Symbol::Mark('a'), Symbol::Mark('b'), Symbol::Blank],
        transitions,
        simulation_strings: Vec::new(),
    })
}

fn arbitrary_cells() -> impl Strategy<Value = Vec<Symbol>> {
    prop::collection::vec(
        prop_oneof![Just(Symbol::Blank), Just(Symbol::Mark('a'))],
        0..12,
    )
}

proptest! {
    #[test]
    fn trace_has_one_entry_per_step(
        machine in arbitrary_machine(),
        input in "[ab]{0,8}",
        budget in 0..60usize,
    ) {
        let result = execute(&machine, &input, budget);
        prop_assert_eq!(result.trace.len(), result.stats.steps + 1);
        prop_assert!(result.stats.steps <= budget);
    }

    #[test]
    fn last_description_shows_final_state(
        machine in arbitrary_machine(),
        input in "[ab]{0,8}",
    ) {
        let result = execute(&machine, &input, 50);
        let last = result.trace.last().unwrap();
        let plain = format!("[{}]", result.stats.final_state);
        let with_register = format!("[{}[", result.stats.final_state);
        prop_assert!(last.contains(&plain) || last.contains(&with_register));
    }

    #[test]
    fn empty_register_blocks_register_moves(
        machine in register_gated_machine(),
        input in "[ab]{0,8}",
    ) {
        let result = execute(&machine, &input, 50);
        prop_assert_eq!(result.stats.steps, 0);
        prop_assert_eq!(result.trace.len(), 1);
        let blocked = matches!(
            &result.halt,
            HaltReason::NoTransition { state, .. } if state == "q0"
        );
        prop_assert!(blocked);
    }

    #[test]
    fn acceptance_implies_final_state(
        machine in arbitrary_machine(),
        input in "[ab]{0,8}",
    ) {
        let result = execute(&machine, &input, 50);
        if result.accepted {
            prop_assert!(machine.is_final(&result.stats.final_state));
            prop_assert_eq!(result.halt, HaltReason::FinalState);
        }
    }

    #[test]
    fn budget_exhaustion_uses_every_step(
        machine in arbitrary_machine(),
        input in "[ab]{0,8}",
        budget in 0..40usize,
    ) {
        let result = execute(&machine, &input, budget);
        if let HaltReason::StepLimit { budget: used } = result.halt {
            prop_assert!(!result.accepted);
            prop_assert_eq!(used, budget);
            prop_assert_eq!(result.stats.steps, budget);
        }
    }

    #[test]
    fn execution_is_repeatable(
        machine in arbitrary_machine(),
        input in "[ab]{0,8}",
    ) {
        let first = execute(&machine, &input, 50);
        let second = execute(&machine, &input, 50);

        prop_assert_eq!(first.accepted, second.accepted);
        prop_assert_eq!(&first.trace, &second.trace);
        prop_assert_eq!(&first.halt, &second.halt);
        prop_assert_eq!(&first.final_tape, &second.final_tape);
        prop_assert_eq!(first.stats.steps, second.stats.steps);
        prop_assert_eq!(&first.stats.states_visited, &second.stats.states_visited);
    }

    #[test]
    fn tape_never_shrinks(
        machine in arbitrary_machine(),
        input in "[ab]{0,8}",
    ) {
        let result = execute(&machine, &input, 50);
        prop_assert!(result.stats.max_tape_size >= input.chars().count().max(1));
        prop_assert!(result.stats.max_tape_size <= input.chars().count().max(1) + result.stats.steps + 1);
    }

    #[test]
    fn trim_is_idempotent(cells in arbitrary_cells()) {
        let once = trim(&cells);
        prop_assert_eq!(trim(once), once);
    }

    #[test]
    fn trim_keeps_last_mark(cells in arbitrary_cells()) {
        let trimmed = trim(&cells);
        if let Some(last_mark) = cells.iter().rposition(|c| !c.is_blank()) {
            prop_assert_eq!(trimmed.len(), last_mark + 1);
        } else {
            prop_assert!(trimmed.len() <= 1);
        }
    }
}
