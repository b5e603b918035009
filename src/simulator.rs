//! Batch execution of input strings and aggregate statistics over the results.

use crate::executor::{ExecutionResult, Executor};
use crate::machine::TuringMachine;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Runs input strings on one machine, keeping results in input order.
pub struct Simulator<'m> {
    machine: &'m TuringMachine,
    executor: Executor<'m>,
}

impl<'m> Simulator<'m> {
    pub fn new(machine: &'m TuringMachine) -> Self {
        Self {
            machine,
            executor: Executor::new(machine),
        }
    }

    /// Sets the maximum number of transitions applied per input.
    pub fn with_step_budget(mut self, step_budget: usize) -> Self {
        self.executor = self.executor.with_step_budget(step_budget);
        self
    }

    /// Runs a single input string.
    pub fn run(&self, input: &str) -> ExecutionResult {
        self.executor.execute(input)
    }

    /// Runs the simulation strings declared by the machine configuration.
    pub fn run_all(&self) -> Vec<ExecutionResult> {
        self.run_inputs(self.machine.simulation_strings())
    }

    /// Runs the given inputs; the i-th result belongs to the i-th input.
    pub fn run_inputs<S: AsRef<str>>(&self, inputs: &[S]) -> Vec<ExecutionResult> {
        let results: Vec<_> = inputs.iter().map(|input| self.run(input.as_ref())).collect();

        let summary = BatchSummary::from_results(&results);
        info!(
            total = summary.total,
            accepted = summary.accepted,
            rejected = summary.rejected,
            steps = summary.total_steps,
            budget = self.executor.step_budget(),
            "simulation batch finished"
        );

        results
    }
}

/// Aggregate statistics over a batch of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub total_steps: usize,
    pub total_time: Duration,
    pub average_steps: f64,
    pub average_time: Duration,
}

impl BatchSummary {
    /// Sums and averages the statistics of `results`; averages of an empty batch are zero.
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        let total = results.len();
        let accepted = results.iter().filter(|r| r.accepted).count();
        let total_steps: usize = results.iter().map(|r| r.stats.steps).sum();
        let total_time: Duration = results.iter().map(|r| r.stats.execution_time).sum();

        let (average_steps, average_time) = if total == 0 {
            (0.0, Duration::ZERO)
        } else {
            let average_time = u32::try_from(total)
                .map_or_else(|_| total_time.div_f64(total as f64), |n| total_time / n);
            (total_steps as f64 / total as f64, average_time)
        };

        Self {
            total,
            accepted,
            rejected: total - accepted,
            total_steps,
            total_time,
            average_steps,
            average_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutionStats, HaltReason};
    use std::collections::BTreeMap;

    const MACHINE: &str = r#"
q_states:
  q_list: [q0, qf]
  initial: q0
  final: qf
alphabet: [a]
tape_alphabet: [a, '']
delta:
  - params:
      initial_state: q0
      tape_input: a
    output:
      final_state: q0
      tape_output: a
      tape_displacement: R
  - params:
      initial_state: q0
    output:
      final_state: qf
      tape_displacement: S
simulation_strings: [aaa, '', b]
"#;

    fn result(accepted: bool, steps: usize, millis: u64) -> ExecutionResult {
        ExecutionResult {
            input: String::new(),
            accepted,
            trace: Vec::new(),
            halt: HaltReason::FinalState,
            stats: ExecutionStats {
                steps,
                execution_time: Duration::from_millis(millis),
                max_tape_size: 1,
                states_visited: BTreeMap::new(),
                unique_transitions: 0,
                final_state: String::new(),
            },
            final_tape: String::new(),
        }
    }

    #[test]
    fn test_run_all_keeps_input_order() {
        let machine = TuringMachine::from_yaml(MACHINE).unwrap();
        let results = Simulator::new(&machine).run_all();

        let inputs: Vec<_> = results.iter().map(|r| r.input.as_str()).collect();
        assert_eq!(inputs, vec!["aaa", "", "b"]);

        let verdicts: Vec<_> = results.iter().map(|r| r.accepted).collect();
        assert_eq!(verdicts, vec![true, true, false]);
        assert_eq!(results[0].stats.steps, 4);
    }

    #[test]
    fn test_step_budget_is_applied() {
        let machine = TuringMachine::from_yaml(MACHINE).unwrap();
        let result = Simulator::new(&machine).with_step_budget(2).run("aaa");

        assert!(!result.accepted);
        assert_eq!(result.halt, HaltReason::StepLimit { budget: 2 });
    }

    #[test]
    fn test_batch_summary() {
        let summary = BatchSummary::from_results(&[
            result(true, 4, 10),
            result(false, 2, 20),
            result(true, 0, 30),
        ]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.total_steps, 6);
        assert_eq!(summary.total_time, Duration::from_millis(60));
        assert_eq!(summary.average_steps, 2.0);
        assert_eq!(summary.average_time, Duration::from_millis(20));
    }

    #[test]
    fn test_empty_batch_summary() {
        let summary = BatchSummary::from_results(&[]);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_steps, 0.0);
        assert_eq!(summary.average_time, Duration::ZERO);
    }
}
