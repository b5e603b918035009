//! Text report of a simulation batch, printed with colors and kept as plain text for saving.

use crossterm::style::{Color, Stylize};
use regex::Regex;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tmsim::{BatchSummary, ExecutionResult, ExecutionStats, Symbol, TuringMachine};

const SEPARATOR_WIDTH: usize = 70;
const TABLE_CELL_WIDTH: usize = 12;

lazy_static::lazy_static! {
    static ref ANSI_ESCAPE: Regex = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
}

/// How many instantaneous descriptions are printed per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Every description.
    Full,
    /// Only the first and the last description.
    Compact,
    /// The first and last `n / 2` descriptions when a run has more than `n`.
    Limit(usize),
}

pub struct Reporter<W: Write> {
    out: W,
    colored: bool,
    mode: DisplayMode,
    plain_lines: Vec<String>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, colored: bool, mode: DisplayMode) -> Self {
        Self {
            out,
            colored,
            mode,
            plain_lines: Vec::new(),
        }
    }

    /// Prints a line and keeps its plain-text version.
    fn line(&mut self, text: impl Into<String>) -> io::Result<()> {
        let text = text.into();
        writeln!(self.out, "{text}")?;
        self.plain_lines.push(strip_ansi(&text));
        Ok(())
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.colored {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn title(&self, text: &str) -> String {
        if self.colored {
            text.with(Color::Blue).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn separator(&mut self) -> io::Result<()> {
        let line = self.title(&separator('='));
        self.line(line)
    }

    pub fn print_header(&mut self, machine: &TuringMachine) -> io::Result<()> {
        self.separator()?;
        let title = self.title(machine.name().unwrap_or("TURING MACHINE SIMULATOR"));
        self.line(title)?;
        self.separator()?;

        self.line(format!("\nStates: {}", machine.states().join(", ")))?;
        self.line(format!("Initial state: {}", machine.initial_state()))?;
        self.line(format!(
            "Final states: {}",
            machine.final_states().join(", ")
        ))?;
        self.line(format!("Alphabet: {{{}}}", symbols(machine.alphabet())))?;
        self.line(format!(
            "Tape alphabet: {{{}}}",
            symbols(machine.tape_alphabet())
        ))?;
        self.line(format!(
            "\nNumber of transitions: {}",
            machine.summary().transition_count
        ))?;
        self.separator()
    }

    pub fn print_simulation_header(&mut self, index: usize, input: &str) -> io::Result<()> {
        let rule = self.title(&format!("\n{}", separator('=')));
        self.line(rule)?;
        let title = self.title(&format!("SIMULATION {index}: \"{input}\""));
        self.line(title)?;
        self.separator()
    }

    pub fn print_result(&mut self, result: &ExecutionResult) -> io::Result<()> {
        self.print_trace(&result.trace)?;
        self.print_final_tape(result)?;
        self.print_stats(&result.stats)?;

        let message = self.paint(&format!("\nMessage: {}", result.message()), Color::Cyan);
        self.line(message)?;

        let verdict = if result.accepted {
            self.paint("RESULT: ACCEPTED", Color::Green)
        } else {
            self.paint("RESULT: REJECTED", Color::Red)
        };
        self.line(verdict)?;
        self.separator()
    }

    fn print_trace(&mut self, trace: &[String]) -> io::Result<()> {
        self.line(format!(
            "\nInstantaneous descriptions ({} steps):",
            trace.len().saturating_sub(1)
        ))?;
        self.line(separator('-'))?;

        for row in trace_window(trace.len(), self.mode) {
            match row {
                TraceRow::Step(i) => self.line(format!("  {}: {}", i, trace[i]))?,
                TraceRow::Ellipsis => self.line("  ...")?,
                TraceRow::Omitted(n) => self.line(format!("  ... ({n} steps omitted) ..."))?,
            }
        }

        self.line(separator('-'))
    }

    fn print_final_tape(&mut self, result: &ExecutionResult) -> io::Result<()> {
        let heading = self.paint("\nFINAL TAPE:", Color::Cyan);
        self.line(heading)?;
        self.line(format!("   Input:  \"{}\"", result.input))?;
        self.line(format!("   Output: \"{}\"", result.final_tape))?;

        let note = if result.tape_modified() {
            self.paint("   The tape was modified", Color::Yellow)
        } else {
            self.paint("   The tape was not modified", Color::Cyan)
        };
        self.line(note)
    }

    fn print_stats(&mut self, stats: &ExecutionStats) -> io::Result<()> {
        let heading = self.paint("\nSTATISTICS:", Color::Cyan);
        self.line(heading)?;
        self.line(format!("   Steps executed: {}", stats.steps))?;
        self.line(format!(
            "   Execution time: {:.6} s",
            stats.execution_time.as_secs_f64()
        ))?;
        self.line(format!("   Max tape size: {} cells", stats.max_tape_size))?;
        self.line(format!(
            "   Unique transitions used: {}",
            stats.unique_transitions
        ))?;
        self.line(format!("   Final state: {}", stats.final_state))?;

        self.line("   Most visited states:")?;
        for (state, count) in stats.most_visited().into_iter().take(3) {
            self.line(format!("     - {state}: {count} times"))?;
        }
        Ok(())
    }

    /// Prints the comparison table and the batch statistics.
    pub fn print_comparison(&mut self, results: &[ExecutionResult]) -> io::Result<()> {
        let rule = self.title(&format!("\n{}", separator('=')));
        self.line(rule)?;
        let title = self.title("COMPARATIVE SUMMARY");
        self.line(title)?;
        self.separator()?;

        self.line(format!(
            "\n{:<15} {:<15} {:<12} {:<8} {:<12}",
            "Input", "Output", "Result", "Steps", "Time (s)"
        ))?;
        self.line(separator('-'))?;

        for result in results {
            let verdict = if result.accepted {
                self.paint(&format!("{:<12}", "ACCEPTED"), Color::Green)
            } else {
                self.paint(&format!("{:<12}", "REJECTED"), Color::Red)
            };

            self.line(format!(
                "{:<15} {:<15} {} {:<8} {:<12.6}",
                truncate(&result.input, TABLE_CELL_WIDTH),
                truncate(&result.final_tape, TABLE_CELL_WIDTH),
                verdict,
                result.stats.steps,
                result.stats.execution_time.as_secs_f64()
            ))?;
        }
        self.line(separator('-'))?;

        self.print_batch_summary(&BatchSummary::from_results(results))
    }

    fn print_batch_summary(&mut self, summary: &BatchSummary) -> io::Result<()> {
        let heading = self.paint("\nGLOBAL STATISTICS:", Color::Cyan);
        self.line(heading)?;
        self.line(format!("   Total simulations: {}", summary.total))?;
        self.line(format!(
            "   Accepted strings: {}/{}",
            summary.accepted, summary.total
        ))?;
        self.line(format!(
            "   Rejected strings: {}/{}",
            summary.rejected, summary.total
        ))?;
        self.line(format!("   Total steps: {}", summary.total_steps))?;
        self.line(format!(
            "   Total time: {:.6} s",
            summary.total_time.as_secs_f64()
        ))?;
        self.line(format!(
            "   Average steps per string: {:.2}",
            summary.average_steps
        ))?;
        self.line(format!(
            "   Average time per string: {:.6} s",
            summary.average_time.as_secs_f64()
        ))?;
        self.separator()
    }

    /// The report printed so far, without color codes.
    pub fn plain_text(&self) -> String {
        self.plain_lines.join("\n")
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.plain_text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraceRow {
    Step(usize),
    Ellipsis,
    Omitted(usize),
}

/// Chooses which of `len` trace entries are printed.
fn trace_window(len: usize, mode: DisplayMode) -> Vec<TraceRow> {
    match mode {
        DisplayMode::Compact => {
            let mut rows = vec![TraceRow::Step(0)];
            if len > 1 {
                rows.push(TraceRow::Ellipsis);
                rows.push(TraceRow::Step(len - 1));
            }
            rows
        }
        DisplayMode::Limit(limit) if len > limit => {
            let half = limit / 2;
            let mut rows: Vec<_> = (0..half).map(TraceRow::Step).collect();
            rows.push(TraceRow::Omitted(len - limit));
            rows.extend((len - half..len).map(TraceRow::Step));
            rows
        }
        _ => (0..len).map(TraceRow::Step).collect(),
    }
}

fn symbols(alphabet: &[Symbol]) -> String {
    alphabet
        .iter()
        .map(Symbol::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn separator(c: char) -> String {
    c.to_string().repeat(SEPARATOR_WIDTH)
}

/// Shortens `text` to at most `max` characters, ending in `...` when cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}
