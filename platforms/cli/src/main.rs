mod report;

use clap::Parser;
use report::{DisplayMode, Reporter};
use serde::Serialize;
use std::error::Error;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::{fs, process};
use tmsim::{
    to_dot, BatchSummary, ConfigLoader, ExecutionResult, MachineCatalog, MachineSummary,
    Simulator, TuringMachine, MAX_EXECUTION_STEPS,
};
use tracing::{debug, Level};

/// Simulates a deterministic Turing machine on a set of input strings.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim-cli machines/anbn.yaml
  tmsim-cli machines/anbn.yaml -c -o report.txt
  tmsim-cli machines/anbn.yaml -l 20 -i aaabbb -i abab
  tmsim-cli --builtin \"Binary increment\" --json
  cat machines/anbn.yaml | tmsim-cli")]
struct Cli {
    /// Path to a machine configuration file (.yaml).
    /// Can also pipe the configuration via stdin.
    config: Option<PathBuf>,

    /// Save the report to a file, without colors
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only show the first and last instantaneous description of each run
    #[clap(short, long)]
    compact: bool,

    /// Show at most N instantaneous descriptions per run
    #[clap(short, long, value_name = "N")]
    limit: Option<usize>,

    /// Maximum number of steps per run
    #[clap(short, long = "max-steps", value_name = "STEPS", default_value_t = MAX_EXECUTION_STEPS)]
    max_steps: usize,

    /// Input string to simulate instead of the configured ones (repeatable)
    #[clap(short, long = "input", value_name = "INPUT")]
    inputs: Vec<String>,

    /// Write the transition graph in DOT format to a file
    #[clap(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Print the results as JSON instead of a report
    #[clap(long)]
    json: bool,

    /// Use a built-in machine instead of a configuration file
    #[clap(long, value_name = "NAME", conflicts_with = "config")]
    builtin: Option<String>,

    /// List the built-in machines and exit
    #[clap(long)]
    list: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    machine: Option<&'a str>,
    summary: MachineSummary,
    results: &'a [ExecutionResult],
    batch: BatchSummary,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list {
        list_builtin();
        return Ok(());
    }

    // Load before printing anything so a bad configuration only produces the error.
    let machine = match load_machine(&cli) {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = &cli.dot {
        fs::write(path, to_dot(&machine))?;
        debug!(path = %path.display(), "transition graph written");
    }

    let simulator = Simulator::new(&machine).with_step_budget(cli.max_steps);
    let results = if cli.inputs.is_empty() {
        simulator.run_all()
    } else {
        simulator.run_inputs(&cli.inputs)
    };

    if cli.json {
        let report = JsonReport {
            machine: machine.name(),
            summary: machine.summary(),
            results: &results,
            batch: BatchSummary::from_results(&results),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&cli, &machine, &results)
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Loads the machine from `--builtin`, a file path, or stdin, in that order.
fn load_machine(cli: &Cli) -> Result<TuringMachine, Box<dyn Error>> {
    if let Some(name) = &cli.builtin {
        Ok(MachineCatalog::get_by_name(name)?)
    } else if let Some(path) = &cli.config {
        Ok(ConfigLoader::load_machine(path)?)
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(ConfigLoader::load_from_string(&buffer)?)
    } else {
        Err("no configuration given: pass a file, pipe one via stdin, or use --builtin".into())
    }
}

fn list_builtin() {
    for (index, name) in MachineCatalog::names().iter().enumerate() {
        match MachineCatalog::info(index) {
            Ok(info) => println!(
                "{:>2}. {} ({} states, {} transitions)",
                index + 1,
                name,
                info.state_count,
                info.transition_count
            ),
            Err(_) => println!("{:>2}. {}", index + 1, name),
        }
    }
}

fn print_report(
    cli: &Cli,
    machine: &TuringMachine,
    results: &[ExecutionResult],
) -> Result<(), Box<dyn Error>> {
    let mode = if cli.compact {
        DisplayMode::Compact
    } else if let Some(limit) = cli.limit {
        DisplayMode::Limit(limit)
    } else {
        DisplayMode::Full
    };

    let colored = atty::is(atty::Stream::Stdout);
    let mut reporter = Reporter::new(io::stdout().lock(), colored, mode);

    reporter.print_header(machine)?;
    for (i, result) in results.iter().enumerate() {
        reporter.print_simulation_header(i + 1, &result.input)?;
        reporter.print_result(result)?;
    }
    if results.len() > 1 {
        reporter.print_comparison(results)?;
    }

    if let Some(path) = &cli.output {
        save_report(&reporter, path)?;
    }
    Ok(())
}

fn save_report<W: io::Write>(reporter: &Reporter<W>, path: &Path) -> io::Result<()> {
    reporter.save(path)?;
    println!("\nReport saved to {}", path.display());
    Ok(())
}
