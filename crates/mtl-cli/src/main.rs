//! mtl-weaken — command-line interface to trace-guided MTL interval weakening.
//!
//! A `clap`-derived `Cli`/`Commands` split with a human/JSON `OutputFormat`,
//! `anyhow::Context` annotating I/O errors, and `colored` output for the
//! terminal-facing case.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use mtl_core::{parse, weaken, Trace, WeakenOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "mtl-weaken")]
#[command(version = "0.1.0")]
#[command(about = "Trace-guided interval weakening for Metric Temporal Logic formulas")]
struct Cli {
    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Weaken the temporal operator at `path` so the formula holds at `at`
    Weaken {
        /// MTL formula, surface syntax (e.g. "F[0,1] p")
        formula: String,

        /// Comma-separated child-index path to the target temporal node
        /// (e.g. "0,1"; empty selects the root)
        #[arg(short = 'p', long = "path", default_value = "")]
        path: String,

        /// JSON trace file: {"states": [["p"], [], ["q"]], "loop_start": 1}
        #[arg(short = 't', long = "trace")]
        trace: PathBuf,

        /// Time point at which the formula should hold
        #[arg(short = 'a', long = "at", default_value = "0")]
        at: usize,

        /// Re-attempt weakening at every trace position (stem and one period
        /// of the suffix), reporting one outcome per position instead of
        /// just `--at`.
        #[arg(long = "iterate")]
        iterate: bool,
    },
    /// Parse a formula and print it back in canonical surface syntax
    Parse {
        formula: String,
    },
    /// Render a trace file as an ASCII table
    ShowTrace {
        trace: PathBuf,
    },
    /// Lower a bounded MTL formula to plain LTL (unit-step operators only)
    ToLtl {
        formula: String,
    },
}

#[derive(Serialize, Deserialize)]
struct TraceFile {
    states: Vec<Vec<String>>,
    loop_start: Option<usize>,
    /// When `true` and `loop_start` is absent, detect the loop the way a
    /// model-checker trail duplicating its loop-closing state needs
    /// (`Trace::detect_loop`), instead of treating the trace as finite.
    #[serde(default)]
    detect_loop: bool,
}

impl TraceFile {
    fn load(path: &PathBuf) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading trace file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing trace file {}", path.display()))
    }

    fn states(&self) -> Vec<BTreeSet<Rc<str>>> {
        self.states
            .iter()
            .map(|state| state.iter().map(|p| Rc::from(p.as_str())).collect())
            .collect()
    }

    fn to_trace(&self) -> Result<Trace> {
        let states = self.states();
        match self.loop_start {
            Some(loop_start) => Ok(Trace::lasso(states, loop_start)?),
            None if self.detect_loop => {
                Ok(Trace::detect_loop(states).context("detecting loop in trace")?)
            }
            None => Ok(Trace::finite(states)),
        }
    }
}

#[derive(Serialize)]
struct WeakenReport {
    at: usize,
    node: &'static str,
    path: String,
    original_interval: String,
    weakened_interval: Option<String>,
}

impl From<(&usize, &WeakenOutcome)> for WeakenReport {
    fn from((at, outcome): (&usize, &WeakenOutcome)) -> Self {
        Self {
            at: *at,
            node: outcome.node,
            path: mtl_core::path::format_path(&outcome.path),
            original_interval: outcome.original_interval.to_string(),
            weakened_interval: outcome.weakened_interval.map(|i| i.to_string()),
        }
    }
}

fn print_outcome(at: usize, outcome: &WeakenOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => match &outcome.weakened_interval {
            Some(interval) => println!(
                "{} at t={at}: {} {} {} {}",
                "weakened".green().bold(),
                outcome.node,
                outcome.original_interval,
                "->".dimmed(),
                interval,
            ),
            None => println!(
                "{} at t={at}: {}",
                "no weakening".red().bold(),
                mtl_core::pretty::NO_WEAKENING_MESSAGE
            ),
        },
        OutputFormat::Json => {
            let report = WeakenReport::from((&at, outcome));
            println!("{}", serde_json::to_string(&report)?);
        }
    }
    Ok(())
}

fn run_weaken(
    formula: &str,
    path: &str,
    trace_path: &PathBuf,
    at: usize,
    iterate: bool,
    format: OutputFormat,
) -> Result<()> {
    let formula = parse(formula).context("parsing formula")?;
    let path = mtl_core::path::parse_path(path).context("parsing path")?;
    let trace_file = TraceFile::load(trace_path)?;
    let trace = trace_file.to_trace().context("constructing trace")?;

    if iterate {
        let progress = ProgressBar::new(trace.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} positions")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        for t in 0..trace.len() {
            let outcome = weaken(&formula, &path, &trace, t)?;
            print_outcome(t, &outcome, format)?;
            progress.inc(1);
        }
        progress.finish_and_clear();
    } else {
        let outcome = weaken(&formula, &path, &trace, at)?;
        print_outcome(at, &outcome, format)?;
    }
    Ok(())
}

fn run_parse(formula: &str) -> Result<()> {
    let parsed = parse(formula).context("parsing formula")?;
    println!("{parsed}");
    Ok(())
}

fn run_show_trace(trace_path: &PathBuf) -> Result<()> {
    let trace_file = TraceFile::load(trace_path)?;
    let states = trace_file.states();
    let trace = trace_file.to_trace()?;
    print!("{}", mtl_core::pretty::render_trace(&trace, &states));
    Ok(())
}

fn run_to_ltl(formula: &str) -> Result<()> {
    let parsed = parse(formula).context("parsing formula")?;
    let lowered = mtl_core::to_ltl(&parsed);
    println!("{lowered}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Weaken {
            formula,
            path,
            trace,
            at,
            iterate,
        } => run_weaken(formula, path, trace, *at, *iterate, cli.format),
        Commands::Parse { formula } => run_parse(formula),
        Commands::ShowTrace { trace } => run_show_trace(trace),
        Commands::ToLtl { formula } => run_to_ltl(formula),
    }
}
