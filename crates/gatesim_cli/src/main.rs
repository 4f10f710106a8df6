//! gatesim CLI: the command-line front end for the gatesim HDL engine.
//!
//! Provides `gatesim check` to load and link a chip, `gatesim render` to print
//! its canonical HDL, `gatesim eval` to settle it for one set of inputs, and
//! `gatesim table` to enumerate its truth table.

#![warn(missing_docs)]

mod check;
mod eval;
mod pipeline;
mod render;
mod table;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// gatesim: load, link and simulate chips described in HDL.
#[derive(Parser, Debug)]
#[command(name = "gatesim", version, about = "gatesim HDL engine")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `gatesim.toml` file or the directory holding one.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Folder holding `<Chip>.hdl` files. Overrides the project's `library`.
    #[arg(long, global = true)]
    pub lib: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and link a chip, reporting every diagnostic.
    Check(ChipArgs),
    /// Print the canonical HDL of a chip.
    Render(ChipArgs),
    /// Settle a chip for one set of inputs and print its outputs.
    Eval(EvalArgs),
    /// Print the truth table of a chip.
    Table(TableArgs),
}

/// A chip selected by name, defaulting to the project's top chip.
#[derive(Parser, Debug)]
pub struct ChipArgs {
    /// Chip name (default: `project.top` from `gatesim.toml`).
    pub chip: Option<String>,
}

/// Arguments for the `gatesim eval` subcommand.
#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Chip name.
    pub chip: String,

    /// Input assignments such as `a=1`, `sel=0b10` or `in=0xff`.
    #[arg(value_parser = pipeline::parse_assignment)]
    pub inputs: Vec<(String, u64)>,

    /// Output format for the settled pins.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `gatesim table` subcommand.
#[derive(Parser, Debug)]
pub struct TableArgs {
    /// Chip name (default: `project.top` from `gatesim.toml`).
    pub chip: Option<String>,

    /// Output format for the table.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Result output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// Optional chip library folder.
    pub lib: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
        lib: cli.lib,
    };
    pipeline::init_logging(&global);

    let result = match cli.command {
        Command::Check(ref args) => check::run(args, &global),
        Command::Render(ref args) => render::run(args, &global),
        Command::Eval(ref args) => eval::run(args, &global),
        Command::Table(ref args) => table::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
