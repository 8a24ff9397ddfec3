use std::process::ExitCode;
use std::time::Instant;

use anstream::{ColorChoice, eprintln};
use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;

use crate::env_vars::EnvVars;
use crate::interpreter::InterpreterArgs;
use crate::marker::{CheckRequirementArgs, EvaluateMarkerArgs};
use crate::version::{CompareArgs, MatchArgs, NormalizeArgs, SelectArgs, SortArgs};

mod env_vars;
mod interpreter;
mod logging;
mod marker;
mod version;

#[derive(Parser)]
#[command(name = "pyprovider-dev", about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Show debug messages.
    #[arg(global = true, long, short)]
    verbose: bool,
    /// Disable colors.
    #[arg(global = true, long, env = EnvVars::PYPROVIDER_NO_COLOR, value_parser = clap::builder::FalseyValueParser::new())]
    no_color: bool,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print versions in their canonical form.
    Normalize(NormalizeArgs),
    /// Compare two versions.
    Compare(CompareArgs),
    /// Sort versions, oldest first.
    Sort(SortArgs),
    /// Pick the preferred versions out of a list of candidates.
    Select(SelectArgs),
    /// Show which versions a version specifier matches.
    Match(MatchArgs),
    /// Evaluate a marker against an environment.
    EvaluateMarker(EvaluateMarkerArgs),
    /// Parse a dependency string and check it against an environment.
    CheckRequirement(CheckRequirementArgs),
    /// Show what an interpreter reported about itself.
    Interpreter(InterpreterArgs),
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Normalize(args) => version::normalize(&args),
        Command::Compare(args) => version::compare(&args),
        Command::Sort(args) => version::sort(&args),
        Command::Select(args) => version::select(&args),
        Command::Match(args) => version::match_versions(&args)?,
        Command::EvaluateMarker(args) => marker::evaluate_marker(&args)?,
        Command::CheckRequirement(args) => marker::check_requirement(&args)?,
        Command::Interpreter(args) => interpreter::interpreter(&args)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.no_color {
        ColorChoice::Never.write_global();
    }

    let level = if cli.verbose {
        logging::Level::Verbose
    } else {
        logging::Level::Default
    };
    if let Err(err) = logging::setup_logging(level) {
        eprintln!("{}: {err:#}", "error".red().bold());
        return ExitCode::FAILURE;
    }

    let start = Instant::now();
    let result = run(cli);
    debug!("Took {}ms", start.elapsed().as_millis());
    if let Err(err) = result {
        eprintln!("{}", "pyprovider-dev failed".red().bold());
        for err in err.chain() {
            eprintln!("  {}: {}", "Caused by".red().bold(), err);
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
