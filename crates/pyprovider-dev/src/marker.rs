use std::path::{Path, PathBuf};
use std::str::FromStr;

use anstream::println;
use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;

use pyprovider_interpreter::InterpreterInfo;
use pyprovider_pep440::VersionIdentifier;
use pyprovider_pep508::{MarkerTree, MarkerValues, Requirement};

use crate::env_vars::EnvVars;

/// Where to read the marker values from.
#[derive(Parser)]
pub(crate) struct EnvironmentArgs {
    /// A JSON file with the marker values.
    #[arg(long, env = EnvVars::PYPROVIDER_MARKER_ENVIRONMENT)]
    environment: Option<PathBuf>,
    /// A file with saved interpreter query output, used when `--environment` isn't given.
    #[arg(long, env = EnvVars::PYPROVIDER_INTERPRETER_INFO)]
    interpreter_info: Option<PathBuf>,
}

impl EnvironmentArgs {
    pub(crate) fn load(&self) -> Result<MarkerValues> {
        if let Some(path) = &self.environment {
            return read_environment(path);
        }
        if let Some(path) = &self.interpreter_info {
            return Ok(read_interpreter_info(path)?.markers().clone());
        }
        bail!(
            "No marker environment, pass `--environment` or `--interpreter-info` (or set `{}` or `{}`)",
            EnvVars::PYPROVIDER_MARKER_ENVIRONMENT,
            EnvVars::PYPROVIDER_INTERPRETER_INFO
        )
    }
}

/// Reads a JSON snapshot of the marker values.
pub(crate) fn read_environment(path: &Path) -> Result<MarkerValues> {
    debug!("Reading marker environment from {}", path.display());
    let contents = fs_err::read_to_string(path)?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid marker environment in {}", path.display()))
}

/// Reads saved interpreter query output.
pub(crate) fn read_interpreter_info(path: &Path) -> Result<InterpreterInfo> {
    debug!("Reading interpreter query output from {}", path.display());
    let contents = fs_err::read_to_string(path)?;
    InterpreterInfo::from_query_output(&contents)
        .with_context(|| format!("Invalid interpreter query output in {}", path.display()))
}

#[derive(Parser)]
pub(crate) struct EvaluateMarkerArgs {
    /// A marker such as `sys_platform == "win32" and python_version >= "3.4"`.
    marker: String,
    #[command(flatten)]
    environment: EnvironmentArgs,
}

pub(crate) fn evaluate_marker(args: &EvaluateMarkerArgs) -> Result<()> {
    let marker = MarkerTree::from_str(&args.marker)?;
    let environment = args.environment.load()?;
    debug!("Parsed marker: `{marker}`");
    println!("{}", marker.evaluate(&environment)?);
    Ok(())
}

#[derive(Parser)]
pub(crate) struct CheckRequirementArgs {
    /// A dependency string such as `pywin32 (>=1.0); sys_platform == "win32"`.
    requirement: String,
    /// Also check whether the requirement allows this version of the package.
    #[arg(long)]
    version: Option<String>,
    #[command(flatten)]
    environment: EnvironmentArgs,
}

pub(crate) fn check_requirement(args: &CheckRequirementArgs) -> Result<()> {
    let requirement = Requirement::from_str(&args.requirement)?;
    println!("{}", requirement.to_string().bold());

    if requirement.marker.is_some() {
        let environment = args.environment.load()?;
        if requirement.evaluate_marker(&environment)? {
            println!("{} applies to this environment", "✓".green());
        } else {
            println!("{} doesn't apply to this environment", "✗".red());
        }
    }

    if let Some(version) = &args.version {
        let version = VersionIdentifier::parse(version);
        if requirement.allows(&version) {
            println!("{} allows {}", "✓".green(), version.raw());
        } else {
            println!("{} doesn't allow {}", "✗".red(), version.raw());
        }
    }
    Ok(())
}
