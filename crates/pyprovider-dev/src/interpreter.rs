use std::path::PathBuf;

use anstream::println;
use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;

use pyprovider_pep440::{VersionBounds, VersionIdentifier};

use crate::marker::read_interpreter_info;

#[derive(Parser)]
pub(crate) struct InterpreterArgs {
    /// A file with the saved output of the interpreter query script.
    query_output: PathBuf,
    /// Check whether the interpreter matches a requested version such as `3.6`.
    #[arg(long)]
    request: Option<String>,
    /// Check whether the interpreter version is at least this version.
    #[arg(long)]
    minimum: Option<String>,
    /// Check whether the interpreter version is at most this version.
    #[arg(long)]
    maximum: Option<String>,
    /// Check whether the interpreter can install these wheels.
    #[arg(long)]
    wheel: Vec<String>,
}

pub(crate) fn interpreter(args: &InterpreterArgs) -> Result<()> {
    let info = read_interpreter_info(&args.query_output)?;
    println!(
        "Python {} ({}-bit)",
        info.version().bold(),
        info.pointer_size() * 8
    );
    println!("site-packages: {}", info.site_packages().display());
    println!("{}", serde_json::to_string_pretty(info.markers())?);

    if let Some(request) = &args.request {
        let request = VersionIdentifier::parse(request);
        check(info.satisfies(&request), &format!("matches {}", request.raw()));
    }

    let bounds = VersionBounds::from_user_input(None, args.minimum.as_deref(), args.maximum.as_deref());
    if !bounds.is_unbounded() {
        check(info.within(&bounds), "is within the bounds");
    }

    for wheel in &args.wheel {
        check(info.supports_wheel(wheel), &format!("can install {wheel}"));
    }
    Ok(())
}

fn check(result: bool, message: &str) {
    if result {
        println!("{} {message}", "✓".green());
    } else {
        println!("{} {message}", "✗".red());
    }
}
