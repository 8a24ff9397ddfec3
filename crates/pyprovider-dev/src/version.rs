use std::cmp::Ordering;

use anstream::println;
use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::{debug, warn};

use pyprovider_pep440::{
    CompareOptions, VersionBounds, VersionIdentifier, VersionSpecifier, best_per_major,
};

#[derive(Parser)]
pub(crate) struct NormalizeArgs {
    /// The versions to print in their canonical form.
    #[arg(required = true)]
    versions: Vec<String>,
}

pub(crate) fn normalize(args: &NormalizeArgs) {
    for text in &args.versions {
        let version = VersionIdentifier::parse(text);
        if version.is_valid() {
            println!("{version}");
        } else {
            warn!("`{text}` is not a valid version, it sorts like `0`");
            println!("{}", version.raw().red());
        }
    }
}

#[derive(Parser)]
pub(crate) struct CompareArgs {
    a: String,
    b: String,
    /// Compare only the epoch and the release, skipping prerelease, postrelease, dev release and
    /// local version.
    #[arg(long)]
    release_only: bool,
}

pub(crate) fn compare(args: &CompareArgs) {
    let a = VersionIdentifier::parse(&args.a);
    let b = VersionIdentifier::parse(&args.b);
    let options = if args.release_only {
        CompareOptions::RELEASE_ONLY
    } else {
        CompareOptions::ALL
    };
    println!("{}", comparison(&a, &b, options));
}

/// Renders the ordering of two versions, such as `1.0a1 < 1.0`.
pub(crate) fn comparison(
    a: &VersionIdentifier,
    b: &VersionIdentifier,
    options: CompareOptions,
) -> String {
    let operator = match a.compare_with(b, options) {
        Ordering::Less => "<",
        Ordering::Equal => "==",
        Ordering::Greater => ">",
    };
    format!("{} {operator} {}", a.raw(), b.raw())
}

#[derive(Parser)]
pub(crate) struct SortArgs {
    #[arg(required = true)]
    versions: Vec<String>,
    /// Print the newest version first.
    #[arg(long)]
    reverse: bool,
}

pub(crate) fn sort(args: &SortArgs) {
    for version in sorted(&args.versions, args.reverse) {
        println!("{}", version.raw());
    }
}

/// Parses and sorts the versions, oldest first unless `reverse`.
pub(crate) fn sorted(versions: &[String], reverse: bool) -> Vec<VersionIdentifier> {
    let mut versions: Vec<_> = versions
        .iter()
        .map(|text| VersionIdentifier::parse(text))
        .collect();
    // Stable, so equal versions keep their order.
    versions.sort();
    if reverse {
        versions.reverse();
    }
    versions
}

#[derive(Parser)]
pub(crate) struct SelectArgs {
    /// The candidate versions, in any order.
    #[arg(required = true)]
    versions: Vec<String>,
    /// Only accept exactly this version.
    #[arg(long)]
    required: Option<String>,
    /// Only accept this version or newer.
    #[arg(long)]
    minimum: Option<String>,
    /// Only accept this version or older.
    #[arg(long)]
    maximum: Option<String>,
    /// List every accepted version in preference order instead of only the best one.
    #[arg(long, conflicts_with = "per_major")]
    all: bool,
    /// Pick the best version of each major release series.
    #[arg(long)]
    per_major: bool,
}

pub(crate) fn select(args: &SelectArgs) {
    let bounds = VersionBounds::from_user_input(
        args.required.as_deref(),
        args.minimum.as_deref(),
        args.maximum.as_deref(),
    );
    if bounds.is_unbounded() {
        debug!("No bounds, every candidate is accepted");
    }
    let candidates: Vec<_> = args
        .versions
        .iter()
        .map(|text| VersionIdentifier::parse(text))
        .collect();
    let selected = if args.per_major {
        best_of_each_major(&candidates, &bounds)
    } else {
        bounds.select(&candidates, args.all)
    };
    if selected.is_empty() {
        warn!("None of the {} candidates is within the bounds", candidates.len());
    }
    for version in selected {
        println!("{}", version.raw());
    }
}

/// The best candidate of each major version within the bounds, newest series first.
pub(crate) fn best_of_each_major<'a>(
    candidates: &'a [VersionIdentifier],
    bounds: &VersionBounds,
) -> Vec<&'a VersionIdentifier> {
    best_per_major(candidates.iter().filter(|candidate| bounds.contains(candidate)))
        .into_values()
        .rev()
        .collect()
}

#[derive(Parser)]
pub(crate) struct MatchArgs {
    /// A comma-separated list of clauses, such as `>=1.0, !=1.3.*`.
    specifier: String,
    #[arg(required = true)]
    versions: Vec<String>,
}

pub(crate) fn match_versions(args: &MatchArgs) -> Result<()> {
    let specifier: VersionSpecifier = args
        .specifier
        .parse()
        .with_context(|| format!("Failed to parse version specifier `{}`", args.specifier))?;
    debug!("Matching against `{specifier}`");
    for text in &args.versions {
        let version = VersionIdentifier::parse(text);
        if specifier.contains(&version) {
            println!("{} {}", "✓".green(), version.raw());
        } else {
            println!("{} {}", "✗".red(), version.raw());
        }
    }
    Ok(())
}
