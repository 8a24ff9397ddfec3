//! Python version numbers and version specifiers, implementing
//! [PEP 440](https://peps.python.org/pep-0440)
//!
//! ```rust
//! use std::str::FromStr;
//! use pyprovider_pep440::{VersionIdentifier, VersionSpecifier};
//!
//! let version = VersionIdentifier::parse("1.19");
//! let specifier = VersionSpecifier::from_str(">=1.16, <2.0").unwrap();
//! assert!(specifier.contains(&version));
//! ```
//!
//! Unlike most PEP 440 implementations, parsing a version never fails. Text that isn't a valid
//! version still produces a [`VersionIdentifier`] (flagged as invalid, sorting like `0`), since
//! the versions we handle come from package indexes and interpreters we don't control. Specifiers,
//! on the other hand, are strict: a malformed clause is an error, because silently accepting it
//! could approve an incompatible install.
//!
//! Things to keep in mind:
//!
//! * An epoch prefix such as `1!1.2.3` dominates everything else (`1.0 < 2!0.1`).
//! * A dev release of a final release (`1.0.dev1`) sorts before every prerelease of it, while a
//!   dev release of a prerelease (`1.0a1.dev1`) sorts just before that prerelease.
//! * Local versions (`1.0+ubuntu.1`) sort after the public version, but `==1.0` matches them.
//! * `>1.0` doesn't match `1.0.post1` and `<1.0` doesn't match `1.0rc1`.
#![deny(missing_docs)]

pub use {
    bounds::{VersionBounds, best_per_major, compare_candidates, is_better_candidate},
    version::{CompareOptions, LocalSegment, Prerelease, PrereleaseKind, VersionIdentifier},
    version_specifier::{
        Operator, OperatorParseError, VersionSpecifier, VersionSpecifierClause,
        VersionSpecifierClauseParseError, VersionSpecifierParseError,
    },
};

mod bounds;
mod version;
mod version_specifier;
