//! Environment markers and dependency strings, implementing the parts of
//! [PEP 508](https://peps.python.org/pep-0508/) used to decide which dependencies of a package
//! apply to an interpreter.
//!
//! ```rust
//! use std::str::FromStr;
//! use pyprovider_pep508::{MarkerValues, Requirement};
//!
//! let requirement = Requirement::from_str(r#"pywin32 (>=1.0); sys_platform == "win32""#).unwrap();
//! assert_eq!(requirement.name, "pywin32");
//! ```
#![deny(missing_docs)]

use std::fmt::{Display, Formatter};

use unicode_width::UnicodeWidthChar;

pub use marker::{
    MarkerEnvironment, MarkerErrorKind, MarkerEvaluationError, MarkerOperator, MarkerParseError,
    MarkerTree, MarkerValues, StringVariable, VersionVariable,
};
pub use requirement::{Requirement, RequirementErrorSource, RequirementParseError};

mod cursor;
pub mod marker;
mod requirement;

/// Writes `message`, then `input` with the span `start..start + len` underlined.
///
/// An empty span at the end of the input still gets a single caret.
pub(crate) fn write_underlined(
    f: &mut Formatter<'_>,
    message: &impl Display,
    input: &str,
    start: usize,
    len: usize,
) -> std::fmt::Result {
    let start_offset = input[..start]
        .chars()
        .flat_map(UnicodeWidthChar::width)
        .sum::<usize>();
    let underline_len = input[start..start + len]
        .chars()
        .flat_map(UnicodeWidthChar::width)
        .sum::<usize>()
        .max(1);
    write!(
        f,
        "{}\n{}\n{}{}",
        message,
        input,
        " ".repeat(start_offset),
        "^".repeat(underline_len)
    )
}
