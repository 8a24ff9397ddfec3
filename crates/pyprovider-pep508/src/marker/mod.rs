//! [Environment markers](https://packaging.python.org/en/latest/specifications/dependency-specifiers/#environment-markers)
//! such as `python_version >= "3.4" and sys_platform == "win32"`.
//!
//! Only the marker variables reported by an interpreter are known. `extra` is accepted but always
//! the empty string, so `extra == "test"` never applies.

pub use environment::{MarkerEnvironment, MarkerValues};
pub use parse::{MarkerErrorKind, MarkerParseError};
pub use tree::{MarkerEvaluationError, MarkerOperator, MarkerTree, StringVariable, VersionVariable};

mod environment;
mod lexer;
mod parse;
mod tree;
