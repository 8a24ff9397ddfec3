//! What we know about a Python interpreter: its version, where packages go, the marker values
//! for evaluating dependency markers and the wheel tags it can install.
//!
//! The facts are read from the output of a small query script run with the interpreter. Running
//! the script is left to the caller; this crate only parses what it printed.
#![deny(missing_docs)]

pub use interpreter::{InterpreterInfo, InterpreterInfoError};
pub use tags::{TagPriority, Tags, TagsError, wheel_tag};

mod interpreter;
mod tags;
