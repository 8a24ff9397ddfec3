use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, trace};

use pyprovider_pep440::VersionIdentifier;

use crate::marker::MarkerEnvironment;
use crate::marker::parse::{MarkerParseError, parse_marker};

/// Those environment markers with an arbitrary string as value such as `sys_platform`
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum StringVariable {
    /// `os_name`
    OsName,
    /// `sys_platform`
    SysPlatform,
    /// `platform_release`
    PlatformRelease,
    /// `implementation_name`
    ImplementationName,
    /// `platform_machine`
    PlatformMachine,
    /// `platform_python_implementation`
    PlatformPythonImplementation,
}

impl StringVariable {
    /// All string variables, in the order an interpreter reports them.
    pub const ALL: [Self; 6] = [
        Self::OsName,
        Self::SysPlatform,
        Self::PlatformRelease,
        Self::ImplementationName,
        Self::PlatformMachine,
        Self::PlatformPythonImplementation,
    ];

    /// The variable with the given marker name, if any.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|variable| variable.as_str() == name)
    }

    /// The name of the variable inside a marker.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OsName => "os_name",
            Self::SysPlatform => "sys_platform",
            Self::PlatformRelease => "platform_release",
            Self::ImplementationName => "implementation_name",
            Self::PlatformMachine => "platform_machine",
            Self::PlatformPythonImplementation => "platform_python_implementation",
        }
    }
}

impl Display for StringVariable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Those environment markers with a PEP 440 version as value such as `python_version`
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[allow(clippy::enum_variant_names)]
pub enum VersionVariable {
    /// `python_version`
    PythonVersion,
    /// `python_full_version`
    PythonFullVersion,
    /// `platform_version`
    PlatformVersion,
    /// `implementation_version`
    ImplementationVersion,
}

impl VersionVariable {
    /// All version variables, in the order an interpreter reports them.
    pub const ALL: [Self; 4] = [
        Self::PythonVersion,
        Self::PythonFullVersion,
        Self::PlatformVersion,
        Self::ImplementationVersion,
    ];

    /// The variable with the given marker name, if any.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|variable| variable.as_str() == name)
    }

    /// The name of the variable inside a marker.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PythonVersion => "python_version",
            Self::PythonFullVersion => "python_full_version",
            Self::PlatformVersion => "platform_version",
            Self::ImplementationVersion => "implementation_version",
        }
    }
}

impl Display for VersionVariable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comparison between two marker operands.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum MarkerOperator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessEqual,
    /// `in`
    In,
    /// `not in`
    NotIn,
}

impl Display for MarkerOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterEqual => ">=",
            Self::LessThan => "<",
            Self::LessEqual => "<=",
            Self::In => "in",
            Self::NotIn => "not in",
        })
    }
}

/// A parsed environment marker such as
/// `python_version >= "3.4" and (sys_platform == "win32" or os_name == "nt")`.
///
/// Parenthesized groups don't have a node of their own, and an `and` or `or` with a single
/// operand is just that operand.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MarkerTree {
    /// `a and b and ...`, evaluated left to right until an operand is falsy.
    And(Vec<MarkerTree>),
    /// `a or b or ...`, evaluated left to right until an operand is truthy.
    Or(Vec<MarkerTree>),
    /// A quoted string, with its escapes already decoded.
    StringLiteral(String),
    /// A variable with a string value.
    StringVariable(StringVariable),
    /// A variable with a version value.
    VersionVariable(VersionVariable),
    /// The `extra` variable. Extras aren't supported, so it's always the empty string.
    Extra,
    /// A chain such as `"2.6" <= python_version < "2.8"`, which means
    /// `"2.6" <= python_version and python_version < "2.8"`.
    ///
    /// There is always exactly one more operand than there are operators.
    ComparisonList {
        /// The operands, at least two.
        operands: Vec<MarkerTree>,
        /// The operator between each pair of neighbouring operands.
        operators: Vec<MarkerOperator>,
    },
}

impl FromStr for MarkerTree {
    type Err = MarkerParseError;

    fn from_str(markers: &str) -> Result<Self, Self::Err> {
        parse_marker(markers)
    }
}

impl MarkerTree {
    /// Does this marker apply in the given environment?
    pub fn evaluate<E: MarkerEnvironment + ?Sized>(
        &self,
        env: &E,
    ) -> Result<bool, MarkerEvaluationError> {
        let result = self.value(env)?.is_truthy();
        debug!("Marker `{self}` evaluated to {result}");
        Ok(result)
    }

    fn value<'a, E: MarkerEnvironment + ?Sized>(
        &'a self,
        env: &'a E,
    ) -> Result<MarkerValue<'a>, MarkerEvaluationError> {
        match self {
            Self::And(operands) => {
                let mut value = MarkerValue::Bool(true);
                for operand in operands {
                    value = operand.value(env)?;
                    if !value.is_truthy() {
                        break;
                    }
                }
                Ok(value)
            }
            Self::Or(operands) => {
                let mut value = MarkerValue::Bool(false);
                for operand in operands {
                    value = operand.value(env)?;
                    if value.is_truthy() {
                        break;
                    }
                }
                Ok(value)
            }
            Self::StringLiteral(value) => Ok(MarkerValue::String(value)),
            Self::StringVariable(variable) => {
                Ok(MarkerValue::String(env.string_variable(*variable)))
            }
            Self::VersionVariable(variable) => {
                Ok(MarkerValue::Version(env.version_variable(*variable)))
            }
            Self::Extra => Ok(MarkerValue::String("")),
            Self::ComparisonList {
                operands,
                operators,
            } => {
                let Some((first, rest)) = operands.split_first() else {
                    return Ok(MarkerValue::Bool(true));
                };
                let mut left = first.value(env)?;
                for (operator, operand) in operators.iter().zip(rest) {
                    let right = operand.value(env)?;
                    if !compare(&left, *operator, &right)? {
                        trace!("Comparison `{left} {operator} {right}` is false");
                        return Ok(MarkerValue::Bool(false));
                    }
                    left = right;
                }
                Ok(MarkerValue::Bool(true))
            }
        }
    }
}

impl Display for MarkerTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let format_inner = |operand: &Self| {
            if matches!(operand, Self::And(_) | Self::Or(_)) {
                format!("({operand})")
            } else {
                format!("{operand}")
            }
        };
        match self {
            Self::And(operands) => f.write_str(
                &operands
                    .iter()
                    .map(format_inner)
                    .collect::<Vec<String>>()
                    .join(" and "),
            ),
            Self::Or(operands) => f.write_str(
                &operands
                    .iter()
                    .map(format_inner)
                    .collect::<Vec<String>>()
                    .join(" or "),
            ),
            Self::StringLiteral(value) => {
                f.write_str("\"")?;
                for char in value.chars() {
                    if matches!(char, '"' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{char}")?;
                }
                f.write_str("\"")
            }
            Self::StringVariable(variable) => write!(f, "{variable}"),
            Self::VersionVariable(variable) => write!(f, "{variable}"),
            Self::Extra => f.write_str("extra"),
            Self::ComparisonList {
                operands,
                operators,
            } => {
                let format_operand = |operand: &Self| {
                    if matches!(
                        operand,
                        Self::And(_) | Self::Or(_) | Self::ComparisonList { .. }
                    ) {
                        format!("({operand})")
                    } else {
                        format!("{operand}")
                    }
                };
                let Some((first, rest)) = operands.split_first() else {
                    return Ok(());
                };
                f.write_str(&format_operand(first))?;
                for (operator, operand) in operators.iter().zip(rest) {
                    write!(f, " {operator} {}", format_operand(operand))?;
                }
                Ok(())
            }
        }
    }
}

/// Marker evaluation failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEvaluationError {
    /// One side of a comparison is the result of a nested comparison, such as
    /// `(os_name == "nt") == "True"`.
    #[error("Can't use `{operator}` on a boolean, booleans are only allowed with `and` and `or`")]
    BooleanComparison {
        /// The operator of the failed comparison.
        operator: MarkerOperator,
    },
}

/// The value of a marker expression while evaluating.
#[derive(Debug, Clone, Copy)]
enum MarkerValue<'a> {
    Bool(bool),
    String(&'a str),
    Version(&'a VersionIdentifier),
}

impl MarkerValue<'_> {
    fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::String(value) => !value.is_empty(),
            Self::Version(version) => !version.raw().is_empty(),
        }
    }

    /// The text used by `in`, `not in` and string equality; versions use their original text.
    fn text(&self) -> Option<&str> {
        match self {
            Self::Bool(_) => None,
            Self::String(value) => Some(value),
            Self::Version(version) => Some(version.raw()),
        }
    }
}

impl Display for MarkerValue<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "'{value}'"),
            Self::Version(version) => write!(f, "'{}'", version.raw()),
        }
    }
}

/// Compare two operands of a [`MarkerTree::ComparisonList`].
///
/// `in` and `not in` are substring tests, `==` and `!=` compare versions if either side is a
/// version variable and strings otherwise, and the ordering operators always compare versions.
fn compare(
    left: &MarkerValue<'_>,
    operator: MarkerOperator,
    right: &MarkerValue<'_>,
) -> Result<bool, MarkerEvaluationError> {
    let (Some(left_text), Some(right_text)) = (left.text(), right.text()) else {
        return Err(MarkerEvaluationError::BooleanComparison { operator });
    };
    let version_typed =
        matches!(left, MarkerValue::Version(_)) || matches!(right, MarkerValue::Version(_));
    let ordering = || {
        if version_typed || !matches!(operator, MarkerOperator::Equal | MarkerOperator::NotEqual) {
            as_version(left, left_text).cmp(&as_version(right, right_text))
        } else {
            left_text.cmp(right_text)
        }
    };
    Ok(match operator {
        MarkerOperator::In => right_text.contains(left_text),
        MarkerOperator::NotIn => !right_text.contains(left_text),
        MarkerOperator::Equal => ordering().is_eq(),
        MarkerOperator::NotEqual => ordering().is_ne(),
        MarkerOperator::GreaterThan => ordering().is_gt(),
        MarkerOperator::GreaterEqual => ordering().is_ge(),
        MarkerOperator::LessThan => ordering().is_lt(),
        MarkerOperator::LessEqual => ordering().is_le(),
    })
}

/// Strings are parsed as versions when compared with one.
fn as_version<'a>(value: &MarkerValue<'a>, text: &str) -> Cow<'a, VersionIdentifier> {
    match value {
        MarkerValue::Version(version) => Cow::Borrowed(*version),
        MarkerValue::Bool(_) | MarkerValue::String(_) => Cow::Owned(VersionIdentifier::parse(text)),
    }
}
