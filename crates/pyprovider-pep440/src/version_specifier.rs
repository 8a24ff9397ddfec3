use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use thiserror::Error;
use unicode_width::UnicodeWidthStr;
use unscanny::Scanner;

use crate::version::{CompareOptions, VersionIdentifier, starts_with_release};

/// One of `~=` `==` `!=` `<=` `>=` `<` `>` `===`
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    /// `~= 2.2`, a compatible release
    Compatible,
    /// `== 1.2.3` or `== 1.2.*`
    Matching,
    /// `!= 1.2.3` or `!= 1.2.*`
    Exclusion,
    /// `<=`
    LessThanEqual,
    /// `>=`
    GreaterThanEqual,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `===` (discouraged)
    ///
    /// <https://peps.python.org/pep-0440/#arbitrary-equality>
    ArbitraryEquality,
}

/// Operator spellings, longest first so that `===` wins over `==` and `<=` over `<`.
static OPERATORS: &[(&str, Operator)] = &[
    ("===", Operator::ArbitraryEquality),
    ("~=", Operator::Compatible),
    ("==", Operator::Matching),
    ("!=", Operator::Exclusion),
    ("<=", Operator::LessThanEqual),
    (">=", Operator::GreaterThanEqual),
    ("<", Operator::LessThan),
    (">", Operator::GreaterThan),
];

impl Operator {
    /// The textual form, e.g. `~=`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compatible => "~=",
            Self::Matching => "==",
            Self::Exclusion => "!=",
            Self::LessThanEqual => "<=",
            Self::GreaterThanEqual => ">=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::ArbitraryEquality => "===",
        }
    }

    /// Consume the longest operator at the scanner position, if any.
    fn eat(s: &mut Scanner<'_>) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|(token, _)| s.eat_if(*token))
            .map(|(_, operator)| *operator)
    }

    /// Whether the operand may end in `.*`.
    fn allows_wildcard(self) -> bool {
        matches!(self, Self::Matching | Self::Exclusion)
    }

    /// Whether the operand may carry a local version label.
    fn allows_local(self) -> bool {
        matches!(
            self,
            Self::Matching | Self::Exclusion | Self::ArbitraryEquality
        )
    }
}

impl FromStr for Operator {
    type Err = OperatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATORS
            .iter()
            .find(|(token, _)| *token == s)
            .map(|(_, operator)| *operator)
            .ok_or_else(|| OperatorParseError {
                operator: s.to_string(),
            })
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error that occurs when parsing an invalid version specifier operator.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("No such comparison operator `{operator}`, must be one of ~= == != <= >= < > ===")]
pub struct OperatorParseError {
    operator: String,
}

/// A single clause such as `>1.2.3`, `<=4!5.6.7-a8.post9.dev0` or `== 4.1.*`.
///
/// ```rust
/// use std::str::FromStr;
/// use pyprovider_pep440::{VersionIdentifier, VersionSpecifierClause};
///
/// let clause = VersionSpecifierClause::from_str("== 1.*").unwrap();
/// assert!(clause.contains(&VersionIdentifier::parse("1.19")));
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct VersionSpecifierClause {
    operator: Operator,
    version: VersionIdentifier,
}

impl VersionSpecifierClause {
    /// Build a clause from an operator and an operand, checking that they go together.
    pub fn new(
        operator: Operator,
        version: VersionIdentifier,
    ) -> Result<Self, VersionSpecifierClauseParseError> {
        if operator == Operator::ArbitraryEquality {
            // Compared verbatim, so the operand doesn't have to be a valid version
            return Ok(Self { operator, version });
        }
        if version.is_wildcard() && !operator.allows_wildcard() {
            return Err(ClauseParseErrorKind::OperatorWithStar(operator).into());
        }
        if !version.is_valid() {
            return Err(ClauseParseErrorKind::InvalidVersion(version.raw().to_string()).into());
        }
        if version.is_local() && !operator.allows_local() {
            return Err(ClauseParseErrorKind::OperatorLocalCombo { operator, version }.into());
        }
        if operator == Operator::Compatible && version.release().len() < 2 {
            return Err(ClauseParseErrorKind::CompatibleRelease.into());
        }
        Ok(Self { operator, version })
    }

    /// The comparison operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The operand.
    pub fn version(&self) -> &VersionIdentifier {
        &self.version
    }

    /// Whether the given version satisfies this clause.
    ///
    /// See <https://peps.python.org/pep-0440/#version-specifiers>.
    pub fn contains(&self, version: &VersionIdentifier) -> bool {
        let operand = &self.version;
        match self.operator {
            Operator::Compatible => {
                // `~=2.2` is `>=2.2, ==2.*`; the constructor guarantees two release segments
                let prefix = &operand.release()[..operand.release().len() - 1];
                version >= operand
                    && version.epoch() == operand.epoch()
                    && starts_with_release(version.release(), prefix)
            }
            Operator::Matching => self.matches_exactly(version),
            Operator::Exclusion => !self.matches_exactly(version),
            Operator::LessThanEqual => version <= operand,
            Operator::GreaterThanEqual => version >= operand,
            Operator::GreaterThan => {
                if version.is_local() {
                    return false;
                }
                // `>1.0` must not match `1.0.post1`, unless the operand is a post release itself
                if !operand.is_post() && version.is_post() && Self::same_release(operand, version)
                {
                    return false;
                }
                version > operand
            }
            Operator::LessThan => {
                // `<1.0` must not match `1.0rc1`, unless the operand is a prerelease itself
                if !operand.is_prerelease()
                    && version.is_prerelease()
                    && Self::same_release(operand, version)
                {
                    return false;
                }
                version < operand
            }
            Operator::ArbitraryEquality => version.raw() == operand.raw(),
        }
    }

    /// `==` semantics: a prefix match for wildcards, otherwise equality that ignores the local
    /// label of the candidate unless the operand has one.
    fn matches_exactly(&self, version: &VersionIdentifier) -> bool {
        if self.version.is_wildcard() {
            return self.version.is_prefix_of(version);
        }
        let options = CompareOptions {
            ignore_local: !self.version.is_local(),
            ..CompareOptions::ALL
        };
        version.compare_with(&self.version, options) == Ordering::Equal
    }

    fn same_release(this: &VersionIdentifier, other: &VersionIdentifier) -> bool {
        this.compare_with(other, CompareOptions::RELEASE_ONLY) == Ordering::Equal
    }
}

impl FromStr for VersionSpecifierClause {
    type Err = VersionSpecifierClauseParseError;

    /// Parses a clause such as `>= 1.19`, `== 1.1.*`, `==1.0+abc.5` or `<=1!2012.2`.
    fn from_str(clause: &str) -> Result<Self, Self::Err> {
        let mut s = Scanner::new(clause);
        s.eat_whitespace();
        let Some(operator) = Operator::eat(&mut s) else {
            let unknown = s.eat_while(['=', '!', '~', '<', '>']);
            if unknown.is_empty() {
                return Err(ClauseParseErrorKind::MissingOperator.into());
            }
            return Err(ClauseParseErrorKind::InvalidOperator(OperatorParseError {
                operator: unknown.to_string(),
            })
            .into());
        };
        s.eat_whitespace();
        let text = s.eat_while(|c: char| !c.is_whitespace());
        if text.is_empty() {
            return Err(ClauseParseErrorKind::MissingVersion.into());
        }
        s.eat_whitespace();
        if !s.done() {
            return Err(ClauseParseErrorKind::InvalidTrailing(s.after().to_string()).into());
        }

        if operator == Operator::ArbitraryEquality {
            #[cfg(feature = "tracing")]
            tracing::warn!("Using arbitrary equality (`===`) is discouraged");
        }

        let version = if operator.allows_wildcard() {
            VersionIdentifier::parse_wildcard(text)
        } else {
            let version = VersionIdentifier::parse(text);
            if operator != Operator::ArbitraryEquality
                && !version.is_valid()
                && VersionIdentifier::parse_wildcard(text).is_wildcard()
            {
                return Err(ClauseParseErrorKind::OperatorWithStar(operator).into());
            }
            version
        };
        Self::new(operator, version)
    }
}

impl Display for VersionSpecifierClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.operator == Operator::ArbitraryEquality {
            return write!(f, "{}{}", self.operator, self.version.raw());
        }
        write!(f, "{}{}", self.operator, self.version)
    }
}

/// An error that can occur when parsing a single version specifier clause.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error(transparent)]
pub struct VersionSpecifierClauseParseError {
    // Boxed to keep `Result<VersionSpecifierClause, _>` small.
    kind: Box<ClauseParseErrorKind>,
}

/// The specific kind of error that occurs when parsing a single clause.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
enum ClauseParseErrorKind {
    #[error("Unexpected end of version specifier, expected operator")]
    MissingOperator,
    #[error(transparent)]
    InvalidOperator(OperatorParseError),
    #[error("Unexpected end of version specifier, expected version")]
    MissingVersion,
    #[error("Version `{0}` doesn't match PEP 440 rules")]
    InvalidVersion(String),
    #[error("Operator {0} cannot be used with a wildcard version specifier")]
    OperatorWithStar(Operator),
    #[error(
        "Operator {operator} is incompatible with versions containing non-empty local segments (`{version}`)"
    )]
    OperatorLocalCombo {
        operator: Operator,
        version: VersionIdentifier,
    },
    #[error("The ~= operator requires at least two segments in the release version")]
    CompatibleRelease,
    #[error("Trailing `{0}` is not allowed")]
    InvalidTrailing(String),
}

impl From<ClauseParseErrorKind> for VersionSpecifierClauseParseError {
    fn from(kind: ClauseParseErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }
}

/// Comma separated version specifier clauses, such as `>=2.1,<3`, all of which must hold.
///
/// ```rust
/// use std::str::FromStr;
/// use pyprovider_pep440::{VersionIdentifier, VersionSpecifier};
///
/// let specifier = VersionSpecifier::from_str(">=1.16, <2.0").unwrap();
/// assert!(specifier.contains(&VersionIdentifier::parse("1.19")));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct VersionSpecifier(Vec<VersionSpecifierClause>);

impl VersionSpecifier {
    /// A specifier without clauses, matching every version.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Whether all clauses match the given version.
    pub fn contains(&self, version: &VersionIdentifier) -> bool {
        self.0.iter().all(|clause| {
            let matches = clause.contains(version);
            #[cfg(feature = "tracing")]
            if !matches {
                tracing::trace!("`{version}` does not satisfy `{clause}`");
            }
            matches
        })
    }
}

impl Deref for VersionSpecifier {
    type Target = [VersionSpecifierClause];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<VersionSpecifierClause> for VersionSpecifier {
    fn from_iter<T: IntoIterator<Item = VersionSpecifierClause>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<VersionSpecifierClause> for VersionSpecifier {
    fn from(clause: VersionSpecifierClause) -> Self {
        Self(vec![clause])
    }
}

impl FromStr for VersionSpecifier {
    type Err = VersionSpecifierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_version_specifier(s).map(Self)
    }
}

impl Display for VersionSpecifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, clause) in self.0.iter().enumerate() {
            if idx == 0 {
                write!(f, "{clause}")?;
            } else {
                write!(f, ", {clause}")?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VersionSpecifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for VersionSpecifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Error with span information (unicode width) inside the parsed specifier.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct VersionSpecifierParseError {
    inner: Box<VersionSpecifierParseErrorInner>,
}

#[derive(Debug, Eq, PartialEq, Clone)]
struct VersionSpecifierParseErrorInner {
    /// The error of the failing clause.
    err: VersionSpecifierClauseParseError,
    /// The whole specifier.
    line: String,
    /// Byte offset of the failing clause.
    start: usize,
    /// Byte offset of the end of the failing clause.
    end: usize,
}

impl VersionSpecifierParseError {
    /// The specifier that failed to parse.
    pub fn line(&self) -> &str {
        &self.inner.line
    }

    /// The byte range of the failing clause within [`Self::line`].
    pub fn span(&self) -> std::ops::Range<usize> {
        self.inner.start..self.inner.end
    }
}

impl Display for VersionSpecifierParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let VersionSpecifierParseErrorInner {
            ref err,
            ref line,
            start,
            end,
        } = *self.inner;
        writeln!(f, "Failed to parse version specifier: {err}:")?;
        writeln!(f, "{line}")?;
        let indent = line[..start].width();
        let point = line[start..end].width().max(1);
        write!(f, "{}{}", " ".repeat(indent), "^".repeat(point))
    }
}

impl std::error::Error for VersionSpecifierParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner.err)
    }
}

/// Parse a list of clauses such as `>= 1.0, != 1.3.*, < 2.0`.
///
/// Every clause must have an operator, so an empty string fails like an empty clause between
/// commas. Use [`VersionSpecifier::empty`] for a specifier without clauses.
fn parse_version_specifier(
    spec: &str,
) -> Result<Vec<VersionSpecifierClause>, VersionSpecifierParseError> {
    let mut clauses = Vec::new();
    let mut start = 0;
    for clause in spec.split(',') {
        match VersionSpecifierClause::from_str(clause) {
            Ok(clause) => clauses.push(clause),
            Err(err) => {
                // Underline the clause without its surrounding whitespace
                let trimmed = clause.trim_start();
                let clause_start = start + (clause.len() - trimmed.len());
                return Err(VersionSpecifierParseError {
                    inner: Box::new(VersionSpecifierParseErrorInner {
                        err,
                        line: spec.to_string(),
                        start: clause_start,
                        end: clause_start + trimmed.trim_end().len(),
                    }),
                });
            }
        }
        start += clause.len() + ','.len_utf8();
    }
    Ok(clauses)
}
