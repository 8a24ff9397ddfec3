use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

use pyprovider_pep440::{
    VersionIdentifier, VersionSpecifier, VersionSpecifierClause, VersionSpecifierClauseParseError,
};

use crate::cursor::Cursor;
use crate::marker::{
    MarkerEnvironment, MarkerErrorKind, MarkerEvaluationError, MarkerParseError, MarkerTree,
};
use crate::write_underlined;

/// A dependency string from the `requires_dist` or `requires` metadata of a package, such as
/// `requests [security,tests] >= 2.8.1, == 2.8.* ; python_version > "3.8"`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Requirement {
    /// The name of the package, as written.
    pub name: String,
    /// The list of extras such as `security` and `tests` in
    /// `requests[security,tests] >= 2.8.1, == 2.8.*`.
    pub extras: Vec<String>,
    /// The versions of the package that are allowed. `None` means any version.
    pub version_specifier: Option<VersionSpecifier>,
    /// Those are the markers such as `python_version > "3.8"`, which restrict when the
    /// dependency applies. `None` means always.
    pub marker: Option<MarkerTree>,
}

impl Requirement {
    /// Whether the dependency applies to an interpreter with the given marker values.
    pub fn evaluate_marker<E: MarkerEnvironment + ?Sized>(
        &self,
        env: &E,
    ) -> Result<bool, MarkerEvaluationError> {
        match &self.marker {
            Some(marker) => marker.evaluate(env),
            None => Ok(true),
        }
    }

    /// Whether the given version of the package satisfies the dependency.
    pub fn allows(&self, version: &VersionIdentifier) -> bool {
        self.version_specifier
            .as_ref()
            .is_none_or(|specifier| specifier.contains(version))
    }
}

impl Display for Requirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some(specifier) = &self.version_specifier {
            if !specifier.is_empty() {
                write!(f, " {specifier}")?;
            }
        }
        if let Some(marker) = &self.marker {
            write!(f, " ; {marker}")?;
        }
        Ok(())
    }
}

impl FromStr for Requirement {
    type Err = RequirementParseError;

    /// Parse a [dependency specifier](https://packaging.python.org/en/latest/specifications/dependency-specifiers)
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse(&mut Cursor::new(input))
    }
}

/// Either we have an error string from our parser or an error from one of the parts.
#[derive(Debug, Error)]
pub enum RequirementErrorSource {
    /// An error from our parser.
    #[error("{0}")]
    String(String),
    /// A clause of the version specifier is invalid.
    #[error(transparent)]
    Specifier(#[from] VersionSpecifierClauseParseError),
    /// The marker is invalid.
    #[error(transparent)]
    Marker(#[from] MarkerErrorKind),
    /// Valid syntax that we don't support, such as direct URL references.
    #[error("{0}")]
    Unsupported(String),
}

/// Error with a span attached.
#[derive(Debug)]
pub struct RequirementParseError {
    /// What went wrong.
    pub message: RequirementErrorSource,
    /// Span start byte offset.
    pub start: usize,
    /// Span length in bytes.
    pub len: usize,
    /// The input string so we can print it underlined.
    pub input: String,
}

impl RequirementParseError {
    fn new(
        message: impl Into<RequirementErrorSource>,
        cursor: &Cursor,
        start: usize,
        len: usize,
    ) -> Self {
        Self {
            message: message.into(),
            start,
            len,
            input: cursor.input().to_string(),
        }
    }

    fn message(message: impl Into<String>, cursor: &Cursor, start: usize, len: usize) -> Self {
        Self::new(
            RequirementErrorSource::String(message.into()),
            cursor,
            start,
            len,
        )
    }
}

impl Display for RequirementParseError {
    /// Pretty formatting with underline.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_underlined(f, &self.message, &self.input, self.start, self.len)
    }
}

impl std::error::Error for RequirementParseError {}

fn parse_name(cursor: &mut Cursor) -> Result<String, RequirementParseError> {
    // https://peps.python.org/pep-0508/#names
    // ^([A-Z0-9]|[A-Z0-9][A-Z0-9._-]*[A-Z0-9])$ with re.IGNORECASE
    let mut name = String::new();
    match cursor.next() {
        Some((_, char @ ('A'..='Z' | 'a'..='z' | '0'..='9'))) => name.push(char),
        Some((index, char)) => {
            return Err(RequirementParseError::message(
                format!("Expected package name starting with an alphanumeric character, found '{char}'"),
                cursor,
                index,
                char.len_utf8(),
            ));
        }
        None => {
            return Err(RequirementParseError::message(
                "Empty field is not allowed for PEP508",
                cursor,
                cursor.pos(),
                0,
            ));
        }
    }

    name.push_str(
        cursor.eat_while(|char| matches!(char, 'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '-' | '_')),
    );
    // [.-_] can't be the final character
    if let Some(last @ ('.' | '-' | '_')) = name.chars().last() {
        return Err(RequirementParseError::message(
            format!("Package name must end with an alphanumeric character, not '{last}'"),
            cursor,
            cursor.pos() - 1,
            1,
        ));
    }
    Ok(name)
}

/// parses extras in the `[extra1,extra2] format`
fn parse_extras(cursor: &mut Cursor) -> Result<Vec<String>, RequirementParseError> {
    let Some(bracket_pos) = cursor.eat_char('[') else {
        return Ok(vec![]);
    };
    let mut extras = Vec::new();
    let early_eof_error = |cursor: &Cursor| {
        RequirementParseError::message(
            "Missing closing bracket (expected ']', found end of dependency specification)",
            cursor,
            bracket_pos,
            1,
        )
    };

    // `[]` is the same as no extras
    cursor.eat_whitespace();
    if cursor.eat_char(']').is_some() {
        return Ok(extras);
    }

    loop {
        // wsp* before the identifier
        cursor.eat_whitespace();

        // First char of the identifier
        let first = match cursor.next() {
            // letterOrDigit
            Some((_, alphanumeric @ ('a'..='z' | 'A'..='Z' | '0'..='9'))) => alphanumeric,
            Some((pos, other)) => {
                return Err(RequirementParseError::message(
                    format!(
                        "Expected an alphanumeric character starting the extra name, found '{other}'"
                    ),
                    cursor,
                    pos,
                    other.len_utf8(),
                ));
            }
            None => return Err(early_eof_error(cursor)),
        };
        // identifier_end = letterOrDigit | (('-' | '_' | '.' )* letterOrDigit)
        let rest = cursor
            .eat_while(|char| matches!(char, 'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.'));
        let extra = format!("{first}{rest}");
        if let Some(char) = cursor.peek() {
            if char != ',' && char != ']' && !char.is_whitespace() {
                return Err(RequirementParseError::message(
                    format!(
                        "Invalid character in extras name, expected an alphanumeric character, '-', '_', '.', ',' or ']', found '{char}'"
                    ),
                    cursor,
                    cursor.pos(),
                    char.len_utf8(),
                ));
            }
        }
        // wsp* after the identifier
        cursor.eat_whitespace();
        // end or next identifier?
        match cursor.next() {
            Some((_, ',')) => extras.push(extra),
            Some((_, ']')) => {
                extras.push(extra);
                break;
            }
            Some((pos, other)) => {
                return Err(RequirementParseError::message(
                    format!(
                        "Expected either ',' (separating extras) or ']' (ending the extras section), found '{other}'"
                    ),
                    cursor,
                    pos,
                    other.len_utf8(),
                ));
            }
            None => return Err(early_eof_error(cursor)),
        }
    }

    Ok(extras)
}

/// PEP 440 wrapper, underlining the clause without its surrounding whitespace on error
fn parse_clause(
    cursor: &Cursor,
    buffer: &str,
    start: usize,
) -> Result<VersionSpecifierClause, RequirementParseError> {
    VersionSpecifierClause::from_str(buffer).map_err(|err| {
        let leading = buffer.len() - buffer.trim_start().len();
        RequirementParseError::new(err, cursor, start + leading, buffer.trim().len())
    })
}

/// Such as `>=1.19,<2.0`, either delimited by the end of the specifier or a `;` for the marker part
///
/// ```text
/// version_one (wsp* ',' version_one)*
/// ```
fn parse_version_specifier(
    cursor: &mut Cursor,
) -> Result<VersionSpecifier, RequirementParseError> {
    let mut start = cursor.pos();
    let mut clauses = Vec::new();
    loop {
        let end = cursor.pos();
        match cursor.peek() {
            Some(',') => {
                clauses.push(parse_clause(cursor, cursor.slice(start..end), start)?);
                cursor.next();
                start = end + 1;
            }
            Some(';') | None => {
                clauses.push(parse_clause(cursor, cursor.slice(start..end), start)?);
                break;
            }
            Some(_) => {
                cursor.next();
            }
        }
    }
    Ok(clauses.into_iter().collect())
}

/// Such as `(>=1.19,<2.0)`
///
/// ```text
/// '(' version_one (wsp* ',' version_one)* ')'
/// ```
fn parse_version_specifier_parentheses(
    cursor: &mut Cursor,
) -> Result<VersionSpecifier, RequirementParseError> {
    let brace_pos = cursor.pos();
    cursor.next();
    // Makes for slightly better error underline
    cursor.eat_whitespace();
    let mut start = cursor.pos();
    let mut clauses = Vec::new();
    loop {
        match cursor.next() {
            Some((end, ',')) => {
                clauses.push(parse_clause(cursor, cursor.slice(start..end), start)?);
                start = end + 1;
            }
            Some((end, ')')) => {
                let buffer = cursor.slice(start..end);
                // `()` is the same as no specifier
                if !(clauses.is_empty() && buffer.trim().is_empty()) {
                    clauses.push(parse_clause(cursor, buffer, start)?);
                }
                break;
            }
            Some(_) => {}
            None => {
                return Err(RequirementParseError::message(
                    "Missing closing parenthesis (expected ')', found end of dependency specification)",
                    cursor,
                    brace_pos,
                    1,
                ));
            }
        }
    }
    Ok(clauses.into_iter().collect())
}

/// Everything after the `;`, up to trailing whitespace.
fn parse_marker(cursor: &mut Cursor) -> Result<MarkerTree, RequirementParseError> {
    cursor.eat_whitespace();
    let start = cursor.pos();
    let text = cursor.rest().trim_end();
    let marker = MarkerTree::from_str(text).map_err(|err: MarkerParseError| {
        let span = err.span();
        RequirementParseError::new(
            err.kind().clone(),
            cursor,
            start + span.start,
            span.len(),
        )
    })?;
    cursor.eat_str(text);
    Ok(marker)
}

/// Parse a [dependency specifier](https://packaging.python.org/en/latest/specifications/dependency-specifiers)
fn parse(cursor: &mut Cursor) -> Result<Requirement, RequirementParseError> {
    // The grammar is:
    // ```text
    // name_req      = name wsp* extras? wsp* versionspec? wsp* quoted_marker?
    // specification = wsp* name_req wsp*
    // ```
    // Where the extras start with '[' if any, then we have '(' or one of the version comparison
    // operators. Markers start with ';' if any
    // wsp*
    cursor.eat_whitespace();
    // name
    let name = parse_name(cursor)?;
    // wsp*
    cursor.eat_whitespace();
    // extras?
    let extras = parse_extras(cursor)?;
    // wsp*
    cursor.eat_whitespace();

    let pos = cursor.pos();
    let version_specifier = match cursor.peek() {
        Some('@') => {
            return Err(RequirementParseError::new(
                RequirementErrorSource::Unsupported(
                    "Direct URL references (`name @ url`) are not supported".to_string(),
                ),
                cursor,
                pos,
                cursor.rest().trim_end().len(),
            ));
        }
        Some('(') => Some(parse_version_specifier_parentheses(cursor)?),
        Some('<' | '=' | '>' | '~' | '!') => Some(parse_version_specifier(cursor)?),
        Some(';') | None => None,
        Some(other) => {
            return Err(RequirementParseError::message(
                format!("Expected one of `(`, `<`, `=`, `>`, `~`, `!`, `;`, found `{other}`"),
                cursor,
                pos,
                other.len_utf8(),
            ));
        }
    };

    // wsp*
    cursor.eat_whitespace();
    // quoted_marker?
    let marker = if cursor.eat_char(';').is_some() {
        Some(parse_marker(cursor)?)
    } else {
        None
    };
    // wsp*
    cursor.eat_whitespace();
    if let Some((pos, char)) = cursor.next() {
        return Err(RequirementParseError::message(
            format!("Expected end of input or ';', found '{char}'"),
            cursor,
            pos,
            char.len_utf8(),
        ));
    }

    Ok(Requirement {
        name,
        extras,
        version_specifier,
        marker,
    })
}

#[cfg(test)]
mod tests;
