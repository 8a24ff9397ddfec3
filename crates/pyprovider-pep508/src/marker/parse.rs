use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::marker::lexer::{Token, TokenKind, tokenize};
use crate::marker::{MarkerOperator, MarkerTree, StringVariable, VersionVariable};
use crate::write_underlined;

/// What went wrong while parsing a marker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarkerErrorKind {
    /// The marker contains nothing but whitespace.
    #[error("Empty marker")]
    Empty,
    /// A quoted string is missing its closing quote.
    #[error("Missing closing quote, found end of marker")]
    UnterminatedString,
    /// A `\x`, `\u`, `\U` or octal escape with too few digits or no matching character.
    #[error("Invalid escape sequence `{0}`")]
    InvalidEscape(String),
    /// `\N{...}` escapes are not supported.
    #[error("Named unicode escapes are not supported")]
    NamedEscape,
    /// A `=` or `!` not followed by `=`.
    #[error("Expected `=` after `{0}`")]
    IncompleteOperator(char),
    /// A character that can't start any token.
    #[error("Unexpected character `{0}`")]
    UnexpectedCharacter(char),
    /// An identifier that is neither a marker variable nor a keyword.
    #[error("Unknown marker variable `{0}`")]
    UnknownVariable(String),
    /// Something other than a variable, a string or a parenthesized group where one was expected.
    #[error("Expected a marker variable, a quoted string or `(`, found {0}")]
    ExpectedOperand(String),
    /// `not` must be followed by `in`.
    #[error("Expected `in` after `not`, found {0}")]
    ExpectedIn(String),
    /// A `(` without its `)`.
    #[error("Missing closing parenthesis (expected `)`, found end of marker)")]
    UnclosedParenthesis,
    /// A `)` without its `(`.
    #[error("Unmatched closing parenthesis")]
    UnmatchedParenthesis,
    /// Tokens after a complete marker.
    #[error("Expected `and`, `or` or end of marker, found `{0}`")]
    Trailing(String),
}

/// A marker that failed to parse, pointing at the offending part of the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerParseError {
    pub(crate) kind: MarkerErrorKind,
    /// Byte offset of the span.
    pub(crate) start: usize,
    /// Length of the span in bytes.
    pub(crate) len: usize,
    /// The marker so we can print it underlined.
    pub(crate) input: String,
}

impl MarkerParseError {
    /// What went wrong.
    pub fn kind(&self) -> &MarkerErrorKind {
        &self.kind
    }

    /// The marker that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The byte range of the offending part of the marker.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }

    /// The offset of the offending part, counted in characters rather than bytes.
    pub fn character_offset(&self) -> usize {
        self.input[..self.start].chars().count()
    }
}

impl Display for MarkerParseError {
    /// Pretty formatting with underline.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_underlined(f, &self.kind, &self.input, self.start, self.len)
    }
}

impl std::error::Error for MarkerParseError {}

/// Parses markers such as `python_version < '3.8'` or
/// `python_version == "3.10" and (sys_platform == "win32" or (os_name == "linux" and implementation_name == 'cpython'))`
///
/// ```text
/// marker      = or_list
/// or_list     = and_list ('or' and_list)*
/// and_list    = comparison ('and' comparison)*
/// comparison  = atom ((marker_op | 'in' | 'not' 'in') atom)*
/// atom        = '(' or_list ')' | quoted_string | variable | 'extra'
/// ```
pub(crate) fn parse_marker(input: &str) -> Result<MarkerTree, MarkerParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
    };
    if parser.tokens.is_empty() {
        return Err(parser.error(MarkerErrorKind::Empty, 0, input.len()));
    }
    let marker = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        // Both `parse_or` and `parse_and` returned because the next token was neither `and`
        // nor `or`
        let kind = if token.kind == TokenKind::RightParen {
            MarkerErrorKind::UnmatchedParenthesis
        } else {
            MarkerErrorKind::Trailing(parser.text(token).to_string())
        };
        return Err(parser.error(kind, token.start, token.len));
    }
    Ok(marker)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token<'a>> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn text(&self, token: &Token<'_>) -> &'a str {
        &self.input[token.start..token.start + token.len]
    }

    /// Describes the next token for an error message.
    fn found(&self) -> (String, usize, usize) {
        match self.peek() {
            Some(token) => (
                format!("`{}`", self.text(token)),
                token.start,
                token.len,
            ),
            None => ("end of marker".to_string(), self.input.len(), 0),
        }
    }

    fn parse_or(&mut self) -> Result<MarkerTree, MarkerParseError> {
        self.parse_list("or", MarkerTree::Or, Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<MarkerTree, MarkerParseError> {
        self.parse_list("and", MarkerTree::And, Self::parse_comparison)
    }

    /// Parses both `or_list` and `and_list`
    fn parse_list(
        &mut self,
        keyword: &str,
        constructor: fn(Vec<MarkerTree>) -> MarkerTree,
        parse_inner: fn(&mut Self) -> Result<MarkerTree, MarkerParseError>,
    ) -> Result<MarkerTree, MarkerParseError> {
        let mut operands = vec![parse_inner(self)?];
        while self.peek().is_some_and(|token| token.is_keyword(keyword)) {
            self.pos += 1;
            operands.push(parse_inner(self)?);
        }
        // Build minimal trees
        if operands.len() == 1 {
            Ok(operands.remove(0))
        } else {
            Ok(constructor(operands))
        }
    }

    fn parse_comparison(&mut self) -> Result<MarkerTree, MarkerParseError> {
        let mut operands = vec![self.parse_atom()?];
        let mut operators = Vec::new();
        while let Some(operator) = self.parse_operator()? {
            operators.push(operator);
            operands.push(self.parse_atom()?);
        }
        if operators.is_empty() {
            Ok(operands.remove(0))
        } else {
            Ok(MarkerTree::ComparisonList {
                operands,
                operators,
            })
        }
    }

    fn parse_operator(&mut self) -> Result<Option<MarkerOperator>, MarkerParseError> {
        let Some(token) = self.peek() else {
            return Ok(None);
        };
        let operator = match token.kind {
            TokenKind::Operator(operator) => operator,
            TokenKind::Identifier("in") => MarkerOperator::In,
            TokenKind::Identifier("not") => {
                self.pos += 1;
                if !self.peek().is_some_and(|token| token.is_keyword("in")) {
                    let (found, start, len) = self.found();
                    return Err(self.error(MarkerErrorKind::ExpectedIn(found), start, len));
                }
                MarkerOperator::NotIn
            }
            _ => return Ok(None),
        };
        self.pos += 1;
        Ok(Some(operator))
    }

    fn parse_atom(&mut self) -> Result<MarkerTree, MarkerParseError> {
        let (found, start, len) = self.found();
        let Some(token) = self.next().cloned() else {
            return Err(self.error(MarkerErrorKind::ExpectedOperand(found), start, len));
        };
        match token.kind {
            TokenKind::LeftParen => {
                let marker = self.parse_or()?;
                if self
                    .next()
                    .is_none_or(|token| token.kind != TokenKind::RightParen)
                {
                    return Err(self.error(MarkerErrorKind::UnclosedParenthesis, start, len));
                }
                Ok(marker)
            }
            TokenKind::String(value) => Ok(MarkerTree::StringLiteral(value)),
            TokenKind::Identifier("extra") => Ok(MarkerTree::Extra),
            TokenKind::Identifier(name @ ("and" | "or" | "not" | "in")) => Err(self.error(
                MarkerErrorKind::ExpectedOperand(format!("`{name}`")),
                start,
                len,
            )),
            TokenKind::Identifier(name) => {
                if let Some(variable) = StringVariable::from_name(name) {
                    Ok(MarkerTree::StringVariable(variable))
                } else if let Some(variable) = VersionVariable::from_name(name) {
                    Ok(MarkerTree::VersionVariable(variable))
                } else {
                    Err(self.error(
                        MarkerErrorKind::UnknownVariable(name.to_string()),
                        start,
                        len,
                    ))
                }
            }
            TokenKind::RightParen | TokenKind::Operator(_) => {
                Err(self.error(MarkerErrorKind::ExpectedOperand(found), start, len))
            }
        }
    }

    fn error(&self, kind: MarkerErrorKind, start: usize, len: usize) -> MarkerParseError {
        MarkerParseError {
            kind,
            start,
            len,
            input: self.input.to_string(),
        }
    }
}
