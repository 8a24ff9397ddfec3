//! Splits a marker into identifiers, quoted strings, parentheses and comparison operators.

use crate::cursor::Cursor;
use crate::marker::MarkerOperator;
use crate::marker::parse::{MarkerErrorKind, MarkerParseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// A variable name or one of the keywords `and`, `or`, `not` and `in`.
    Identifier(&'a str),
    /// A quoted string with its escapes decoded.
    String(String),
    LeftParen,
    RightParen,
    /// One of `==`, `!=`, `<`, `<=`, `>` and `>=`.
    Operator(MarkerOperator),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind<'a>,
    /// Byte offset in the marker.
    pub(crate) start: usize,
    /// Length in bytes.
    pub(crate) len: usize,
}

impl Token<'_> {
    /// Whether this is the given keyword. Quoted strings are never keywords.
    pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.kind, TokenKind::Identifier(identifier) if identifier == keyword)
    }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token<'_>>, MarkerParseError> {
    let mut lexer = Lexer {
        cursor: Cursor::new(input),
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> Result<Option<Token<'a>>, MarkerParseError> {
        // Only these count as whitespace inside a marker
        self.cursor.eat_while(|char| matches!(char, ' ' | '\t' | '\x0C'));
        let Some((start, char)) = self.cursor.next() else {
            return Ok(None);
        };
        let kind = match char {
            char if char.is_alphabetic() || char == '_' => {
                self.cursor.eat_while(|char| char.is_alphanumeric() || char == '_');
                TokenKind::Identifier(self.cursor.slice(start..self.cursor.pos()))
            }
            '"' | '\'' => TokenKind::String(self.string(start, char)?),
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '=' | '!' => {
                if self.cursor.eat_char('=').is_none() {
                    return Err(self.error(
                        MarkerErrorKind::IncompleteOperator(char),
                        start,
                        char.len_utf8(),
                    ));
                }
                TokenKind::Operator(if char == '=' {
                    MarkerOperator::Equal
                } else {
                    MarkerOperator::NotEqual
                })
            }
            '<' | '>' => {
                let or_equal = self.cursor.eat_char('=').is_some();
                TokenKind::Operator(match (char, or_equal) {
                    ('<', false) => MarkerOperator::LessThan,
                    ('<', true) => MarkerOperator::LessEqual,
                    (_, false) => MarkerOperator::GreaterThan,
                    (_, true) => MarkerOperator::GreaterEqual,
                })
            }
            other => {
                return Err(self.error(
                    MarkerErrorKind::UnexpectedCharacter(other),
                    start,
                    other.len_utf8(),
                ));
            }
        };
        Ok(Some(Token {
            kind,
            start,
            len: self.cursor.pos() - start,
        }))
    }

    /// A single or triple quoted string, after its first quote.
    ///
    /// Escapes follow Python's string literals, except that `\t` is kept as is and named
    /// unicode escapes (`\N{...}`) aren't supported. Other unknown escapes are kept verbatim.
    fn string(&mut self, start: usize, quote: char) -> Result<String, MarkerParseError> {
        let doubled = format!("{quote}{quote}");
        let triple_quoted = self.cursor.eat_str(&doubled);
        let mut value = String::new();
        loop {
            let Some((pos, char)) = self.cursor.next() else {
                return Err(self.error(
                    MarkerErrorKind::UnterminatedString,
                    start,
                    self.cursor.pos() - start,
                ));
            };
            if char == quote && (!triple_quoted || self.cursor.eat_str(&doubled)) {
                return Ok(value);
            }
            if char != '\\' {
                value.push(char);
                continue;
            }

            let Some(escape) = self.cursor.peek() else {
                return Err(self.error(
                    MarkerErrorKind::UnterminatedString,
                    start,
                    self.cursor.pos() - start,
                ));
            };
            if matches!(escape, '0'..='7') {
                value.push(self.numeric_escape(pos, 8, 1, 3)?);
                continue;
            }
            self.cursor.next();
            match escape {
                '\\' | '\'' | '"' => value.push(escape),
                'a' => value.push('\x07'),
                'b' => value.push('\x08'),
                'f' => value.push('\x0C'),
                'n' => value.push('\n'),
                'r' => value.push('\r'),
                'v' => value.push('\x0B'),
                'x' => value.push(self.numeric_escape(pos, 16, 2, 2)?),
                'u' => value.push(self.numeric_escape(pos, 16, 4, 4)?),
                'U' => value.push(self.numeric_escape(pos, 16, 8, 8)?),
                'N' => {
                    return Err(self.error(MarkerErrorKind::NamedEscape, pos, 2));
                }
                other => {
                    value.push('\\');
                    value.push(other);
                }
            }
        }
    }

    /// Reads between `min` and `max` digits of a numeric escape starting at `escape_start`.
    fn numeric_escape(
        &mut self,
        escape_start: usize,
        radix: u32,
        min: usize,
        max: usize,
    ) -> Result<char, MarkerParseError> {
        let mut code = 0u32;
        let mut digits = 0;
        while digits < max {
            let Some(digit) = self
                .cursor
                .peek()
                .and_then(|char| char.to_digit(radix))
            else {
                break;
            };
            self.cursor.next();
            code = code * radix + digit;
            digits += 1;
        }
        let len = self.cursor.pos() - escape_start;
        if digits < min {
            return Err(self.error(
                MarkerErrorKind::InvalidEscape(self.cursor.slice(escape_start..escape_start + len).to_string()),
                escape_start,
                len,
            ));
        }
        char::from_u32(code).ok_or_else(|| {
            self.error(
                MarkerErrorKind::InvalidEscape(self.cursor.slice(escape_start..escape_start + len).to_string()),
                escape_start,
                len,
            )
        })
    }

    fn error(&self, kind: MarkerErrorKind, start: usize, len: usize) -> MarkerParseError {
        MarkerParseError {
            kind,
            start,
            len,
            input: self.cursor.input().to_string(),
        }
    }
}
