use std::ops::Range;

/// Walks a dependency specification or a marker one character at a time.
///
/// Positions are byte offsets into the input, which is what the error spans are made of.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// The whole input, including what was already consumed.
    pub(crate) fn input(&self) -> &'a str {
        self.input
    }

    /// Byte offset of the next character.
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn slice(&self, range: Range<usize>) -> &'a str {
        &self.input[range]
    }

    /// The input that hasn't been consumed yet.
    pub(crate) fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes the next character, returning it together with its offset.
    pub(crate) fn next(&mut self) -> Option<(usize, char)> {
        let char = self.peek()?;
        let pos = self.pos;
        self.pos += char.len_utf8();
        Some((pos, char))
    }

    /// Consumes `expected` if it comes next, returning its offset.
    pub(crate) fn eat_char(&mut self, expected: char) -> Option<usize> {
        if self.peek() == Some(expected) {
            self.next().map(|(pos, _)| pos)
        } else {
            None
        }
    }

    pub(crate) fn eat_str(&mut self, expected: &str) -> bool {
        let found = self.rest().starts_with(expected);
        if found {
            self.pos += expected.len();
        }
        found
    }

    /// Consumes and returns the longest run of characters matching `predicate`.
    pub(crate) fn eat_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&predicate) {
            self.next();
        }
        &self.input[start..self.pos]
    }

    pub(crate) fn eat_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }
}

#[cfg(test)]
mod tests {
    use super::Cursor;

    #[test]
    fn offsets_are_bytes() {
        let mut cursor = Cursor::new("é1 ;");
        assert_eq!(cursor.next(), Some((0, 'é')));
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.eat_while(|char| char.is_ascii_digit()), "1");
        cursor.eat_whitespace();
        assert_eq!(cursor.eat_char(';'), Some(4));
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.slice(0..3), "é1");
        assert_eq!(cursor.input(), "é1 ;");
    }

    #[test]
    fn eat_str_only_on_match() {
        let mut cursor = Cursor::new("'''a'");
        assert!(!cursor.eat_str("\"\""));
        assert!(cursor.eat_str("''"));
        assert_eq!(cursor.rest(), "'a'");
        assert_eq!(cursor.eat_char('a'), None);
        assert_eq!(cursor.eat_while(|char| char == 'x'), "");
    }
}
