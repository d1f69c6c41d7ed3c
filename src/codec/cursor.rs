//! Character cursor shared by the splitter and the tokenizer.

use crate::location::Location;

#[derive(Clone)]
pub(crate) struct Cursor<'src> {
    /// The remaining source text.
    remaining: &'src str,
    origin: Location,
    line: usize,
    char: usize,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(source: &'src str, start: &Location) -> Self {
        Cursor {
            remaining: source,
            origin: start.clone(),
            line: start.line,
            char: start.char,
        }
    }

    pub(crate) fn location(&self) -> Location {
        Location {
            line: self.line,
            char: self.char,
            ..self.origin.clone()
        }
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    #[inline]
    pub(crate) fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining.chars().nth(n)
    }

    #[inline]
    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    pub(crate) fn rest(&self) -> &'src str {
        self.remaining
    }

    /// Whether the cursor sits on a `(dl` opener: the marker followed by whitespace, `)` or EOF.
    pub(crate) fn at_block_opener(&self) -> bool {
        self.starts_with("(dl")
            && self
                .peek_nth(3)
                .map(|c| c.is_whitespace() || c == ')')
                .unwrap_or(true)
    }

    /// Advance by one character and return it.
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.remaining = &self.remaining[c.len_utf8()..];
        if c == '\n' {
            self.line += 1;
            self.char = 1;
        } else {
            self.char += 1;
        }
        Some(c)
    }

    /// Advance over `count` characters, returning them.
    pub(crate) fn bump_n(&mut self, count: usize) -> String {
        (0..count).filter_map(|_| self.bump()).collect()
    }
}
