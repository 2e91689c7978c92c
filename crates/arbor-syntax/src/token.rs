use text_size::{TextRange, TextSize};

use crate::Symbol;

/// A lexed token, as fed to the parser and kept by trees for reuse checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub symbol: Symbol,
    pub range: TextRange,
    /// Extra tokens (comments) may appear anywhere and are not seen by grammar
    /// rules.
    pub extra: bool,
    /// Bytes past `range.end()` the lexer inspected to produce this token.
    pub lookahead: u32,
}

impl Token {
    #[inline]
    pub fn new(symbol: Symbol, range: TextRange) -> Self {
        Self { symbol, range, extra: false, lookahead: 0 }
    }

    /// The zero-width end-of-input token at `len`.
    #[inline]
    pub fn end(len: TextSize) -> Self {
        Self { symbol: Symbol::END, range: TextRange::empty(len), extra: false, lookahead: 1 }
    }

    #[inline]
    pub fn with_extra(mut self, extra: bool) -> Self {
        self.extra = extra;
        self
    }

    #[inline]
    pub fn with_lookahead(mut self, lookahead: u32) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Byte offset one past the last byte the lexer looked at.
    #[inline]
    pub fn lookahead_end(&self) -> TextSize {
        self.range.end() + TextSize::new(self.lookahead)
    }
}
