//! Byte-level scanning shared by grammar lexers.
//!
//! A grammar lexer walks the text with a [`Cursor`] and pushes tokens into a
//! [`Tokenizer`], which records how far past each token the lexer looked and
//! terminates the stream with a zero-width end token.

mod cursor;

pub use arbor_syntax::{Symbol, Token};
pub use cursor::{Cursor, EOF_CHAR};
use text_size::TextRange;

pub struct Tokenizer<'a> {
    pub cursor: Cursor<'a>,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(bytes), tokens: Vec::with_capacity(bytes.len() / 4 + 1) }
    }

    /// Discards the text consumed since the last token, e.g. whitespace.
    #[inline]
    pub fn skip(&mut self) {
        self.cursor.reset_pos_within_token();
    }

    /// Emits the text consumed since the last token as a token of `symbol`.
    pub fn push(&mut self, symbol: Symbol) {
        self.push_token(symbol, false);
    }

    /// Emits the text consumed since the last token as an extra token.
    pub fn push_extra(&mut self, symbol: Symbol) {
        self.push_token(symbol, true);
    }

    fn push_token(&mut self, symbol: Symbol, extra: bool) {
        let token = Token::new(symbol, self.cursor.token_range())
            .with_extra(extra)
            .with_lookahead(self.cursor.lookahead());
        self.tokens.push(token);
        self.cursor.reset_pos_within_token();
    }

    /// Emits a zero-width token at the current position, keeping any pending
    /// text for the next token.
    pub fn push_empty(&mut self, symbol: Symbol) {
        let at = self.cursor.offset() - self.cursor.pos_within_token();
        let lookahead = u32::from(self.cursor.pos_within_token()) + self.cursor.lookahead();
        self.tokens.push(Token::new(symbol, TextRange::empty(at)).with_lookahead(lookahead));
    }

    /// Returns the most recent non-extra token.
    pub fn last_significant(&self) -> Option<&Token> {
        self.tokens.iter().rev().find(|token| !token.extra)
    }

    /// Appends the end token and returns the stream.
    pub fn finish(mut self) -> Vec<Token> {
        self.tokens.push(Token::end(self.cursor.text_len()));
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::*;

    const WORD: Symbol = Symbol(1);
    const COMMENT: Symbol = Symbol(2);
    const OTHER: Symbol = Symbol(3);

    fn lex(text: &[u8]) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(text);
        while !tokenizer.cursor.is_eof() {
            match tokenizer.cursor.advance() {
                c if c.is_whitespace() => {
                    tokenizer.cursor.advance_while(char::is_whitespace);
                    tokenizer.skip();
                }
                '#' => {
                    tokenizer.cursor.advance_while(|c| c != '\n');
                    tokenizer.push_extra(COMMENT);
                }
                c if c.is_alphanumeric() => {
                    tokenizer.cursor.advance_while(char::is_alphanumeric);
                    tokenizer.push(WORD);
                }
                _ => tokenizer.push(OTHER),
            }
        }
        tokenizer.finish()
    }

    fn spans(tokens: &[Token]) -> Vec<(u16, u32, u32, u32)> {
        tokens
            .iter()
            .map(|token| {
                let range = token.range;
                (token.symbol.raw(), range.start().into(), range.end().into(), token.lookahead)
            })
            .collect()
    }

    #[test]
    fn stream_ends_with_end_token() {
        let tokens = lex(b"ab cd");
        assert_eq!(spans(&tokens), [(1, 0, 2, 1), (1, 3, 5, 1), (0, 5, 5, 1)]);
        assert_eq!(lex(b"").len(), 1);
    }

    #[test]
    fn multibyte_characters_use_byte_offsets() {
        let text = "é+😎".as_bytes();
        let tokens = lex(text);
        assert_eq!(spans(&tokens), [(1, 0, 2, 1), (3, 2, 3, 0), (3, 3, 7, 0), (0, 7, 7, 1)]);
    }

    #[test]
    fn invalid_utf8_consumes_one_byte_at_a_time() {
        let tokens = lex(b"a\xff\xfeb");
        assert_eq!(spans(&tokens), [(1, 0, 1, 1), (3, 1, 2, 0), (3, 2, 3, 0), (1, 3, 4, 1), (0, 4, 4, 1)]);
    }

    #[test]
    fn extras_are_flagged() {
        let tokens = lex(b"a # note\nb");
        assert!(tokens[1].extra);
        let range = usize::from(tokens[1].range.start())..usize::from(tokens[1].range.end());
        assert_eq!(&b"a # note\nb"[range], b"# note");
        assert_eq!(tokens[1].lookahead, 1);
        assert!(!tokens[2].extra);
    }

    #[test]
    fn cursor_peeks_ahead() {
        let mut cursor = Cursor::new("x😎y".as_bytes());
        assert_eq!(cursor.peek(), 'x');
        assert_eq!(cursor.second(), '😎');
        assert_eq!(cursor.advance(), 'x');
        assert!(cursor.eat('😎'));
        assert_eq!(cursor.offset(), TextSize::new(5));
        assert_eq!(cursor.token_text(), "x😎".as_bytes());
        assert_eq!(cursor.advance(), 'y');
        assert!(cursor.is_eof());
        assert_eq!(cursor.peek(), EOF_CHAR);
    }
}
