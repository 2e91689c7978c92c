use arbor_tokenizer::{Cursor, EOF_CHAR};
use text_size::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Dot,
    Bang,
    Hash,
    Question,
    Star,
    Plus,
    /// `@name`; the range covers the name only.
    Capture,
    Identifier,
    /// A quoted string; the range covers the quotes.
    String,
    /// A byte no token starts with, or an unterminated string.
    Unknown,
    Eof,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) range: TextRange,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '?' | '!')
}

/// Splits a pattern source into tokens. Whitespace and `;` comments are
/// dropped, the stream always ends with an [`TokenKind::Eof`] token.
pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let mut cursor = Cursor::new(source.as_bytes());
    let mut tokens = Vec::new();

    loop {
        cursor.reset_pos_within_token();
        if cursor.is_eof() {
            tokens.push(Token { kind: TokenKind::Eof, range: cursor.token_range() });
            return tokens;
        }

        let kind = match cursor.advance() {
            c if c.is_whitespace() => {
                cursor.advance_while(char::is_whitespace);
                continue;
            }
            ';' => {
                cursor.advance_while(|c| c != '\n');
                continue;
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            '!' => TokenKind::Bang,
            '#' => TokenKind::Hash,
            '?' => TokenKind::Question,
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '@' => {
                cursor.reset_pos_within_token();
                cursor.advance_while(is_ident_continue);
                TokenKind::Capture
            }
            '"' => string(&mut cursor),
            c if is_ident_start(c) => {
                cursor.advance_while(is_ident_continue);
                TokenKind::Identifier
            }
            _ => TokenKind::Unknown,
        };
        tokens.push(Token { kind, range: cursor.token_range() });
    }
}

fn string(cursor: &mut Cursor<'_>) -> TokenKind {
    loop {
        match cursor.advance() {
            '"' => return TokenKind::String,
            '\\' => {
                cursor.advance();
            }
            EOF_CHAR if cursor.is_eof() => return TokenKind::Unknown,
            _ => {}
        }
    }
}

/// Decodes the contents of a string token, quotes included in `raw`.
pub(crate) fn unescape(raw: &str) -> String {
    let inner = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(raw);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source)
            .into_iter()
            .map(|token| (token.kind, &source[token.range]))
            .collect()
    }

    #[test]
    fn punctuation_and_names() {
        use TokenKind::*;
        assert_eq!(
            kinds("(call function: (identifier) @func-call)* ; trailing\n"),
            [
                (LParen, "("),
                (Identifier, "call"),
                (Identifier, "function"),
                (Colon, ":"),
                (LParen, "("),
                (Identifier, "identifier"),
                (RParen, ")"),
                (Capture, "func-call"),
                (RParen, ")"),
                (Star, "*"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn predicates_and_negations() {
        use TokenKind::*;
        assert_eq!(
            kinds("(#eq? @a \"x\") !body ."),
            [
                (LParen, "("),
                (Hash, "#"),
                (Identifier, "eq?"),
                (Capture, "a"),
                (String, "\"x\""),
                (RParen, ")"),
                (Bang, "!"),
                (Identifier, "body"),
                (Dot, "."),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn strings_unescape() {
        assert_eq!(unescape(r#""a\"b\n\\""#), "a\"b\n\\");
        assert_eq!(kinds("\"open")[0].0, TokenKind::Unknown);
    }
}
