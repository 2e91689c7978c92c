use arbor_syntax::{Symbol, Token};
use arbor_tokenizer::{Cursor, Tokenizer};

use super::kinds::*;

pub(super) fn tokenize(text: &[u8]) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(text);

    while !tokenizer.cursor.is_eof() {
        let cursor = &mut tokenizer.cursor;
        let kind = match cursor.advance() {
            c if c.is_whitespace() => {
                cursor.advance_while(char::is_whitespace);
                tokenizer.skip();
                continue;
            }
            '/' if cursor.matches('/') => {
                cursor.advance_while(|c| !matches!(c, '\n' | '\r'));
                tokenizer.push_extra(COMMENT);
                continue;
            }
            '/' if cursor.matches('*') => {
                cursor.advance();
                block_comment(cursor);
                tokenizer.push_extra(COMMENT);
                continue;
            }
            '(' => L_PAREN,
            ')' => R_PAREN,
            '[' => L_BRACK,
            ']' => R_BRACK,
            '{' => L_BRACE,
            '}' => R_BRACE,
            ',' => COMMA,
            ';' => SEMICOLON,
            ':' => COLON,
            '~' => TILDE,
            '%' => PERCENT,
            '.' if cursor.peek().is_ascii_digit() => number(cursor, '.'),
            '.' => DOT,
            '=' if cursor.eat('=') => then_eq(cursor, EQ_EQ_EQ, EQ_EQ),
            '=' => EQ,
            '!' if cursor.eat('=') => then_eq(cursor, NOT_EQ_EQ, NOT_EQ),
            '!' => BANG,
            '<' => then_eq(cursor, LT_EQ, LT),
            '>' => then_eq(cursor, GT_EQ, GT),
            '+' => then_eq(cursor, PLUS_EQ, PLUS),
            '-' => then_eq(cursor, MINUS_EQ, MINUS),
            '*' if cursor.eat('*') => STAR_STAR,
            '*' => then_eq(cursor, STAR_EQ, STAR),
            '/' => then_eq(cursor, SLASH_EQ, SLASH),
            '&' if cursor.eat('&') => AMP_AMP,
            '|' if cursor.eat('|') => PIPE_PIPE,
            '?' if cursor.eat('?') => QUESTION_QUESTION,
            quote @ ('\'' | '"') => string(cursor, quote),
            first_char @ '0'..='9' => number(cursor, first_char),
            c if is_ident_start(c) => word(cursor),
            _ => Symbol::ERROR,
        };
        tokenizer.push(kind);
    }

    tokenizer.finish()
}

fn then_eq(cursor: &mut Cursor<'_>, with_eq: Symbol, without: Symbol) -> Symbol {
    if cursor.eat('=') { with_eq } else { without }
}

/// An unterminated comment runs to the end of input.
fn block_comment(cursor: &mut Cursor<'_>) {
    while !cursor.is_eof() {
        if cursor.advance() == '*' && cursor.eat('/') {
            break;
        }
    }
}

/// Strings stop at the closing quote or, unterminated, at the line end.
fn string(cursor: &mut Cursor<'_>, quote: char) -> Symbol {
    loop {
        match cursor.peek() {
            _ if cursor.is_eof() => break,
            '\n' | '\r' => break,
            '\\' => {
                cursor.advance();
                cursor.advance();
            }
            c => {
                cursor.advance();
                if c == quote {
                    break;
                }
            }
        }
    }
    STRING
}

fn number(cursor: &mut Cursor<'_>, first_char: char) -> Symbol {
    if first_char == '0' && matches!(cursor.peek(), 'x' | 'X' | 'o' | 'O' | 'b' | 'B') {
        cursor.advance();
        cursor.advance_while(|c| c.is_ascii_hexdigit() || c == '_');
        cursor.eat('n');
        return NUMBER;
    }

    cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
    if first_char != '.' && cursor.matches('.') {
        cursor.advance();
        cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
    }
    if matches!(cursor.peek(), 'e' | 'E')
        && (cursor.second().is_ascii_digit() || matches!(cursor.second(), '+' | '-'))
    {
        cursor.advance();
        if !cursor.eat('+') {
            cursor.eat('-');
        }
        cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
    } else {
        cursor.eat('n');
    }
    NUMBER
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '$')
}

fn word(cursor: &mut Cursor<'_>) -> Symbol {
    cursor.advance_while(|c| c.is_alphanumeric() || matches!(c, '_' | '$'));
    match cursor.token_text() {
        b"function" => FUNCTION_KW,
        b"return" => RETURN_KW,
        b"if" => IF_KW,
        b"else" => ELSE_KW,
        b"while" => WHILE_KW,
        b"var" => VAR_KW,
        b"let" => LET_KW,
        b"const" => CONST_KW,
        b"typeof" => TYPEOF_KW,
        b"true" => TRUE,
        b"false" => FALSE,
        b"null" => NULL,
        b"this" => THIS,
        _ => IDENTIFIER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<&'static str> {
        tokenize(text.as_bytes())
            .iter()
            .map(|token| super::super::TABLE.symbol_name(token.symbol).unwrap_or("?"))
            .collect()
    }

    #[test]
    fn comments_are_extras() {
        let tokens = tokenize(b"a // one\n/* two */ b");
        assert!(tokens[1].extra);
        assert!(tokens[2].extra);
        assert!(!tokens[3].extra);
        assert_eq!(kinds("a // one\n/* two */ b"), ["identifier", "comment", "comment", "identifier", "end"]);
    }

    #[test]
    fn operators_take_the_longest_match() {
        assert_eq!(
            kinds("a === b !== c == d && e ?? f **= g"),
            [
                "identifier", "===", "identifier", "!==", "identifier", "==", "identifier", "&&",
                "identifier", "??", "identifier", "**", "=", "identifier", "end",
            ]
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            kinds("1 1.5 .5 1e-3 0xff 10n 'a\\'b' \"c\" true null this $x"),
            [
                "number", "number", "number", "number", "number", "number", "string", "string",
                "true", "null", "this", "identifier", "end",
            ]
        );
    }

    #[test]
    fn multibyte_strings_use_byte_offsets() {
        let tokens = tokenize("'😎' && '🐍'".as_bytes());
        let ranges: Vec<_> = tokens
            .iter()
            .map(|token| (u32::from(token.range.start()), u32::from(token.range.end())))
            .collect();
        assert_eq!(ranges, [(0, 6), (7, 9), (10, 16), (16, 16)]);
    }
}
