use arbor_syntax::{Symbol, Token};
use arbor_tokenizer::Tokenizer;

use super::kinds::*;

pub(super) fn tokenize(text: &[u8]) -> Vec<Token> {
    let mut lexer = Lexer {
        tokenizer: Tokenizer::new(text),
        indents: vec![0],
        brackets: 0,
        at_line_start: true,
    };
    lexer.run();
    lexer.finish()
}

struct Lexer<'a> {
    tokenizer: Tokenizer<'a>,
    /// Widths of the open indentation levels, outermost first.
    indents: Vec<u32>,
    brackets: u32,
    at_line_start: bool,
}

impl Lexer<'_> {
    fn run(&mut self) {
        loop {
            if self.at_line_start && self.brackets == 0 {
                self.indentation();
            }
            if self.tokenizer.cursor.is_eof() {
                break;
            }

            let kind = match self.tokenizer.cursor.advance() {
                ' ' | '\t' | '\x0c' => {
                    self.tokenizer.cursor.advance_while(|c| matches!(c, ' ' | '\t' | '\x0c'));
                    self.tokenizer.skip();
                    continue;
                }
                '\\' if matches!(self.tokenizer.cursor.peek(), '\n' | '\r') => {
                    self.tokenizer.cursor.eat('\r');
                    self.tokenizer.cursor.eat('\n');
                    self.tokenizer.skip();
                    continue;
                }
                '\r' | '\n' => {
                    self.newline();
                    continue;
                }
                '#' => {
                    self.tokenizer.cursor.advance_while(|c| !matches!(c, '\n' | '\r'));
                    self.tokenizer.push_extra(COMMENT);
                    continue;
                }
                c @ ('(' | '[' | '{') => {
                    self.brackets += 1;
                    match c {
                        '(' => L_PAREN,
                        '[' => L_BRACK,
                        _ => L_BRACE,
                    }
                }
                c @ (')' | ']' | '}') => {
                    self.brackets = self.brackets.saturating_sub(1);
                    match c {
                        ')' => R_PAREN,
                        ']' => R_BRACK,
                        _ => R_BRACE,
                    }
                }
                ',' => COMMA,
                ':' => COLON,
                ';' => SEMICOLON,
                '~' => TILDE,
                '%' => PERCENT,
                '.' if self.tokenizer.cursor.peek().is_ascii_digit() => self.number('.'),
                '.' => DOT,
                '=' => self.then_eq(EQ_EQ, EQ),
                '!' => self.then_eq(NOT_EQ, Symbol::ERROR),
                '<' => self.then_eq(LT_EQ, LT),
                '>' => self.then_eq(GT_EQ, GT),
                '+' => self.then_eq(PLUS_EQ, PLUS),
                '-' => self.then_eq(MINUS_EQ, MINUS),
                '*' if self.tokenizer.cursor.eat('*') => STAR_STAR,
                '*' => self.then_eq(STAR_EQ, STAR),
                '/' if self.tokenizer.cursor.eat('/') => SLASH_SLASH,
                '/' => self.then_eq(SLASH_EQ, SLASH),
                quote @ ('\'' | '"') => self.string(quote),
                first_char @ '0'..='9' => self.number(first_char),
                c if c.is_alphabetic() || c == '_' => self.word(),
                _ => Symbol::ERROR,
            };
            self.tokenizer.push(kind);
        }
    }

    fn then_eq(&mut self, with_eq: Symbol, without: Symbol) -> Symbol {
        if self.tokenizer.cursor.eat('=') { with_eq } else { without }
    }

    /// Ends a logical line, unless the line was blank or inside brackets.
    fn newline(&mut self) {
        if self.tokenizer.cursor.previous() == '\r' {
            self.tokenizer.cursor.eat('\n');
        }
        if self.brackets > 0 {
            self.tokenizer.skip();
            return;
        }
        if self.tokenizer.last_significant().is_some_and(|token| token.symbol != NEWLINE) {
            self.tokenizer.push(NEWLINE);
        } else {
            self.tokenizer.skip();
        }
        self.at_line_start = true;
    }

    /// Measures the indentation of a new line and emits indent or dedent
    /// tokens before its first token. Blank and comment-only lines are
    /// ignored.
    fn indentation(&mut self) {
        let cursor = &mut self.tokenizer.cursor;
        let mut width = 0;
        loop {
            match cursor.peek() {
                ' ' => width += 1,
                '\t' => width += 8 - width % 8,
                '\x0c' => width = 0,
                _ => break,
            }
            cursor.advance();
        }

        let blank = cursor.is_eof() || matches!(cursor.peek(), '\n' | '\r' | '#');
        self.tokenizer.skip();
        self.at_line_start = false;
        if blank {
            return;
        }

        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.tokenizer.push_empty(INDENT);
            return;
        }
        while self.indents.last().is_some_and(|&level| level > width) {
            self.indents.pop();
            self.tokenizer.push_empty(DEDENT);
        }
        if self.indents.last() != Some(&width) {
            tracing::trace!(width, "dedent does not match any outer indentation level");
            self.indents.push(width);
        }
    }

    fn string(&mut self, quote: char) -> Symbol {
        let cursor = &mut self.tokenizer.cursor;
        if cursor.matches(quote) && cursor.second() == quote {
            cursor.advance();
            cursor.advance();
            while !cursor.is_eof() {
                match cursor.advance() {
                    '\\' => {
                        cursor.advance();
                    }
                    c if c == quote && cursor.matches(quote) && cursor.second() == quote => {
                        cursor.advance();
                        cursor.advance();
                        break;
                    }
                    _ => {}
                }
            }
            return STRING;
        }

        loop {
            match cursor.peek() {
                '\n' | '\r' => break,
                _ if cursor.is_eof() => break,
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

    fn number(&mut self, first_char: char) -> Symbol {
        let cursor = &mut self.tokenizer.cursor;
        let mut float = first_char == '.';

        if first_char == '0' && matches!(cursor.peek(), 'x' | 'X' | 'o' | 'O' | 'b' | 'B') {
            cursor.advance();
            cursor.advance_while(|c| c.is_ascii_hexdigit() || c == '_');
            return INTEGER;
        }

        cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
        if !float && cursor.matches('.') {
            cursor.advance();
            cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
            float = true;
        }
        if matches!(cursor.peek(), 'e' | 'E')
            && (cursor.second().is_ascii_digit() || matches!(cursor.second(), '+' | '-'))
        {
            cursor.advance();
            if !cursor.eat('+') {
                cursor.eat('-');
            }
            cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
            float = true;
        }
        if matches!(cursor.peek(), 'j' | 'J') {
            cursor.advance();
        }

        if float { FLOAT } else { INTEGER }
    }

    fn word(&mut self) -> Symbol {
        let cursor = &mut self.tokenizer.cursor;
        cursor.advance_while(|c| c.is_alphanumeric() || c == '_');

        let text = cursor.token_text();
        if matches!(cursor.peek(), '\'' | '"') && is_string_prefix(text) {
            let quote = cursor.advance();
            return self.string(quote);
        }

        match text {
            b"def" => DEF_KW,
            b"class" => CLASS_KW,
            b"if" => IF_KW,
            b"elif" => ELIF_KW,
            b"else" => ELSE_KW,
            b"while" => WHILE_KW,
            b"for" => FOR_KW,
            b"in" => IN_KW,
            b"return" => RETURN_KW,
            b"pass" => PASS_KW,
            b"break" => BREAK_KW,
            b"continue" => CONTINUE_KW,
            b"import" => IMPORT_KW,
            b"and" => AND_KW,
            b"or" => OR_KW,
            b"not" => NOT_KW,
            b"is" => IS_KW,
            b"True" => TRUE,
            b"False" => FALSE,
            b"None" => NONE,
            _ => IDENTIFIER,
        }
    }

    /// Closes the last line and every open indentation level.
    fn finish(mut self) -> Vec<Token> {
        if self.tokenizer.last_significant().is_some_and(|token| token.symbol != NEWLINE) {
            self.tokenizer.push_empty(NEWLINE);
        }
        for _ in 1..self.indents.len() {
            self.tokenizer.push_empty(DEDENT);
        }
        self.tokenizer.finish()
    }
}

fn is_string_prefix(text: &[u8]) -> bool {
    text.len() <= 2
        && text.iter().all(|c| matches!(c.to_ascii_lowercase(), b'r' | b'b' | b'f' | b'u'))
}
