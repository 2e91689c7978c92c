//! Recursive descent over the query token stream.
//!
//! Parsing stops at the first syntax error. Patterns completed before it are
//! still returned so that name errors inside them take precedence.

use text_size::TextSize;

use crate::ast::{Argument, Item, ItemKind, Name, Pattern, Predicate, Quantifier};
use crate::lexer::{Token, TokenKind, tokenize, unescape};

pub(crate) struct Parsed {
    pub(crate) patterns: Vec<Pattern>,
    /// Byte offset of the first token that could not be parsed.
    pub(crate) syntax_error: Option<usize>,
}

struct SyntaxError(usize);

type PResult<T> = Result<T, SyntaxError>;

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    predicates: Vec<Predicate>,
}

pub(crate) fn parse(source: &str) -> Parsed {
    let mut p = Parser { source, tokens: tokenize(source), pos: 0, predicates: Vec::new() };
    let mut patterns = Vec::new();
    while !p.at(TokenKind::Eof) {
        match p.pattern() {
            Ok(pattern) => patterns.push(pattern),
            Err(SyntaxError(offset)) => {
                return Parsed { patterns, syntax_error: Some(offset) };
            }
        }
    }
    Parsed { patterns, syntax_error: None }
}

impl Parser<'_> {
    fn current(&self) -> Token {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn nth(&self, n: usize) -> TokenKind {
        self.tokens.get(self.pos + n).map_or(TokenKind::Eof, |token| token.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.nth(0) == kind
    }

    fn offset(&self) -> usize {
        usize::from(self.current().range.start())
    }

    fn text(&self) -> &str {
        &self.source[self.current().range]
    }

    fn bump(&mut self) -> Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error<T>(&self) -> PResult<T> {
        Err(SyntaxError(self.offset()))
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.at(kind) { Ok(self.bump()) } else { self.error() }
    }

    fn name(&mut self) -> Name {
        let token = self.bump();
        let start: TextSize = token.range.start();
        Name { text: self.source[token.range].to_owned(), offset: usize::from(start) }
    }

    fn pattern(&mut self) -> PResult<Pattern> {
        self.predicates.clear();
        if matches!(self.nth(0), TokenKind::Dot) || self.nth(1) == TokenKind::Colon {
            return self.error();
        }
        if self.at(TokenKind::LParen) && self.is_predicate_start(1) {
            return Err(SyntaxError(usize::from(self.tokens[self.pos + 1].range.start())));
        }
        let item = self.item()?;
        Ok(Pattern { item, predicates: std::mem::take(&mut self.predicates) })
    }

    /// Returns whether the token `n` ahead starts a predicate name.
    fn is_predicate_start(&self, n: usize) -> bool {
        match self.nth(n) {
            TokenKind::Hash => true,
            TokenKind::Identifier => {
                let token = self.tokens[self.pos + n];
                let text = &self.source[token.range];
                self.nth(n + 1) != TokenKind::Colon
                    && (text.ends_with('?') || text.ends_with('!'))
            }
            _ => false,
        }
    }

    fn item(&mut self) -> PResult<Item> {
        let offset = self.offset();
        let field = if self.at(TokenKind::Identifier) && self.nth(1) == TokenKind::Colon {
            let field = self.name();
            self.bump();
            Some(field)
        } else {
            None
        };

        let kind = match self.nth(0) {
            TokenKind::LParen => self.parenthesized()?,
            TokenKind::LBracket => self.alternation()?,
            TokenKind::String => {
                let token = self.bump();
                let raw = &self.source[token.range];
                ItemKind::Anonymous(Name {
                    text: unescape(raw),
                    offset: usize::from(token.range.start()),
                })
            }
            TokenKind::Identifier if self.text() == "_" => {
                self.bump();
                ItemKind::Wildcard
            }
            TokenKind::Dot if field.is_none() => {
                self.bump();
                return Ok(Item {
                    kind: ItemKind::Anchor,
                    field,
                    quantifier: Quantifier::One,
                    captures: Vec::new(),
                    offset,
                });
            }
            _ => return self.error(),
        };

        let quantifier = match self.nth(0) {
            TokenKind::Question => Quantifier::ZeroOrOne,
            TokenKind::Star => Quantifier::ZeroOrMore,
            TokenKind::Plus => Quantifier::OneOrMore,
            _ => Quantifier::One,
        };
        if quantifier != Quantifier::One {
            self.bump();
        }

        let mut captures = Vec::new();
        while self.at(TokenKind::Capture) {
            if self.current().range.is_empty() {
                return self.error();
            }
            captures.push(self.name());
        }

        Ok(Item { kind, field, quantifier, captures, offset })
    }

    /// Parses a node, a group or a predicate-only form after `(`.
    fn parenthesized(&mut self) -> PResult<ItemKind> {
        self.expect(TokenKind::LParen)?;
        let is_node = self.at(TokenKind::Identifier)
            && self.nth(1) != TokenKind::Colon
            && !self.is_predicate_start(0);

        if is_node {
            let kind = if self.text() == "_" {
                self.bump();
                None
            } else {
                Some(self.name())
            };
            let mut negated = Vec::new();
            let mut children = Vec::new();
            while !self.at(TokenKind::RParen) {
                if self.at(TokenKind::Bang) {
                    self.bump();
                    if !self.at(TokenKind::Identifier) {
                        return self.error();
                    }
                    negated.push(self.name());
                } else if self.at(TokenKind::LParen) && self.is_predicate_start(1) {
                    self.predicate()?;
                } else {
                    children.push(self.item()?);
                }
            }
            self.bump();
            return Ok(ItemKind::Node { kind, negated, children });
        }

        let mut items = Vec::new();
        while !self.at(TokenKind::RParen) {
            if self.at(TokenKind::LParen) && self.is_predicate_start(1) {
                self.predicate()?;
            } else {
                items.push(self.item()?);
            }
        }
        if items.is_empty() {
            return self.error();
        }
        self.bump();
        Ok(ItemKind::Group(items))
    }

    fn alternation(&mut self) -> PResult<ItemKind> {
        self.expect(TokenKind::LBracket)?;
        let mut alternatives = Vec::new();
        while !self.at(TokenKind::RBracket) {
            if self.at(TokenKind::Dot) {
                return self.error();
            }
            alternatives.push(self.item()?);
        }
        if alternatives.is_empty() {
            return self.error();
        }
        self.bump();
        Ok(ItemKind::Alternation(alternatives))
    }

    /// `(#name? args...)`, the `#` being optional.
    fn predicate(&mut self) -> PResult<()> {
        self.expect(TokenKind::LParen)?;
        if self.at(TokenKind::Hash) {
            self.bump();
        }
        if !self.at(TokenKind::Identifier) {
            return self.error();
        }
        let operator = self.name();

        let mut args = Vec::new();
        loop {
            match self.nth(0) {
                TokenKind::RParen => break,
                TokenKind::Capture if !self.current().range.is_empty() => {
                    args.push(Argument::Capture(self.name()));
                }
                TokenKind::String => {
                    let token = self.bump();
                    args.push(Argument::String(Name {
                        text: unescape(&self.source[token.range]),
                        offset: usize::from(token.range.start()),
                    }));
                }
                TokenKind::Identifier => args.push(Argument::String(self.name())),
                _ => return self.error(),
            }
        }
        self.bump();
        self.predicates.push(Predicate { operator, args });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_error(source: &str) -> Option<usize> {
        parse(source).syntax_error
    }

    #[test]
    fn well_formed_patterns() {
        for source in [
            "(function_definition)",
            "(call function: (identifier) @f arguments: (_)) @call",
            "((identifier) @a (#eq? @a \"self\"))",
            "((identifier) @a (eq? @a self))",
            "[(true) (false)] @bool",
            "(block . (_) @first (comment)* .)",
            "(function_definition !body)",
            "\"def\" @keyword _",
            "; a comment\n(module)",
        ] {
            assert_eq!(syntax_error(source), None, "{source}");
        }
    }

    #[test]
    fn first_unparsable_token_is_reported() {
        assert_eq!(syntax_error("(list))"), Some(6));
        assert_eq!(syntax_error("(list"), Some(5));
        assert_eq!(syntax_error("(call (identifier) @)"), Some(20));
        assert_eq!(syntax_error("()"), Some(1));
        assert_eq!(syntax_error("[]"), Some(1));
        assert_eq!(syntax_error("(#eq? @a @b)"), Some(1));
        assert_eq!(syntax_error("name: (identifier)"), Some(0));
        assert_eq!(syntax_error("(a \"unterminated)"), Some(3));
    }

    #[test]
    fn patterns_before_an_error_are_kept() {
        let parsed = parse("(a) (b) )");
        assert_eq!(parsed.patterns.len(), 2);
        assert_eq!(parsed.syntax_error, Some(8));
    }

    #[test]
    fn predicates_attach_to_their_pattern() {
        let parsed = parse("((a) @x (#match? @x \"^f\") (set! key value)) (b)");
        assert_eq!(parsed.patterns.len(), 2);
        let predicates = &parsed.patterns[0].predicates;
        assert_eq!(predicates.len(), 2);
        assert_eq!(predicates[0].operator.text, "match?");
        assert!(matches!(&predicates[0].args[0], Argument::Capture(name) if name.text == "x"));
        assert!(matches!(&predicates[0].args[1], Argument::String(name) if name.text == "^f"));
        assert_eq!(predicates[1].operator.text, "set!");
        assert!(parsed.patterns[1].predicates.is_empty());
    }
}
