use arbor_parse::{CompletedMarker, Engine};
use arbor_syntax::{FieldId, Symbol, SymbolSet};

use super::kinds::*;
use super::{delimited, fields};

type Parse = fn(&mut Engine<'_>) -> Option<CompletedMarker>;

const COMPARISON: SymbolSet =
    SymbolSet::new([LT, LT_EQ, GT, GT_EQ, EQ_EQ, NOT_EQ, IN_KW, IS_KW, NOT_KW]);

/// Parses an expression, or inserts a missing identifier in its place.
pub(super) fn expected_expr(p: &mut Engine<'_>, field: Option<FieldId>) {
    match (expr(p), field) {
        (Some(m), Some(field)) => _ = m.set_field(p, field),
        (Some(_), None) => {}
        (None, field) => p.missing(IDENTIFIER, field),
    }
}

fn operand(p: &mut Engine<'_>, parse: Parse, field: FieldId) {
    match parse(p) {
        Some(m) => _ = m.set_field(p, field),
        None => p.missing(IDENTIFIER, Some(field)),
    }
}

pub(super) fn expr(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    boolean(p, OR_KW, and_test)
}

fn and_test(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    boolean(p, AND_KW, not_test)
}

fn boolean(p: &mut Engine<'_>, op: Symbol, next: Parse) -> Option<CompletedMarker> {
    let mut lhs = next(p)?;
    while p.at(op) {
        let m = lhs.set_field(p, fields::LEFT).precede(p);
        p.bump_field(fields::OPERATOR);
        operand(p, next, fields::RIGHT);
        lhs = m.complete(p, BOOLEAN_OPERATOR);
    }
    Some(lhs)
}

fn not_test(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    if !p.at(NOT_KW) {
        return comparison(p);
    }
    let m = p.start();
    p.bump();
    operand(p, not_test, fields::ARGUMENT);
    Some(m.complete(p, NOT_OPERATOR))
}

fn at_comparison(p: &Engine<'_>) -> bool {
    p.at_set(&COMPARISON) && (!p.at(NOT_KW) || p.nth_at(1, IN_KW))
}

/// `a < b <= c` is a single node with every operand and operator as
/// children.
fn comparison(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    let lhs = arithmetic(p, 0)?;
    if !at_comparison(p) {
        return Some(lhs);
    }

    let m = lhs.precede(p);
    while at_comparison(p) {
        match p.peek() {
            NOT_KW => {
                p.bump_field(fields::OPERATORS);
                p.bump_field(fields::OPERATORS);
            }
            IS_KW => {
                p.bump_field(fields::OPERATORS);
                if p.at(NOT_KW) {
                    p.bump_field(fields::OPERATORS);
                }
            }
            _ => p.bump_field(fields::OPERATORS),
        }
        if arithmetic(p, 0).is_none() {
            p.missing(IDENTIFIER, None);
        }
    }
    Some(m.complete(p, COMPARISON_OPERATOR))
}

fn binary_precedence(kind: Symbol) -> Option<u8> {
    match kind {
        PLUS | MINUS => Some(1),
        STAR | SLASH | SLASH_SLASH | PERCENT => Some(2),
        _ => None,
    }
}

fn arithmetic(p: &mut Engine<'_>, min: u8) -> Option<CompletedMarker> {
    let mut lhs = unary(p)?;

    while let Some(precedence) = binary_precedence(p.peek())
        && precedence >= min
    {
        let m = lhs.set_field(p, fields::LEFT).precede(p);
        p.bump_field(fields::OPERATOR);
        match arithmetic(p, precedence + 1) {
            Some(rhs) => _ = rhs.set_field(p, fields::RIGHT),
            None => p.missing(IDENTIFIER, Some(fields::RIGHT)),
        }
        lhs = m.complete(p, BINARY_OPERATOR);
    }

    Some(lhs)
}

fn unary(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    match p.peek() {
        MINUS | PLUS | TILDE => {
            let m = p.start();
            p.bump_field(fields::OPERATOR);
            operand(p, unary, fields::ARGUMENT);
            Some(m.complete(p, UNARY_OPERATOR))
        }
        _ => power(p),
    }
}

/// `**` binds tighter than a unary operator on its left and looser than
/// one on its right: `-a ** -b` is `-(a ** (-b))`.
fn power(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    let lhs = primary(p)?;
    if !p.at(STAR_STAR) {
        return Some(lhs);
    }
    let m = lhs.set_field(p, fields::LEFT).precede(p);
    p.bump_field(fields::OPERATOR);
    operand(p, unary, fields::RIGHT);
    Some(m.complete(p, BINARY_OPERATOR))
}

/// An atom followed by any number of calls, attribute accesses and
/// subscripts.
pub(super) fn primary(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    let mut lhs = atom(p)?;
    loop {
        lhs = match p.peek() {
            L_PAREN => {
                let m = lhs.set_field(p, fields::FUNCTION).precede(p);
                argument_list(p).set_field(p, fields::ARGUMENTS);
                m.complete(p, CALL)
            }
            DOT => {
                let m = lhs.set_field(p, fields::OBJECT).precede(p);
                p.bump();
                p.expect_field(IDENTIFIER, Some(fields::ATTRIBUTE));
                m.complete(p, ATTRIBUTE)
            }
            L_BRACK => {
                let m = lhs.set_field(p, fields::VALUE).precede(p);
                p.bump();
                expected_expr(p, Some(fields::SUBSCRIPT));
                p.expect(R_BRACK);
                m.complete(p, SUBSCRIPT)
            }
            _ => return Some(lhs),
        };
    }
}

fn atom(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    match p.peek() {
        IDENTIFIER | INTEGER | FLOAT | STRING | TRUE | FALSE | NONE => p.bump_leaf(),
        L_PAREN => Some(parenthesized(p)),
        L_BRACK => {
            let m = p.start();
            delimited(p, L_BRACK, R_BRACK, |p| expr(p).is_some());
            Some(m.complete(p, LIST))
        }
        L_BRACE => Some(dictionary(p)),
        _ => None,
    }
}

/// `()` and `(a, b)` are tuples, `(a)` is a parenthesized expression.
fn parenthesized(p: &mut Engine<'_>) -> CompletedMarker {
    let m = p.start();
    p.bump();
    if p.eat(R_PAREN) {
        return m.complete(p, TUPLE);
    }

    let mut tuple = false;
    if expr(p).is_none() {
        p.missing(IDENTIFIER, None);
    }
    while p.eat(COMMA) {
        tuple = true;
        if p.at(R_PAREN) || expr(p).is_none() {
            break;
        }
    }
    p.expect(R_PAREN);
    m.complete(p, if tuple { TUPLE } else { PARENTHESIZED_EXPRESSION })
}

fn dictionary(p: &mut Engine<'_>) -> CompletedMarker {
    let m = p.start();
    delimited(p, L_BRACE, R_BRACE, |p| {
        let Some(key) = expr(p) else { return false };
        let pair = key.set_field(p, fields::KEY).precede(p);
        p.expect(COLON);
        expected_expr(p, Some(fields::VALUE));
        pair.complete(p, PAIR);
        true
    });
    m.complete(p, DICTIONARY)
}

pub(super) fn argument_list(p: &mut Engine<'_>) -> CompletedMarker {
    let m = p.start();
    delimited(p, L_PAREN, R_PAREN, |p| {
        if p.at(IDENTIFIER) && p.nth_at(1, EQ) {
            let argument = p.start();
            p.bump_field(fields::NAME);
            p.bump();
            expected_expr(p, Some(fields::VALUE));
            argument.complete(p, KEYWORD_ARGUMENT);
            return true;
        }
        expr(p).is_some()
    });
    m.complete(p, ARGUMENT_LIST)
}
