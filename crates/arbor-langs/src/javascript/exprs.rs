use arbor_parse::{CompletedMarker, Engine};
use arbor_syntax::{FieldId, Symbol, SymbolSet};

use super::kinds::*;
use super::{delimited, fields, stmts};

/// Tokens that may follow `.` as a property name.
const WORDS: SymbolSet = SymbolSet::new([
    IDENTIFIER, TRUE, FALSE, NULL, THIS, FUNCTION_KW, RETURN_KW, IF_KW, ELSE_KW, WHILE_KW,
    VAR_KW, LET_KW, CONST_KW, TYPEOF_KW,
]);

/// Parses an expression, or inserts a missing identifier in its place.
pub(super) fn expected_expr(p: &mut Engine<'_>, field: Option<FieldId>) {
    match (expr(p), field) {
        (Some(m), Some(field)) => _ = m.set_field(p, field),
        (Some(_), None) => {}
        (None, field) => p.missing(IDENTIFIER, field),
    }
}

pub(super) fn expr(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    let lhs = binary(p, 0)?;
    let kind = match p.peek() {
        EQ => ASSIGNMENT_EXPRESSION,
        PLUS_EQ | MINUS_EQ | STAR_EQ | SLASH_EQ => AUGMENTED_ASSIGNMENT_EXPRESSION,
        _ => return Some(lhs),
    };

    let m = lhs.set_field(p, fields::LEFT).precede(p);
    if kind == ASSIGNMENT_EXPRESSION {
        p.bump();
    } else {
        p.bump_field(fields::OPERATOR);
    }
    match expr(p) {
        Some(rhs) => _ = rhs.set_field(p, fields::RIGHT),
        None => p.missing(IDENTIFIER, Some(fields::RIGHT)),
    }
    Some(m.complete(p, kind))
}

fn binary_precedence(kind: Symbol) -> Option<u8> {
    match kind {
        QUESTION_QUESTION => Some(1),
        PIPE_PIPE => Some(2),
        AMP_AMP => Some(3),
        EQ_EQ | EQ_EQ_EQ | NOT_EQ | NOT_EQ_EQ => Some(4),
        LT | LT_EQ | GT | GT_EQ => Some(5),
        PLUS | MINUS => Some(6),
        STAR | SLASH | PERCENT => Some(7),
        STAR_STAR => Some(8),
        _ => None,
    }
}

fn binary(p: &mut Engine<'_>, min: u8) -> Option<CompletedMarker> {
    let mut lhs = unary(p)?;

    while let Some(precedence) = binary_precedence(p.peek())
        && precedence >= min
    {
        // `**` is right associative.
        let next = if p.at(STAR_STAR) { precedence } else { precedence + 1 };
        let m = lhs.set_field(p, fields::LEFT).precede(p);
        p.bump_field(fields::OPERATOR);
        match binary(p, next) {
            Some(rhs) => _ = rhs.set_field(p, fields::RIGHT),
            None => p.missing(IDENTIFIER, Some(fields::RIGHT)),
        }
        lhs = m.complete(p, BINARY_EXPRESSION);
    }

    Some(lhs)
}

fn unary(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    if !matches!(p.peek(), BANG | MINUS | PLUS | TILDE | TYPEOF_KW) {
        return postfix(p);
    }
    let m = p.start();
    p.bump_field(fields::OPERATOR);
    match unary(p) {
        Some(argument) => _ = argument.set_field(p, fields::ARGUMENT),
        None => p.missing(IDENTIFIER, Some(fields::ARGUMENT)),
    }
    Some(m.complete(p, UNARY_EXPRESSION))
}

/// An atom followed by any number of calls, member accesses and
/// subscripts.
fn postfix(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    let mut lhs = atom(p)?;
    loop {
        lhs = match p.peek() {
            L_PAREN => {
                let m = lhs.set_field(p, fields::FUNCTION).precede(p);
                arguments(p).set_field(p, fields::ARGUMENTS);
                m.complete(p, CALL_EXPRESSION)
            }
            DOT => {
                let m = lhs.set_field(p, fields::OBJECT).precede(p);
                p.bump();
                if p.at_set(&WORDS) {
                    p.bump_with(PROPERTY_IDENTIFIER, Some(fields::PROPERTY));
                } else {
                    p.missing(PROPERTY_IDENTIFIER, Some(fields::PROPERTY));
                }
                m.complete(p, MEMBER_EXPRESSION)
            }
            L_BRACK => {
                let m = lhs.set_field(p, fields::OBJECT).precede(p);
                p.bump();
                expected_expr(p, Some(fields::INDEX));
                p.expect(R_BRACK);
                m.complete(p, SUBSCRIPT_EXPRESSION)
            }
            _ => return Some(lhs),
        };
    }
}

fn atom(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    match p.peek() {
        IDENTIFIER | NUMBER | STRING | TRUE | FALSE | NULL | THIS => p.bump_leaf(),
        L_PAREN => {
            let m = p.start();
            p.bump();
            expected_expr(p, None);
            p.expect(R_PAREN);
            Some(m.complete(p, PARENTHESIZED_EXPRESSION))
        }
        L_BRACK => {
            let m = p.start();
            delimited(p, L_BRACK, R_BRACK, |p| expr(p).is_some());
            Some(m.complete(p, ARRAY))
        }
        L_BRACE => Some(object(p)),
        FUNCTION_KW => Some(stmts::function(p, FUNCTION_EXPRESSION)),
        _ => None,
    }
}

fn object(p: &mut Engine<'_>) -> CompletedMarker {
    let m = p.start();
    delimited(p, L_BRACE, R_BRACE, |p| {
        let pair = p.start();
        match p.peek() {
            STRING | NUMBER => p.bump_field(fields::KEY),
            kind if WORDS.contains(kind) => {
                p.bump_with(PROPERTY_IDENTIFIER, Some(fields::KEY));
            }
            _ => {
                pair.abandon(p);
                return false;
            }
        }
        p.expect(COLON);
        expected_expr(p, Some(fields::VALUE));
        pair.complete(p, PAIR);
        true
    });
    m.complete(p, OBJECT)
}

fn arguments(p: &mut Engine<'_>) -> CompletedMarker {
    let m = p.start();
    delimited(p, L_PAREN, R_PAREN, |p| expr(p).is_some());
    m.complete(p, ARGUMENTS)
}
