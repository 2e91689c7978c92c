use arbor_parse::{CompletedMarker, Engine};
use arbor_syntax::{FieldId, ReuseSite, Symbol, SymbolSet};

use super::exprs::{self, expected_expr};
use super::fields;
use super::kinds::*;

const STATEMENT: ReuseSite = ReuseSite::new(1);

const STATEMENT_END: SymbolSet = SymbolSet::new([SEMICOLON, R_BRACE]);

pub(super) fn program(p: &mut Engine<'_>) {
    let m = p.start();
    while !p.at(Symbol::END) {
        statement(p);
    }
    m.complete(p, PROGRAM);
}

/// Parses one statement. A token that cannot start a statement is wrapped
/// in an `ERROR` node instead.
fn statement(p: &mut Engine<'_>) {
    if p.reusable(STATEMENT, any_statement).is_some() || p.at(Symbol::END) {
        return;
    }
    let m = p.start();
    p.bump();
    m.complete(p, Symbol::ERROR);
}

/// A statement nested in another one, e.g. the body of a `while`.
fn nested_statement(p: &mut Engine<'_>, field: Option<FieldId>) {
    match (p.reusable(STATEMENT, any_statement), field) {
        (Some(statement), Some(field)) => _ = statement.set_field(p, field),
        (Some(_), None) => {}
        (None, _) => p.error_recover(&STATEMENT_END),
    }
}

fn any_statement(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    match p.peek() {
        FUNCTION_KW => Some(function(p, FUNCTION_DECLARATION)),
        L_BRACE => Some(statement_block(p)),
        LET_KW | CONST_KW => Some(declaration(p, LEXICAL_DECLARATION)),
        VAR_KW => Some(declaration(p, VARIABLE_DECLARATION)),
        RETURN_KW => Some(return_statement(p)),
        IF_KW => Some(if_statement(p)),
        WHILE_KW => Some(while_statement(p)),
        SEMICOLON => {
            let m = p.start();
            p.bump();
            Some(m.complete(p, EMPTY_STATEMENT))
        }
        _ => expression_statement(p),
    }
}

/// Consumes the `;` ending a statement. It may be left out before a line
/// break, a `}` or the end of input.
fn semicolon(p: &mut Engine<'_>) {
    if p.eat(SEMICOLON) || p.at(R_BRACE) || p.at(Symbol::END) || p.has_newline_before() {
        return;
    }
    p.missing(SEMICOLON, None);
}

fn expression_statement(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    let expr = exprs::expr(p)?;
    let m = expr.precede(p);
    semicolon(p);
    Some(m.complete(p, EXPRESSION_STATEMENT))
}

/// Parses a function declaration or expression. Only declarations require
/// a name.
pub(super) fn function(p: &mut Engine<'_>, kind: Symbol) -> CompletedMarker {
    debug_assert_eq!(p.peek(), FUNCTION_KW);

    let m = p.start();
    p.bump();
    if kind == FUNCTION_DECLARATION {
        p.expect_field(IDENTIFIER, Some(fields::NAME));
    } else if p.at(IDENTIFIER) {
        p.bump_field(fields::NAME);
    }
    formal_parameters(p);
    if p.at(L_BRACE) {
        statement_block(p).set_field(p, fields::BODY);
    } else {
        let body = p.start();
        p.missing(L_BRACE, None);
        p.missing(R_BRACE, None);
        body.complete(p, STATEMENT_BLOCK).set_field(p, fields::BODY);
    }
    m.complete(p, kind)
}

fn formal_parameters(p: &mut Engine<'_>) {
    let m = p.start();
    if p.at(L_PAREN) {
        super::delimited(p, L_PAREN, R_PAREN, |p| p.eat(IDENTIFIER));
    } else {
        p.missing(L_PAREN, None);
        p.missing(R_PAREN, None);
    }
    m.complete(p, FORMAL_PARAMETERS).set_field(p, fields::PARAMETERS);
}

fn statement_block(p: &mut Engine<'_>) -> CompletedMarker {
    debug_assert_eq!(p.peek(), L_BRACE);

    let m = p.start();
    p.bump();
    while !p.at(R_BRACE) && !p.at(Symbol::END) {
        statement(p);
    }
    p.expect(R_BRACE);
    m.complete(p, STATEMENT_BLOCK)
}

/// `let`, `const` and `var` declarations of one or more variables.
fn declaration(p: &mut Engine<'_>, kind: Symbol) -> CompletedMarker {
    let m = p.start();
    p.bump();
    loop {
        let declarator = p.start();
        p.expect_field(IDENTIFIER, Some(fields::NAME));
        if p.eat(EQ) {
            expected_expr(p, Some(fields::VALUE));
        }
        declarator.complete(p, VARIABLE_DECLARATOR);
        if !p.eat(COMMA) {
            break;
        }
    }
    semicolon(p);
    m.complete(p, kind)
}

fn return_statement(p: &mut Engine<'_>) -> CompletedMarker {
    let m = p.start();
    p.bump();
    // A line break right after `return` ends the statement.
    if !p.at_set(&STATEMENT_END) && !p.at(Symbol::END) && !p.has_newline_before() {
        exprs::expr(p);
    }
    semicolon(p);
    m.complete(p, RETURN_STATEMENT)
}

fn condition(p: &mut Engine<'_>) {
    let m = p.start();
    p.expect(L_PAREN);
    expected_expr(p, None);
    p.expect(R_PAREN);
    m.complete(p, PARENTHESIZED_EXPRESSION).set_field(p, fields::CONDITION);
}

fn if_statement(p: &mut Engine<'_>) -> CompletedMarker {
    debug_assert_eq!(p.peek(), IF_KW);

    let m = p.start();
    p.bump();
    condition(p);
    nested_statement(p, Some(fields::CONSEQUENCE));
    if p.at(ELSE_KW) {
        let clause = p.start();
        p.bump();
        nested_statement(p, None);
        clause.complete(p, ELSE_CLAUSE).set_field(p, fields::ALTERNATIVE);
    }
    m.complete(p, IF_STATEMENT)
}

fn while_statement(p: &mut Engine<'_>) -> CompletedMarker {
    debug_assert_eq!(p.peek(), WHILE_KW);

    let m = p.start();
    p.bump();
    condition(p);
    nested_statement(p, Some(fields::BODY));
    m.complete(p, WHILE_STATEMENT)
}
