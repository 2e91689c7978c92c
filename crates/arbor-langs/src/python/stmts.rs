use arbor_parse::{CompletedMarker, Engine};
use arbor_syntax::{FieldId, ReuseSite, Symbol, SymbolSet};

use super::exprs::{self, expected_expr};
use super::kinds::*;
use super::{delimited, fields};

/// Any statement on its own line.
const STATEMENT: ReuseSite = ReuseSite::new(1);

/// A simple statement in a body on the same line as its `:`, where
/// compound statements are not allowed.
const SIMPLE_STATEMENT: ReuseSite = ReuseSite::new(2);

const LINE_END: SymbolSet = SymbolSet::new([NEWLINE, DEDENT, SEMICOLON]);

pub(super) fn module(p: &mut Engine<'_>) {
    let m = p.start();
    statements(p, Symbol::END);
    m.complete(p, MODULE);
}

/// Parses statements up to `until` or the end of input.
fn statements(p: &mut Engine<'_>, until: Symbol) {
    while !p.at(until) && !p.at(Symbol::END) {
        match p.peek() {
            NEWLINE => p.bump(),
            INDENT => {
                // Unexpected indentation: keep the statements, flag the block.
                let m = p.start();
                p.bump();
                statements(p, DEDENT);
                p.eat(DEDENT);
                m.complete(p, Symbol::ERROR);
            }
            DEDENT => {
                let m = p.start();
                p.bump();
                m.complete(p, Symbol::ERROR);
            }
            _ => statement(p),
        }
    }
}

fn statement(p: &mut Engine<'_>) {
    let compound = matches!(p.peek(), DEF_KW | CLASS_KW | IF_KW | WHILE_KW | FOR_KW);
    if p.reusable(STATEMENT, compound_or_simple).is_none() {
        p.error_recover(&LINE_END);
    }
    if !compound {
        line_end(p);
    }
}

fn compound_or_simple(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    match p.peek() {
        DEF_KW => Some(function_definition(p)),
        CLASS_KW => Some(class_definition(p)),
        IF_KW => Some(if_statement(p)),
        WHILE_KW => Some(while_statement(p)),
        FOR_KW => Some(for_statement(p)),
        _ => simple_statement(p),
    }
}

/// Consumes the end of a simple statement, wrapping anything left on the
/// line in an `ERROR` node.
fn line_end(p: &mut Engine<'_>) {
    if p.eat(NEWLINE) || p.at(DEDENT) || p.at(Symbol::END) {
        return;
    }
    if p.eat(SEMICOLON) {
        if p.at(NEWLINE) {
            p.bump();
        }
        return;
    }
    p.error_until(&LINE_END);
    p.eat(NEWLINE);
}

fn simple_statement(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    match p.peek() {
        PASS_KW => Some(keyword_statement(p, PASS_STATEMENT)),
        BREAK_KW => Some(keyword_statement(p, BREAK_STATEMENT)),
        CONTINUE_KW => Some(keyword_statement(p, CONTINUE_STATEMENT)),
        RETURN_KW => {
            let m = p.start();
            p.bump();
            if !p.at_set(&LINE_END) && !p.at(Symbol::END) {
                exprs::expr(p);
            }
            Some(m.complete(p, RETURN_STATEMENT))
        }
        IMPORT_KW => {
            let m = p.start();
            p.bump();
            loop {
                dotted_name(p);
                if !p.eat(COMMA) {
                    break;
                }
            }
            Some(m.complete(p, IMPORT_STATEMENT))
        }
        Symbol::ERROR => None,
        _ => expression_statement(p),
    }
}

fn keyword_statement(p: &mut Engine<'_>, kind: Symbol) -> CompletedMarker {
    let m = p.start();
    p.bump();
    m.complete(p, kind)
}

fn dotted_name(p: &mut Engine<'_>) {
    let m = p.start();
    p.expect(IDENTIFIER);
    while p.at(DOT) && p.nth_at(1, IDENTIFIER) {
        p.bump();
        p.bump();
    }
    m.complete(p, DOTTED_NAME).set_field(p, fields::NAME);
}

fn expression_statement(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    let lhs = exprs::expr(p)?;
    let statement = assignment_rhs(p, lhs);
    Some(statement.precede(p).complete(p, EXPRESSION_STATEMENT))
}

/// Wraps `lhs` in an assignment if one follows. Chained assignments nest
/// to the right.
fn assignment_rhs(p: &mut Engine<'_>, lhs: CompletedMarker) -> CompletedMarker {
    let kind = match p.peek() {
        EQ => ASSIGNMENT,
        PLUS_EQ | MINUS_EQ | STAR_EQ | SLASH_EQ => AUGMENTED_ASSIGNMENT,
        _ => return lhs,
    };

    let m = lhs.set_field(p, fields::LEFT).precede(p);
    if kind == ASSIGNMENT {
        p.bump();
    } else {
        p.bump_field(fields::OPERATOR);
    }
    match exprs::expr(p) {
        Some(rhs) => {
            let rhs = if kind == ASSIGNMENT { assignment_rhs(p, rhs) } else { rhs };
            rhs.set_field(p, fields::RIGHT);
        }
        None => p.missing(IDENTIFIER, Some(fields::RIGHT)),
    }
    m.complete(p, kind)
}

fn function_definition(p: &mut Engine<'_>) -> CompletedMarker {
    debug_assert_eq!(p.peek(), DEF_KW);

    let m = p.start();
    p.bump();
    p.expect_field(IDENTIFIER, Some(fields::NAME));
    if p.at(L_PAREN) {
        parameters(p);
    } else {
        let params = p.start();
        p.missing(L_PAREN, None);
        p.missing(R_PAREN, None);
        params.complete(p, PARAMETERS).set_field(p, fields::PARAMETERS);
    }
    p.expect(COLON);
    block(p, fields::BODY);
    m.complete(p, FUNCTION_DEFINITION)
}

fn parameters(p: &mut Engine<'_>) {
    let m = p.start();
    delimited(p, L_PAREN, R_PAREN, |p| {
        if !p.at(IDENTIFIER) {
            return false;
        }
        if p.nth_at(1, EQ) {
            let param = p.start();
            p.bump_field(fields::NAME);
            p.bump();
            expected_expr(p, Some(fields::VALUE));
            param.complete(p, DEFAULT_PARAMETER);
        } else {
            p.bump();
        }
        true
    });
    m.complete(p, PARAMETERS).set_field(p, fields::PARAMETERS);
}

fn class_definition(p: &mut Engine<'_>) -> CompletedMarker {
    debug_assert_eq!(p.peek(), CLASS_KW);

    let m = p.start();
    p.bump();
    p.expect_field(IDENTIFIER, Some(fields::NAME));
    if p.at(L_PAREN) {
        exprs::argument_list(p).set_field(p, fields::SUPERCLASSES);
    }
    p.expect(COLON);
    block(p, fields::BODY);
    m.complete(p, CLASS_DEFINITION)
}

fn if_statement(p: &mut Engine<'_>) -> CompletedMarker {
    debug_assert_eq!(p.peek(), IF_KW);

    let m = p.start();
    p.bump();
    expected_expr(p, Some(fields::CONDITION));
    p.expect(COLON);
    block(p, fields::CONSEQUENCE);

    while p.at(ELIF_KW) {
        let clause = p.start();
        p.bump();
        expected_expr(p, Some(fields::CONDITION));
        p.expect(COLON);
        block(p, fields::CONSEQUENCE);
        clause.complete(p, ELIF_CLAUSE).set_field(p, fields::ALTERNATIVE);
    }
    if p.at(ELSE_KW) {
        else_clause(p).set_field(p, fields::ALTERNATIVE);
    }
    m.complete(p, IF_STATEMENT)
}

fn else_clause(p: &mut Engine<'_>) -> CompletedMarker {
    let m = p.start();
    p.bump();
    p.expect(COLON);
    block(p, fields::BODY);
    m.complete(p, ELSE_CLAUSE)
}

fn while_statement(p: &mut Engine<'_>) -> CompletedMarker {
    debug_assert_eq!(p.peek(), WHILE_KW);

    let m = p.start();
    p.bump();
    expected_expr(p, Some(fields::CONDITION));
    p.expect(COLON);
    block(p, fields::BODY);
    if p.at(ELSE_KW) {
        else_clause(p).set_field(p, fields::ALTERNATIVE);
    }
    m.complete(p, WHILE_STATEMENT)
}

fn for_statement(p: &mut Engine<'_>) -> CompletedMarker {
    debug_assert_eq!(p.peek(), FOR_KW);

    let m = p.start();
    p.bump();
    match exprs::primary(p) {
        Some(target) => _ = target.set_field(p, fields::LEFT),
        None => p.missing(IDENTIFIER, Some(fields::LEFT)),
    }
    p.expect(IN_KW);
    expected_expr(p, Some(fields::RIGHT));
    p.expect(COLON);
    block(p, fields::BODY);
    if p.at(ELSE_KW) {
        else_clause(p).set_field(p, fields::ALTERNATIVE);
    }
    m.complete(p, FOR_STATEMENT)
}

/// Parses the body after a `:`, either an indented suite or simple
/// statements on the same line.
fn block(p: &mut Engine<'_>, field: FieldId) {
    let m = p.start();
    if p.eat(NEWLINE) {
        if p.eat(INDENT) {
            statements(p, DEDENT);
            p.eat(DEDENT);
        } else {
            let error = p.start();
            error.complete(p, Symbol::ERROR);
        }
    } else {
        while !p.at(NEWLINE) && !p.at(DEDENT) && !p.at(Symbol::END) {
            if p.reusable(SIMPLE_STATEMENT, simple_statement).is_none() {
                p.error_recover(&LINE_END);
            }
            if !p.eat(SEMICOLON) {
                break;
            }
        }
        line_end(p);
    }
    m.complete(p, BLOCK).set_field(p, field);
}
