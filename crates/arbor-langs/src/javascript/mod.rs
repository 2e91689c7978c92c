//! JavaScript: statements, declarations and operator expressions.

use arbor_parse::{Engine, Grammar};
use arbor_syntax::{LANGUAGE_VERSION, LanguageTable, Symbol, SymbolSet, Token};

mod exprs;
mod lexer;
mod stmts;

pub(crate) mod kinds {
    use arbor_syntax::SymbolInfo;

    symbols! {
        IDENTIFIER = SymbolInfo::named("identifier"),
        PROPERTY_IDENTIFIER = SymbolInfo::named("property_identifier"),
        NUMBER = SymbolInfo::named("number"),
        STRING = SymbolInfo::named("string"),
        COMMENT = SymbolInfo::named("comment"),
        TRUE = SymbolInfo::named("true"),
        FALSE = SymbolInfo::named("false"),
        NULL = SymbolInfo::named("null"),
        THIS = SymbolInfo::named("this"),

        FUNCTION_KW = SymbolInfo::anonymous("function"),
        RETURN_KW = SymbolInfo::anonymous("return"),
        IF_KW = SymbolInfo::anonymous("if"),
        ELSE_KW = SymbolInfo::anonymous("else"),
        WHILE_KW = SymbolInfo::anonymous("while"),
        VAR_KW = SymbolInfo::anonymous("var"),
        LET_KW = SymbolInfo::anonymous("let"),
        CONST_KW = SymbolInfo::anonymous("const"),
        TYPEOF_KW = SymbolInfo::anonymous("typeof"),

        L_PAREN = SymbolInfo::anonymous("("),
        R_PAREN = SymbolInfo::anonymous(")"),
        L_BRACK = SymbolInfo::anonymous("["),
        R_BRACK = SymbolInfo::anonymous("]"),
        L_BRACE = SymbolInfo::anonymous("{"),
        R_BRACE = SymbolInfo::anonymous("}"),
        COMMA = SymbolInfo::anonymous(","),
        SEMICOLON = SymbolInfo::anonymous(";"),
        COLON = SymbolInfo::anonymous(":"),
        DOT = SymbolInfo::anonymous("."),
        EQ = SymbolInfo::anonymous("="),
        PLUS_EQ = SymbolInfo::anonymous("+="),
        MINUS_EQ = SymbolInfo::anonymous("-="),
        STAR_EQ = SymbolInfo::anonymous("*="),
        SLASH_EQ = SymbolInfo::anonymous("/="),
        PLUS = SymbolInfo::anonymous("+"),
        MINUS = SymbolInfo::anonymous("-"),
        STAR = SymbolInfo::anonymous("*"),
        STAR_STAR = SymbolInfo::anonymous("**"),
        SLASH = SymbolInfo::anonymous("/"),
        PERCENT = SymbolInfo::anonymous("%"),
        BANG = SymbolInfo::anonymous("!"),
        TILDE = SymbolInfo::anonymous("~"),
        AMP_AMP = SymbolInfo::anonymous("&&"),
        PIPE_PIPE = SymbolInfo::anonymous("||"),
        QUESTION_QUESTION = SymbolInfo::anonymous("??"),
        EQ_EQ = SymbolInfo::anonymous("=="),
        EQ_EQ_EQ = SymbolInfo::anonymous("==="),
        NOT_EQ = SymbolInfo::anonymous("!="),
        NOT_EQ_EQ = SymbolInfo::anonymous("!=="),
        LT = SymbolInfo::anonymous("<"),
        LT_EQ = SymbolInfo::anonymous("<="),
        GT = SymbolInfo::anonymous(">"),
        GT_EQ = SymbolInfo::anonymous(">="),

        PROGRAM = SymbolInfo::named("program"),
        FUNCTION_DECLARATION = SymbolInfo::named("function_declaration"),
        FUNCTION_EXPRESSION = SymbolInfo::named("function_expression"),
        FORMAL_PARAMETERS = SymbolInfo::named("formal_parameters"),
        STATEMENT_BLOCK = SymbolInfo::named("statement_block"),
        EXPRESSION_STATEMENT = SymbolInfo::named("expression_statement"),
        LEXICAL_DECLARATION = SymbolInfo::named("lexical_declaration"),
        VARIABLE_DECLARATION = SymbolInfo::named("variable_declaration"),
        VARIABLE_DECLARATOR = SymbolInfo::named("variable_declarator"),
        RETURN_STATEMENT = SymbolInfo::named("return_statement"),
        IF_STATEMENT = SymbolInfo::named("if_statement"),
        ELSE_CLAUSE = SymbolInfo::named("else_clause"),
        WHILE_STATEMENT = SymbolInfo::named("while_statement"),
        EMPTY_STATEMENT = SymbolInfo::named("empty_statement"),
        PARENTHESIZED_EXPRESSION = SymbolInfo::named("parenthesized_expression"),
        ASSIGNMENT_EXPRESSION = SymbolInfo::named("assignment_expression"),
        AUGMENTED_ASSIGNMENT_EXPRESSION = SymbolInfo::named("augmented_assignment_expression"),
        BINARY_EXPRESSION = SymbolInfo::named("binary_expression"),
        UNARY_EXPRESSION = SymbolInfo::named("unary_expression"),
        CALL_EXPRESSION = SymbolInfo::named("call_expression"),
        ARGUMENTS = SymbolInfo::named("arguments"),
        MEMBER_EXPRESSION = SymbolInfo::named("member_expression"),
        SUBSCRIPT_EXPRESSION = SymbolInfo::named("subscript_expression"),
        ARRAY = SymbolInfo::named("array"),
        OBJECT = SymbolInfo::named("object"),
        PAIR = SymbolInfo::named("pair"),
    }
}

pub(crate) mod fields {
    fields! {
        ALIAS = "alias",
        ALTERNATIVE = "alternative",
        ARGUMENT = "argument",
        ARGUMENTS = "arguments",
        BODY = "body",
        CONDITION = "condition",
        CONSEQUENCE = "consequence",
        FUNCTION = "function",
        INDEX = "index",
        KEY = "key",
        LEFT = "left",
        NAME = "name",
        OBJECT = "object",
        OPERATOR = "operator",
        PARAMETERS = "parameters",
        PROPERTY = "property",
        RIGHT = "right",
        VALUE = "value",
    }
}

pub(crate) static TABLE: LanguageTable =
    LanguageTable::new("javascript", LANGUAGE_VERSION, kinds::SYMBOLS, fields::FIELDS);

pub(crate) struct JavaScriptGrammar;

impl Grammar for JavaScriptGrammar {
    fn tokenize(&self, text: &[u8]) -> Vec<Token> {
        lexer::tokenize(text)
    }

    fn parse(&self, p: &mut Engine<'_>) {
        stmts::program(p);
    }
}

/// Parses `bra item (, item)* ,? ket`. An item that cannot start at the
/// current token wraps that token in an `ERROR` node.
fn delimited(
    p: &mut Engine<'_>,
    bra: Symbol,
    ket: Symbol,
    mut item: impl FnMut(&mut Engine<'_>) -> bool,
) {
    debug_assert_eq!(p.peek(), bra);
    p.bump();

    while !p.at(ket) && !p.at(Symbol::END) {
        if p.at(kinds::COMMA) {
            let m = p.start();
            p.bump();
            m.complete(p, Symbol::ERROR);
            continue;
        }
        if !item(p) {
            p.error_recover(&SymbolSet::new([kinds::COMMA, ket, kinds::SEMICOLON]));
            if p.at(kinds::SEMICOLON) {
                break;
            }
            continue;
        }
        if !p.eat(kinds::COMMA) {
            break;
        }
    }

    p.expect(ket);
}
