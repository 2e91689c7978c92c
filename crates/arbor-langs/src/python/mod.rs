//! Python: modules of statements with significant indentation.
//!
//! Indentation is turned into hidden `_indent`/`_dedent` tokens by the lexer,
//! logical line ends into hidden `_newline` tokens. Line breaks inside
//! brackets are plain whitespace.

use arbor_parse::{Engine, Grammar};
use arbor_syntax::{LANGUAGE_VERSION, LanguageTable, Symbol, SymbolSet, Token};

mod exprs;
mod lexer;
mod stmts;

pub(crate) mod kinds {
    use arbor_syntax::SymbolInfo;

    symbols! {
        NEWLINE = SymbolInfo::hidden("_newline"),
        INDENT = SymbolInfo::hidden("_indent"),
        DEDENT = SymbolInfo::hidden("_dedent"),

        IDENTIFIER = SymbolInfo::named("identifier"),
        INTEGER = SymbolInfo::named("integer"),
        FLOAT = SymbolInfo::named("float"),
        STRING = SymbolInfo::named("string"),
        COMMENT = SymbolInfo::named("comment"),
        TRUE = SymbolInfo::named("true"),
        FALSE = SymbolInfo::named("false"),
        NONE = SymbolInfo::named("none"),

        DEF_KW = SymbolInfo::anonymous("def"),
        CLASS_KW = SymbolInfo::anonymous("class"),
        IF_KW = SymbolInfo::anonymous("if"),
        ELIF_KW = SymbolInfo::anonymous("elif"),
        ELSE_KW = SymbolInfo::anonymous("else"),
        WHILE_KW = SymbolInfo::anonymous("while"),
        FOR_KW = SymbolInfo::anonymous("for"),
        IN_KW = SymbolInfo::anonymous("in"),
        RETURN_KW = SymbolInfo::anonymous("return"),
        PASS_KW = SymbolInfo::anonymous("pass"),
        BREAK_KW = SymbolInfo::anonymous("break"),
        CONTINUE_KW = SymbolInfo::anonymous("continue"),
        IMPORT_KW = SymbolInfo::anonymous("import"),
        AND_KW = SymbolInfo::anonymous("and"),
        OR_KW = SymbolInfo::anonymous("or"),
        NOT_KW = SymbolInfo::anonymous("not"),
        IS_KW = SymbolInfo::anonymous("is"),

        L_PAREN = SymbolInfo::anonymous("("),
        R_PAREN = SymbolInfo::anonymous(")"),
        L_BRACK = SymbolInfo::anonymous("["),
        R_BRACK = SymbolInfo::anonymous("]"),
        L_BRACE = SymbolInfo::anonymous("{"),
        R_BRACE = SymbolInfo::anonymous("}"),
        COMMA = SymbolInfo::anonymous(","),
        COLON = SymbolInfo::anonymous(":"),
        SEMICOLON = SymbolInfo::anonymous(";"),
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
        SLASH_SLASH = SymbolInfo::anonymous("//"),
        PERCENT = SymbolInfo::anonymous("%"),
        TILDE = SymbolInfo::anonymous("~"),
        EQ_EQ = SymbolInfo::anonymous("=="),
        NOT_EQ = SymbolInfo::anonymous("!="),
        LT = SymbolInfo::anonymous("<"),
        LT_EQ = SymbolInfo::anonymous("<="),
        GT = SymbolInfo::anonymous(">"),
        GT_EQ = SymbolInfo::anonymous(">="),

        MODULE = SymbolInfo::named("module"),
        FUNCTION_DEFINITION = SymbolInfo::named("function_definition"),
        CLASS_DEFINITION = SymbolInfo::named("class_definition"),
        PARAMETERS = SymbolInfo::named("parameters"),
        DEFAULT_PARAMETER = SymbolInfo::named("default_parameter"),
        BLOCK = SymbolInfo::named("block"),
        IF_STATEMENT = SymbolInfo::named("if_statement"),
        ELIF_CLAUSE = SymbolInfo::named("elif_clause"),
        ELSE_CLAUSE = SymbolInfo::named("else_clause"),
        WHILE_STATEMENT = SymbolInfo::named("while_statement"),
        FOR_STATEMENT = SymbolInfo::named("for_statement"),
        RETURN_STATEMENT = SymbolInfo::named("return_statement"),
        PASS_STATEMENT = SymbolInfo::named("pass_statement"),
        BREAK_STATEMENT = SymbolInfo::named("break_statement"),
        CONTINUE_STATEMENT = SymbolInfo::named("continue_statement"),
        IMPORT_STATEMENT = SymbolInfo::named("import_statement"),
        DOTTED_NAME = SymbolInfo::named("dotted_name"),
        EXPRESSION_STATEMENT = SymbolInfo::named("expression_statement"),
        ASSIGNMENT = SymbolInfo::named("assignment"),
        AUGMENTED_ASSIGNMENT = SymbolInfo::named("augmented_assignment"),
        CALL = SymbolInfo::named("call"),
        ARGUMENT_LIST = SymbolInfo::named("argument_list"),
        KEYWORD_ARGUMENT = SymbolInfo::named("keyword_argument"),
        ATTRIBUTE = SymbolInfo::named("attribute"),
        SUBSCRIPT = SymbolInfo::named("subscript"),
        BINARY_OPERATOR = SymbolInfo::named("binary_operator"),
        UNARY_OPERATOR = SymbolInfo::named("unary_operator"),
        BOOLEAN_OPERATOR = SymbolInfo::named("boolean_operator"),
        NOT_OPERATOR = SymbolInfo::named("not_operator"),
        COMPARISON_OPERATOR = SymbolInfo::named("comparison_operator"),
        LIST = SymbolInfo::named("list"),
        TUPLE = SymbolInfo::named("tuple"),
        PARENTHESIZED_EXPRESSION = SymbolInfo::named("parenthesized_expression"),
        DICTIONARY = SymbolInfo::named("dictionary"),
        PAIR = SymbolInfo::named("pair"),
    }
}

pub(crate) mod fields {
    fields! {
        ALIAS = "alias",
        ALTERNATIVE = "alternative",
        ARGUMENT = "argument",
        ARGUMENTS = "arguments",
        ATTRIBUTE = "attribute",
        BODY = "body",
        CONDITION = "condition",
        CONSEQUENCE = "consequence",
        FUNCTION = "function",
        KEY = "key",
        LEFT = "left",
        NAME = "name",
        OBJECT = "object",
        OPERATOR = "operator",
        OPERATORS = "operators",
        PARAMETERS = "parameters",
        RIGHT = "right",
        SUBSCRIPT = "subscript",
        SUPERCLASSES = "superclasses",
        VALUE = "value",
    }
}

pub(crate) static TABLE: LanguageTable =
    LanguageTable::new("python", LANGUAGE_VERSION, kinds::SYMBOLS, fields::FIELDS);

pub(crate) struct PythonGrammar;

impl Grammar for PythonGrammar {
    fn tokenize(&self, text: &[u8]) -> Vec<Token> {
        lexer::tokenize(text)
    }

    fn parse(&self, p: &mut Engine<'_>) {
        stmts::module(p);
    }
}

/// Parses `bra item (, item)* ,? ket`. `item` returns `false` when the
/// current token cannot start an item; the token is then wrapped in an
/// `ERROR` node.
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
            p.error_recover(&SymbolSet::new([kinds::COMMA, ket, kinds::NEWLINE, kinds::COLON]));
            if p.at_set(&SymbolSet::new([kinds::NEWLINE, kinds::COLON])) {
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
