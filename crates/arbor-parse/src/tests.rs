use arbor_syntax::{
    FieldId, InputEdit, LanguageTable, Point, ReuseSite, Symbol, SymbolInfo, SymbolSet, Token,
};
use arbor_tokenizer::Tokenizer;
use expect_test::expect;

use crate::{CompletedMarker, Engine, Grammar, Language, LanguageError, ParseError, Parser};

const IDENTIFIER: Symbol = Symbol(1);
const L_PAREN: Symbol = Symbol(2);
const R_PAREN: Symbol = Symbol(3);
const LIST: Symbol = Symbol(4);
const PROGRAM: Symbol = Symbol(5);
const COMMENT: Symbol = Symbol(6);

const HEAD: FieldId = FieldId::from_raw(1);
const LIST_SITE: ReuseSite = ReuseSite::new(1);

const SYMBOLS: &[SymbolInfo] = &[
    SymbolInfo::hidden("end"),
    SymbolInfo::named("identifier"),
    SymbolInfo::anonymous("("),
    SymbolInfo::anonymous(")"),
    SymbolInfo::named("list"),
    SymbolInfo::named("program"),
    SymbolInfo::named("comment"),
];

static LISTS_TABLE: LanguageTable =
    LanguageTable::new("lists", arbor_syntax::LANGUAGE_VERSION, SYMBOLS, &["head", "alias"]);
static OTHER_TABLE: LanguageTable =
    LanguageTable::new("other", arbor_syntax::LANGUAGE_VERSION, SYMBOLS, &["head", "alias"]);
static OLD_TABLE: LanguageTable = LanguageTable::new("old", 12, SYMBOLS, &["head"]);

static LISTS: Language = Language::new(&LISTS_TABLE, &ListGrammar);
static OTHER: Language = Language::new(&OTHER_TABLE, &ListGrammar);
static OLD: Language = Language::new(&OLD_TABLE, &ListGrammar);

/// Parenthesised lists of words with `;` line comments.
struct ListGrammar;

impl Grammar for ListGrammar {
    fn tokenize(&self, text: &[u8]) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(text);
        while !tokenizer.cursor.is_eof() {
            match tokenizer.cursor.advance() {
                c if c.is_whitespace() => {
                    tokenizer.cursor.advance_while(char::is_whitespace);
                    tokenizer.skip();
                }
                ';' => {
                    tokenizer.cursor.advance_while(|c| c != '\n');
                    tokenizer.push_extra(COMMENT);
                }
                '(' => tokenizer.push(L_PAREN),
                ')' => tokenizer.push(R_PAREN),
                c if c.is_alphanumeric() => {
                    tokenizer.cursor.advance_while(char::is_alphanumeric);
                    tokenizer.push(IDENTIFIER);
                }
                _ => tokenizer.push(Symbol::ERROR),
            }
        }
        tokenizer.finish()
    }

    fn parse(&self, p: &mut Engine<'_>) {
        let m = p.start();
        while !p.at(Symbol::END) {
            if !item(p) {
                p.error_recover(&SymbolSet::EMPTY);
            }
        }
        m.complete(p, PROGRAM);
    }
}

fn item(p: &mut Engine<'_>) -> bool {
    match p.peek() {
        IDENTIFIER | Symbol::ERROR => {
            p.bump();
            true
        }
        L_PAREN => {
            p.reusable(LIST_SITE, list);
            true
        }
        _ => false,
    }
}

fn list(p: &mut Engine<'_>) -> Option<CompletedMarker> {
    let m = p.start();
    p.bump();
    if p.at(IDENTIFIER) {
        p.bump_field(HEAD);
    }
    while !p.at(R_PAREN) && !p.at(Symbol::END) {
        item(p);
    }
    p.expect(R_PAREN);
    Some(m.complete(p, LIST))
}

fn parser() -> Parser {
    let mut parser = Parser::new();
    parser.set_language(&LISTS).unwrap();
    parser
}

fn replace(start: usize, old_end: usize, new_end: usize) -> InputEdit {
    InputEdit {
        start_byte: start,
        old_end_byte: old_end,
        new_end_byte: new_end,
        start_position: Point::new(0, start),
        old_end_position: Point::new(0, old_end),
        new_end_position: Point::new(0, new_end),
    }
}

#[test]
fn parse_without_language_fails() {
    let mut parser = Parser::new();
    assert_eq!(parser.parse("a", None).unwrap_err(), ParseError::LanguageNotSet);
    assert!(parser.language().is_none());
}

#[test]
fn incompatible_language_is_rejected() {
    let mut parser = parser();
    let err = parser.set_language(&OLD).unwrap_err();
    assert_eq!(err, LanguageError::Version { name: "old", version: 12, min: 13, max: 14 });
    expect!["incompatible language version 12 for `old`, expected 13 through 14"]
        .assert_eq(&err.to_string());
    assert_eq!(parser.language(), Some(&LISTS));
}

#[test]
fn parses_nested_lists() {
    let tree = parser().parse("(f a (g b)) c", None).unwrap();
    expect![[r#"(program (list head: (identifier) (identifier) (list head: (identifier) (identifier))) (identifier))"#]]
        .assert_eq(&tree.root_node().sexp());
    assert!(!tree.root_node().has_error());
    assert_eq!(tree.reused_node_count(), 0);
}

#[test]
fn owned_and_borrowed_input_parse_alike() {
    let text = "(a ; note\n b)";
    let borrowed = parser().parse(text.as_bytes(), None).unwrap();
    let owned = parser().parse(text.to_owned().into_bytes(), None).unwrap();
    assert_eq!(borrowed.root_node().sexp(), owned.root_node().sexp());
    assert_eq!(borrowed.text(), owned.text());
}

#[test]
fn missing_close_paren_is_inserted() {
    let tree = parser().parse("(a", None).unwrap();
    expect![[r#"(program (list head: (identifier) (MISSING ")")))"#]]
        .assert_eq(&tree.root_node().sexp());

    let list = tree.root_node().child(0).unwrap();
    let missing = list.child(2).unwrap();
    assert!(missing.is_missing());
    assert_eq!(missing.byte_range(), 2..2);
    assert!(tree.root_node().has_error());
}

#[test]
fn stray_tokens_become_errors() {
    let tree = parser().parse("a ) +", None).unwrap();
    expect!["(program (identifier) (ERROR) (UNEXPECTED '+'))"].assert_eq(&tree.root_node().sexp());

    let error = tree.root_node().child(1).unwrap();
    assert!(error.is_error());
    assert_eq!(error.byte_range(), 2..3);
    assert_eq!(error.child(0).unwrap().kind(), ")");
}

#[test]
fn leading_comments_are_hoisted() {
    let tree = parser().parse("; note\n(a) ; tail\n", None).unwrap();
    expect!["(program (comment) (list head: (identifier)) (comment))"]
        .assert_eq(&tree.root_node().sexp());

    let root = tree.root_node();
    assert_eq!(root.byte_range(), 0..18);
    assert!(root.child(0).unwrap().is_extra());
    assert_eq!(root.child(1).unwrap().byte_range(), 7..10);
}

#[test]
fn comments_inside_a_list_stay_there() {
    let tree = parser().parse("(a ; note\n b)", None).unwrap();
    expect!["(program (list head: (identifier) (comment) (identifier)))"]
        .assert_eq(&tree.root_node().sexp());
}

#[test]
fn reparse_reuses_lists_before_the_edit() {
    let mut parser = parser();
    let mut tree = parser.parse("(a b) (c d)", None).unwrap();
    tree.edit(&replace(7, 8, 9));
    assert!(!tree.root_node().child(0).unwrap().has_changes());
    assert!(tree.root_node().child(1).unwrap().has_changes());

    let text = "(a b) (xy d)";
    let new_tree = parser.parse(text, Some(&tree)).unwrap();
    assert_eq!(new_tree.reused_node_count(), 5);

    let fresh = parser.parse(text, None).unwrap();
    assert_eq!(new_tree.root_node().sexp(), fresh.root_node().sexp());

    let root = new_tree.root_node();
    let first = root.child(0).unwrap();
    assert!(!first.has_changes());
    assert_eq!(first.byte_range(), 0..5);
    assert_eq!(first.child_by_field_id(HEAD).unwrap().utf8_text().unwrap(), "a");
    let second = root.child(1).unwrap();
    assert_eq!(second.byte_range(), 6..12);
    assert_eq!(second.child_by_field_name("head").unwrap().utf8_text().unwrap(), "xy");
}

#[test]
fn reparse_reuses_lists_after_the_edit() {
    let mut parser = parser();
    let mut tree = parser.parse("(a b) (c d)", None).unwrap();
    tree.edit(&replace(4, 4, 5));

    let text = "(a bc) (c d)";
    let new_tree = parser.parse(text, Some(&tree)).unwrap();
    assert_eq!(new_tree.reused_node_count(), 5);

    let second = new_tree.root_node().child(1).unwrap();
    assert_eq!(second.byte_range(), 7..12);
    assert_eq!(second.utf8_text().unwrap(), "(c d)");
    assert_eq!(
        new_tree.root_node().sexp(),
        parser.parse(text, None).unwrap().root_node().sexp()
    );
}

#[test]
fn unedited_reparse_reuses_everything_reusable() {
    let mut parser = parser();
    let tree = parser.parse("(a) (b)", None).unwrap();
    let new_tree = parser.parse("(a) (b)", Some(&tree)).unwrap();
    assert_eq!(new_tree.reused_node_count(), 8);
    assert_eq!(new_tree.root_node().sexp(), tree.root_node().sexp());
}

#[test]
fn previous_tree_of_another_language_is_ignored() {
    let mut parser = parser();
    let tree = parser.parse("(a) (b)", None).unwrap();
    parser.set_language(&OTHER).unwrap();
    let new_tree = parser.parse("(a) (b)", Some(&tree)).unwrap();
    assert_eq!(new_tree.reused_node_count(), 0);
    assert_eq!(new_tree.language().name(), "other");
}

#[test]
#[should_panic(expected = "Marker must be either completed or abandoned")]
fn dropped_marker_panics() {
    let tokens = ListGrammar.tokenize(b"a");
    let mut p = Engine::new(&LISTS_TABLE, b"a", &tokens, None);
    let _m = p.start();
}

#[test]
fn abandoned_and_preceded_markers() {
    let text = b"a b";
    let tokens = ListGrammar.tokenize(text);
    let mut p = Engine::new(&LISTS_TABLE, text, &tokens, None);
    let root = p.start();
    let abandoned = p.start();
    abandoned.abandon(&mut p);
    let inner = p.start();
    p.bump();
    let inner = inner.complete(&mut p, LIST);
    let outer = inner.precede(&mut p);
    p.bump();
    outer.complete(&mut p, LIST).set_field(&mut p, HEAD);
    root.complete(&mut p, PROGRAM);

    let tree = p.build_tree();
    expect!["(program head: (list (list (identifier)) (identifier)))"]
        .assert_eq(&tree.root_node().sexp());
}

#[test]
fn leaves_can_be_wrapped() {
    let text = b"; c\na b";
    let tokens = ListGrammar.tokenize(text);
    let mut p = Engine::new(&LISTS_TABLE, text, &tokens, None);
    let root = p.start();
    let leaf = p.bump_leaf().unwrap().set_field(&mut p, HEAD);
    assert_eq!(leaf.kind(), IDENTIFIER);
    let list = leaf.precede(&mut p);
    p.bump();
    list.complete(&mut p, LIST);
    assert!(p.bump_leaf().is_none());
    root.complete(&mut p, PROGRAM);

    let tree = p.build_tree();
    expect!["(program (comment) (list head: (identifier) (identifier)))"]
        .assert_eq(&tree.root_node().sexp());
    assert_eq!(tree.root_node().child(1).unwrap().byte_range(), 4..7);
}
