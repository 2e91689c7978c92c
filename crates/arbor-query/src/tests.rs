use arbor_langs::{JAVASCRIPT, PYTHON};
use arbor_parse::{Language, Parser};
use arbor_syntax::Tree;
use expect_test::{Expect, expect};
use rstest::rstest;

use crate::{LanguageQueryExt as _, Query, QueryPredicate, QueryPredicateArg, QueryProperty};

fn parse(language: &Language, text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(language).unwrap();
    parser.parse(text, None).unwrap()
}

fn query(source: &str) -> Query {
    PYTHON.query(source).unwrap()
}

fn render(query: &Query, tree: &Tree) -> String {
    query
        .captures(tree.root_node())
        .into_iter()
        .map(|(node, name)| {
            format!(
                "{name} {}-{} {}\n",
                node.start_point(),
                node.end_point(),
                node.utf8_text().unwrap()
            )
        })
        .collect()
}

fn check(source: &str, text: &str, expect: Expect) {
    let tree = parse(&PYTHON, text);
    expect.assert_eq(&render(&query(source), &tree));
}

#[rstest]
#[case::node_type("(list (foo))", "Invalid node type foo")]
#[case::anonymous_node_type("(call \"fun\")", "Invalid node type fun")]
#[case::field("(function_definition buzz: (identifier))", "Invalid field name buzz")]
#[case::negated_field("(function_definition !buzz)", "Invalid field name buzz")]
#[case::capture("((function_definition) (eq? @garbage foo))", "Invalid capture name garbage")]
#[case::syntax("(list))", "Invalid syntax at offset 6")]
#[case::unterminated("(list", "Invalid syntax at offset 5")]
#[case::arity(
    "((identifier) @a (#eq? @a))",
    "Invalid predicate #eq? expects a capture and one more argument, got 1 arguments"
)]
#[case::regex("((identifier) @a (#match? @a \"(\"))", "Invalid predicate")]
fn compile_errors(#[case] source: &str, #[case] message: &str) {
    let err = PYTHON.query(source).unwrap_err();
    assert!(err.to_string().starts_with(message), "{err}");
}

#[rstest]
#[case::type_over_capture_and_syntax("((foo) @a (#eq? @b x)) (list))", "Invalid node type foo")]
#[case::field_over_capture("((identifier) @a (#eq? @b x)) (module qq: (_))", "Invalid field name qq")]
#[case::field_over_syntax("(module zzz: (_)) (foo", "Invalid field name zzz")]
#[case::capture_over_predicate("((identifier) @a (#eq? @b))", "Invalid capture name b")]
fn first_error_by_kind(#[case] source: &str, #[case] message: &str) {
    assert_eq!(PYTHON.query(source).unwrap_err().to_string(), message);
}

#[test]
fn errors_carry_their_position() {
    let err = PYTHON.query("(module)\n  (foo)").unwrap_err();
    assert_eq!((err.offset, err.row, err.column), (12, 1, 3));
}

#[test]
fn captures_come_in_document_order() {
    let source = "
        (function_definition name: (identifier) @func-def)
        (call function: (identifier) @func-call)
    ";
    let text = "def foo():\n  bar()\ndef baz():\n  quux()\n";
    check(
        source,
        text,
        expect![[r#"
            func-def (0, 4)-(0, 7) foo
            func-call (1, 2)-(1, 5) bar
            func-def (2, 4)-(2, 7) baz
            func-call (3, 2)-(3, 6) quux
        "#]],
    );

    let query = query(source);
    let tree = parse(&PYTHON, text);
    assert_eq!(query.captures(tree.root_node()), query.captures(tree.root_node()));
    assert_eq!(query.matches(tree.root_node()), query.matches(tree.root_node()));
}

#[test]
fn enclosing_nodes_come_first() {
    check(
        "(call) @call (identifier) @id",
        "f(x)\n",
        expect![[r#"
            call (0, 0)-(0, 4) f(x)
            id (0, 0)-(0, 1) f
            id (0, 2)-(0, 3) x
        "#]],
    );
}

#[test]
fn captures_are_scoped_to_the_given_node() {
    let query = query("(identifier) @id");
    let tree = parse(&PYTHON, "a = b\nc = d\n");
    let second = tree.root_node().child(1).unwrap();
    let names: Vec<_> =
        query.captures(second).into_iter().map(|(node, _)| node.utf8_text().unwrap()).collect();
    assert_eq!(names, ["c", "d"]);
}

#[rstest]
#[case::eq("((identifier) @id (#eq? @id \"foo\"))", &["foo", "foo"])]
#[case::not_eq("((identifier) @id (#not-eq? @id foo))", &["bar", "baz"])]
#[case::matches("((identifier) @id (#match? @id \"^ba\"))", &["bar", "baz"])]
#[case::not_matches("((identifier) @id (#not-match? @id \"^ba\"))", &["foo", "foo"])]
#[case::any_of("((identifier) @id (#any-of? @id \"foo\" \"baz\"))", &["foo", "foo", "baz"])]
#[case::not_any_of("((identifier) @id (#not-any-of? @id foo baz))", &["bar"])]
#[case::capture_eq(
    "(assignment left: (identifier) @left right: (identifier) @right (#eq? @left @right))",
    &[]
)]
#[case::capture_not_eq(
    "(assignment left: (identifier) @left right: (identifier) (#not-eq? @left bar))",
    &[]
)]
fn text_predicates(#[case] source: &str, #[case] expected: &[&str]) {
    let tree = parse(&PYTHON, "foo = 1\nbar = foo\nbaz = 2\n");
    let names: Vec<_> = query(source)
        .captures(tree.root_node())
        .into_iter()
        .map(|(node, _)| node.utf8_text().unwrap())
        .collect();
    assert_eq!(names, expected);
}

#[test]
fn capture_to_capture_equality() {
    check(
        "(assignment left: (identifier) @left right: (identifier) @right (#eq? @left @right))",
        "a = a\nb = c\n",
        expect![[r#"
            left (0, 0)-(0, 1) a
            right (0, 4)-(0, 5) a
        "#]],
    );
}

#[test]
fn directives_and_general_predicates() {
    let query = query(
        "((identifier) @id (#set! \"kind\" \"variable\") (#is? @id local))
         ((call) @call (#set! @call priority high))",
    );
    assert_eq!(query.pattern_count(), 2);
    assert_eq!(
        query.property_settings(0),
        [QueryProperty { key: "kind".into(), value: Some("variable".into()), capture_id: None }]
    );
    assert_eq!(
        query.general_predicates(0),
        [QueryPredicate {
            operator: "is?".into(),
            args: vec![QueryPredicateArg::Capture(0), QueryPredicateArg::String("local".into())]
                .into(),
        }]
    );
    assert_eq!(
        query.property_settings(1),
        [QueryProperty { key: "priority".into(), value: Some("high".into()), capture_id: Some(1) }]
    );
    assert!(query.general_predicates(1).is_empty());

    // Unevaluated predicates do not filter matches.
    let tree = parse(&PYTHON, "x\n");
    assert_eq!(query.captures(tree.root_node()).len(), 1);
}

#[test]
fn capture_table() {
    let query = query("(identifier) @a\n(call) @b @a");
    assert_eq!(query.capture_names().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(query.capture_index_for_name("b"), Some(1));
    assert_eq!(query.capture_index_for_name("c"), None);
    assert_eq!(query.capture_name(0), Some("a"));
    assert_eq!(query.start_byte_for_pattern(1), Some(16));
    assert_eq!(query.start_byte_for_pattern(2), None);
}

#[test]
fn quantifiers() {
    check(
        "(argument_list (identifier)+ @args)",
        "f(a, b)\n",
        expect![[r#"
            args (0, 2)-(0, 3) a
            args (0, 5)-(0, 6) b
        "#]],
    );

    let query = query("(argument_list (keyword_argument)* @kw)");
    let tree = parse(&PYTHON, "f()\n");
    let matches = query.matches(tree.root_node());
    assert_eq!(matches.len(), 1);
    assert!(matches[0].captures.is_empty());

    check(
        "(function_definition name: (identifier) @name (parameters (identifier)? @first))",
        "def f(): pass\ndef g(x): pass\n",
        expect![[r#"
            name (0, 4)-(0, 5) f
            name (1, 4)-(1, 5) g
            first (1, 6)-(1, 7) x
        "#]],
    );
}

#[test]
fn alternations_and_anonymous_nodes() {
    check(
        "[\"def\" \"return\"] @keyword",
        "def f():\n  return 1\n",
        expect![[r#"
            keyword (0, 0)-(0, 3) def
            keyword (1, 2)-(1, 8) return
        "#]],
    );
    check(
        "(binary_operator operator: [\"+\" \"-\"] @op)",
        "a + b * c - d\n",
        expect![[r#"
            op (0, 2)-(0, 3) +
            op (0, 10)-(0, 11) -
        "#]],
    );
}

#[test]
fn anchors() {
    let text = "def f():\n  a\n  b\n";
    check(
        "(block . (_) @first)",
        text,
        expect![[r#"
            first (1, 2)-(1, 3) a
        "#]],
    );
    check(
        "(block (_) @last .)",
        text,
        expect![[r#"
            last (2, 2)-(2, 3) b
        "#]],
    );
    check(
        "(block (expression_statement) @x . (expression_statement) @y)",
        text,
        expect![[r#"
            x (1, 2)-(1, 3) a
            y (2, 2)-(2, 3) b
        "#]],
    );
}

#[test]
fn negated_fields() {
    check(
        "(class_definition name: (identifier) @plain !superclasses)",
        "class A:\n  pass\nclass B(A):\n  pass\n",
        expect![[r#"
            plain (0, 6)-(0, 7) A
        "#]],
    );
}

#[test]
fn wildcards() {
    check(
        "(call (_) @named)",
        "f(x)\n",
        expect![[r#"
            named (0, 0)-(0, 1) f
            named (0, 1)-(0, 4) (x)
        "#]],
    );
    check(
        "(argument_list _ @any)",
        "f(x)\n",
        expect![[r#"
            any (0, 1)-(0, 2) (
            any (0, 2)-(0, 3) x
            any (0, 3)-(0, 4) )
        "#]],
    );
}

#[test]
fn sibling_groups() {
    check(
        "(module (expression_statement) @stmt . (comment) @doc)",
        "x\n# about x\ny\n",
        expect![[r#"
            stmt (0, 0)-(0, 1) x
            doc (1, 0)-(1, 9) # about x
        "#]],
    );
}

#[test]
fn error_nodes_can_be_queried() {
    check(
        "(ERROR) @error",
        "x = 1 )\n",
        expect![[r#"
            error (0, 6)-(0, 7) )
        "#]],
    );
}

#[test]
fn javascript_queries() {
    let query = JAVASCRIPT
        .query("(call_expression function: (member_expression property: (property_identifier) @method))")
        .unwrap();
    let tree = parse(&JAVASCRIPT, "a.b(); c.d.e();");
    let methods: Vec<_> = query
        .captures(tree.root_node())
        .into_iter()
        .map(|(node, _)| node.utf8_text().unwrap())
        .collect();
    assert_eq!(methods, ["b", "e"]);
}
