//! Parsing, navigation, cursor and edit behaviour over the bundled grammars.

use arbor_langs::{JAVASCRIPT, PYTHON};
use arbor_parse::{Language, ParseError, Parser};
use arbor_syntax::{InputEdit, Node, Point, Tree};
use expect_test::expect;
use rstest::rstest;

fn parse(language: &Language, text: impl AsRef<[u8]>) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(language).unwrap();
    parser.parse(text, None).unwrap()
}

const PYTHON_SOURCES: &[&str] = &[
    "",
    "def foo():\n  bar()",
    "class A(B):\n    def f(self, x=1):\n        return self.y[x] ** 2\n",
    "for i in range(10):\n    if i % 2 == 0 and not done:\n        continue\n    else:\n        print(i, end='')\n",
    "x = {'a': [1, 2.5], 'b': (None,)}  # trailing\n",
    "def (:\n  )\n",
];

const JAVASCRIPT_SOURCES: &[&str] = &[
    "",
    "function foo() {\n  bar();\n}\n",
    "'😎' && '🐍'",
    "let a = {b: [1, 'c'], d: a.b[0]}\nwhile (x < 10) x += 1\n",
    "if (a) { return } else b = function (c) { return c ** 2 }\n",
    "/* open",
];

#[rstest]
#[case::borrowed(false)]
#[case::owned(true)]
fn root_spans_whole_input(#[case] owned: bool) {
    let sources = PYTHON_SOURCES
        .iter()
        .map(|text| (&PYTHON, text))
        .chain(JAVASCRIPT_SOURCES.iter().map(|text| (&JAVASCRIPT, text)));
    for (language, text) in sources {
        let tree = if owned {
            parse(language, text.as_bytes().to_vec())
        } else {
            parse(language, text.as_bytes())
        };
        assert_eq!(tree.root_node().end_byte(), text.len(), "{text:?}");
        assert_eq!(tree.root_node().start_byte(), 0);
    }
}

#[test]
fn borrowed_and_owned_input_agree() {
    for text in PYTHON_SOURCES {
        let borrowed = parse(&PYTHON, text.as_bytes());
        let owned = parse(&PYTHON, String::from(*text));
        assert_eq!(borrowed.root_node().to_sexp(), owned.root_node().to_sexp());
    }
}

fn check_spans(node: Node<'_>) {
    let children: Vec<_> = node.children().iter().collect();
    assert!(node.start_byte() <= node.end_byte());
    if node.parent().is_some()
        && let (Some(first), Some(last)) = (children.first(), children.last())
    {
        assert_eq!(first.start_byte(), node.start_byte(), "{node:?}");
        assert_eq!(last.end_byte(), node.end_byte(), "{node:?}");
    }
    for pair in children.windows(2) {
        assert!(pair[0].end_byte() <= pair[1].start_byte(), "{:?} {:?}", pair[0], pair[1]);
    }
    for child in children {
        assert!(node.start_byte() <= child.start_byte() && child.end_byte() <= node.end_byte());
        assert_eq!(child.parent(), Some(node));
        check_spans(child);
    }
}

#[test]
fn children_tile_their_parent() {
    for text in PYTHON_SOURCES {
        check_spans(parse(&PYTHON, text).root_node());
    }
    for text in JAVASCRIPT_SOURCES {
        check_spans(parse(&JAVASCRIPT, text).root_node());
    }
}

#[rstest]
#[case::python(&PYTHON, "[1, 2, 3]", "integer")]
#[case::javascript(&JAVASCRIPT, "[1, 2, 3]", "number")]
fn named_siblings_skip_punctuation(
    #[case] language: &Language,
    #[case] text: &str,
    #[case] element: &str,
) {
    let tree = parse(language, text);
    let list = tree.root_node().child(0).and_then(|statement| statement.child(0)).unwrap();
    assert_eq!(list.child_count(), 7);
    assert_eq!(list.named_child_count(), 3);

    let children: Vec<_> = list.children().iter().collect();
    for pair in children.windows(2) {
        assert_eq!(pair[0].next_sibling(), Some(pair[1]));
        assert_eq!(pair[1].prev_sibling(), Some(pair[0]));
    }
    assert_eq!(children[0].prev_sibling(), None);
    assert_eq!(children[6].next_sibling(), None);

    let mut named = Vec::new();
    let mut next = list.named_child(0);
    while let Some(node) = next {
        named.push(node);
        next = node.next_named_sibling();
    }
    assert_eq!(named.iter().map(|node| node.kind()).collect::<Vec<_>>(), [element; 3]);
    assert_eq!(
        named.iter().map(|node| node.utf8_text().unwrap()).collect::<Vec<_>>(),
        ["1", "2", "3"]
    );
    assert_eq!(named[2].prev_named_sibling(), Some(named[1]));
    assert_eq!(named[0].prev_named_sibling(), None);
}

#[test]
fn field_lookup() {
    let tree = parse(&PYTHON, "def foo():\n  bar()");
    let function = tree.root_node().child(0).unwrap();

    let name = function.child_by_field_name("name").unwrap();
    assert_eq!(function.child_by_field_name("name"), Some(name));
    assert_eq!(function.child_by_field_name(b"name"), Some(name));
    assert_eq!(name.utf8_text().unwrap(), "foo");

    let name_id = PYTHON.field_id_for_name("name").unwrap();
    assert_eq!(function.child_by_field_id(name_id), Some(name));
    assert_eq!(name.field_name(), Some("name"));

    assert!(PYTHON.field_id_for_name("alias").is_some());
    assert_eq!(PYTHON.field_id_for_name("nameasdf"), None);
    assert_eq!(function.child_by_field_name("nameasdf"), None);
    assert_eq!(function.child_by_field_name("alias"), None);

    expect![[r#"(module (function_definition name: (identifier) parameters: (parameters) body: (block (expression_statement (call function: (identifier) arguments: (argument_list))))))"#]]
        .assert_eq(&tree.root_node().to_sexp());
}

#[test]
fn points_count_bytes() {
    let text = "'😎' && '🐍'";
    let tree = parse(&JAVASCRIPT, text);
    let binary = tree.root_node().child(0).and_then(|statement| statement.child(0)).unwrap();
    assert_eq!(binary.kind(), "binary_expression");

    let right = binary.child(2).unwrap();
    assert_eq!(right.kind(), "string");
    assert_eq!(right.byte_range(), 10..16);
    assert_eq!(&text.as_bytes()[right.byte_range()], "'🐍'".as_bytes());
    assert_eq!(right.start_point(), Point::new(0, 10));
    assert_eq!(right.end_point(), Point::new(0, 16));
    assert_eq!(binary.child_by_field_name("operator").map(|op| op.kind()), Some("&&"));
}

#[test]
fn cursor_walks_the_tree() {
    let tree = parse(&PYTHON, "def foo():\n  bar()");
    let mut cursor = tree.walk();
    assert_eq!(cursor.node().kind(), "module");
    assert_eq!(cursor.current_field_name(), None);

    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind(), "function_definition");
    assert!(cursor.goto_first_child());
    let keyword = cursor.node();
    assert_eq!(keyword.kind(), "def");
    assert!(!cursor.goto_first_child());
    assert_eq!(cursor.node(), keyword);
    assert_eq!(cursor.depth(), 2);

    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.current_field_name(), Some("name"));
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.node().kind(), "parameters");
    assert_eq!(cursor.current_field_name(), Some("parameters"));
    assert!(cursor.goto_previous_sibling());
    assert_eq!(cursor.current_field_name(), Some("name"));
    assert_eq!(cursor.node(), cursor.node());

    assert!(cursor.goto_parent());
    assert!(cursor.goto_last_child());
    assert_eq!(cursor.current_field_name(), Some("body"));
    assert!(!cursor.goto_next_sibling());
    assert_eq!(cursor.node().kind(), "block");
}

fn insert_two_at_eight() -> InputEdit {
    InputEdit {
        start_byte: 8,
        old_end_byte: 8,
        new_end_byte: 10,
        start_position: Point::new(0, 8),
        old_end_position: Point::new(0, 8),
        new_end_position: Point::new(0, 10),
    }
}

#[test]
fn edit_marks_the_touched_path() {
    let mut tree = parse(&PYTHON, "def foo():\n  bar()");
    tree.edit(&insert_two_at_eight());

    let root = tree.root_node();
    let function = root.child(0).unwrap();
    let parameters = function.child_by_field_name("parameters").unwrap();
    assert!(root.has_changes());
    assert!(function.has_changes());
    assert!(parameters.has_changes());
    assert_eq!(parameters.start_point(), Point::new(0, 7));
    assert_eq!(parameters.end_point(), Point::new(0, 11));

    assert!(!function.child(0).unwrap().has_changes());
    assert!(!function.child_by_field_name("name").unwrap().has_changes());

    let body = function.child_by_field_name("body").unwrap();
    assert_eq!(body.start_byte(), 15);
    assert_eq!(body.start_point(), Point::new(1, 2));
    assert_eq!(root.end_byte(), 20);
}

#[test]
fn reparse_after_edit_matches_fresh_parse() {
    let mut parser = Parser::new();
    parser.set_language(&PYTHON).unwrap();
    let mut tree = parser.parse("def foo():\n  bar()", None).unwrap();
    tree.edit(&insert_two_at_eight());

    let text = "def foo(ab):\n  bar()";
    let reparsed = parser.parse(text, Some(&tree)).unwrap();
    let fresh = parser.parse(text, None).unwrap();
    assert_eq!(reparsed.root_node().to_sexp(), fresh.root_node().to_sexp());
    assert!(reparsed.reused_node_count() > 0);
    assert!(!reparsed.root_node().has_changes());

    let function = reparsed.root_node().child(0).unwrap();
    let parameters = function.child_by_field_name("parameters").unwrap();
    assert_eq!(parameters.to_sexp(), "(parameters (identifier))");
}

#[test]
fn sequential_edits_compose() {
    let mut parser = Parser::new();
    parser.set_language(&PYTHON).unwrap();
    let mut tree = parser.parse("x = 1\ny = 2\n", None).unwrap();

    // "1" -> "10", then "2" -> "20" in the already edited text.
    tree.edit(&InputEdit {
        start_byte: 4,
        old_end_byte: 5,
        new_end_byte: 6,
        start_position: Point::new(0, 4),
        old_end_position: Point::new(0, 5),
        new_end_position: Point::new(0, 6),
    });
    tree.edit(&InputEdit {
        start_byte: 11,
        old_end_byte: 12,
        new_end_byte: 13,
        start_position: Point::new(1, 4),
        old_end_position: Point::new(1, 5),
        new_end_position: Point::new(1, 6),
    });

    let text = "x = 10\ny = 20\n";
    let reparsed = parser.parse(text, Some(&tree)).unwrap();
    let fresh = parser.parse(text, None).unwrap();
    assert_eq!(reparsed.root_node().to_sexp(), fresh.root_node().to_sexp());

    let second = reparsed.root_node().child(1).unwrap();
    assert_eq!(second.byte_range(), 7..13);
    assert_eq!(second.start_point(), Point::new(1, 0));
}

fn point_at(text: &str, byte: usize) -> Point {
    let before = &text[..byte];
    let line_start = before.rfind('\n').map_or(0, |newline| newline + 1);
    Point::new(before.matches('\n').count(), byte - line_start)
}

/// Every node in pre-order with its field, span and missing flag.
fn dump(tree: &Tree) -> Vec<String> {
    tree.root_node()
        .preorder()
        .map(|node| {
            format!(
                "{}{} {:?}{}",
                node.field_name().map(|field| format!("{field}: ")).unwrap_or_default(),
                node.kind(),
                node.byte_range(),
                if node.is_missing() { " missing" } else { "" }
            )
        })
        .collect()
}

/// Replaces `range` of `old` with `insert`, then checks that reparsing with
/// the edited old tree builds the same tree as parsing from scratch.
fn check_reparse(language: &Language, old: &str, range: std::ops::Range<usize>, insert: &str) {
    let mut parser = Parser::new();
    parser.set_language(language).unwrap();
    let mut tree = parser.parse(old, None).unwrap();

    let new = format!("{}{insert}{}", &old[..range.start], &old[range.end..]);
    let new_end = range.start + insert.len();
    tree.edit(&InputEdit {
        start_byte: range.start,
        old_end_byte: range.end,
        new_end_byte: new_end,
        start_position: point_at(old, range.start),
        old_end_position: point_at(old, range.end),
        new_end_position: point_at(&new, new_end),
    });

    let reparsed = parser.parse(&new, Some(&tree)).unwrap();
    let fresh = parser.parse(&new, None).unwrap();
    assert_eq!(
        reparsed.root_node().to_sexp(),
        fresh.root_node().to_sexp(),
        "{old:?} -> {new:?}"
    );
    assert_eq!(dump(&reparsed), dump(&fresh), "{old:?} -> {new:?}");
}

#[rstest]
// "class A(B):\n    def" -> "class A(B):        def"
#[case::function_joins_class_line(
    "class A(B):\n    def f(self, x=1):\n        return self.y[x] ** 2\n",
    11..16,
    "        "
)]
// "range(10):\n    if" -> "range(10)        if"
#[case::if_joins_for_line(
    "for i in range(10):\n    if i % 2 == 0 and not done:\n        continue\n    else:\n        print(i, end='')\n",
    18..24,
    "        "
)]
// "if a: pass" -> "if a:\n  pass"
#[case::same_line_body_moves_down("if a: pass\nx = 1\n", 5..6, "\n  ")]
// "if a:\n  pass" -> "if a: pass"
#[case::indented_body_moves_up("if a:\n  pass\nx = 1\n", 5..8, " ")]
fn python_bodies_changing_shape(
    #[case] old: &str,
    #[case] range: std::ops::Range<usize>,
    #[case] insert: &str,
) {
    check_reparse(&PYTHON, old, range, insert);
}

#[test]
fn every_small_edit_reparses_like_a_fresh_parse() {
    let test_data = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");
    let mut paths: Vec<_> = std::fs::read_dir(&test_data)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext != "tree"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty());

    for path in paths {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap();
        let language = arbor_langs::language_for_name(extension).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        let boundaries: Vec<_> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        for pair in boundaries.windows(2) {
            let (offset, next) = (pair[0], pair[1]);
            check_reparse(language, &text, offset..offset, " ");
            check_reparse(language, &text, offset..offset, "\n");
            check_reparse(language, &text, offset..next, "");
        }
        check_reparse(language, &text, text.len()..text.len(), "z");
    }
}

#[test]
fn javascript_statements_are_reused() {
    let mut parser = Parser::new();
    parser.set_language(&JAVASCRIPT).unwrap();
    let old_text = "a();\nfunction f() {\n  return 1;\n}\n";
    let mut tree = parser.parse(old_text, None).unwrap();

    // "a()" -> "ab()"
    tree.edit(&InputEdit {
        start_byte: 1,
        old_end_byte: 1,
        new_end_byte: 2,
        start_position: Point::new(0, 1),
        old_end_position: Point::new(0, 1),
        new_end_position: Point::new(0, 2),
    });
    let text = "ab();\nfunction f() {\n  return 1;\n}\n";
    let reparsed = parser.parse(text, Some(&tree)).unwrap();
    let fresh = parser.parse(text, None).unwrap();
    assert_eq!(reparsed.root_node().to_sexp(), fresh.root_node().to_sexp());
    assert!(reparsed.reused_node_count() > 0);
}

#[test]
fn malformed_input_produces_error_nodes() {
    let tree = parse(&PYTHON, "def (:\n  )\n");
    assert!(tree.root_node().has_error());
    assert!(tree.root_node().preorder().any(|node| node.is_error() || node.is_missing()));

    let tree = parse(&JAVASCRIPT, "let = ;");
    assert!(tree.root_node().has_error());
    let missing = tree.root_node().preorder().find(|node| node.is_missing()).unwrap();
    assert_eq!(missing.kind(), "identifier");
}

#[test]
fn parsing_requires_a_language() {
    let mut parser = Parser::new();
    assert_eq!(parser.parse("x", None).unwrap_err(), ParseError::LanguageNotSet);
    assert!(parser.language().is_none());

    parser.set_language(&JAVASCRIPT).unwrap();
    assert_eq!(parser.language(), Some(&JAVASCRIPT));
}

#[test]
fn descendants_by_byte_range() {
    let text = "x = foo.bar(1)\n";
    let tree = parse(&PYTHON, text);
    let root = tree.root_node();

    let attribute = root.named_descendant_for_byte_range(4, 11).unwrap();
    assert_eq!(attribute.kind(), "attribute");
    let name = root.descendant_for_byte_range(8, 9).unwrap();
    assert_eq!(name.utf8_text().unwrap(), "bar");
    assert_eq!(name.field_name(), Some("attribute"));
}
