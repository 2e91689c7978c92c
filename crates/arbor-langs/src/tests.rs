use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use arbor_parse::Parser;
use arbor_syntax::Node;
use expect_test::expect_file;

use crate::language_for_name;

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    expected: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "tree" {
                    return None;
                }
                let expected = path.with_extension("tree");
                let text = fs::read_to_string(&path).ok()?;
                Some(Self { input: path, expected, text })
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }

    fn parser(&self) -> Parser {
        let extension = self.input.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        let language = language_for_name(extension)
            .unwrap_or_else(|| panic!("no language for {}", self.input.display()));
        let mut parser = Parser::new();
        parser.set_language(language).unwrap();
        parser
    }
}

fn debug_tree(node: Node<'_>, depth: usize, out: &mut String) {
    let _ = write!(out, "{:indent$}", "", indent = depth * 2);
    if let Some(field) = node.field_name() {
        let _ = write!(out, "{field}: ");
    }
    if node.is_named() {
        out.push_str(node.kind());
    } else {
        let _ = write!(out, "{:?}", node.kind());
    }
    let _ = write!(out, "@{}..{}", node.start_byte(), node.end_byte());
    if node.is_missing() {
        out.push_str(" (missing)");
    } else if node.is_named() && node.child_count() == 0 {
        let _ = write!(out, " {:?}", String::from_utf8_lossy(node.text()));
    }
    out.push('\n');

    for child in node.children() {
        debug_tree(child, depth + 1, out);
    }
}

#[test]
fn parse() {
    for case in TestCase::list() {
        let tree = case.parser().parse(&case.text, None).unwrap();
        let mut actual = String::new();
        debug_tree(tree.root_node(), 0, &mut actual);
        expect_file![&case.expected].assert_eq(&actual);
    }
}

#[test]
fn unchanged_reparse_matches() {
    for case in TestCase::list() {
        let mut parser = case.parser();
        let tree = parser.parse(&case.text, None).unwrap();
        let reparsed = parser.parse(&case.text, Some(&tree)).unwrap();
        assert_eq!(
            reparsed.root_node().to_sexp(),
            tree.root_node().to_sexp(),
            "{}",
            case.input.display()
        );
        assert!(reparsed.reused_node_count() > 0, "{}", case.input.display());
    }
}
