//! S-expression rendering of subtrees.

use std::fmt::Write as _;

use crate::Node;

pub(crate) fn render(node: Node<'_>) -> String {
    let mut out = String::new();
    write_node(node, &mut out, true);
    out
}

fn write_node(node: Node<'_>, out: &mut String, is_root: bool) {
    let visible = node.is_named() || node.is_missing();
    let mut open = visible;
    if visible {
        if !is_root {
            out.push(' ');
            if let Some(field) = node.field_name() {
                out.push_str(field);
                out.push_str(": ");
            }
        }
        if node.is_error() && node.child_count() == 0 && !node.text_range().is_empty() {
            let unexpected = String::from_utf8_lossy(node.text()).chars().next().unwrap_or('\0');
            let _ = write!(out, "(UNEXPECTED {unexpected:?}");
        } else if node.is_missing() {
            if node.language().is_named(node.kind_id()) {
                let _ = write!(out, "(MISSING {}", node.kind());
            } else {
                let _ = write!(out, "(MISSING {:?}", node.kind());
            }
        } else {
            out.push('(');
            out.push_str(node.kind());
        }
    } else if is_root {
        if node.child_count() > 0 {
            out.push('(');
            out.push_str(node.kind());
            open = true;
        } else {
            let _ = write!(out, "({:?})", node.kind());
        }
    }

    for child in node.children() {
        write_node(child, out, false);
    }

    if open {
        out.push(')');
    }
}
