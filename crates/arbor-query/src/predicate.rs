//! Predicates attached to patterns.
//!
//! Text predicates are evaluated while matching. `#set!` directives and
//! unknown predicates are handed to the caller untouched.

use arbor_syntax::Node;
use regex_automata::meta::Regex;

/// An argument of a predicate that is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPredicateArg {
    Capture(u32),
    String(Box<str>),
}

/// A predicate the query engine does not evaluate itself, e.g. `#is?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPredicate {
    /// Operator without the leading `#`.
    pub operator: Box<str>,
    pub args: Box<[QueryPredicateArg]>,
}

/// A `#set!` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryProperty {
    pub key: Box<str>,
    pub value: Option<Box<str>>,
    pub capture_id: Option<u32>,
}

#[derive(Debug, Clone)]
pub(crate) enum Operand {
    Capture(u32),
    Text(Box<[u8]>),
}

#[derive(Debug, Clone)]
pub(crate) enum TextPredicate {
    Eq { capture: u32, operand: Operand, negated: bool, any: bool },
    Match { capture: u32, regex: Regex, negated: bool, any: bool },
    AnyOf { capture: u32, values: Box<[Box<[u8]>]>, negated: bool },
}

fn nodes<'a, 'tree>(
    captures: &'a [(u32, Node<'tree>)],
    capture: u32,
) -> impl Iterator<Item = Node<'tree>> + 'a {
    captures.iter().filter(move |(index, _)| *index == capture).map(|&(_, node)| node)
}

impl TextPredicate {
    /// Checks the predicate against one match. Predicates over captures
    /// the match did not bind hold trivially.
    pub(crate) fn holds(&self, captures: &[(u32, Node<'_>)]) -> bool {
        match self {
            Self::Eq { capture, operand, negated, any } => {
                let test = |node: Node<'_>| match operand {
                    Operand::Text(text) => node.text() == &**text,
                    Operand::Capture(other) => {
                        nodes(captures, *other).all(|other| other.text() == node.text())
                    }
                };
                quantify(nodes(captures, *capture), *any, |node| test(node) != *negated)
            }
            Self::Match { capture, regex, negated, any } => {
                quantify(nodes(captures, *capture), *any, |node| {
                    regex.is_match(node.text()) != *negated
                })
            }
            Self::AnyOf { capture, values, negated } => nodes(captures, *capture)
                .all(|node| values.iter().any(|value| node.text() == &**value) != *negated),
        }
    }
}

/// `all` over the captured nodes, or `any` for the `#any-` variants. No
/// nodes means the predicate holds.
fn quantify<'tree>(
    mut nodes: impl Iterator<Item = Node<'tree>>,
    any: bool,
    mut test: impl FnMut(Node<'tree>) -> bool,
) -> bool {
    if !any {
        return nodes.all(test);
    }
    let mut seen = false;
    for node in nodes {
        if test(node) {
            return true;
        }
        seen = true;
    }
    !seen
}
