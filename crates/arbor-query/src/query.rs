use std::cmp::Reverse;
use std::fmt;

use arbor_syntax::{LanguageTable, Node};
use indexmap::IndexSet;
use rustc_hash::FxHashSet;

use crate::ast::Quantifier;
use crate::compile::{CompiledPattern, Compiler, KindTest, Step, Test};
use crate::predicate::{QueryPredicate, QueryProperty};
use crate::{QueryError, parser};

/// A compiled set of patterns for one language.
///
/// Queries are immutable; running one never changes its state, so the same
/// query may be used from several threads.
pub struct Query {
    language: &'static str,
    patterns: Box<[CompiledPattern]>,
    capture_names: IndexSet<Box<str>>,
}

/// One node bound to a capture name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCapture<'tree> {
    pub node: Node<'tree>,
    pub index: u32,
}

/// All captures of one successful pattern match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch<'tree> {
    pub pattern_index: usize,
    pub captures: Vec<QueryCapture<'tree>>,
}

impl Query {
    /// Compiles `source` against the symbol and field names of `language`.
    pub fn new(language: &LanguageTable, source: &str) -> Result<Self, QueryError> {
        let _span = tracing::debug_span!("compile query", language = language.name()).entered();

        let parsed = parser::parse(source);
        let mut compiler = Compiler::new(language, source);
        let patterns: Box<[_]> =
            parsed.patterns.iter().map(|pattern| compiler.pattern(pattern)).collect();
        if let Some(offset) = parsed.syntax_error {
            compiler.syntax_error(offset);
        }
        let capture_names = compiler.finish().inspect_err(|err| {
            tracing::debug!(%err, offset = err.offset, "query rejected");
        })?;

        tracing::debug!(patterns = patterns.len(), captures = capture_names.len(), "compiled");
        Ok(Self { language: language.name(), patterns, capture_names })
    }

    #[inline]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Returns the capture names in order of first appearance.
    pub fn capture_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.capture_names.iter().map(|name| &**name)
    }

    #[inline]
    pub fn capture_name(&self, index: u32) -> Option<&str> {
        self.capture_names.get_index(index as usize).map(|name| &**name)
    }

    #[inline]
    pub fn capture_index_for_name(&self, name: &str) -> Option<u32> {
        self.capture_names.get_index_of(name).map(|index| index as u32)
    }

    /// Returns the byte offset at which pattern `index` starts in the query
    /// source.
    pub fn start_byte_for_pattern(&self, index: usize) -> Option<usize> {
        self.patterns.get(index).map(|pattern| pattern.start_byte)
    }

    /// Returns the `#set!` directives of pattern `index`.
    pub fn property_settings(&self, index: usize) -> &[QueryProperty] {
        self.patterns.get(index).map_or(&[], |pattern| &pattern.properties)
    }

    /// Returns the predicates of pattern `index` that are left to the caller.
    pub fn general_predicates(&self, index: usize) -> &[QueryPredicate] {
        self.patterns.get(index).map_or(&[], |pattern| &pattern.general_predicates)
    }

    /// Runs every pattern against `node` and its descendants.
    ///
    /// Matches come in pre-order of the node they start at, then in pattern
    /// order. Each match is reported once per distinct set of captures.
    pub fn matches<'tree>(&self, node: Node<'tree>) -> Vec<QueryMatch<'tree>> {
        let _span = tracing::trace_span!("matches", root = node.kind()).entered();
        let matcher = Matcher { boundary: node };
        let mut matches = Vec::new();
        let mut found = Vec::new();

        for candidate in node.preorder() {
            for (pattern_index, pattern) in self.patterns.iter().enumerate() {
                found.clear();
                matcher.sequence(
                    std::slice::from_ref(&pattern.root),
                    Some(candidate),
                    Mode::Exact,
                    &Vec::new(),
                    &mut found,
                );

                let mut seen: Vec<&Bindings<'tree>> = Vec::new();
                for (after, bindings) in &found {
                    if *after == Some(candidate) || seen.contains(&bindings) {
                        continue;
                    }
                    seen.push(bindings);
                    if !pattern.text_predicates.iter().all(|predicate| predicate.holds(bindings)) {
                        continue;
                    }
                    matches.push(QueryMatch {
                        pattern_index,
                        captures: bindings
                            .iter()
                            .map(|&(index, node)| QueryCapture { node, index })
                            .collect(),
                    });
                }
            }
        }

        tracing::trace!(matches = matches.len(), "matched");
        matches
    }

    /// Returns every captured node with its capture name, ordered by start
    /// byte with enclosing nodes first.
    ///
    /// A node captured under the same name by several matches of the same
    /// pattern is reported once.
    pub fn captures<'tree>(&self, node: Node<'tree>) -> Vec<(Node<'tree>, &str)> {
        let mut seen = FxHashSet::default();
        let mut captures = Vec::new();
        for m in self.matches(node) {
            for capture in m.captures {
                if seen.insert((m.pattern_index, capture.node, capture.index)) {
                    captures.push(capture);
                }
            }
        }
        captures.sort_by_key(|capture| (capture.node.start_byte(), Reverse(capture.node.end_byte())));
        captures
            .into_iter()
            .map(|capture| (capture.node, self.capture_name(capture.index).unwrap_or_default()))
            .collect()
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("language", &self.language)
            .field("patterns", &self.patterns.len())
            .field("capture_names", &self.capture_names)
            .finish()
    }
}

type Bindings<'tree> = Vec<(u32, Node<'tree>)>;

/// Where the next step may start relative to the current position.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// At the current position only.
    Exact,
    /// At the current position or after anonymous siblings.
    Anchored,
    /// Anywhere at or after the current position.
    Gap,
}

struct Matcher<'tree> {
    /// The node matching started from. Top-level sequences never continue
    /// past it.
    boundary: Node<'tree>,
}

impl<'tree> Matcher<'tree> {
    fn next(&self, node: Node<'tree>) -> Option<Node<'tree>> {
        if node == self.boundary { None } else { node.next_sibling() }
    }

    fn candidates(&self, pos: Option<Node<'tree>>, mode: Mode) -> Vec<Node<'tree>> {
        let mut candidates = Vec::new();
        let mut current = pos;
        while let Some(node) = current {
            candidates.push(node);
            match mode {
                Mode::Exact => break,
                Mode::Anchored if node.is_named() => break,
                _ => current = self.next(node),
            }
        }
        candidates
    }

    /// Matches `steps` against the siblings starting at `pos`, pushing the
    /// position after the last consumed sibling with the bindings so far.
    fn sequence(
        &self,
        steps: &[Step],
        pos: Option<Node<'tree>>,
        mode: Mode,
        bindings: &Bindings<'tree>,
        out: &mut Vec<(Option<Node<'tree>>, Bindings<'tree>)>,
    ) {
        let Some((step, rest)) = steps.split_first() else {
            out.push((pos, bindings.clone()));
            return;
        };

        if let Test::Anchor = step.test {
            if rest.is_empty() {
                let mut current = pos;
                while let Some(node) = current {
                    if node.is_named() {
                        return;
                    }
                    current = self.next(node);
                }
                out.push((pos, bindings.clone()));
            } else {
                let mode = if mode == Mode::Exact { Mode::Exact } else { Mode::Anchored };
                self.sequence(rest, pos, mode, bindings, out);
            }
            return;
        }

        if step.quantifier == Quantifier::One {
            for node in self.candidates(pos, mode) {
                for (after, bindings) in self.single(step, node, bindings) {
                    self.sequence(rest, after, Mode::Gap, &bindings, out);
                }
            }
            return;
        }

        // Quantified steps commit to the earliest, longest run that lets the
        // rest of the sequence match.
        for node in self.candidates(pos, mode) {
            for (after, bindings) in self.repeat(step, node, bindings) {
                let before = out.len();
                self.sequence(rest, after, Mode::Gap, &bindings, out);
                if out.len() > before {
                    return;
                }
            }
        }
        if step.quantifier.allows_zero() {
            self.sequence(rest, pos, mode, bindings, out);
        }
    }

    /// Runs of consecutive matches of `step` starting at `node`, longest
    /// first. Only anonymous siblings may separate repetitions.
    fn repeat(
        &self,
        step: &Step,
        node: Node<'tree>,
        bindings: &Bindings<'tree>,
    ) -> Vec<(Option<Node<'tree>>, Bindings<'tree>)> {
        let mut runs = Vec::new();
        let Some((mut after, mut bindings)) = self.single(step, node, bindings).into_iter().next()
        else {
            return runs;
        };
        runs.push((after, bindings.clone()));

        while step.quantifier.allows_many() {
            let next = self
                .candidates(after, Mode::Anchored)
                .into_iter()
                .find_map(|node| self.single(step, node, &bindings).into_iter().next());
            let Some(next) = next else { break };
            (after, bindings) = next;
            runs.push((after, bindings.clone()));
        }

        runs.reverse();
        runs
    }

    /// Matches `step` with its first consumed sibling being `node`.
    fn single(
        &self,
        step: &Step,
        node: Node<'tree>,
        bindings: &Bindings<'tree>,
    ) -> Vec<(Option<Node<'tree>>, Bindings<'tree>)> {
        if step.field.is_some() && node.field_id() != step.field {
            return Vec::new();
        }

        let mut bound = bindings.clone();
        bound.extend(step.captures.iter().map(|&index| (index, node)));

        match &step.test {
            Test::Node { kind, negated, children } => {
                let kind_matches = match *kind {
                    KindTest::Symbol(symbol) => node.kind_id() == symbol,
                    KindTest::Named => node.is_named(),
                    KindTest::Any => true,
                };
                if !kind_matches
                    || negated.iter().any(|&field| node.child_by_field_id(field).is_some())
                {
                    return Vec::new();
                }

                let after = self.next(node);
                if children.is_empty() {
                    return vec![(after, bound)];
                }
                let mut inner = Vec::new();
                self.sequence(children, node.child(0), Mode::Gap, &bound, &mut inner);
                inner.into_iter().map(|(_, bindings)| (after, bindings)).collect()
            }
            Test::Group(steps) => {
                let mut out = Vec::new();
                self.sequence(steps, Some(node), Mode::Exact, &bound, &mut out);
                out
            }
            Test::Alternation(alternatives) => alternatives
                .iter()
                .flat_map(|alternative| self.single(alternative, node, &bound))
                .collect(),
            Test::Anchor => Vec::new(),
        }
    }
}
