//! Arena-backed concrete syntax tree and in-place edit application.

use std::fmt;
use std::num::NonZeroU16;

use la_arena::{Arena, Idx};
use text_size::{TextRange, TextSize};

use crate::views::NodeViews;
use crate::{FieldId, InputEdit, LanguageTable, Node, Point, Symbol, Token, TreeCursor};

pub(crate) type NodeId = Idx<NodeData>;

/// Tag for a grammar call site whose output can be reused across parses.
///
/// Two nodes built at the same site from the same tokens are interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReuseSite(NonZeroU16);

impl ReuseSite {
    /// Creates a site tag. Panics in constant context if `raw` is zero.
    pub const fn new(raw: u16) -> Self {
        match NonZeroU16::new(raw) {
            Some(raw) => Self(raw),
            None => panic!("reuse sites start at 1"),
        }
    }
}

/// Token indexes a node consumed and inspected, into [`Tree::tokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenSpan {
    /// First significant (non-extra) token of the node.
    pub start: u32,
    /// One past the last token consumed by the node.
    pub end: u32,
    /// One past the last token the parser peeked at before the node was
    /// finished. Never less than `end`.
    pub lookahead: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NodeFlags {
    pub(crate) named: bool,
    pub(crate) extra: bool,
    pub(crate) missing: bool,
    pub(crate) has_error: bool,
    pub(crate) has_changes: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) symbol: Symbol,
    pub(crate) field: Option<FieldId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) index_in_parent: u32,
    pub(crate) children_start: u32,
    pub(crate) children_len: u32,
    pub(crate) range: TextRange,
    pub(crate) start_point: Point,
    pub(crate) end_point: Point,
    /// Bytes past `range.end()` that influenced this node.
    pub(crate) lookahead: u32,
    pub(crate) tokens: TokenSpan,
    pub(crate) site: Option<ReuseSite>,
    pub(crate) flags: NodeFlags,
}

impl NodeData {
    #[inline]
    pub(crate) fn lookahead_end(&self) -> TextSize {
        self.range.end() + TextSize::new(self.lookahead)
    }
}

/// Owned syntax tree for a single source text.
#[derive(Clone)]
pub struct Tree {
    pub(crate) language: &'static LanguageTable,
    pub(crate) text: Box<[u8]>,
    pub(crate) nodes: Arena<NodeData>,
    pub(crate) children: Box<[NodeId]>,
    pub(crate) tokens: Box<[Token]>,
    pub(crate) root: NodeId,
    pub(crate) views: NodeViews,
    pub(crate) reused: usize,
}

impl Tree {
    /// Returns the root syntax node.
    #[inline]
    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, self.root)
    }

    /// Returns a cursor positioned on the root node.
    #[inline]
    pub fn walk(&self) -> TreeCursor<'_> {
        self.root_node().walk()
    }

    /// Returns the language table the tree was parsed with.
    #[inline]
    pub fn language(&self) -> &'static LanguageTable {
        self.language
    }

    /// Returns the source text as it was at parse time.
    ///
    /// Edits adjust node spans but never the stored text.
    #[inline]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Returns the token stream the tree was parsed from, with edits applied
    /// to its spans.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the number of nodes, including anonymous leaves.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns how many nodes were copied from a previous tree while parsing.
    #[inline]
    pub fn reused_node_count(&self) -> usize {
        self.reused
    }

    /// Iterates nodes carrying a reuse site, outermost first for nodes that
    /// share a start byte.
    pub fn reusable_nodes(&self) -> impl Iterator<Item = (ReuseSite, Node<'_>)> {
        self.nodes
            .iter()
            .filter_map(move |(id, data)| Some((data.site?, Node::new(self, id))))
    }

    #[inline]
    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }

    #[inline]
    pub(crate) fn child_ids(&self, id: NodeId) -> &[NodeId] {
        let data = &self.nodes[id];
        let start = data.children_start as usize;
        &self.children[start..start + data.children_len as usize]
    }

    /// Applies `edit` to every node and token span.
    ///
    /// Spans wholly before the edit keep their positions, spans at or after
    /// the old end are shifted, and every node the edit may have influenced is
    /// marked as changed together with its ancestors. Reparse with this tree
    /// as the previous tree to reuse the unchanged parts.
    ///
    /// Nodes and cursors borrow the tree, so none can be held across an edit:
    ///
    /// ```compile_fail
    /// # fn demo(tree: &mut arbor_syntax::Tree, edit: &arbor_syntax::InputEdit) {
    /// let root = tree.root_node();
    /// tree.edit(edit);
    /// root.kind();
    /// # }
    /// ```
    pub fn edit(&mut self, edit: &InputEdit) {
        let _span = tracing::debug_span!(
            "edit",
            start = edit.start_byte,
            old_end = edit.old_end_byte,
            new_end = edit.new_end_byte
        )
        .entered();

        let mut changed = Vec::new();
        for (id, data) in self.nodes.iter_mut() {
            let start = usize::from(data.range.start());
            let end = usize::from(data.range.end());
            let lookahead_end = usize::from(data.lookahead_end());
            let touched = start <= edit.old_end_byte
                && (lookahead_end > edit.start_byte || (start == end && start >= edit.start_byte));
            if touched {
                data.flags.has_changes = true;
                changed.push(id);
            } else if start <= edit.old_end_byte {
                continue;
            }

            let (new_start, start_point) = edit.edit_position(start, data.start_point);
            let (new_end, end_point) = edit.edit_position(end, data.end_point);
            let new_end = new_end.max(new_start);
            data.range = TextRange::new(text_size(new_start), text_size(new_end));
            data.start_point = start_point;
            data.end_point = end_point.max(start_point);
        }

        // A zero-width node at the edit start may sit in a parent that ends
        // there, which the span test alone misses.
        for id in changed {
            let mut parent = self.nodes[id].parent;
            while let Some(id) = parent {
                let data = &mut self.nodes[id];
                data.flags.has_changes = true;
                parent = data.parent;
            }
        }

        for token in &mut self.tokens {
            let start = usize::from(token.range.start());
            let end = usize::from(token.range.end());
            if end < edit.start_byte || (end == edit.start_byte && start < end) {
                continue;
            }
            let new_start = edit.edit_byte(start);
            let new_end = edit.edit_byte(end).max(new_start);
            token.range = TextRange::new(text_size(new_start), text_size(new_end));
        }
    }
}

#[inline]
fn text_size(offset: usize) -> TextSize {
    TextSize::new(u32::try_from(offset).unwrap_or(u32::MAX))
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("language", &self.language.name())
            .field("text_len", &self.text.len())
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}
