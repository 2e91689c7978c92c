//! Node handles and navigation.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::str::Utf8Error;

use text_size::{TextRange, TextSize};

use crate::tree::{NodeData, NodeId};
use crate::views::Children;
use crate::{FieldId, LanguageTable, Point, ReuseSite, Symbol, TokenSpan, Tree, TreeCursor};

/// Node handle tied to the lifetime of the tree.
///
/// Handles are plain (tree, index) pairs: two handles are equal when they
/// point at the same position of the same tree.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    id: NodeId,
}

impl<'tree> Node<'tree> {
    #[inline]
    pub(crate) fn new(tree: &'tree Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    #[inline]
    fn data(self) -> &'tree NodeData {
        self.tree.data(self.id)
    }

    #[inline]
    fn with(self, id: NodeId) -> Self {
        Self { tree: self.tree, id }
    }

    #[inline]
    pub(crate) fn raw_id(self) -> NodeId {
        self.id
    }

    /// Returns a number unique to this node within its tree.
    #[inline]
    pub fn id(self) -> usize {
        u32::from(self.id.into_raw()) as usize
    }

    /// Returns the tree this node belongs to.
    #[inline]
    pub fn tree(self) -> &'tree Tree {
        self.tree
    }

    /// Returns the language table of the tree.
    #[inline]
    pub fn language(self) -> &'static LanguageTable {
        self.tree.language
    }

    /// Returns the node type name, e.g. `identifier` or `(`.
    #[inline]
    pub fn kind(self) -> &'static str {
        self.tree.language.symbol_name(self.data().symbol).unwrap_or_default()
    }

    /// Returns the numeric node type.
    #[inline]
    pub fn kind_id(self) -> Symbol {
        self.data().symbol
    }

    /// Returns `true` for named nodes, `false` for anonymous tokens.
    #[inline]
    pub fn is_named(self) -> bool {
        self.data().flags.named
    }

    /// Returns `true` for extra nodes such as comments.
    #[inline]
    pub fn is_extra(self) -> bool {
        self.data().flags.extra
    }

    /// Returns `true` for `ERROR` nodes.
    #[inline]
    pub fn is_error(self) -> bool {
        self.data().symbol == Symbol::ERROR
    }

    /// Returns `true` for zero-width nodes the parser inserted to recover from
    /// a missing token.
    #[inline]
    pub fn is_missing(self) -> bool {
        self.data().flags.missing
    }

    /// Returns `true` if this node is, or contains, an error or missing node.
    #[inline]
    pub fn has_error(self) -> bool {
        self.data().flags.has_error
    }

    /// Returns `true` if an edit touched this node since it was parsed.
    #[inline]
    pub fn has_changes(self) -> bool {
        self.data().flags.has_changes
    }

    #[inline]
    pub fn start_byte(self) -> usize {
        usize::from(self.data().range.start())
    }

    #[inline]
    pub fn end_byte(self) -> usize {
        usize::from(self.data().range.end())
    }

    #[inline]
    pub fn byte_range(self) -> Range<usize> {
        self.start_byte()..self.end_byte()
    }

    #[inline]
    pub fn text_range(self) -> TextRange {
        self.data().range
    }

    #[inline]
    pub fn start_point(self) -> Point {
        self.data().start_point
    }

    #[inline]
    pub fn end_point(self) -> Point {
        self.data().end_point
    }

    /// Returns the source bytes covered by this node.
    ///
    /// After an edit the span refers to the new text while the tree still
    /// holds the old one; spans past the end of the old text yield an empty
    /// slice.
    #[inline]
    pub fn text(self) -> &'tree [u8] {
        self.tree.text.get(self.byte_range()).unwrap_or_default()
    }

    /// Returns the source text covered by this node as UTF-8.
    #[inline]
    pub fn utf8_text(self) -> Result<&'tree str, Utf8Error> {
        std::str::from_utf8(self.text())
    }

    /// Returns the parent node if any.
    #[inline]
    pub fn parent(self) -> Option<Self> {
        Some(self.with(self.data().parent?))
    }

    /// Returns an iterator of ancestors starting from this node.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = Node<'tree>> + Clone {
        std::iter::successors(Some(self), |it| it.parent())
    }

    /// Returns all direct children in source order.
    #[inline]
    pub fn children(self) -> Children<'tree> {
        Children::new(self.tree, self.tree.child_ids(self.id))
    }

    /// Returns the named direct children in source order.
    ///
    /// The list is computed on first use and cached in the tree.
    #[inline]
    pub fn named_children(self) -> Children<'tree> {
        Children::new(self.tree, self.tree.views.named_children(self.tree, self.id))
    }

    #[inline]
    pub fn child_count(self) -> usize {
        self.data().children_len as usize
    }

    #[inline]
    pub fn child(self, idx: usize) -> Option<Self> {
        self.children().get(idx)
    }

    #[inline]
    pub fn named_child_count(self) -> usize {
        self.named_children().len()
    }

    #[inline]
    pub fn named_child(self, idx: usize) -> Option<Self> {
        self.named_children().get(idx)
    }

    /// Returns the first child attached under `field`.
    ///
    /// ```compile_fail
    /// # fn demo(node: arbor_syntax::Node<'_>) {
    /// node.child_by_field_id("name");
    /// # }
    /// ```
    pub fn child_by_field_id(self, field: FieldId) -> Option<Self> {
        self.children_by_field_id(field).next()
    }

    /// Returns the first child attached under the field called `name`.
    ///
    /// Unknown field names yield `None`.
    ///
    /// ```compile_fail
    /// # fn demo(node: arbor_syntax::Node<'_>) {
    /// node.child_by_field_name(1u16);
    /// # }
    /// ```
    pub fn child_by_field_name(self, name: impl AsRef<[u8]>) -> Option<Self> {
        let field = self.language().field_id_for_name(name)?;
        self.child_by_field_id(field)
    }

    /// Returns every child attached under `field`.
    pub fn children_by_field_id(self, field: FieldId) -> impl Iterator<Item = Node<'tree>> {
        self.tree
            .views
            .fields(self.tree, self.id)
            .iter()
            .filter(move |&&(id, _)| id == field)
            .map(move |&(_, child)| self.with(child))
    }

    /// Returns every child attached under the field called `name`.
    pub fn children_by_field_name(self, name: impl AsRef<[u8]>) -> impl Iterator<Item = Node<'tree>> {
        let field = self.language().field_id_for_name(name);
        field.into_iter().flat_map(move |field| self.children_by_field_id(field))
    }

    /// Returns the field under which this node is attached to its parent.
    #[inline]
    pub fn field_id(self) -> Option<FieldId> {
        self.data().field
    }

    /// Returns the name of the field under which this node is attached to its
    /// parent.
    #[inline]
    pub fn field_name(self) -> Option<&'static str> {
        self.language().field_name_for_id(self.field_id()?)
    }

    /// Returns the field name of the child at `idx`.
    #[inline]
    pub fn field_name_for_child(self, idx: usize) -> Option<&'static str> {
        self.child(idx)?.field_name()
    }

    #[inline]
    fn siblings(self) -> &'tree [NodeId] {
        match self.data().parent {
            Some(parent) => self.tree.child_ids(parent),
            None => &[],
        }
    }

    /// Returns the following sibling, named or not.
    #[inline]
    pub fn next_sibling(self) -> Option<Self> {
        let index = self.data().index_in_parent as usize;
        self.siblings().get(index + 1).map(|&id| self.with(id))
    }

    /// Returns the preceding sibling, named or not.
    #[inline]
    pub fn prev_sibling(self) -> Option<Self> {
        let index = (self.data().index_in_parent as usize).checked_sub(1)?;
        self.siblings().get(index).map(|&id| self.with(id))
    }

    /// Returns the following named sibling.
    pub fn next_named_sibling(self) -> Option<Self> {
        let index = self.data().index_in_parent as usize;
        self.siblings()[(index + 1).min(self.siblings().len())..]
            .iter()
            .map(|&id| self.with(id))
            .find(|node| node.is_named())
    }

    /// Returns the preceding named sibling.
    pub fn prev_named_sibling(self) -> Option<Self> {
        let index = (self.data().index_in_parent as usize).min(self.siblings().len());
        self.siblings()[..index].iter().rev().map(|&id| self.with(id)).find(|node| node.is_named())
    }

    /// Returns the first child that ends after `byte`.
    pub fn first_child_for_byte(self, byte: usize) -> Option<Self> {
        self.children().iter().find(|child| child.end_byte() > byte)
    }

    /// Returns the first named child that ends after `byte`.
    pub fn first_named_child_for_byte(self, byte: usize) -> Option<Self> {
        self.named_children().iter().find(|child| child.end_byte() > byte)
    }

    /// Returns the smallest node within this one that spans `start..end`.
    pub fn descendant_for_byte_range(self, start: usize, end: usize) -> Option<Self> {
        self.descend_to(start, end, false)
    }

    /// Returns the smallest named node within this one that spans
    /// `start..end`.
    pub fn named_descendant_for_byte_range(self, start: usize, end: usize) -> Option<Self> {
        self.descend_to(start, end, true)
    }

    fn descend_to(self, start: usize, end: usize, named: bool) -> Option<Self> {
        if start > end || start < self.start_byte() || end > self.end_byte() {
            return None;
        }
        let mut node = self;
        let mut last_visible = self;
        'descend: loop {
            for child in node.children() {
                if child.start_byte() > start {
                    break;
                }
                // A child ending exactly at `start` only covers empty ranges.
                let covers = child.end_byte() > start || (start == end && child.end_byte() == start);
                if covers && child.end_byte() >= end && child.start_byte() <= start {
                    node = child;
                    if !named || node.is_named() {
                        last_visible = node;
                    }
                    continue 'descend;
                }
            }
            break;
        }
        Some(last_visible)
    }

    /// Returns the number of nodes in this subtree, itself included.
    pub fn descendant_count(self) -> usize {
        self.preorder().count()
    }

    /// Iterates over this node and its descendants in pre-order.
    #[inline]
    pub fn preorder(self) -> Preorder<'tree> {
        Preorder { stack: vec![self] }
    }

    /// Returns a cursor positioned on this node.
    #[inline]
    pub fn walk(self) -> TreeCursor<'tree> {
        TreeCursor::new(self)
    }

    /// Returns the reuse site the grammar tagged this node with.
    #[inline]
    pub fn reuse_site(self) -> Option<ReuseSite> {
        self.data().site
    }

    /// Returns the token indexes this node consumed and looked at.
    #[inline]
    pub fn token_span(self) -> TokenSpan {
        self.data().tokens
    }

    /// Returns the offset one past the last byte that influenced this node.
    #[inline]
    pub fn lookahead_end(self) -> TextSize {
        self.data().lookahead_end()
    }

    /// Renders the subtree as an s-expression of named nodes.
    pub fn sexp(self) -> String {
        crate::sexp::render(self)
    }

    /// Alias of [`sexp`](Self::sexp).
    #[inline]
    pub fn to_sexp(self) -> String {
        self.sexp()
    }
}

impl PartialEq for Node<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Node {} {} - {}}}", self.kind(), self.start_point(), self.end_point())
    }
}

/// Pre-order traversal over a subtree.
#[derive(Clone)]
pub struct Preorder<'tree> {
    stack: Vec<Node<'tree>>,
}

impl<'tree> Iterator for Preorder<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
