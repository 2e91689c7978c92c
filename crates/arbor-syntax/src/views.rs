//! Derived per-node views: child lists and lazily built lookup tables.

use std::fmt;
use std::sync::OnceLock;

use crate::tree::NodeId;
use crate::{FieldId, Node, Tree};

/// Lazily computed tables, one slot per node, shared by every handle into the
/// tree.
#[derive(Clone, Default)]
pub(crate) struct NodeViews {
    named_children: Box<[OnceLock<Box<[NodeId]>>]>,
    fields: Box<[OnceLock<Box<[(FieldId, NodeId)]>>]>,
}

impl NodeViews {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            named_children: (0..len).map(|_| OnceLock::new()).collect(),
            fields: (0..len).map(|_| OnceLock::new()).collect(),
        }
    }

    pub(crate) fn named_children<'t>(&'t self, tree: &'t Tree, id: NodeId) -> &'t [NodeId] {
        self.named_children[slot(id)].get_or_init(|| {
            tree.child_ids(id).iter().copied().filter(|&child| tree.data(child).flags.named).collect()
        })
    }

    pub(crate) fn fields<'t>(&'t self, tree: &'t Tree, id: NodeId) -> &'t [(FieldId, NodeId)] {
        self.fields[slot(id)].get_or_init(|| {
            tree.child_ids(id)
                .iter()
                .filter_map(|&child| Some((tree.data(child).field?, child)))
                .collect()
        })
    }
}

#[inline]
fn slot(id: NodeId) -> usize {
    u32::from(id.into_raw()) as usize
}

/// List of child nodes, borrowed from the tree's stored child lists.
///
/// Asking a node for its children twice yields views over the same storage,
/// see [`Children::ptr_eq`].
#[derive(Clone, Copy)]
pub struct Children<'tree> {
    tree: &'tree Tree,
    ids: &'tree [NodeId],
}

impl<'tree> Children<'tree> {
    #[inline]
    pub(crate) fn new(tree: &'tree Tree, ids: &'tree [NodeId]) -> Self {
        Self { tree, ids }
    }

    /// Returns the number of children.
    #[inline]
    pub fn len(self) -> usize {
        self.ids.len()
    }

    /// Returns `true` when there are no children.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the child at `idx`, if present.
    #[inline]
    pub fn get(self, idx: usize) -> Option<Node<'tree>> {
        self.ids.get(idx).map(|&id| Node::new(self.tree, id))
    }

    /// Returns the child at `idx`, panicking if out of bounds.
    #[inline]
    #[track_caller]
    pub fn at(self, idx: usize) -> Node<'tree> {
        Node::new(self.tree, self.ids[idx])
    }

    #[inline]
    pub fn first(self) -> Option<Node<'tree>> {
        self.get(0)
    }

    #[inline]
    pub fn last(self) -> Option<Node<'tree>> {
        self.ids.last().map(|&id| Node::new(self.tree, id))
    }

    /// Returns an iterator over the children.
    #[inline]
    pub fn iter(self) -> ChildrenIter<'tree> {
        ChildrenIter { tree: self.tree, iter: self.ids.iter() }
    }

    /// Returns `true` if both views are backed by the same stored list.
    #[inline]
    pub fn ptr_eq(self, other: Self) -> bool {
        std::ptr::eq(self.ids, other.ids)
    }
}

impl PartialEq for Children<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.ids == other.ids
    }
}

impl Eq for Children<'_> {}

impl fmt::Debug for Children<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'tree> IntoIterator for Children<'tree> {
    type Item = Node<'tree>;
    type IntoIter = ChildrenIter<'tree>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`Children`] view.
#[derive(Clone)]
pub struct ChildrenIter<'tree> {
    tree: &'tree Tree,
    iter: std::slice::Iter<'tree, NodeId>,
}

impl<'tree> Iterator for ChildrenIter<'tree> {
    type Item = Node<'tree>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|&id| Node::new(self.tree, id))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl DoubleEndedIterator for ChildrenIter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|&id| Node::new(self.tree, id))
    }
}

impl ExactSizeIterator for ChildrenIter<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.iter.len()
    }
}
