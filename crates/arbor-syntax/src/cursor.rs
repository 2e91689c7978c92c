use crate::tree::NodeId;
use crate::{FieldId, Node, Tree};

/// Stateful walker over one tree.
///
/// The cursor is always positioned on a node. It never moves above the node
/// it was created on, and [`node`](Self::node) returns the same handle until
/// the next successful move.
#[derive(Clone)]
pub struct TreeCursor<'tree> {
    tree: &'tree Tree,
    stack: Vec<NodeId>,
    node: Node<'tree>,
}

impl<'tree> TreeCursor<'tree> {
    pub(crate) fn new(node: Node<'tree>) -> Self {
        let mut stack = Vec::with_capacity(16);
        stack.push(node.raw_id());
        Self { tree: node.tree(), stack, node }
    }

    /// Returns the current node.
    #[inline]
    pub fn node(&self) -> Node<'tree> {
        self.node
    }

    /// Returns how many levels below the starting node the cursor is.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Returns the field under which the current node is attached to its
    /// parent. Always `None` at the starting node.
    #[inline]
    pub fn field_id(&self) -> Option<FieldId> {
        if self.stack.len() == 1 {
            return None;
        }
        self.node.field_id()
    }

    /// Returns the name of the field under which the current node is attached
    /// to its parent.
    #[inline]
    pub fn field_name(&self) -> Option<&'static str> {
        self.tree.language().field_name_for_id(self.field_id()?)
    }

    /// Alias of [`field_name`](Self::field_name).
    #[inline]
    pub fn current_field_name(&self) -> Option<&'static str> {
        self.field_name()
    }

    #[inline]
    fn move_to(&mut self, node: Node<'tree>) {
        if let Some(top) = self.stack.last_mut() {
            *top = node.raw_id();
        }
        self.node = node;
    }

    #[inline]
    fn descend(&mut self, node: Node<'tree>) {
        self.stack.push(node.raw_id());
        self.node = node;
    }

    /// Moves to the first child. Returns `false` and stays put if there is
    /// none.
    pub fn goto_first_child(&mut self) -> bool {
        match self.node.child(0) {
            Some(child) => {
                self.descend(child);
                true
            }
            None => false,
        }
    }

    /// Moves to the last child. Returns `false` and stays put if there is
    /// none.
    pub fn goto_last_child(&mut self) -> bool {
        match self.node.children().last() {
            Some(child) => {
                self.descend(child);
                true
            }
            None => false,
        }
    }

    /// Moves to the first child that ends after `byte` and returns its index.
    pub fn goto_first_child_for_byte(&mut self, byte: usize) -> Option<usize> {
        let (index, child) =
            self.node.children().iter().enumerate().find(|(_, child)| child.end_byte() > byte)?;
        self.descend(child);
        Some(index)
    }

    /// Moves to the following sibling. Returns `false` at the starting node or
    /// when there is no following sibling.
    pub fn goto_next_sibling(&mut self) -> bool {
        if self.stack.len() == 1 {
            return false;
        }
        match self.node.next_sibling() {
            Some(sibling) => {
                self.move_to(sibling);
                true
            }
            None => false,
        }
    }

    /// Moves to the preceding sibling. Returns `false` at the starting node
    /// or when there is no preceding sibling.
    pub fn goto_previous_sibling(&mut self) -> bool {
        if self.stack.len() == 1 {
            return false;
        }
        match self.node.prev_sibling() {
            Some(sibling) => {
                self.move_to(sibling);
                true
            }
            None => false,
        }
    }

    /// Moves to the parent. Returns `false` at the starting node.
    pub fn goto_parent(&mut self) -> bool {
        if self.stack.len() == 1 {
            return false;
        }
        self.stack.pop();
        let top = self.stack[self.stack.len() - 1];
        self.node = Node::new(self.tree, top);
        true
    }

    /// Repositions the cursor on `node`, which becomes the new starting node.
    pub fn reset(&mut self, node: Node<'tree>) {
        self.tree = node.tree();
        self.stack.clear();
        self.stack.push(node.raw_id());
        self.node = node;
    }
}
