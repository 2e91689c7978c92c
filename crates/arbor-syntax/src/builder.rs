//! Incremental builder for the arena-backed syntax tree.

use la_arena::Arena;
use text_size::{TextRange, TextSize};

use crate::point::LineIndex;
use crate::tree::{NodeData, NodeFlags, NodeId};
use crate::views::NodeViews;
use crate::{FieldId, LanguageTable, Node, Point, ReuseSite, Symbol, Token, TokenSpan, Tree};

struct Opened {
    id: NodeId,
    children: Vec<NodeId>,
    lookahead_end: TextSize,
    has_error: bool,
}

/// Builds a [`Tree`] from a token table and a sequence of node events.
///
/// Nodes are opened and finished in pre-order. Leaves refer to tokens by
/// index, whole subtrees of an older tree can be copied in with
/// [`reuse`](Self::reuse).
pub struct Builder {
    language: &'static LanguageTable,
    text: Box<[u8]>,
    lines: LineIndex,
    tokens: Vec<Token>,
    nodes: Arena<NodeData>,
    children: Vec<NodeId>,

    children_pool: Vec<Vec<NodeId>>,
    opened: Vec<Opened>,
    root: Option<NodeId>,
    next_token: u32,
    last_end: TextSize,
    reused: usize,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 128;
const DEFAULT_CHILDREN_LEN: usize = 10;

impl Builder {
    /// Creates a new builder for `text`, lexed into `tokens`.
    pub fn new(language: &'static LanguageTable, text: &[u8], tokens: Vec<Token>) -> Self {
        Self {
            language,
            text: text.into(),
            lines: LineIndex::new(text),
            nodes: Arena::new(),
            children: Vec::with_capacity(tokens.len()),
            tokens,

            children_pool: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            root: None,
            next_token: 0,
            last_end: TextSize::new(0),
            reused: 0,
        }
    }

    /// Returns the token table the builder was created with.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Retrieves a recycled children buffer or allocates a new one.
    fn new_children_vec(&mut self) -> Vec<NodeId> {
        self.children_pool.pop().unwrap_or_else(|| Vec::with_capacity(DEFAULT_CHILDREN_LEN))
    }

    /// Returns a children buffer to the pool.
    fn recycle_children_vec(&mut self, mut vec: Vec<NodeId>) {
        vec.clear();
        self.children_pool.push(vec);
    }

    /// Returns the index of the first non-extra token at or after `from`.
    fn first_significant_token(&self, from: u32) -> u32 {
        let mut index = from as usize;
        while index + 1 < self.tokens.len() && self.tokens[index].extra {
            index += 1;
        }
        index as u32
    }

    fn node_data(&self, symbol: Symbol, field: Option<FieldId>, range: TextRange) -> NodeData {
        let parent = self.opened.last();
        NodeData {
            symbol,
            field,
            parent: parent.map(|opened| opened.id),
            index_in_parent: parent.map_or(0, |opened| opened.children.len() as u32),
            children_start: 0,
            children_len: 0,
            range,
            start_point: self.lines.point(range.start()),
            end_point: self.lines.point(range.end()),
            lookahead: 0,
            tokens: TokenSpan::default(),
            site: None,
            flags: NodeFlags {
                named: self.language.is_named(symbol),
                has_error: symbol == Symbol::ERROR,
                ..NodeFlags::default()
            },
        }
    }

    /// Attaches a finished node to the innermost open node.
    fn attach(&mut self, id: NodeId) {
        let data = &self.nodes[id];
        let lookahead_end = data.lookahead_end();
        let has_error = data.flags.has_error;
        match self.opened.last_mut() {
            Some(parent) => {
                parent.children.push(id);
                parent.lookahead_end = parent.lookahead_end.max(lookahead_end);
                parent.has_error |= has_error;
            }
            None => self.root = Some(id),
        }
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, symbol: Symbol, field: Option<FieldId>, site: Option<ReuseSite>) {
        let first_token = self.first_significant_token(self.next_token);
        let mut data = self.node_data(symbol, field, TextRange::empty(self.last_end));
        data.site = site;
        data.tokens.start = first_token;
        let id = self.nodes.alloc(data);
        if let Some(parent) = self.opened.last_mut() {
            parent.children.push(id);
        }
        let children = self.new_children_vec();
        self.opened.push(Opened {
            id,
            children,
            lookahead_end: TextSize::new(0),
            has_error: symbol == Symbol::ERROR,
        });
    }

    /// Finishes the most recently started node.
    ///
    /// `lookahead_token` is one past the last token the parser peeked at while
    /// the node was open.
    pub fn finish_node(&mut self, lookahead_token: usize) {
        let opened = self.opened.pop().expect("no opened nodes?");
        let range = match (opened.children.first(), opened.children.last()) {
            (Some(&first), Some(&last)) => {
                TextRange::new(self.nodes[first].range.start(), self.nodes[last].range.end())
            }
            _ => TextRange::empty(self.last_end),
        };

        let token_end = self.next_token;
        let token_lookahead = (lookahead_token.min(self.tokens.len()) as u32).max(token_end);
        let mut lookahead_end = opened.lookahead_end.max(range.end());
        if let Some(token) = (token_lookahead as usize).checked_sub(1).map(|i| self.tokens[i]) {
            lookahead_end = lookahead_end.max(token.lookahead_end());
        }

        let children_start = self.children.len() as u32;
        let children_len = opened.children.len() as u32;
        self.children.extend_from_slice(&opened.children);

        let start_point = self.lines.point(range.start());
        let end_point = self.lines.point(range.end());
        let data = &mut self.nodes[opened.id];
        data.range = range;
        data.start_point = start_point;
        data.end_point = end_point;
        data.children_start = children_start;
        data.children_len = children_len;
        data.lookahead = u32::from(lookahead_end - range.end());
        data.tokens.end = token_end;
        data.tokens.lookahead = token_lookahead;
        data.flags.has_error = opened.has_error;

        let id = opened.id;
        self.recycle_children_vec(opened.children);

        let lookahead_end = self.nodes[id].lookahead_end();
        match self.opened.last_mut() {
            Some(parent) => {
                parent.lookahead_end = parent.lookahead_end.max(lookahead_end);
                parent.has_error |= opened.has_error;
            }
            None => self.root = Some(id),
        }
    }

    /// Consumes the token at `index` as a leaf of kind `symbol`.
    ///
    /// Tokens of hidden symbols are consumed without creating a leaf.
    pub fn token(&mut self, index: usize, symbol: Symbol, field: Option<FieldId>) {
        let token = self.tokens[index];
        self.next_token = index as u32 + 1;
        if !self.language.is_visible(symbol) {
            if let Some(parent) = self.opened.last_mut() {
                parent.lookahead_end = parent.lookahead_end.max(token.lookahead_end());
            }
            return;
        }

        let mut data = self.node_data(symbol, field, token.range);
        data.lookahead = token.lookahead;
        data.flags.extra = token.extra;
        data.tokens = TokenSpan { start: index as u32, end: index as u32 + 1, lookahead: index as u32 + 1 };
        let id = self.nodes.alloc(data);
        self.last_end = token.range.end();
        self.attach(id);
    }

    /// Inserts a zero-width leaf for a token the parser expected but did not
    /// find.
    pub fn missing(&mut self, symbol: Symbol, field: Option<FieldId>) {
        let mut data = self.node_data(symbol, field, TextRange::empty(self.last_end));
        data.flags.missing = true;
        data.flags.has_error = true;
        data.tokens = TokenSpan { start: self.next_token, end: self.next_token, lookahead: self.next_token };
        let id = self.nodes.alloc(data);
        self.attach(id);
    }

    /// Copies `node` from an older tree, attaching it under `field`.
    ///
    /// The old tree must already have every edit applied so that its spans
    /// refer to the text being parsed. Token indexes are shifted so the copy
    /// starts at the next significant token.
    pub fn reuse(&mut self, node: Node<'_>, field: Option<FieldId>) {
        let first_token = self.first_significant_token(self.next_token);
        let delta = i64::from(first_token) - i64::from(node.token_span().start);
        let id = self.copy_subtree(node, field, delta);
        let data = &self.nodes[id];
        self.next_token = data.tokens.end;
        self.last_end = data.range.end();
        self.attach(id);
    }

    fn copy_subtree(&mut self, source: Node<'_>, field: Option<FieldId>, delta: i64) -> NodeId {
        let old = source.tree().data(source.raw_id());
        let shift = |index: u32| (i64::from(index) + delta).max(0) as u32;
        let mut data = self.node_data(old.symbol, field, old.range);
        data.lookahead = old.lookahead;
        data.site = old.site;
        data.flags = NodeFlags { has_changes: false, ..old.flags };
        data.tokens = TokenSpan {
            start: shift(old.tokens.start),
            end: shift(old.tokens.end),
            lookahead: shift(old.tokens.lookahead),
        };
        let id = self.nodes.alloc(data);
        self.reused += 1;

        let children = self.new_children_vec();
        self.opened.push(Opened {
            id,
            children,
            lookahead_end: TextSize::new(0),
            has_error: false,
        });
        for child in source.children() {
            let child_id = self.copy_subtree(child, child.field_id(), delta);
            if let Some(opened) = self.opened.last_mut() {
                opened.children.push(child_id);
            }
        }
        let opened = self.opened.pop().expect("no opened nodes?");
        let data = &mut self.nodes[id];
        data.children_start = self.children.len() as u32;
        data.children_len = opened.children.len() as u32;
        self.children.extend_from_slice(&opened.children);
        self.recycle_children_vec(opened.children);
        id
    }

    /// Finishes building and returns the tree.
    ///
    /// The root is stretched to cover the whole text, so leading and trailing
    /// whitespace belong to it.
    pub fn finish(mut self) -> Tree {
        assert!(self.opened.is_empty(), "unfinished nodes");
        let root = self.root.expect("no root node");

        let text_len = TextSize::new(self.text.len() as u32);
        let end_point = self.lines.point(text_len);
        let data = &mut self.nodes[root];
        let lookahead_end = data.lookahead_end().max(text_len);
        data.range = TextRange::up_to(text_len);
        data.start_point = Point::default();
        data.end_point = end_point;
        data.lookahead = u32::from(lookahead_end - text_len);

        let nodes = std::mem::take(&mut self.nodes);
        let views = NodeViews::new(nodes.len());
        Tree {
            language: self.language,
            text: std::mem::take(&mut self.text),
            nodes,
            children: std::mem::take(&mut self.children).into_boxed_slice(),
            tokens: std::mem::take(&mut self.tokens).into_boxed_slice(),
            root,
            views,
            reused: self.reused,
        }
    }
}
