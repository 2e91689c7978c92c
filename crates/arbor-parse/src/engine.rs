use std::cell::Cell;

use arbor_syntax::{
    Builder, FieldId, LanguageTable, Node, ReuseSite, Symbol, SymbolSet, Token, Tree,
};
use drop_bomb::DropBomb;
use rustc_hash::FxHashMap;
use text_size::{TextRange, TextSize};

const STEP_LIMIT: u32 = 10_000_000;

/// Old-tree nodes that may be copied into the tree being built.
pub(crate) struct ReuseIndex<'a> {
    tokens: &'a [Token],
    candidates: FxHashMap<(usize, ReuseSite), Node<'a>>,
}

impl<'a> ReuseIndex<'a> {
    pub(crate) fn new(old_tree: &'a Tree) -> Self {
        let mut candidates = FxHashMap::default();
        for (site, node) in old_tree.reusable_nodes() {
            if node.has_changes() || node.has_error() {
                continue;
            }
            candidates.entry((node.start_byte(), site)).or_insert(node);
        }
        Self { tokens: old_tree.tokens(), candidates }
    }
}

/// Grammar-facing parser state.
///
/// Grammars inspect upcoming tokens with [`peek`](Self::peek) and friends,
/// consume them with [`bump`](Self::bump), and shape the tree with markers.
/// Extra tokens are invisible to these operations and are attached to the
/// tree automatically.
pub struct Engine<'a> {
    language: &'static LanguageTable,
    text: &'a [u8],
    tokens: &'a [Token],
    significant: Vec<u32>,
    cursor: usize,
    emitted: usize,
    high_water: Cell<usize>,
    steps: Cell<u32>,
    depth: u32,
    events: Vec<Event<'a>>,
    reuse: Option<ReuseIndex<'a>>,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(
        language: &'static LanguageTable,
        text: &'a [u8],
        tokens: &'a [Token],
        reuse: Option<ReuseIndex<'a>>,
    ) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.extra)
            .map(|(index, _)| index as u32)
            .collect();
        Self {
            language,
            text,
            tokens,
            significant,
            cursor: 0,
            emitted: 0,
            high_water: Cell::new(0),
            steps: Cell::new(0),
            depth: 0,
            events: Vec::with_capacity(tokens.len() * 2),
            reuse,
        }
    }

    /// Returns the language table being parsed with.
    #[inline]
    pub fn language(&self) -> &'static LanguageTable {
        self.language
    }

    /// Returns the raw index of the `n`th significant token ahead.
    fn nth_index(&self, n: usize) -> Option<usize> {
        let steps = self.steps.get();
        assert!(steps <= STEP_LIMIT, "the parser seems stuck");
        self.steps.set(steps + 1);

        let index = *self.significant.get(self.cursor + n)? as usize;
        self.high_water.set(self.high_water.get().max(index + 1));
        Some(index)
    }

    /// Returns the kind of the `n`th upcoming token.
    pub fn nth(&self, n: usize) -> Symbol {
        self.nth_index(n).map_or(Symbol::END, |index| self.tokens[index].symbol)
    }

    #[inline]
    pub fn peek(&self) -> Symbol {
        self.nth(0)
    }

    #[inline]
    pub fn at(&self, kind: Symbol) -> bool {
        self.peek() == kind
    }

    #[inline]
    pub fn nth_at(&self, n: usize, kind: Symbol) -> bool {
        self.nth(n) == kind
    }

    #[inline]
    pub fn at_set(&self, set: &SymbolSet) -> bool {
        set.contains(self.peek())
    }

    /// Returns the span of the current token.
    pub fn current_range(&self) -> TextRange {
        self.nth_index(0)
            .map_or(TextRange::empty(TextSize::new(self.text.len() as u32)), |index| {
                self.tokens[index].range
            })
    }

    /// Returns the source bytes of the current token.
    pub fn current_text(&self) -> &'a [u8] {
        let range = self.current_range();
        &self.text[usize::from(range.start())..usize::from(range.end())]
    }

    /// Returns `true` if a line break separates the current token from the
    /// previous significant one.
    pub fn has_newline_before(&self) -> bool {
        let end = self.current_range().start();
        let start = match self.cursor.checked_sub(1) {
            Some(previous) => self.tokens[self.significant[previous] as usize].range.end(),
            None => TextSize::new(0),
        };
        self.text[usize::from(start)..usize::from(end)].contains(&b'\n')
    }

    /// Records the extra tokens before raw index `until`.
    fn emit_extras(&mut self, until: usize) {
        while self.emitted < until {
            let kind = self.tokens[self.emitted].symbol;
            self.events.push(Event::Token {
                index: self.emitted as u32,
                kind,
                field: None,
                forward_parent: None,
            });
            self.emitted += 1;
        }
    }

    /// Consumes the current token as `kind`, attaching it under `field`.
    /// Does nothing at the end of input.
    pub fn bump_with(&mut self, kind: Symbol, field: Option<FieldId>) {
        let Some(index) = self.nth_index(0) else { return };
        if self.tokens[index].symbol == Symbol::END {
            return;
        }
        self.emit_extras(index);
        self.events.push(Event::Token { index: index as u32, kind, field, forward_parent: None });
        self.emitted = index + 1;
        self.cursor += 1;
        self.steps.set(0);
    }

    /// Consumes the current token as a leaf that a later node may wrap with
    /// [`CompletedMarker::precede`]. Returns `None` at the end of input.
    pub fn bump_leaf(&mut self) -> Option<CompletedMarker> {
        let kind = self.peek();
        if kind == Symbol::END {
            return None;
        }
        self.bump_with(kind, None);
        let pos = self.events.len() as u32 - 1;
        Some(CompletedMarker::new(pos, kind))
    }

    #[inline]
    pub fn bump(&mut self) {
        let kind = self.peek();
        self.bump_with(kind, None);
    }

    /// Consumes the current token, giving it another kind, e.g. an
    /// identifier used as a property name.
    #[inline]
    pub fn bump_as(&mut self, kind: Symbol) {
        self.bump_with(kind, None);
    }

    #[inline]
    pub fn bump_field(&mut self, field: FieldId) {
        let kind = self.peek();
        self.bump_with(kind, Some(field));
    }

    pub fn eat(&mut self, kind: Symbol) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes `kind` or inserts a missing leaf in its place.
    pub fn expect(&mut self, kind: Symbol) -> bool {
        self.expect_field(kind, None)
    }

    pub fn expect_field(&mut self, kind: Symbol, field: Option<FieldId>) -> bool {
        if self.at(kind) {
            self.bump_with(kind, field);
            true
        } else {
            self.missing(kind, field);
            false
        }
    }

    /// Inserts a zero-width leaf for a token that should have been here.
    pub fn missing(&mut self, kind: Symbol, field: Option<FieldId>) {
        self.events.push(Event::Missing { kind, field });
    }

    /// Wraps the current token in an `ERROR` node unless it belongs to
    /// `recovery` or input has ended.
    pub fn error_recover(&mut self, recovery: &SymbolSet) {
        if self.at_set(recovery) || self.at(Symbol::END) {
            return;
        }
        let m = self.start();
        self.bump();
        m.complete(self, Symbol::ERROR);
    }

    /// Wraps every token up to the next one in `recovery` in a single
    /// `ERROR` node.
    pub fn error_until(&mut self, recovery: &SymbolSet) {
        if self.at_set(recovery) || self.at(Symbol::END) {
            return;
        }
        let m = self.start();
        while !self.at_set(recovery) && !self.at(Symbol::END) {
            self.bump();
        }
        m.complete(self, Symbol::ERROR);
    }

    pub fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        self.depth += 1;
        Marker::new(pos)
    }

    /// Runs `parse` at a context-free call site, or copies a node the
    /// previous tree built at the same site from the same tokens.
    pub fn reusable(
        &mut self,
        site: ReuseSite,
        parse: impl FnOnce(&mut Self) -> Option<CompletedMarker>,
    ) -> Option<CompletedMarker> {
        if let Some(completed) = self.try_reuse(site) {
            return Some(completed);
        }
        let completed = parse(self)?;
        if let Event::Start { site: slot, .. } = &mut self.events[completed.pos as usize] {
            *slot = Some(site);
        }
        Some(completed)
    }

    fn try_reuse(&mut self, site: ReuseSite) -> Option<CompletedMarker> {
        let first = *self.significant.get(self.cursor)? as usize;
        let start = usize::from(self.tokens[first].range.start());
        let (node, old_tokens) = {
            let reuse = self.reuse.as_ref()?;
            (*reuse.candidates.get(&(start, site))?, reuse.tokens)
        };

        let span = node.token_span();
        if span.end <= span.start {
            return None;
        }
        let old = old_tokens.get(span.start as usize..span.lookahead as usize)?;
        let new = self.tokens.get(first..first + old.len())?;
        let same = old.iter().zip(new).all(|(old, new)| {
            old.symbol == new.symbol && old.range == new.range && old.extra == new.extra
        });
        if !same {
            return None;
        }

        tracing::trace!(kind = node.kind(), start, "reusing node");
        let end = first + (span.end - span.start) as usize;
        let seen = first + old.len();
        self.high_water.set(self.high_water.get().max(seen));
        self.emit_extras(first);
        let pos = self.events.len() as u32;
        self.events.push(Event::Start {
            kind: Some(node.kind_id()),
            forward_parent: None,
            field: None,
            site: Some(site),
            reused: Some(node),
        });
        self.emitted = end;
        self.cursor = self.significant.partition_point(|&index| (index as usize) < end);
        self.steps.set(0);
        Some(CompletedMarker::new(pos, node.kind_id()))
    }

    /// Replays the recorded events into a tree.
    pub(crate) fn build_tree(self) -> Tree {
        let Engine { language, text, tokens, mut events, .. } = self;
        let mut replay = Replay {
            builder: Builder::new(language, text, tokens.to_vec()),
            pending: Vec::new(),
            open: 0,
        };
        let mut forward_parents = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind: None, .. } => {}
                Event::Start { kind: Some(kind), forward_parent, field, site, reused } => {
                    forward_parents.push((PendingStart { kind, field, site }, reused));
                    collect_forward_parents(&mut events, i, forward_parent, &mut forward_parents);
                    replay.open(forward_parents.drain(..).rev());
                }
                Event::Token { index, kind, field, forward_parent } => {
                    if forward_parent.is_some() {
                        collect_forward_parents(
                            &mut events,
                            i,
                            forward_parent,
                            &mut forward_parents,
                        );
                        replay.open(forward_parents.drain(..).rev());
                    }
                    // Leading extras belong to the node enclosing the ones
                    // that are about to start.
                    if tokens[index as usize].extra {
                        replay.open_root();
                    } else {
                        replay.flush();
                    }
                    replay.builder.token(index as usize, kind, field);
                }
                Event::Missing { kind, field } => {
                    replay.flush();
                    replay.builder.missing(kind, field);
                }
                Event::Finish { lookahead } => {
                    replay.flush();
                    replay.builder.finish_node(lookahead as usize);
                    replay.open -= 1;
                }
            }
        }

        replay.flush();
        replay.builder.finish()
    }
}

struct Replay {
    builder: Builder,
    pending: Vec<PendingStart>,
    open: usize,
}

/// Follows the `forward_parent` chain starting at event `idx`, taking the
/// wrapping nodes out of `events` innermost first.
fn collect_forward_parents<'a>(
    events: &mut [Event<'a>],
    mut idx: usize,
    mut forward_parent: Option<u32>,
    out: &mut Vec<(PendingStart, Option<Node<'a>>)>,
) {
    while let Some(fwd) = forward_parent {
        idx += fwd as usize;
        forward_parent = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
            Event::Start { kind, forward_parent, field, site, reused } => {
                if let Some(kind) = kind {
                    out.push((PendingStart { kind, field, site }, reused));
                }
                forward_parent
            }
            _ => unreachable!(),
        };
    }
}

impl Replay {
    /// Queues nodes outermost first. Reused nodes are copied right away.
    fn open<'a>(&mut self, starts: impl Iterator<Item = (PendingStart, Option<Node<'a>>)>) {
        for (start, reused) in starts {
            match reused {
                Some(node) => {
                    self.flush();
                    self.builder.reuse(node, start.field);
                }
                None => self.pending.push(start),
            }
        }
    }

    fn start(&mut self, start: PendingStart) {
        self.builder.start_node(start.kind, start.field, start.site);
        self.open += 1;
    }

    fn flush(&mut self) {
        for start in std::mem::take(&mut self.pending) {
            self.start(start);
        }
    }

    /// Starts the outermost pending node if nothing is open yet.
    fn open_root(&mut self) {
        if self.open == 0 && !self.pending.is_empty() {
            let root = self.pending.remove(0);
            self.start(root);
        }
    }
}

struct PendingStart {
    kind: Symbol,
    field: Option<FieldId>,
    site: Option<ReuseSite>,
}

enum Event<'a> {
    Start {
        kind: Option<Symbol>,
        forward_parent: Option<u32>,
        field: Option<FieldId>,
        site: Option<ReuseSite>,
        reused: Option<Node<'a>>,
    },
    Token {
        index: u32,
        kind: Symbol,
        field: Option<FieldId>,
        forward_parent: Option<u32>,
    },
    Missing {
        kind: Symbol,
        field: Option<FieldId>,
    },
    Finish {
        lookahead: u32,
    },
}

impl Event<'_> {
    const TOMBSTONE: Self =
        Self::Start { kind: None, forward_parent: None, field: None, site: None, reused: None };
}

pub struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Self {
        Self { position: pos, bomb: DropBomb::new("Marker must be either completed or abandoned") }
    }

    pub fn complete(mut self, p: &mut Engine<'_>, kind: Symbol) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => {
                *slot = Some(kind);
            }
            _ => unreachable!(),
        }

        p.depth -= 1;
        if p.depth == 0 {
            // Trailing extras end up in the outermost node.
            let end = p.significant.last().map_or(p.tokens.len(), |&index| index as usize);
            p.emit_extras(end);
        }
        p.events.push(Event::Finish { lookahead: p.high_water.get() as u32 });
        CompletedMarker::new(self.position, kind)
    }

    pub fn abandon(mut self, p: &mut Engine<'_>) {
        self.bomb.defuse();
        p.depth -= 1;
        if self.position as usize == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Start { kind: None, forward_parent: None, .. }) => (),
                _ => unreachable!(),
            }
        }
    }
}

#[derive(Clone, Copy)]
pub struct CompletedMarker {
    pos: u32,
    kind: Symbol,
}

impl CompletedMarker {
    fn new(pos: u32, kind: Symbol) -> Self {
        Self { pos, kind }
    }

    #[inline]
    pub fn kind(self) -> Symbol {
        self.kind
    }

    /// Attaches the completed node under `field` in its parent.
    pub fn set_field(self, p: &mut Engine<'_>, field: FieldId) -> Self {
        match &mut p.events[self.pos as usize] {
            Event::Start { field: slot, .. } | Event::Token { field: slot, .. } => {
                *slot = Some(field);
            }
            _ => unreachable!(),
        }
        self
    }

    /// Starts a new node that will wrap this one.
    pub fn precede(self, p: &mut Engine<'_>) -> Marker {
        let new_pos = p.start();

        match &mut p.events[self.pos as usize] {
            Event::Start { forward_parent, .. } | Event::Token { forward_parent, .. } => {
                *forward_parent = Some(new_pos.position - self.pos);
            }
            _ => unreachable!(),
        }

        new_pos
    }
}
