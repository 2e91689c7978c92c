//! Unresolved pattern trees, as written in the query source.

/// A name together with the byte offset it was written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Name {
    pub(crate) text: String,
    pub(crate) offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Quantifier {
    #[default]
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Quantifier {
    pub(crate) fn allows_zero(self) -> bool {
        matches!(self, Self::ZeroOrOne | Self::ZeroOrMore)
    }

    pub(crate) fn allows_many(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Item {
    pub(crate) kind: ItemKind,
    pub(crate) field: Option<Name>,
    pub(crate) quantifier: Quantifier,
    pub(crate) captures: Vec<Name>,
    pub(crate) offset: usize,
}

#[derive(Debug, Clone)]
pub(crate) enum ItemKind {
    /// `(type children...)`; a `None` type is the named wildcard `(_)`.
    Node { kind: Option<Name>, negated: Vec<Name>, children: Vec<Item> },
    /// Bare `_`.
    Wildcard,
    /// `"text"`.
    Anonymous(Name),
    /// `( (a) (b) )`.
    Group(Vec<Item>),
    /// `[ (a) (b) ]`.
    Alternation(Vec<Item>),
    /// `.`
    Anchor,
}

#[derive(Debug, Clone)]
pub(crate) enum Argument {
    Capture(Name),
    String(Name),
}

#[derive(Debug, Clone)]
pub(crate) struct Predicate {
    /// Operator without the leading `#`, e.g. `eq?`.
    pub(crate) operator: Name,
    pub(crate) args: Vec<Argument>,
}

/// One top-level pattern with the predicates written anywhere inside it.
#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    pub(crate) item: Item,
    pub(crate) predicates: Vec<Predicate>,
}
