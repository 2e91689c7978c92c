#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryErrorKind {
    #[error("Invalid node type {0}")]
    NodeType(String),
    #[error("Invalid field name {0}")]
    Field(String),
    #[error("Invalid capture name {0}")]
    Capture(String),
    #[error("Invalid predicate {0}")]
    Predicate(String),
    #[error("Invalid syntax at offset {0}")]
    Syntax(usize),
}

impl QueryErrorKind {
    /// Lower ranks win when a query has several problems.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Self::NodeType(_) => 0,
            Self::Field(_) => 1,
            Self::Capture(_) => 2,
            Self::Predicate(_) => 3,
            Self::Syntax(_) => 4,
        }
    }
}

/// A query that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct QueryError {
    pub kind: QueryErrorKind,
    /// Byte offset of the offending text in the query source.
    pub offset: usize,
    pub row: usize,
    /// Byte column within `row`.
    pub column: usize,
}

impl QueryError {
    pub(crate) fn new(source: &str, offset: usize, kind: QueryErrorKind) -> Self {
        let offset = offset.min(source.len());
        let before = &source.as_bytes()[..offset];
        let row = before.iter().filter(|&&b| b == b'\n').count();
        let column = offset - before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
        Self { kind, offset, row, column }
    }
}
