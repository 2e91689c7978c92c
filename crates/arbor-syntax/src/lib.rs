//! Concrete syntax trees with byte and point spans, in-place edits, cursors
//! and cached per-node views.
//!
//! Trees are built once by [`Builder`] and then navigated through [`Node`]
//! handles, which are a tree reference plus an arena index.

mod builder;
mod cursor;
mod edit;
mod language;
mod node;
mod point;
mod sexp;
mod symbol_set;
mod token;
mod tree;
mod views;


/// Incremental builder for constructing a `Tree`.
pub use builder::Builder;
/// Stateful tree walker.
pub use cursor::TreeCursor;
pub use edit::InputEdit;
/// Grammar metadata.
pub use language::{
    FieldId, LANGUAGE_VERSION, LanguageTable, MIN_COMPATIBLE_LANGUAGE_VERSION, Symbol, SymbolInfo,
};
/// Node handles and traversal.
pub use node::{Node, Preorder};
pub use point::Point;
/// Compact set for grouping `Symbol` values.
pub use symbol_set::SymbolSet;
pub use token::Token;
pub use tree::{ReuseSite, TokenSpan, Tree};
pub use views::{Children, ChildrenIter};

/// Re-exported so grammar crates can build tokens without a direct dependency.
pub use text_size::{TextRange, TextSize};
