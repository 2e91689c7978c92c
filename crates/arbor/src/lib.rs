//! Incremental parsing into concrete syntax trees, with s-expression
//! queries over the result.
//!
//! ```
//! use arbor::{LanguageQueryExt as _, PYTHON, Parser};
//!
//! let mut parser = Parser::new();
//! parser.set_language(&PYTHON).unwrap();
//! let tree = parser.parse("def greet(name):\n    print(name)\n", None).unwrap();
//!
//! let query = PYTHON.query("(call function: (identifier) @callee)").unwrap();
//! let callees: Vec<_> = query
//!     .captures(tree.root_node())
//!     .into_iter()
//!     .map(|(node, _)| node.utf8_text().unwrap())
//!     .collect();
//! assert_eq!(callees, ["print"]);
//! ```
//!
//! After editing the source, describe the change with [`InputEdit`], apply
//! it to the old tree and hand that tree back to the parser so unchanged
//! statements are reused.

pub use arbor_langs::{JAVASCRIPT, PYTHON, language_for_name, languages};
pub use arbor_parse::{Grammar, Language, LanguageError, ParseError, Parser};
pub use arbor_query::{
    LanguageQueryExt, Query, QueryCapture, QueryError, QueryErrorKind, QueryMatch,
    QueryPredicate, QueryPredicateArg, QueryProperty,
};
pub use arbor_syntax::{
    Children, ChildrenIter, FieldId, InputEdit, LANGUAGE_VERSION, LanguageTable,
    MIN_COMPATIBLE_LANGUAGE_VERSION, Node, Point, Preorder, Symbol, SymbolInfo, Tree, TreeCursor,
};

/// Building blocks for writing grammars.
pub mod grammar {
    pub use arbor_parse::{CompletedMarker, Engine, Marker};
    pub use arbor_syntax::{ReuseSite, SymbolSet, TextRange, TextSize, Token};
    pub use arbor_tokenizer::{Cursor, Tokenizer};
}
