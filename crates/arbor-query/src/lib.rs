//! S-expression tree queries.
//!
//! A query is a list of patterns such as
//! `(function_definition name: (identifier) @name)`, compiled once against a
//! language's symbol and field names and then run over any number of trees.
//!
//! ```text
//! (call function: (identifier) @callee (#eq? @callee "print"))
//! ["if" "else"] @keyword
//! (block . (_) @first)
//! ```

mod ast;
mod compile;
mod error;
mod lexer;
mod parser;
mod predicate;
mod query;
#[cfg(test)]
mod tests;

use arbor_syntax::LanguageTable;

pub use error::{QueryError, QueryErrorKind};
pub use predicate::{QueryPredicate, QueryPredicateArg, QueryProperty};
pub use query::{Query, QueryCapture, QueryMatch};

/// Adds `language.query(source)` to language tables and everything that
/// dereferences to one.
pub trait LanguageQueryExt {
    fn query(&self, source: &str) -> Result<Query, QueryError>;
}

impl LanguageQueryExt for LanguageTable {
    #[inline]
    fn query(&self, source: &str) -> Result<Query, QueryError> {
        Query::new(self, source)
    }
}
