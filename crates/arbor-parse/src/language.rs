use std::fmt;
use std::ops::Deref;

use arbor_syntax::{LanguageTable, Token};

use crate::Engine;

/// The executable half of a compiled grammar.
///
/// `tokenize` turns source bytes into a token stream ending with the end
/// token, `parse` drives the [`Engine`] over that stream.
pub trait Grammar: Send + Sync {
    fn tokenize(&self, text: &[u8]) -> Vec<Token>;

    fn parse(&self, p: &mut Engine<'_>);
}

/// A compiled grammar: its symbol table plus its parse entry point.
#[derive(Clone, Copy)]
pub struct Language {
    table: &'static LanguageTable,
    grammar: &'static dyn Grammar,
}

impl Language {
    pub const fn new(table: &'static LanguageTable, grammar: &'static dyn Grammar) -> Self {
        Self { table, grammar }
    }

    #[inline]
    pub fn table(&self) -> &'static LanguageTable {
        self.table
    }

    #[inline]
    pub(crate) fn grammar(&self) -> &'static dyn Grammar {
        self.grammar
    }
}

impl Deref for Language {
    type Target = LanguageTable;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.table
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.table, other.table)
    }
}

impl Eq for Language {}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.table.name())
            .field("version", &self.table.version())
            .finish_non_exhaustive()
    }
}
