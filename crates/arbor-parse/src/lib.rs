//! Event-based recursive descent parsing with incremental reuse.
//!
//! A [`Language`] pairs a symbol table with a [`Grammar`]. The [`Parser`]
//! tokenizes the input, lets the grammar drive an [`Engine`] over the token
//! stream, and replays the recorded events into a tree.

use arbor_syntax::{LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION, Tree};

mod engine;
mod language;
#[cfg(test)]
mod tests;

pub use engine::{CompletedMarker, Engine, Marker};
pub use language::{Grammar, Language};

use crate::engine::ReuseIndex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    #[error(
        "incompatible language version {version} for `{name}`, expected {min} through {max}"
    )]
    Version { name: &'static str, version: u32, min: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no language set")]
    LanguageNotSet,
}

/// Turns source bytes into syntax trees for one language at a time.
///
/// The parser keeps nothing between calls except its language.
#[derive(Debug, Default)]
pub struct Parser {
    language: Option<Language>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the language used by later calls to [`parse`](Self::parse).
    ///
    /// Tables built for another language version are rejected and the
    /// previous language is kept.
    pub fn set_language(&mut self, language: &Language) -> Result<(), LanguageError> {
        if !language.is_compatible() {
            return Err(LanguageError::Version {
                name: language.name(),
                version: language.version(),
                min: MIN_COMPATIBLE_LANGUAGE_VERSION,
                max: LANGUAGE_VERSION,
            });
        }
        self.language = Some(*language);
        Ok(())
    }

    #[inline]
    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    /// Parses `text` into a tree.
    ///
    /// When `old_tree` is given it must have every edit made since it was
    /// parsed applied through [`Tree::edit`]; its unchanged subtrees are
    /// copied instead of being parsed again. Malformed input never fails,
    /// it produces `ERROR` and missing nodes instead.
    pub fn parse(
        &mut self,
        text: impl AsRef<[u8]>,
        old_tree: Option<&Tree>,
    ) -> Result<Tree, ParseError> {
        let language = self.language.ok_or(ParseError::LanguageNotSet)?;
        let text = text.as_ref();
        let _span = tracing::debug_span!("parse", language = language.name(), len = text.len())
            .entered();

        let reuse = match old_tree {
            Some(old_tree) if std::ptr::eq(old_tree.language(), language.table()) => {
                Some(ReuseIndex::new(old_tree))
            }
            Some(old_tree) => {
                tracing::warn!(
                    old = old_tree.language().name(),
                    new = language.name(),
                    "previous tree has another language, parsing from scratch"
                );
                None
            }
            None => None,
        };

        let tokens = language.grammar().tokenize(text);
        tracing::trace!(tokens = tokens.len(), "tokenized");

        let mut engine = Engine::new(language.table(), text, &tokens, reuse);
        language.grammar().parse(&mut engine);
        let tree = engine.build_tree();

        tracing::debug!(nodes = tree.node_count(), reused = tree.reused_node_count(), "parsed");
        Ok(tree)
    }
}
