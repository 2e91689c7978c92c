//! Bundled grammars: subsets of Python and JavaScript.
//!
//! Each grammar is a hand-written lexer plus a recursive descent parser over
//! [`arbor_parse::Engine`], producing trees shaped like the upstream
//! tree-sitter grammars for the constructs it covers.

use arbor_parse::Language;

/// Declares symbol constants and the matching table, in order. Symbol 0 is
/// the end of input.
macro_rules! symbols {
    ($($name:ident = $info:expr,)*) => {
        #[allow(dead_code, non_camel_case_types, clippy::upper_case_acronyms)]
        #[repr(u16)]
        enum Index {
            END,
            $($name,)*
        }

        $(#[allow(dead_code)]
        pub(crate) const $name: arbor_syntax::Symbol = arbor_syntax::Symbol(Index::$name as u16);)*

        pub(crate) const SYMBOLS: &[arbor_syntax::SymbolInfo] = &[
            arbor_syntax::SymbolInfo::hidden("end"),
            $($info,)*
        ];
    };
}

/// Declares field constants and the matching name table. Field ids start at 1.
macro_rules! fields {
    ($($name:ident = $text:literal,)*) => {
        #[allow(dead_code, non_camel_case_types, clippy::upper_case_acronyms)]
        #[repr(u16)]
        enum Index {
            $($name,)*
        }

        $(#[allow(dead_code)]
        pub(crate) const $name: arbor_syntax::FieldId =
            arbor_syntax::FieldId::from_raw(Index::$name as u16 + 1);)*

        pub(crate) const FIELDS: &[&str] = &[$($text,)*];
    };
}

mod javascript;
mod python;
#[cfg(test)]
mod tests;

pub static PYTHON: Language = Language::new(&python::TABLE, &python::PythonGrammar);

pub static JAVASCRIPT: Language = Language::new(&javascript::TABLE, &javascript::JavaScriptGrammar);

/// Every bundled language.
pub fn languages() -> [&'static Language; 2] {
    [&PYTHON, &JAVASCRIPT]
}

/// Looks a bundled language up by name or common file extension.
pub fn language_for_name(name: &str) -> Option<&'static Language> {
    match name {
        "python" | "py" => Some(&PYTHON),
        "javascript" | "js" | "mjs" | "cjs" => Some(&JAVASCRIPT),
        _ => None,
    }
}
