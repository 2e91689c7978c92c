//! Static grammar metadata: symbol and field name tables.

use std::fmt;
use std::num::NonZeroU16;

/// Newest table layout understood by this crate.
pub const LANGUAGE_VERSION: u32 = 14;

/// Oldest table layout still accepted by the parser.
pub const MIN_COMPATIBLE_LANGUAGE_VERSION: u32 = 13;

/// Numeric node type identifier.
///
/// Identifiers are indexes into [`LanguageTable::symbols`]. Zero is reserved for
/// the end-of-input marker and `u16::MAX` for error nodes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub u16);

impl Symbol {
    /// End of input.
    pub const END: Self = Self(0);
    /// Error nodes produced during recovery.
    pub const ERROR: Self = Self(u16::MAX);

    /// Returns the raw identifier.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ERROR => f.write_str("Symbol(ERROR)"),
            Self(raw) => write!(f, "Symbol({raw})"),
        }
    }
}

/// Numeric field identifier. Field ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(NonZeroU16);

impl FieldId {
    /// Creates a field id from its raw value, or `None` for zero.
    #[inline]
    pub const fn new(raw: u16) -> Option<Self> {
        match NonZeroU16::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Creates a field id in constant context. Panics if `raw` is zero.
    pub const fn from_raw(raw: u16) -> Self {
        match Self::new(raw) {
            Some(field) => field,
            None => panic!("field ids start at 1"),
        }
    }

    /// Returns the raw identifier.
    #[inline]
    pub const fn get(self) -> u16 {
        self.0.get()
    }

    #[inline]
    const fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// Display and classification data for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    /// The node type name, e.g. `identifier` or `(`.
    pub name: &'static str,
    /// Named node types have a grammar rule name; anonymous ones are literal
    /// tokens.
    pub named: bool,
    /// Hidden symbols are consumed by the parser but never become nodes.
    pub visible: bool,
}

impl SymbolInfo {
    /// A named, visible node type.
    pub const fn named(name: &'static str) -> Self {
        Self { name, named: true, visible: true }
    }

    /// An anonymous, visible node type.
    pub const fn anonymous(name: &'static str) -> Self {
        Self { name, named: false, visible: true }
    }

    /// A symbol that never appears in trees.
    pub const fn hidden(name: &'static str) -> Self {
        Self { name, named: false, visible: false }
    }
}

/// Immutable description of a grammar's node types and field names.
///
/// Tables are `'static` and built in constant context by grammar crates.
#[derive(Debug)]
pub struct LanguageTable {
    name: &'static str,
    version: u32,
    symbols: &'static [SymbolInfo],
    fields: &'static [&'static str],
}

const ERROR_NAME: &str = "ERROR";

impl LanguageTable {
    /// Creates a table. `symbols[0]` must describe [`Symbol::END`].
    pub const fn new(
        name: &'static str,
        version: u32,
        symbols: &'static [SymbolInfo],
        fields: &'static [&'static str],
    ) -> Self {
        assert!(!symbols.is_empty(), "symbol 0 is reserved for the end of input");
        assert!(symbols.len() < u16::MAX as usize, "too many symbols");
        assert!(fields.len() < u16::MAX as usize, "too many fields");
        Self { name, version, symbols, fields }
    }

    /// Returns the grammar name, e.g. `python`.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the table layout version.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns whether [`version`](Self::version) is in the supported range.
    #[inline]
    pub fn is_compatible(&self) -> bool {
        (MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&self.version)
    }

    /// Returns the number of symbols, including the reserved end symbol.
    #[inline]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Returns the number of fields.
    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    fn info(&self, symbol: Symbol) -> Option<&'static SymbolInfo> {
        self.symbols.get(usize::from(symbol.0))
    }

    /// Returns the name of `symbol`, or `None` if it is out of range.
    pub fn symbol_name(&self, symbol: Symbol) -> Option<&'static str> {
        if symbol == Symbol::ERROR {
            return Some(ERROR_NAME);
        }
        self.info(symbol).map(|info| info.name)
    }

    /// Returns whether `symbol` is a named node type.
    pub fn is_named(&self, symbol: Symbol) -> bool {
        symbol == Symbol::ERROR || self.info(symbol).is_some_and(|info| info.named)
    }

    /// Returns whether `symbol` produces nodes in trees.
    pub fn is_visible(&self, symbol: Symbol) -> bool {
        symbol == Symbol::ERROR || self.info(symbol).is_some_and(|info| info.visible)
    }

    /// Looks up a visible symbol by name and namedness.
    ///
    /// Anonymous and named symbols may share a name (`"print"` versus
    /// `print`); `named` selects between them.
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<Symbol> {
        if named && name == ERROR_NAME {
            return Some(Symbol::ERROR);
        }
        self.symbols
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, info)| info.visible && info.named == named && info.name == name)
            .map(|(index, _)| Symbol(index as u16))
    }

    /// Returns the name of `field`, or `None` if it is out of range.
    #[inline]
    pub fn field_name_for_id(&self, field: FieldId) -> Option<&'static str> {
        self.fields.get(field.index()).copied()
    }

    /// Looks up a field by name. Accepts `&str`, `String`, `&[u8]` and
    /// anything else viewable as bytes.
    ///
    /// ```compile_fail
    /// # use arbor_syntax::{LanguageTable, SymbolInfo};
    /// # static TABLE: LanguageTable =
    /// #     LanguageTable::new("t", 14, &[SymbolInfo::hidden("end")], &["name"]);
    /// TABLE.field_id_for_name(42);
    /// ```
    pub fn field_id_for_name(&self, name: impl AsRef<[u8]>) -> Option<FieldId> {
        let name = name.as_ref();
        let index = self.fields.iter().position(|field| field.as_bytes() == name)?;
        FieldId::new(index as u16 + 1)
    }

    /// Iterates over all visible symbols with their ids.
    pub fn symbols(&self) -> impl Iterator<Item = (Symbol, &'static SymbolInfo)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, info)| info.visible)
            .map(|(index, info)| (Symbol(index as u16), info))
    }

    /// Iterates over all field names with their ids.
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &'static str)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter_map(|(index, &name)| Some((FieldId::new(index as u16 + 1)?, name)))
    }
}
