use crate::Symbol;

const SIZE: usize = 4;

/// Compact constant-built set of symbols, used by grammars for recovery and
/// first sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolSet {
    bits: [u64; SIZE],
}

impl SymbolSet {
    pub const EMPTY: Self = Self { bits: [0; SIZE] };
    const BITS_PER_SLOT: u16 = u64::BITS as u16;

    const fn from_symbol(symbol: Symbol) -> Self {
        let raw = symbol.raw();
        let slot_index = (raw / Self::BITS_PER_SLOT) as usize;

        assert!(
            slot_index < Self::EMPTY.bits.len(),
            "Index out of bounds. Increase the size of the bitset array."
        );

        let mut bits = Self::EMPTY.bits;
        bits[slot_index] = 1 << (raw % Self::BITS_PER_SLOT);

        Self { bits }
    }

    pub const fn union(mut self, other: &Self) -> Self {
        let mut i = 0;

        while i < self.bits.len() {
            self.bits[i] |= other.bits[i];
            i += 1;
        }

        self
    }

    pub const fn new<const N: usize>(symbols: [Symbol; N]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < symbols.len() {
            set = set.union(&Self::from_symbol(symbols[i]));
            i += 1;
        }

        set
    }

    pub const fn contains(&self, symbol: Symbol) -> bool {
        let raw = symbol.raw();
        let slot_index = (raw / Self::BITS_PER_SLOT) as usize;
        if slot_index >= self.bits.len() {
            return false;
        }
        self.bits[slot_index] & (1 << (raw % Self::BITS_PER_SLOT)) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_membership() {
        const A: SymbolSet = SymbolSet::new([Symbol(1), Symbol(70)]);
        const B: SymbolSet = SymbolSet::new([Symbol(200)]);
        let both = A.union(&B);
        assert!(both.contains(Symbol(1)));
        assert!(both.contains(Symbol(70)));
        assert!(both.contains(Symbol(200)));
        assert!(!both.contains(Symbol(2)));
        assert!(!both.contains(Symbol::ERROR));
    }
}
