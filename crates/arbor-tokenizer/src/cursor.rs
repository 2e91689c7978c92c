use std::cell::Cell;

use text_size::{TextRange, TextSize};

pub const EOF_CHAR: char = '\0';

/// Character cursor over raw source bytes.
///
/// Bytes are decoded as UTF-8 one character at a time. A byte that does not
/// start a valid sequence decodes as U+FFFD and is consumed alone, so every
/// byte belongs to exactly one character. Offsets are always in bytes.
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    token_start: usize,
    furthest: Cell<usize>,
    previous: char,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0, token_start: 0, furthest: Cell::new(0), previous: EOF_CHAR }
    }

    #[inline]
    pub fn offset(&self) -> TextSize {
        TextSize::new(self.pos as u32)
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        TextSize::new(self.bytes.len() as u32)
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    pub fn previous(&self) -> char {
        self.previous
    }

    /// Decodes the character at `at`, recording that it was inspected.
    fn char_at(&self, at: usize) -> (char, usize) {
        let (c, width) = decode(self.bytes.get(at..).unwrap_or_default());
        self.furthest.set(self.furthest.get().max(at + width.max(1)));
        (c, width)
    }

    #[inline]
    pub fn peek(&self) -> char {
        self.char_at(self.pos).0
    }

    #[inline]
    pub fn second(&self) -> char {
        let (_, width) = self.char_at(self.pos);
        if width == 0 {
            return EOF_CHAR;
        }
        self.char_at(self.pos + width).0
    }

    #[inline]
    pub fn matches(&self, c: char) -> bool {
        !self.is_eof() && self.peek() == c
    }

    pub fn advance(&mut self) -> char {
        let (c, width) = self.char_at(self.pos);
        self.pos += width;
        self.previous = c;
        c
    }

    pub fn eat(&mut self, c: char) -> bool {
        if self.matches(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances while `f` holds. Reaching the end of input counts as having
    /// looked one byte ahead.
    pub fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        loop {
            let c = self.peek();
            if self.is_eof() || !f(c) {
                break;
            }
            self.advance();
        }
    }

    /// Forgets everything consumed since the last token start.
    pub fn reset_pos_within_token(&mut self) {
        self.token_start = self.pos;
        self.furthest.set(self.pos);
    }

    #[inline]
    pub fn pos_within_token(&self) -> TextSize {
        TextSize::new((self.pos - self.token_start) as u32)
    }

    #[inline]
    pub fn token_range(&self) -> TextRange {
        TextRange::new(TextSize::new(self.token_start as u32), self.offset())
    }

    #[inline]
    pub fn token_text(&self) -> &'a [u8] {
        &self.bytes[self.token_start..self.pos]
    }

    /// Bytes past the current position inspected since the token started.
    #[inline]
    pub fn lookahead(&self) -> u32 {
        self.furthest.get().saturating_sub(self.pos) as u32
    }
}

fn decode(bytes: &[u8]) -> (char, usize) {
    let Some(&first) = bytes.first() else { return (EOF_CHAR, 0) };
    if first.is_ascii() {
        return (char::from(first), 1);
    }
    let width = match first {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return (char::REPLACEMENT_CHARACTER, 1),
    };
    match bytes.get(..width).map(std::str::from_utf8) {
        Some(Ok(s)) => (s.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER), width),
        _ => (char::REPLACEMENT_CHARACTER, 1),
    }
}
