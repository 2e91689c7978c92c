use std::fmt;

use text_size::TextSize;

/// A zero-based row and byte column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    #[inline]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Byte offsets of line starts, for turning offsets into points.
///
/// Only `\n` terminates a line, so a `\r\n` pair leaves the `\r` at the end of
/// the previous row. Works on arbitrary bytes, valid UTF-8 or not.
#[derive(Debug, Clone)]
pub(crate) struct LineIndex {
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub(crate) fn new(text: &[u8]) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        line_starts.extend(
            text.iter()
                .enumerate()
                .filter(|&(_, &byte)| byte == b'\n')
                .map(|(offset, _)| TextSize::new(offset as u32 + 1)),
        );
        Self { line_starts }
    }

    pub(crate) fn point(&self, offset: TextSize) -> Point {
        let row = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let column = offset - self.line_starts[row];
        Point::new(row, u32::from(column) as usize)
    }
}
