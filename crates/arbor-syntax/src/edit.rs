use crate::Point;

/// Describes a single replacement in the source text, in both byte and point
/// coordinates.
///
/// The bytes `start_byte..old_end_byte` of the old text were replaced by
/// `start_byte..new_end_byte` of the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEdit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_position: Point,
    pub old_end_position: Point,
    pub new_end_position: Point,
}

impl InputEdit {
    /// Maps a position in the old text to the new text.
    ///
    /// Positions before the edit are unchanged, positions at or after the old
    /// end are shifted and positions strictly inside the replaced range collapse
    /// to the new end.
    pub fn edit_position(&self, byte: usize, point: Point) -> (usize, Point) {
        if byte >= self.old_end_byte {
            let byte = byte - self.old_end_byte + self.new_end_byte;
            let point = if point.row == self.old_end_position.row {
                Point::new(
                    self.new_end_position.row,
                    self.new_end_position.column
                        + point.column.saturating_sub(self.old_end_position.column),
                )
            } else {
                Point::new(
                    point.row - self.old_end_position.row + self.new_end_position.row,
                    point.column,
                )
            };
            (byte, point)
        } else if byte > self.start_byte {
            (self.new_end_byte, self.new_end_position)
        } else {
            (byte, point)
        }
    }

    pub(crate) fn edit_byte(&self, byte: usize) -> usize {
        if byte >= self.old_end_byte {
            byte - self.old_end_byte + self.new_end_byte
        } else if byte > self.start_byte {
            self.new_end_byte
        } else {
            byte
        }
    }
}
