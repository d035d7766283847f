use std::fmt;

/// A tightly-packed column of fixed-size component payloads.
///
/// Row `r` occupies bytes `r * size .. (r + 1) * size`. The owning
/// archetype keeps every column in lock-step with its entity rows.
/// Payloads are plain bytes; there is no drop glue.
pub struct Column {
    size: usize,
    data: Vec<u8>,
}

impl Column {
    /// Creates a column for payloads of `size` bytes, with room for
    /// `rows` rows.
    pub fn with_capacity(size: usize, rows: usize) -> Self {
        let data = Vec::with_capacity(size * rows);

        Self { size, data }
    }

    /// The payload size of this column in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The number of rows currently stored.
    pub fn rows(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            self.data.len() / self.size
        }
    }

    /// Appends a zeroed row.
    pub fn push_row(&mut self) {
        self.data.resize(self.data.len() + self.size, 0);
    }

    /// The payload bytes of a row.
    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.size..(row + 1) * self.size]
    }

    /// The payload bytes of a row, mutably.
    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        &mut self.data[row * self.size..(row + 1) * self.size]
    }

    /// Overwrites a row with `bytes`.
    pub fn write(&mut self, row: usize, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), self.size);

        self.row_mut(row).copy_from_slice(bytes);
    }

    /// Copies a row out of `source` into a row of this column.
    ///
    /// Both columns must have the same payload size.
    pub fn copy_row_from(&mut self, source: &Column, source_row: usize, row: usize) {
        debug_assert_eq!(source.size, self.size);

        self.row_mut(row).copy_from_slice(source.row(source_row));
    }

    /// Removes a row by moving the last row into its place.
    pub fn swap_remove_row(&mut self, row: usize) {
        let last = self.data.len() - self.size;

        self.data.copy_within(last.., row * self.size);
        self.data.truncate(last);
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("size", &self.size)
            .field("rows", &self.rows())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_read_rows() {
        let mut column = Column::with_capacity(4, 16);

        column.push_row();
        column.push_row();

        column.write(0, &[1, 2, 3, 4]);
        column.write(1, &[5, 6, 7, 8]);

        assert_eq!(column.rows(), 2);
        assert_eq!(column.row(0), [1, 2, 3, 4]);
        assert_eq!(column.row(1), [5, 6, 7, 8]);
    }

    #[test]
    fn new_rows_are_zeroed() {
        let mut column = Column::with_capacity(2, 16);

        column.push_row();

        assert_eq!(column.row(0), [0, 0]);
    }

    #[test]
    fn swap_remove_moves_tail() {
        let mut column = Column::with_capacity(1, 16);

        for byte in [10, 20, 30] {
            column.push_row();
            column.write(column.rows() - 1, &[byte]);
        }

        column.swap_remove_row(0);

        assert_eq!(column.rows(), 2);
        assert_eq!(column.row(0), [30]);
        assert_eq!(column.row(1), [20]);
    }

    #[test]
    fn swap_remove_last_row() {
        let mut column = Column::with_capacity(1, 16);

        column.push_row();
        column.write(0, &[42]);
        column.push_row();
        column.write(1, &[43]);

        column.swap_remove_row(1);

        assert_eq!(column.rows(), 1);
        assert_eq!(column.row(0), [42]);
    }

    #[test]
    fn zero_sized_payloads() {
        let mut column = Column::with_capacity(0, 16);

        column.push_row();
        column.write(0, &[]);

        assert_eq!(column.row(0), [0u8; 0]);
    }
}
