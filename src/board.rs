//! Board primitives: player colours, toroidal coordinates and the cell map.
//!
//! The board is a dense 121-cell array where `None` marks an empty cell. It is
//! `Copy`, so search nodes and playouts can snapshot it without allocating.

use std::fmt;

use crate::constants::{CELLS, N};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }

    /// Single-character marker used in board dumps.
    pub fn marker(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Blue => 'B',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "RED"),
            Color::Blue => write!(f, "BLUE"),
        }
    }
}

/// A cell on the board, `(row, column)` with both components in `[0, N)`.
///
/// Offsets and unit steps wrap around modulo `N`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    r: u8,
    c: u8,
}

impl Coord {
    /// Build a coordinate, reducing both components modulo `N`.
    #[inline]
    pub const fn new(r: usize, c: usize) -> Self {
        Coord {
            r: (r % N) as u8,
            c: (c % N) as u8,
        }
    }

    /// Build a coordinate only if both components are on the board.
    pub fn checked(r: usize, c: usize) -> Option<Self> {
        (r < N && c < N).then(|| Coord::new(r, c))
    }

    #[inline]
    pub fn row(self) -> usize {
        self.r as usize
    }

    #[inline]
    pub fn col(self) -> usize {
        self.c as usize
    }

    /// Index into a row-major cell array.
    #[inline]
    pub fn index(self) -> usize {
        self.row() * N + self.col()
    }

    /// Inverse of [`Coord::index`].
    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Coord::new(idx / N, idx % N)
    }

    /// Translate by `offset` component-wise, wrapping around.
    #[inline]
    pub fn translate(self, offset: Coord) -> Self {
        Coord::new(self.row() + offset.row(), self.col() + offset.col())
    }

    /// The coordinate that `offset` must be added to in order to reach `self`.
    #[inline]
    pub fn untranslate(self, offset: Coord) -> Self {
        Coord::new(self.row() + N - offset.row(), self.col() + N - offset.col())
    }

    pub fn up(self) -> Self {
        Coord::new(self.row() + N - 1, self.col())
    }

    pub fn down(self) -> Self {
        Coord::new(self.row() + 1, self.col())
    }

    pub fn left(self) -> Self {
        Coord::new(self.row(), self.col() + N - 1)
    }

    pub fn right(self) -> Self {
        Coord::new(self.row(), self.col() + 1)
    }

    /// The 4 orthogonal neighbours (up, left, right, down).
    #[inline]
    pub fn neighbors(self) -> [Coord; 4] {
        [self.up(), self.left(), self.right(), self.down()]
    }

    /// Iterate over every cell of the board in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..CELLS).map(Coord::from_index)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.r, self.c)
    }
}

/// Occupancy of every cell: which colour, if any, sits there.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Color>; CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [None; CELLS],
        }
    }

    #[inline]
    pub fn get(&self, coord: Coord) -> Option<Color> {
        self.cells[coord.index()]
    }

    #[inline]
    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.get(coord).is_some()
    }

    #[inline]
    pub fn set(&mut self, coord: Coord, color: Color) {
        self.cells[coord.index()] = Some(color);
    }

    #[inline]
    pub fn remove(&mut self, coord: Coord) {
        self.cells[coord.index()] = None;
    }

    /// Write `color` into each of `coords`.
    pub fn place(&mut self, coords: &[Coord], color: Color) {
        for &coord in coords {
            self.set(coord, color);
        }
    }

    /// Occupied cells and their owners, in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, Color)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.map(|color| (Coord::from_index(i), color)))
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Whether `color` owns at least one cell.
    pub fn has_color(&self, color: Color) -> bool {
        self.cells.contains(&Some(color))
    }

    /// Number of occupied cells (either colour) in row `r`.
    pub fn row_count(&self, r: usize) -> usize {
        self.cells[r * N..(r + 1) * N]
            .iter()
            .filter(|cell| cell.is_some())
            .count()
    }

    /// Number of occupied cells (either colour) in column `c`.
    pub fn col_count(&self, c: usize) -> usize {
        (0..N).filter(|&r| self.cells[r * N + c].is_some()).count()
    }

    pub fn clear_row(&mut self, r: usize) {
        for c in 0..N {
            self.remove(Coord::new(r, c));
        }
    }

    pub fn clear_col(&mut self, c: usize) {
        for r in 0..N {
            self.remove(Coord::new(r, c));
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..N {
            for c in 0..N {
                let ch = self.get(Coord::new(r, c)).map_or('.', Color::marker);
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_wrap_around() {
        let corner = Coord::new(0, 0);
        assert_eq!(corner.up(), Coord::new(10, 0));
        assert_eq!(corner.left(), Coord::new(0, 10));
        assert_eq!(Coord::new(10, 10).down(), Coord::new(0, 10));
        assert_eq!(Coord::new(10, 10).right(), Coord::new(10, 0));
    }

    #[test]
    fn test_translate_and_untranslate() {
        let anchor = Coord::new(5, 1);
        let offset = Coord::new(9, 10);
        let placed = anchor.translate(offset);
        assert_eq!(placed, Coord::new(3, 0));
        assert_eq!(placed.untranslate(offset), anchor);
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        assert!(Coord::checked(10, 10).is_some());
        assert!(Coord::checked(11, 0).is_none());
        assert!(Coord::checked(0, 11).is_none());
    }

    #[test]
    fn test_line_counts() {
        let mut board = Board::new();
        board.place(&[Coord::new(2, 0), Coord::new(2, 5), Coord::new(7, 5)], Color::Red);
        assert_eq!(board.row_count(2), 2);
        assert_eq!(board.col_count(5), 2);
        assert_eq!(board.len(), 3);

        board.clear_row(2);
        assert_eq!(board.len(), 1);
        assert_eq!(board.get(Coord::new(7, 5)), Some(Color::Red));
        assert!(board.has_color(Color::Red));
        assert!(!board.has_color(Color::Blue));
    }

    #[test]
    fn test_display() {
        let mut board = Board::new();
        board.set(Coord::new(0, 1), Color::Blue);
        let dump = board.to_string();
        assert!(dump.starts_with(". B . "));
        assert_eq!(dump.lines().count(), N);
    }
}
