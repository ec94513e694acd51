//! The board of locked cells.
//!
//! Cells hold an occupancy code: `0` is empty, anything else is the code of
//! the [`TetrominoKind`](crate::tetromino::TetrominoKind) that was locked there.
//! Coordinates are `(x, y)` with `x` growing to the right and `y` growing down,
//! so row `0` is the top of the board.

pub const EMPTY: u8 = 0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major, `cells[y][x]`.
    cells: Vec<Vec<u8>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![EMPTY; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Code at `(x, y)`, or `None` outside the board.
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if self.in_bounds(x, y) {
            Some(self.cells[y as usize][x as usize])
        } else {
            None
        }
    }

    /// Writes a code. Returns false (and writes nothing) outside the board.
    pub fn set(&mut self, x: i32, y: i32, code: u8) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.cells[y as usize][x as usize] = code;
        true
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(code) if code != EMPTY)
    }

    /// True iff every cell of `row` is locked. Rows past the bottom are never full.
    pub fn is_row_full(&self, row: usize) -> bool {
        self.cells
            .get(row)
            .is_some_and(|cells| cells.iter().all(|&code| code != EMPTY))
    }

    /// Zeroes `row` in place. Rows above are left where they are.
    pub fn clear_row(&mut self, row: usize) {
        if let Some(cells) = self.cells.get_mut(row) {
            cells.fill(EMPTY);
        }
    }

    /// Moves `row` to the top and shifts every row above it down by one.
    ///
    /// Paired with [`Grid::clear_row`] this removes a row and compacts the board.
    pub(crate) fn sink_rows_above(&mut self, row: usize) {
        if row < self.height {
            self.cells[..=row].rotate_right(1);
        }
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.cells
    }

    pub fn filled_count_in_row(&self, row: usize) -> usize {
        self.cells
            .get(row)
            .map_or(0, |cells| cells.iter().filter(|&&code| code != EMPTY).count())
    }

    pub fn total_filled_cells(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&code| code != EMPTY)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.total_filled_cells() == 0
    }
}
