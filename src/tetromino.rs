use crate::grid::Grid;

/// Side of the largest bounding square any piece needs (the I piece).
pub const MAX_SHAPE_SIZE: usize = 4;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TetrominoKind {
    O,
    T,
    S,
    Z,
    I,
    L,
    J,
}

impl TetrominoKind {
    pub const ALL: [TetrominoKind; 7] = [
        TetrominoKind::O,
        TetrominoKind::T,
        TetrominoKind::S,
        TetrominoKind::Z,
        TetrominoKind::I,
        TetrominoKind::L,
        TetrominoKind::J,
    ];

    /// Grid occupancy code written when a piece of this kind locks. Never zero.
    pub fn code(self) -> u8 {
        match self {
            TetrominoKind::O => 1,
            TetrominoKind::T => 2,
            TetrominoKind::S => 3,
            TetrominoKind::Z => 4,
            TetrominoKind::I => 5,
            TetrominoKind::L => 6,
            TetrominoKind::J => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Spawn orientation, padded out to a square.
    #[rustfmt::skip]
    pub fn shape(self) -> Shape {
        match self {
            TetrominoKind::O => Shape::from_rows(&[
                &[1, 1],
                &[1, 1],
            ]),
            TetrominoKind::T => Shape::from_rows(&[
                &[0, 1, 0],
                &[1, 1, 1],
                &[0, 0, 0],
            ]),
            TetrominoKind::S => Shape::from_rows(&[
                &[0, 1, 1],
                &[1, 1, 0],
                &[0, 0, 0],
            ]),
            TetrominoKind::Z => Shape::from_rows(&[
                &[1, 1, 0],
                &[0, 1, 1],
                &[0, 0, 0],
            ]),
            // A 1x4 bar does not survive the square rotation formula, so it
            // lives in the top row of a 4x4 square.
            TetrominoKind::I => Shape::from_rows(&[
                &[1, 1, 1, 1],
                &[0, 0, 0, 0],
                &[0, 0, 0, 0],
                &[0, 0, 0, 0],
            ]),
            TetrominoKind::L => Shape::from_rows(&[
                &[0, 0, 1],
                &[1, 1, 1],
                &[0, 0, 0],
            ]),
            TetrominoKind::J => Shape::from_rows(&[
                &[1, 0, 0],
                &[1, 1, 1],
                &[0, 0, 0],
            ]),
        }
    }
}

// ============================================================================
// Shape
// ============================================================================

/// An N x N occupancy matrix, `N <= MAX_SHAPE_SIZE`, indexed `[y][x]`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Shape {
    size: usize,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Builds a shape from square rows of 0/1. Rows and columns beyond
    /// `MAX_SHAPE_SIZE` are ignored.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let size = rows.len().min(MAX_SHAPE_SIZE);
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in rows.iter().take(size).enumerate() {
            for (x, &bit) in row.iter().take(size).enumerate() {
                cells[y][x] = bit != 0;
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.cells[y][x]
    }

    /// Local offsets of the occupied cells.
    pub fn filled(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |y| {
            (0..self.size)
                .filter(move |&x| self.cells[y][x])
                .map(move |x| Position::new(x as i32, y as i32))
        })
    }

    /// Quarter turn in local `(x, y)` terms: `rotated(x, y) = shape(N-1-y, x)`.
    pub fn rotated(&self) -> Self {
        let n = self.size;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in cells.iter_mut().enumerate().take(n) {
            for (x, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.is_filled(n - 1 - y, x);
            }
        }
        Self { size: n, cells }
    }
}

// ============================================================================
// Tetromino
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tetromino {
    kind: TetrominoKind,
    shape: Shape,
    pub position: Position,
}

impl Tetromino {
    /// A fresh piece in spawn orientation at the grid origin.
    pub fn new(kind: TetrominoKind) -> Self {
        Self::new_at(kind, 0, 0)
    }

    pub fn new_at(kind: TetrominoKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            position: Position::new(x, y),
        }
    }

    pub fn kind(&self) -> TetrominoKind {
        self.kind
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Absolute grid positions of the occupied cells.
    pub fn blocks(&self) -> impl Iterator<Item = Position> + '_ {
        offset(&self.shape, self.position)
    }

    pub(crate) fn translate(&mut self, dx: i32, dy: i32) {
        self.position.x += dx;
        self.position.y += dy;
    }

    /// Replaces the shape with its quarter-turn rotation. No bounds or collision
    /// checks; validate with [`Tetromino::can_rotate_at`] first.
    pub fn rotate(&mut self) {
        self.shape = self.shape.rotated();
    }

    /// Whether the rotated shape fits at the current position: every occupied
    /// cell inside the grid and on an empty cell. No kick offsets are tried.
    pub fn can_rotate_at(&self, grid: &Grid) -> bool {
        let rotated = self.shape.rotated();
        let fits = offset(&rotated, self.position)
            .all(|cell| grid.in_bounds(cell.x, cell.y) && !grid.is_occupied(cell.x, cell.y));
        fits
    }
}

fn offset(shape: &Shape, origin: Position) -> impl Iterator<Item = Position> + '_ {
    shape
        .filled()
        .map(move |local| Position::new(origin.x + local.x, origin.y + local.y))
}
