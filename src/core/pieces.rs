//! Pieces module - shape matrices and rotation
//!
//! Shapes are small row-major boolean matrices. Rotation is 90° clockwise
//! (transpose, then reverse each row), retried at horizontal offsets when
//! the naive rotated position collides (wall-kick).

use crate::types::PieceKind;

/// A piece shape: row-major boolean matrix. Width and height derive from
/// the matrix, so rotation of non-square shapes changes both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    pub fn new(rows: Vec<Vec<bool>>) -> Self {
        debug_assert!(!rows.is_empty());
        debug_assert!(rows.iter().all(|r| r.len() == rows[0].len()));
        Self { rows }
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn filled(&self, col: usize, row: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Iterate the occupied (col, row) offsets of this shape.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter()
                .enumerate()
                .filter(|(_, &filled)| filled)
                .map(move |(col, _)| (col, row))
        })
    }

    /// The shape rotated 90° clockwise: transpose, then reverse each row.
    pub fn rotated_cw(&self) -> Shape {
        let h = self.height();
        let w = self.width();
        let rows = (0..w)
            .map(|col| (0..h).rev().map(|row| self.rows[row][col]).collect())
            .collect();
        Shape { rows }
    }
}

/// Horizontal offsets tried, in order, when a rotation collides in place.
pub const KICK_OFFSETS: [i8; 4] = [-1, 1, -2, 2];

/// Canonical spawn-orientation matrix for a piece kind.
pub fn shape_for(kind: PieceKind) -> Shape {
    let rows: Vec<Vec<bool>> = match kind {
        PieceKind::I => vec![vec![true, true, true, true]],
        PieceKind::O => vec![vec![true, true], vec![true, true]],
        PieceKind::T => vec![vec![false, true, false], vec![true, true, true]],
        PieceKind::S => vec![vec![false, true, true], vec![true, true, false]],
        PieceKind::Z => vec![vec![true, true, false], vec![false, true, true]],
        PieceKind::J => vec![vec![true, false, false], vec![true, true, true]],
        PieceKind::L => vec![vec![false, false, true], vec![true, true, true]],
    };
    Shape::new(rows)
}

/// Spawn column for a shape: centered over the board.
pub fn spawn_x(shape: &Shape, cols: u8) -> i8 {
    ((cols as usize).saturating_sub(shape.width()) / 2) as i8
}
