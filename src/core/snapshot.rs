//! Read-only render snapshot of the game engine.
//!
//! Everything a view needs to draw one frame, decoupled from live engine
//! state so the render layer has no way to mutate the game.

use crate::core::game::{GameState, Piece};
use crate::core::pieces::Shape;
use crate::types::{Cell, PieceKind, BOARD_COLS, BOARD_ROWS};

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl From<&Piece> for ActiveSnapshot {
    fn from(value: &Piece) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape.clone(),
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    /// Locked cells, row-major (y * BOARD_COLS + x)
    pub cells: Vec<Cell>,
    pub cols: u8,
    pub rows: u8,
    pub active: Option<ActiveSnapshot>,
    pub ghost_row: Option<i8>,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub paused: bool,
    pub game_over: bool,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            cells: state.board().cells().to_vec(),
            cols: BOARD_COLS,
            rows: BOARD_ROWS,
            active: state.active().map(ActiveSnapshot::from),
            ghost_row: state.ghost_row(),
            score: state.score(),
            lines: state.lines(),
            level: state.level(),
            paused: state.paused(),
            game_over: state.game_over(),
        }
    }

    pub fn cell(&self, x: u8, y: u8) -> Cell {
        self.cells[(y as usize) * (self.cols as usize) + (x as usize)]
    }
}
