//! Core module - the falling-block puzzle engine
//!
//! Pure in-memory state transition logic. No I/O, no clocks of its own:
//! `GameState::tick` takes the caller's timestamp.

pub mod board;
pub mod game;
pub mod pieces;
pub mod rng;
pub mod snapshot;

pub use board::Board;
pub use game::{GameState, Piece};
pub use pieces::{shape_for, Shape};
pub use rng::{PieceBag, SeededRng};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
