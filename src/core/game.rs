//! Game module - the falling-block state machine
//!
//! Spawn -> fall -> lock -> line clear -> spawn, with a terminal game-over
//! state and an orthogonal paused flag. Rejected moves and rotations are
//! normal no-ops, not errors; the only terminal condition is a blocked
//! spawn. All timing flows through `tick(now_ms)` — the engine never reads
//! a clock of its own.

use crate::core::board::Board;
use crate::core::pieces::{shape_for, spawn_x, Shape, KICK_OFFSETS};
use crate::core::rng::PieceBag;
use crate::types::{
    GameAction, PieceKind, BASE_DROP_MS, BOARD_COLS, DROP_FLOOR_MS, DROP_STEP_MS, LINES_PER_LEVEL,
    LINE_SCORES,
};

/// The piece in play: its kind, current shape matrix, and grid position.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl Piece {
    /// Create a new piece of the given kind at the spawn position:
    /// centered horizontally, top row.
    pub fn spawn(kind: PieceKind) -> Self {
        let shape = shape_for(kind);
        let x = spawn_x(&shape, BOARD_COLS);
        Self { kind, shape, x, y: 0 }
    }
}

/// The whole session: well, active piece, bag, counters, flags.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    active: Option<Piece>,
    bag: PieceBag,
    score: u32,
    lines: u32,
    level: u32,
    drop_interval_ms: u64,
    last_drop_ms: u64,
    paused: bool,
    game_over: bool,
}

impl GameState {
    pub fn new(seed: u32) -> Self {
        Self {
            board: Board::new(),
            active: None,
            bag: PieceBag::new(seed),
            score: 0,
            lines: 0,
            level: 1,
            drop_interval_ms: BASE_DROP_MS,
            last_drop_ms: 0,
            paused: false,
            game_over: false,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn drop_interval_ms(&self) -> u64 {
        self.drop_interval_ms
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Spawn the next piece from the bag, centered at the top row.
    ///
    /// A spawn position already overlapping locked cells is the terminal
    /// condition: the piece stays visible where it collided and the game
    /// ends. Returns false in that case.
    pub fn spawn_piece(&mut self) -> bool {
        let kind = self.bag.draw();
        let piece = Piece::spawn(kind);

        let blocked = self.board.collides(piece.x, piece.y, &piece.shape);
        self.active = Some(piece);

        if blocked {
            self.game_over = true;
            return false;
        }
        true
    }

    /// Translate the active piece horizontally by dx (±1).
    /// Silently rejected when the target position collides.
    pub fn move_horizontal(&mut self, dx: i8) -> bool {
        if self.paused || self.game_over {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        if self.board.collides(active.x + dx, active.y, &active.shape) {
            return false;
        }
        active.x += dx;
        true
    }

    /// Rotate the active piece 90° clockwise with wall-kicks.
    ///
    /// The rotated matrix is tried at the current position, then at
    /// horizontal offsets [-1, +1, -2, +2] in order. If all five candidates
    /// collide the piece keeps its shape and position.
    pub fn rotate(&mut self) -> bool {
        if self.paused || self.game_over {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        let rotated = active.shape.rotated_cw();

        if !self.board.collides(active.x, active.y, &rotated) {
            active.shape = rotated;
            return true;
        }
        for dx in KICK_OFFSETS {
            if !self.board.collides(active.x + dx, active.y, &rotated) {
                active.x += dx;
                active.shape = rotated;
                return true;
            }
        }
        false
    }

    /// Advance the active piece one row if free, scoring 1 point.
    /// Never locks: landing is handled by the tick-driven drop or hard drop.
    pub fn soft_drop(&mut self) -> bool {
        if self.paused || self.game_over {
            return false;
        }
        if self.step_down() {
            self.score += 1;
            return true;
        }
        false
    }

    /// Drop the active piece to its resting row and lock immediately.
    /// Scores 2 points per row descended.
    pub fn hard_drop(&mut self) -> bool {
        if self.paused || self.game_over || self.active.is_none() {
            return false;
        }

        let mut descended: u32 = 0;
        while self.step_down() {
            descended += 1;
        }
        self.score += 2 * descended;
        self.lock_active();
        true
    }

    /// Per-frame update.
    ///
    /// No-op while paused or after game over. Spawns a piece when none is
    /// active; otherwise advances one row once the drop interval has
    /// elapsed, locking when the step down is blocked. The last-drop stamp
    /// resets on either branch.
    pub fn tick(&mut self, now_ms: u64) {
        if self.paused || self.game_over {
            return;
        }

        if self.active.is_none() {
            self.spawn_piece();
            self.last_drop_ms = now_ms;
            return;
        }

        if now_ms.saturating_sub(self.last_drop_ms) >= self.drop_interval_ms {
            if !self.step_down() {
                self.lock_active();
            }
            self.last_drop_ms = now_ms;
        }
    }

    /// Toggle the paused flag. Pausing freezes every transition except
    /// resume and reset.
    pub fn toggle_pause(&mut self) {
        if !self.game_over {
            self.paused = !self.paused;
        }
    }

    /// Reinitialize grid, score, lines, level, drop interval, and bag,
    /// clearing the game-over and paused flags. The bag continues from the
    /// current RNG state so restarts do not replay the same sequence.
    pub fn reset(&mut self) {
        *self = Self::new(self.bag.seed());
    }

    /// The lowest row the active piece could occupy without collision.
    /// Read-only projection for rendering; never mutates engine state.
    pub fn ghost_row(&self) -> Option<i8> {
        let active = self.active.as_ref()?;
        let mut y = active.y;
        while !self.board.collides(active.x, y + 1, &active.shape) {
            y += 1;
        }
        Some(y)
    }

    /// Route one player input to its transition.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_horizontal(-1),
            GameAction::MoveRight => self.move_horizontal(1),
            GameAction::Rotate => self.rotate(),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::Pause => {
                self.toggle_pause();
                true
            }
            GameAction::Restart => {
                self.reset();
                true
            }
        }
    }

    /// Move the active piece down one row if the target is free.
    fn step_down(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if self.board.collides(active.x, active.y + 1, &active.shape) {
            return false;
        }
        active.y += 1;
        true
    }

    /// Write the active piece into the grid, evaluate line clears, update
    /// score/lines/level/interval, and clear the active slot. The next tick
    /// spawns the successor.
    fn lock_active(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        self.board.lock(active.x, active.y, &active.shape, active.kind);

        let cleared = self.board.clear_full_rows();
        let n = cleared.len();
        if n > 0 {
            self.lines += n as u32;
            // Award against the level in effect when the clear happened.
            self.score += LINE_SCORES[n.min(4)] * self.level;
            self.level = self.lines / LINES_PER_LEVEL + 1;
            self.drop_interval_ms =
                BASE_DROP_MS.saturating_sub((self.level as u64 - 1) * DROP_STEP_MS).max(DROP_FLOOR_MS);
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BOARD_ROWS;

    fn fill_row(state: &mut GameState, y: i8, except: &[i8]) {
        for x in 0..BOARD_COLS as i8 {
            if !except.contains(&x) {
                state.board_mut().set(x, y, Some(PieceKind::I));
            }
        }
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(12345);

        assert!(!state.game_over());
        assert!(!state.paused());
        assert_eq!(state.score(), 0);
        assert_eq!(state.lines(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.drop_interval_ms(), 1000);
        assert!(state.active().is_none());
    }

    #[test]
    fn test_first_tick_spawns() {
        let mut state = GameState::new(12345);
        state.tick(0);

        let piece = state.active().expect("piece spawned");
        assert_eq!(piece.y, 0);
        assert_eq!(piece.x as usize, (10 - piece.shape.width()) / 2);
    }

    #[test]
    fn test_move_horizontal_bounded_by_walls() {
        let mut state = GameState::new(12345);
        state.tick(0);

        let mut moved = 0;
        for _ in 0..12 {
            if state.move_horizontal(-1) {
                moved += 1;
            }
        }
        // Spawn is centered; the wall stops movement within the board width.
        assert!(moved <= 5);
        assert_eq!(state.active().unwrap().x, 0);
    }

    #[test]
    fn test_rotate_cycle_of_four() {
        let mut state = GameState::new(12345);
        state.tick(0);

        // Drop a few rows so tall rotations have room below the top edge.
        for _ in 0..4 {
            state.soft_drop();
        }
        let before = state.active().unwrap().shape.clone();
        let kind = state.active().unwrap().kind;

        for _ in 0..4 {
            state.rotate();
        }
        let after = state.active().unwrap().shape.clone();
        assert_eq!(before, after, "{:?}", kind);
    }

    #[test]
    fn test_rotation_rejected_when_no_candidate_fits() {
        let mut state = GameState::new(12345);
        state.tick(0);

        // Box the piece in completely: every cell outside its own footprint.
        let (x, y, shape) = {
            let p = state.active().unwrap();
            (p.x, p.y, p.shape.clone())
        };
        for gy in 0..BOARD_ROWS as i8 {
            for gx in 0..BOARD_COLS as i8 {
                let inside = shape
                    .cells()
                    .any(|(c, r)| x + c as i8 == gx && y + r as i8 == gy);
                if !inside {
                    state.board_mut().set(gx, gy, Some(PieceKind::O));
                }
            }
        }

        let before = state.active().unwrap().clone();
        let rotated = state.rotate();
        let after = state.active().unwrap().clone();

        // Unless the rotation happens to be an identity fit, it must be a
        // rejected no-op that left shape and position untouched.
        if !rotated {
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_soft_drop_scores_one() {
        let mut state = GameState::new(12345);
        state.tick(0);

        assert!(state.soft_drop());
        assert_eq!(state.score(), 1);
        assert_eq!(state.active().unwrap().y, 1);
    }

    #[test]
    fn test_soft_drop_on_ground_does_not_lock() {
        let mut state = GameState::new(12345);
        state.tick(0);

        while state.soft_drop() {}
        // Piece rests but stays active; only tick/hard-drop lock.
        assert!(state.active().is_some());
    }

    #[test]
    fn test_hard_drop_scores_two_per_row_and_locks() {
        let mut state = GameState::new(12345);
        state.tick(0);

        let start_y = state.active().unwrap().y;
        let ghost = state.ghost_row().unwrap();
        let expected = 2 * (ghost - start_y) as u32;

        assert!(state.hard_drop());
        assert_eq!(state.score(), expected);
        // Locked: active cleared until the next tick spawns.
        assert!(state.active().is_none());
        assert!(state.board().cells().iter().any(|c| c.is_some()));
    }

    #[test]
    fn test_tick_advances_after_interval() {
        let mut state = GameState::new(12345);
        state.tick(0);

        let y0 = state.active().unwrap().y;
        state.tick(999);
        assert_eq!(state.active().unwrap().y, y0, "before interval");
        state.tick(1000);
        assert_eq!(state.active().unwrap().y, y0 + 1, "after interval");
    }

    #[test]
    fn test_tick_locks_when_blocked() {
        let mut state = GameState::new(12345);
        state.tick(0);

        // Park the piece on the floor, then let the timed drop hit the block.
        while state.soft_drop() {}
        let score = state.score();
        state.tick(1000);

        assert!(state.active().is_none());
        assert_eq!(state.score(), score);
    }

    #[test]
    fn test_line_clear_scoring_and_level() {
        let mut state = GameState::new(12345);
        state.tick(0);

        // Hand-build a single full row and lock a piece on top of it to
        // trigger the sweep through lock_active.
        fill_row(&mut state, 19, &[]);
        let before = state.score();
        let drop = 2 * (state.ghost_row().unwrap() - state.active().unwrap().y) as u32;
        state.hard_drop();

        assert_eq!(state.lines(), 1);
        assert_eq!(state.score() - before - drop, 100);
        assert_eq!(state.level(), 1);
    }

    #[test]
    fn test_level_and_interval_progression() {
        let mut state = GameState::new(12345);

        // Drive the counters directly through the lock path.
        for step in 0..3 {
            state.tick(0);
            for y in (BOARD_ROWS as i8 - 4)..BOARD_ROWS as i8 {
                fill_row(&mut state, y, &[]);
            }
            state.hard_drop();
            assert_eq!(state.lines(), (step + 1) * 4);
        }

        // 12 lines: level 2, interval stepped down once.
        assert_eq!(state.level(), 2);
        assert_eq!(state.drop_interval_ms(), 900);
    }

    #[test]
    fn test_tetris_scores_800_times_level() {
        let mut state = GameState::new(12345);
        state.tick(0);

        for y in (BOARD_ROWS as i8 - 4)..BOARD_ROWS as i8 {
            fill_row(&mut state, y, &[]);
        }
        let before = state.score();
        let drop = 2 * (state.ghost_row().unwrap() - state.active().unwrap().y) as u32;
        state.hard_drop();

        assert_eq!(state.score() - before - drop, 800);
    }

    #[test]
    fn test_blocked_spawn_is_terminal() {
        let mut state = GameState::new(12345);

        // Choke the spawn rows before the first piece arrives.
        for y in 0..2 {
            fill_row(&mut state, y, &[]);
        }
        state.tick(0);
        assert!(state.game_over());

        // Frozen until reset: no transition changes anything.
        let score = state.score();
        assert!(!state.move_horizontal(1));
        assert!(!state.rotate());
        assert!(!state.soft_drop());
        assert!(!state.hard_drop());
        state.tick(5000);
        assert_eq!(state.score(), score);
        assert!(state.game_over());

        state.reset();
        assert!(!state.game_over());
        assert!(state.board().cells().iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_pause_freezes_transitions() {
        let mut state = GameState::new(12345);
        state.tick(0);

        state.toggle_pause();
        let y = state.active().unwrap().y;

        assert!(!state.move_horizontal(1));
        assert!(!state.rotate());
        assert!(!state.soft_drop());
        state.tick(10_000);
        assert_eq!(state.active().unwrap().y, y);

        state.toggle_pause();
        assert!(state.move_horizontal(1) || state.move_horizontal(-1));
    }

    #[test]
    fn test_ghost_row_is_pure() {
        let mut state = GameState::new(12345);
        state.tick(0);

        let before = state.clone();
        let ghost = state.ghost_row().unwrap();

        assert!(ghost >= state.active().unwrap().y);
        assert_eq!(before.active(), state.active());
        assert_eq!(before.board(), state.board());
    }

    #[test]
    fn test_reset_reinitializes_session() {
        let mut state = GameState::new(12345);
        state.tick(0);
        state.soft_drop();
        state.hard_drop();

        state.reset();
        assert_eq!(state.score(), 0);
        assert_eq!(state.lines(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.drop_interval_ms(), 1000);
        assert!(state.active().is_none());
    }

    #[test]
    fn test_collision_invariant_over_random_play() {
        let mut state = GameState::new(777);
        let mut now = 0u64;

        // Random-ish action soup; the active piece must never overlap a
        // locked cell at any point.
        for step in 0..2000 {
            match step % 5 {
                0 => {
                    state.move_horizontal(if step % 2 == 0 { 1 } else { -1 });
                }
                1 => {
                    state.rotate();
                }
                2 => {
                    state.soft_drop();
                }
                _ => {}
            }
            now += 120;
            state.tick(now);

            if let Some(p) = state.active() {
                for (c, r) in p.shape.cells() {
                    let gy = p.y + r as i8;
                    if gy >= 0 && !state.game_over() {
                        assert_eq!(
                            state.board().get(p.x + c as i8, gy),
                            Some(None),
                            "active piece overlaps locked cell at step {}",
                            step
                        );
                    }
                }
            }
            if state.game_over() {
                state.reset();
            }
        }
    }
}
