//! Deterministic randomness and the 7-bag generator.
//!
//! One seedable RNG serves the whole crate: piece order here, content
//! sampling in the batch manager and picker. Seeding it makes bag order
//! and sampling reproducible in tests.

use crate::types::PieceKind;

/// Linear congruential generator (Numerical Recipes multiplier).
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        // State 0 would lock the low bits; nudge it.
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform-ish value in `[0, bound)`.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_below(i as u32 + 1) as usize;
            slice.swap(i, j);
        }
    }

    /// Current internal state, usable as a seed to continue the sequence.
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// The bag scheme: all 7 kinds shuffled together, drawn down to empty,
/// then refilled. Every kind appears exactly once per 7 draws aligned to
/// a refill boundary.
#[derive(Debug, Clone)]
pub struct PieceBag {
    /// Remaining pieces in the current bag, drawn from the back.
    bag: Vec<PieceKind>,
    rng: SeededRng,
}

impl PieceBag {
    pub fn new(seed: u32) -> Self {
        let mut bag = Self {
            bag: Vec::with_capacity(7),
            rng: SeededRng::new(seed),
        };
        bag.refill();
        bag
    }

    fn refill(&mut self) {
        self.bag.extend(PieceKind::ALL);
        self.rng.shuffle(&mut self.bag);
    }

    /// Draw the next piece kind, refilling the bag when it empties.
    pub fn draw(&mut self) -> PieceKind {
        if self.bag.is_empty() {
            self.refill();
        }
        // refill guarantees a non-empty bag
        self.bag.pop().expect("bag refilled")
    }

    /// Pieces left before the next refill.
    pub fn remaining(&self) -> usize {
        self.bag.len()
    }

    /// Current RNG state (for restarting without replaying the sequence).
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new(1)
    }
}
