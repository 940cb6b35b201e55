use criterion::{black_box, criterion_group, criterion_main, Criterion};

use respite::core::{shape_for, Board, GameState};
use respite::types::{PieceKind, BOARD_COLS};

fn engine_tick(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.tick(0);
    let mut now = 0u64;

    c.bench_function("engine_tick", |b| {
        b.iter(|| {
            now += 16;
            state.tick(black_box(now));
            if state.game_over() {
                state.reset();
            }
        })
    });
}

fn sweep_four_rows(c: &mut Criterion) {
    c.bench_function("sweep_four_rows", |b| {
        b.iter(|| {
            let mut board = Board::new();
            for y in 16..20 {
                for x in 0..BOARD_COLS as i8 {
                    board.set(x, y, Some(PieceKind::I));
                }
            }
            black_box(board.clear_full_rows())
        })
    });
}

fn collision_probe(c: &mut Criterion) {
    let board = Board::new();
    let shape = shape_for(PieceKind::T);

    c.bench_function("collision_probe", |b| {
        b.iter(|| board.collides(black_box(4), black_box(10), &shape))
    });
}

fn drop_to_floor(c: &mut Criterion) {
    c.bench_function("drop_to_floor", |b| {
        b.iter(|| {
            let mut state = GameState::new(777);
            state.tick(0);
            state.hard_drop();
            black_box(state.score())
        })
    });
}

criterion_group!(
    benches,
    engine_tick,
    sweep_four_rows,
    collision_probe,
    drop_to_floor
);
criterion_main!(benches);
