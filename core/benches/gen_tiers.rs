//! Board generation cost across grid sizes and score requirements.
//!
//! Run with: cargo bench -p breach-core

use breach_core::*;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const TIERS: [(&str, Coord, Coord, Score); 4] = [
    ("opening", 7, 7, 100),
    ("mid", 7, 8, 600),
    ("late", 7, 9, 1100),
    ("capped", 7, 9, 1337),
];

fn bench_generate_board(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate/board");

    for (name, width, height, required) in TIERS {
        let params = RoundParameters {
            grid_width: width,
            grid_height: height,
            ..RoundParameters::default()
        };
        let mut seed = 0u64;
        group.bench_with_input(
            BenchmarkId::new(name, format!("{width}x{height}@{required}")),
            &params,
            |b, params| {
                b.iter(|| {
                    seed = seed.wrapping_add(1);
                    black_box(RandomBoardGenerator::new(seed).generate(required, params))
                })
            },
        );
    }

    group.finish();
}

fn bench_legal_moves(c: &mut Criterion) {
    let params = RoundParameters::default();
    let board = RandomBoardGenerator::new(1)
        .generate(params.min_round_score, &params)
        .expect("default parameters generate a board");
    let mut round = Round::new(board.clone(), &params);
    round.start().expect("fresh round starts");
    for tile in &board.winning_path()[..board.winning_path().len() - 1] {
        round.select(tile.pos).expect("winning path is legal");
    }

    c.bench_function("round/legal_moves", |b| {
        b.iter(|| black_box(round.legal_moves()))
    });
}

criterion_group!(benches, bench_generate_board, bench_legal_moves);
criterion_main!(benches);
