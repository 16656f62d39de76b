use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gapmatrix::{Gap, Level, Matrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

// Build a matrix whose levels hold `gaps` gaps of width 10
fn build_matrix(levels: usize, gaps: usize) -> Matrix {
    Matrix::from_levels((0..levels).map(|level| {
        Level::from_gaps((0..gaps as i64).map(|i| {
            Gap::new(i * 10 + 1, i * 10 + 10, (level as i64 + 1) * (i + 1))
        }))
    }))
}

fn bench_reward_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("reward_lookup");
    group.measurement_time(Duration::from_secs(5));

    for gaps in [4usize, 32, 256] {
        let matrix = build_matrix(8, gaps);
        let mut rng = StdRng::seed_from_u64(42);
        let counts: Vec<(usize, i64)> = (0..1024)
            .map(|_| (rng.gen_range(1..=8), rng.gen_range(-5..(gaps as i64 * 12))))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(gaps), &counts, |b, counts| {
            b.iter(|| {
                let mut total = 0i64;
                for &(level, count) in counts {
                    total = total.wrapping_add(matrix.reward(black_box(level), black_box(count)));
                }
                black_box(total)
            })
        });
    }

    group.finish();
}

fn bench_update_gap(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_gap");
    group.measurement_time(Duration::from_secs(5));

    for gaps in [4usize, 32, 256] {
        let matrix = build_matrix(1, gaps);
        let middle = gaps / 2 + 1;
        let target = *matrix.gap(1, middle);

        // Swallow everything but the last gap, forcing propagation across the level
        group.bench_with_input(BenchmarkId::new("swallow", gaps), &target, |b, target| {
            b.iter_batched(
                || matrix.clone(),
                |mut matrix| {
                    let gap = Gap::new(1, target.right_border, target.amount).at(1, target.index);
                    black_box(matrix.update_gap(gap).ok())
                },
                criterion::BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("nudge", gaps), &target, |b, target| {
            b.iter_batched(
                || matrix.clone(),
                |mut matrix| {
                    let gap = Gap::new(target.left_border + 1, target.right_border, target.amount)
                        .at(1, target.index);
                    black_box(matrix.update_gap(gap).ok())
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reward_lookup, bench_update_gap);
criterion_main!(benches);
