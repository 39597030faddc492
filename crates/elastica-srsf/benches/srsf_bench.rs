//! Criterion benchmarks for elastica-srsf: SRSF transform and DP alignment.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use elastica_srsf::{DpSolver, Srsf, TimeGrid};

fn shifted_sines(n: usize) -> (TimeGrid, Vec<f64>, Vec<f64>) {
    let grid = TimeGrid::uniform(n).unwrap();
    let f1: Vec<f64> = grid
        .as_slice()
        .iter()
        .map(|&t| (2.0 * std::f64::consts::PI * t).sin())
        .collect();
    let f2: Vec<f64> = grid
        .as_slice()
        .iter()
        .map(|&t| (2.0 * std::f64::consts::PI * t + 0.7).sin())
        .collect();
    (grid, f1, f2)
}

fn bench_to_srsf(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_srsf");
    for &n in &[64usize, 256, 1024] {
        let (grid, f1, _) = shifted_sines(n);
        let srsf = Srsf::new(grid);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(srsf, f1), |b, (srsf, f1)| {
            b.iter(|| srsf.to_srsf(f1).unwrap());
        });
    }
    group.finish();
}

fn bench_dp_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("dp_solve");
    for &n in &[32usize, 64, 128] {
        let (grid, f1, f2) = shifted_sines(n);
        let srsf = Srsf::new(grid.clone());
        let q1 = srsf.to_srsf(&f1).unwrap();
        let q2 = srsf.to_srsf(&f2).unwrap();
        let solver = DpSolver::new();
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(solver, q1, q2, grid),
            |b, (solver, q1, q2, grid)| {
                b.iter(|| solver.solve(q1, q2, grid).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_to_srsf, bench_dp_solve);
criterion_main!(benches);
