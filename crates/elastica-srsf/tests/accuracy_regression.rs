//! Accuracy regression tests for elastica-srsf.
//!
//! These tests verify the numerical contracts of the SRSF transform and the
//! DP alignment solver: round-trip convergence under grid refinement and
//! residual reduction on synthetically warped inputs.

use std::f64::consts::PI;

use elastica_srsf::{DpSolver, Srsf, TimeGrid, WarpingFunction, WarpingManifold};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sine(grid: &TimeGrid) -> Vec<f64> {
    grid.as_slice().iter().map(|&t| (2.0 * PI * t).sin()).collect()
}

fn l2(grid: &TimeGrid, a: &[f64], b: &[f64]) -> f64 {
    let sq: Vec<f64> = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).collect();
    grid.trapz(&sq).sqrt()
}

fn roundtrip_error(n: usize) -> f64 {
    let grid = TimeGrid::uniform(n).unwrap();
    let f = sine(&grid);
    let srsf = Srsf::new(grid);
    let q = srsf.to_srsf(&f).unwrap();
    let rec = srsf.from_srsf(&q, f[0]).unwrap();
    f.iter()
        .zip(&rec)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

// ---------------------------------------------------------------------------
// a) srsf_round_trip_converges_under_refinement
// ---------------------------------------------------------------------------

/// Round-trip error must shrink as the sample count grows and stay within
/// the truncation-error budget at 256 samples.
#[test]
fn srsf_round_trip_converges_under_refinement() {
    let coarse = roundtrip_error(32);
    let fine = roundtrip_error(256);
    assert!(
        fine < 0.25 * coarse,
        "no convergence: err(32) = {coarse}, err(256) = {fine}"
    );
    assert!(fine < 1e-2, "err(256) too large: {fine}");
}

// ---------------------------------------------------------------------------
// b) dp_recovers_synthetic_warp
// ---------------------------------------------------------------------------

/// Aligning `f ∘ gamma` back onto `f` must remove most of the SRSF mismatch.
#[test]
fn dp_recovers_synthetic_warp() {
    let n = 51;
    let grid = TimeGrid::uniform(n).unwrap();
    let gamma = |t: f64| (f64::exp(1.2 * t) - 1.0) / (f64::exp(1.2) - 1.0);

    let f1 = sine(&grid);
    let f2: Vec<f64> = grid
        .as_slice()
        .iter()
        .map(|&t| (2.0 * PI * gamma(t)).sin())
        .collect();

    let srsf = Srsf::new(grid.clone());
    let q1 = srsf.to_srsf(&f1).unwrap();
    let q2 = srsf.to_srsf(&f2).unwrap();

    let phi = DpSolver::new().solve(&q1, &q2, &grid).unwrap();
    let aligned = srsf.warp_srsf(&q2, &phi).unwrap();

    let before = l2(&grid, &q1, &q2);
    let after = l2(&grid, &q1, &aligned);
    assert!(
        after < 0.5 * before,
        "residual {after} not below half of {before}"
    );
}

// ---------------------------------------------------------------------------
// c) dp_warping_is_monotone_with_pinned_boundaries
// ---------------------------------------------------------------------------

/// Every warping produced by the DP solver must satisfy the warping
/// invariants exactly.
#[test]
fn dp_warping_is_monotone_with_pinned_boundaries() {
    let n = 41;
    let grid = TimeGrid::uniform(n).unwrap();
    let f1 = sine(&grid);
    let f2: Vec<f64> = grid
        .as_slice()
        .iter()
        .map(|&t| (2.0 * PI * t + PI / 4.0).sin())
        .collect();

    let srsf = Srsf::new(grid.clone());
    let q1 = srsf.to_srsf(&f1).unwrap();
    let q2 = srsf.to_srsf(&f2).unwrap();
    let phi = DpSolver::new().solve(&q1, &q2, &grid).unwrap();

    let s = phi.samples();
    assert_eq!(s[0], 0.0);
    assert_eq!(s[n - 1], 1.0);
    for w in s.windows(2) {
        assert!(w[1] >= w[0], "warping decreases: {} -> {}", w[0], w[1]);
    }
}

// ---------------------------------------------------------------------------
// d) manifold_geometry_consistency
// ---------------------------------------------------------------------------

/// Geodesic distance of a DP warping from the identity matches the direct
/// arccos formula on the square-root derivatives.
#[test]
fn manifold_geometry_consistency() {
    let n = 51;
    let grid = TimeGrid::uniform(n).unwrap();
    let manifold = WarpingManifold::new(grid.clone());

    let phi_samples: Vec<f64> = grid.as_slice().iter().map(|&t| t.powf(1.5)).collect();
    let phi = WarpingFunction::new(phi_samples).unwrap();

    let psi = manifold.tangent(&phi);
    let id = manifold.identity_tangent();

    let d = manifold.geodesic_distance(&psi, &id);
    let direct = manifold.inner_product(&psi, &id).clamp(-1.0, 1.0).acos();
    assert!((d - direct).abs() < 1e-14);
    assert!(d > 0.0, "non-identity warping must have positive distance");
}
