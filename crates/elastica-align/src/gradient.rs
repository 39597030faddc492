//! Continuous gradient alignment on the warping manifold.
//!
//! Candidate warpings are parameterized in the tangent space at the
//! identity: a truncated Fourier basis spans the tangent directions, and
//! the sphere exponential map carries a coefficient vector to a valid
//! square-root-derivative representation, so every iterate corresponds to a
//! valid warping by construction. Gradients of the registration cost are
//! central finite differences in coefficient space.
//!
//! The cost surface is non-convex, so the solver runs independent restarts
//! from perturbed starting points (the first restart always starts at the
//! identity) and keeps the lowest-cost result. Restarts share no mutable
//! state and run in parallel; sub-seeds are derived deterministically from
//! the master seed so the whole computation is reproducible.

use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use elastica_srsf::{Srsf, TimeGrid, WarpingFunction, WarpingManifold};

use crate::config::GradientConfig;
use crate::error::AlignError;

/// Finite-difference half-width for coefficient-space gradients.
const GRAD_EPS: f64 = 1e-5;

/// Result of a single gradient restart.
struct SingleRun {
    coeffs: Vec<f64>,
    cost: f64,
}

/// Registration-cost model shared (immutably) by all restarts.
struct CostModel<'a> {
    q1: &'a [f64],
    q2: &'a [f64],
    srsf: Srsf,
    manifold: WarpingManifold,
    basis: Vec<Vec<f64>>,
    identity: Vec<f64>,
}

impl<'a> CostModel<'a> {
    fn new(q1: &'a [f64], q2: &'a [f64], grid: &TimeGrid, n_basis: usize) -> Self {
        let sqrt2 = std::f64::consts::SQRT_2;
        let mut basis = Vec::with_capacity(2 * n_basis);
        for k in 1..=n_basis {
            let omega = 2.0 * PI * k as f64;
            basis.push(
                grid.as_slice()
                    .iter()
                    .map(|&t| sqrt2 * (omega * t).sin())
                    .collect(),
            );
            basis.push(
                grid.as_slice()
                    .iter()
                    .map(|&t| sqrt2 * (omega * t).cos())
                    .collect(),
            );
        }
        Self {
            q1,
            q2,
            srsf: Srsf::new(grid.clone()),
            manifold: WarpingManifold::new(grid.clone()),
            basis,
            identity: vec![1.0; grid.len()],
        }
    }

    /// Square-root-derivative representation for a coefficient vector.
    fn psi(&self, coeffs: &[f64]) -> Vec<f64> {
        let n = self.identity.len();
        let mut tangent = vec![0.0; n];
        for (c, row) in coeffs.iter().zip(&self.basis) {
            for (v, b) in tangent.iter_mut().zip(row) {
                *v += c * b;
            }
        }
        self.manifold.exp(&self.identity, &tangent)
    }

    /// Registration cost `∫ (q1 - (q2 ∘ phi) sqrt(phi'))² dt` for a
    /// coefficient vector. Non-finite and degenerate candidates map to
    /// infinity so the restart loop discards them uniformly.
    fn cost(&self, coeffs: &[f64]) -> f64 {
        let psi = self.psi(coeffs);
        let Ok(phi) = self.manifold.to_warping(&psi) else {
            return f64::INFINITY;
        };
        let Ok(warped) = self.srsf.warp_srsf(self.q2, &phi) else {
            return f64::INFINITY;
        };
        let sq: Vec<f64> = self
            .q1
            .iter()
            .zip(&warped)
            .map(|(a, b)| (a - b).powi(2))
            .collect();
        let cost = self.manifold.grid().trapz(&sq);
        if cost.is_finite() {
            cost
        } else {
            f64::INFINITY
        }
    }
}

/// Run a single restart seeded with `seed`.
///
/// Tracks the best cost seen across iterations (including the starting
/// point), so a run never reports worse than where it started. Returns
/// `None` when the restart diverges to a non-finite cost before producing a
/// finite best.
fn run_once(
    model: &CostModel<'_>,
    config: &GradientConfig,
    seed: u64,
    identity_start: bool,
) -> Option<SingleRun> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dim = model.basis.len();

    let mut coeffs: Vec<f64> = if identity_start || config.init_scale <= 0.0 {
        vec![0.0; dim]
    } else {
        (0..dim)
            .map(|_| rng.gen_range(-config.init_scale..config.init_scale))
            .collect()
    };

    let mut cost = model.cost(&coeffs);
    if !cost.is_finite() {
        return None;
    }
    let mut best_cost = cost;
    let mut best_coeffs = coeffs.clone();

    for iteration in 0..config.max_iter {
        // Central finite differences in coefficient space.
        let mut grad = vec![0.0; dim];
        for m in 0..dim {
            let saved = coeffs[m];
            coeffs[m] = saved + GRAD_EPS;
            let plus = model.cost(&coeffs);
            coeffs[m] = saved - GRAD_EPS;
            let minus = model.cost(&coeffs);
            coeffs[m] = saved;
            grad[m] = (plus - minus) / (2.0 * GRAD_EPS);
        }
        if grad.iter().any(|g| !g.is_finite()) {
            break;
        }

        for (c, g) in coeffs.iter_mut().zip(&grad) {
            *c -= config.step_size * g;
        }

        let new_cost = model.cost(&coeffs);
        if !new_cost.is_finite() {
            break;
        }
        if new_cost < best_cost {
            best_cost = new_cost;
            best_coeffs.clone_from(&coeffs);
        }

        let improvement = cost - new_cost;
        cost = new_cost;
        debug!(iteration, cost, "descent iteration complete");
        if improvement.abs() < config.tol {
            break;
        }
    }

    Some(SingleRun {
        coeffs: best_coeffs,
        cost: best_cost,
    })
}

/// Compute the warping aligning `q2` onto `q1` via multi-restart gradient
/// descent.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`AlignError::NonConvergence`] | Every restart diverged to a non-finite cost |
/// | [`AlignError::Srsf`] | The winning representation cannot be rebuilt into a warping |
#[instrument(skip(q1, q2, grid, config), fields(n = grid.len(), n_restarts = config.n_restarts))]
pub(crate) fn solve(
    q1: &[f64],
    q2: &[f64],
    grid: &TimeGrid,
    config: &GradientConfig,
) -> Result<WarpingFunction, AlignError> {
    let model = CostModel::new(q1, q2, grid, config.n_basis);

    // Derive per-restart seeds deterministically from the master seed.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let seeds: Vec<u64> = (0..config.n_restarts).map(|_| master_rng.gen()).collect();
    let n_restarts = seeds.len();

    let runs: Vec<Option<SingleRun>> = seeds
        .into_par_iter()
        .enumerate()
        .map(|(restart, seed)| run_once(&model, config, seed, restart == 0))
        .collect();

    let discarded = runs.iter().filter(|r| r.is_none()).count();
    if discarded > 0 {
        warn!(discarded, n_restarts, "discarded divergent restarts");
    }

    let best = runs
        .into_iter()
        .flatten()
        .min_by(|a, b| a.cost.total_cmp(&b.cost))
        .ok_or(AlignError::NonConvergence { n_restarts })?;

    info!(cost = best.cost, n_restarts, "gradient alignment complete");

    let psi = model.psi(&best.coeffs);
    let phi = model.manifold.to_warping(&psi)?;
    Ok(phi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_pair(n: usize, shift: f64) -> (TimeGrid, Vec<f64>, Vec<f64>) {
        let grid = TimeGrid::uniform(n).unwrap();
        let srsf = Srsf::new(grid.clone());
        let f1: Vec<f64> = grid
            .as_slice()
            .iter()
            .map(|&t| (2.0 * PI * t).sin())
            .collect();
        let f2: Vec<f64> = grid
            .as_slice()
            .iter()
            .map(|&t| (2.0 * PI * t + shift).sin())
            .collect();
        let q1 = srsf.to_srsf(&f1).unwrap();
        let q2 = srsf.to_srsf(&f2).unwrap();
        (grid, q1, q2)
    }

    fn quick_config() -> GradientConfig {
        GradientConfig::new()
            .with_max_iter(20)
            .with_n_restarts(4)
            .with_seed(42)
    }

    #[test]
    fn identical_srsfs_stay_at_identity() {
        let (grid, q, _) = sine_pair(41, 0.0);
        let phi = solve(&q, &q, &grid, &quick_config()).unwrap();
        assert!(
            phi.deviation_from_identity(&grid) < 1e-6,
            "deviation {}",
            phi.deviation_from_identity(&grid)
        );
    }

    #[test]
    fn never_worse_than_identity_start() {
        let (grid, q1, q2) = sine_pair(41, 0.8);
        let model = CostModel::new(&q1, &q2, &grid, 4);
        let identity_cost = model.cost(&vec![0.0; 8]);

        let phi = solve(&q1, &q2, &grid, &quick_config()).unwrap();
        let srsf = Srsf::new(grid.clone());
        let warped = srsf.warp_srsf(&q2, &phi).unwrap();
        let sq: Vec<f64> = q1.iter().zip(&warped).map(|(a, b)| (a - b).powi(2)).collect();
        let final_cost = grid.trapz(&sq);

        assert!(
            final_cost <= identity_cost + 1e-9,
            "final {final_cost} vs identity {identity_cost}"
        );
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (grid, q1, q2) = sine_pair(31, 0.6);
        let config = quick_config();
        let a = solve(&q1, &q2, &grid, &config).unwrap();
        let b = solve(&q1, &q2, &grid, &config).unwrap();
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn different_seeds_still_converge() {
        let (grid, q1, q2) = sine_pair(31, 0.6);
        for seed in [1u64, 2, 3] {
            let config = quick_config().with_seed(seed);
            let phi = solve(&q1, &q2, &grid, &config).unwrap();
            let s = phi.samples();
            assert_eq!(s[0], 0.0);
            assert_eq!(s[s.len() - 1], 1.0);
            assert!(s.windows(2).all(|w| w[1] >= w[0]));
        }
    }

    #[test]
    fn basis_is_tangent_at_identity() {
        // Every basis row must be L2-orthogonal to the constant direction,
        // up to quadrature error.
        let grid = TimeGrid::uniform(201).unwrap();
        let model = CostModel::new(&[0.0; 201], &[0.0; 201], &grid, 3);
        for (k, row) in model.basis.iter().enumerate() {
            let ip = model.manifold.inner_product(row, &model.identity);
            assert!(ip.abs() < 1e-3, "basis row {k} not tangent: {ip}");
        }
    }
}
