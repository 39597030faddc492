//! Discrete dynamic-programming alignment solver.
//!
//! Finds the monotone lattice path through the N×N grid of index pairs that
//! minimizes the registration cost between two SRSFs, then resamples the
//! path into a warping function. Deterministic; O(N² · S²) time and O(N²)
//! memory for the cost and predecessor tables, where S is the slope
//! neighborhood size.

use tracing::instrument;

use crate::error::SrsfError;
use crate::grid::{interp_monotone, TimeGrid};
use crate::warping::WarpingFunction;

/// Immutable DP solver configuration. Thread-safe and copyable.
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `grid_span` | 7 |
/// | `lambda` | 0.0 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DpSolver {
    grid_span: usize,
    lambda: f64,
}

impl Default for DpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DpSolver {
    /// Create a solver with the default slope neighborhood and no
    /// regularization.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid_span: 7,
            lambda: 0.0,
        }
    }

    /// Set the slope neighborhood size: candidate lattice steps are the
    /// coprime pairs `(di, dj)` with `1 <= di, dj <= grid_span`. Larger
    /// spans admit steeper local warping slopes. Values below 1 are clamped
    /// to 1.
    #[must_use]
    pub fn with_grid_span(mut self, grid_span: usize) -> Self {
        self.grid_span = grid_span.max(1);
        self
    }

    /// Set the warping regularization weight. Penalizes each path segment by
    /// `lambda * (1 - sqrt(slope))²` times its length, biasing the solution
    /// toward the identity warping.
    #[must_use]
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Return the slope neighborhood size.
    #[must_use]
    pub fn grid_span(&self) -> usize {
        self.grid_span
    }

    /// Return the regularization weight.
    #[must_use]
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Compute the warping function aligning `q2` onto `q1`.
    ///
    /// Builds the cumulative cost table over all monotone lattice paths from
    /// `(0, 0)` to `(n-1, n-1)`, backtracks through the predecessor table,
    /// and resamples the node path onto the grid. Cost ties prefer the step
    /// that continues the predecessor's incoming direction, which reduces
    /// staircase artifacts.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SrsfError::LengthMismatch`] | `q1` or `q2` does not match the grid length |
    /// | [`SrsfError::NonFiniteValue`] | `q1` or `q2` contains NaN or infinity |
    /// | [`SrsfError::AlignmentFailure`] | No monotone path reaches the terminal corner |
    #[instrument(skip(self, q1, q2, grid), fields(n = grid.len(), span = self.grid_span))]
    pub fn solve(
        &self,
        q1: &[f64],
        q2: &[f64],
        grid: &TimeGrid,
    ) -> Result<WarpingFunction, SrsfError> {
        let n = grid.len();
        for q in [q1, q2] {
            if q.len() != n {
                return Err(SrsfError::LengthMismatch {
                    expected: n,
                    actual: q.len(),
                });
            }
            if let Some(index) = q.iter().position(|v| !v.is_finite()) {
                return Err(SrsfError::NonFiniteValue { index });
            }
        }

        let steps = coprime_steps(self.grid_span);

        // Flat n×n tables: cumulative cost, predecessor cell, incoming step.
        let mut cost = vec![f64::INFINITY; n * n];
        let mut pred = vec![usize::MAX; n * n];
        let mut step_in = vec![usize::MAX; n * n];
        cost[0] = 0.0;

        for i in 1..n {
            for j in 1..n {
                let idx = i * n + j;
                let mut best = f64::INFINITY;
                let mut best_pred = usize::MAX;
                let mut best_step = usize::MAX;

                for (s, &(di, dj)) in steps.iter().enumerate() {
                    if di > i || dj > j {
                        continue;
                    }
                    let (k, l) = (i - di, j - dj);
                    let prev_idx = k * n + l;
                    let prev_cost = cost[prev_idx];
                    if !prev_cost.is_finite() {
                        continue;
                    }

                    let total = prev_cost + self.edge_cost(q1, q2, grid, k, l, i, j);
                    let continues = s == step_in[prev_idx];
                    if total < best || (total == best && continues) {
                        best = total;
                        best_pred = prev_idx;
                        best_step = s;
                    }
                }

                cost[idx] = best;
                pred[idx] = best_pred;
                step_in[idx] = best_step;
            }
        }

        let terminal = n * n - 1;
        if !cost[terminal].is_finite() {
            return Err(SrsfError::AlignmentFailure);
        }

        // Backtrack from the terminal corner to the origin.
        let mut nodes = Vec::new();
        let mut idx = terminal;
        loop {
            nodes.push((idx / n, idx % n));
            if idx == 0 {
                break;
            }
            idx = pred[idx];
        }
        nodes.reverse();

        // Piecewise-linear resampling of the node path onto the grid.
        let t = grid.as_slice();
        let xs: Vec<f64> = nodes.iter().map(|&(i, _)| t[i]).collect();
        let ys: Vec<f64> = nodes.iter().map(|&(_, j)| t[j]).collect();
        let gamma: Vec<f64> = t.iter().map(|&x| interp_monotone(&xs, &ys, x)).collect();

        WarpingFunction::new(gamma)
    }

    /// Registration cost of the path segment from `(k, l)` to `(i, j)`:
    /// the trapezoid integral of `(q1(t) - sqrt(s) q2(gamma(t)))²` along the
    /// segment (where `s` is the segment slope and `gamma` the linear map
    /// from `[t_k, t_i]` onto `[t_l, t_j]`), plus the slope regularization.
    fn edge_cost(
        &self,
        q1: &[f64],
        q2: &[f64],
        grid: &TimeGrid,
        k: usize,
        l: usize,
        i: usize,
        j: usize,
    ) -> f64 {
        let t = grid.as_slice();
        let width = t[i] - t[k];
        let slope = (t[j] - t[l]) / width;
        let sqrt_slope = slope.sqrt();

        let mut acc = 0.0;
        let mut prev = residual(q1, q2, grid, t, k, l, k, slope, sqrt_slope);
        for m in k + 1..=i {
            let curr = residual(q1, q2, grid, t, k, l, m, slope, sqrt_slope);
            acc += (t[m] - t[m - 1]) * (prev + curr) / 2.0;
            prev = curr;
        }

        acc + self.lambda * (1.0 - sqrt_slope).powi(2) * width
    }
}

/// Squared residual of the segment integrand at grid node `m`.
#[allow(clippy::too_many_arguments)]
fn residual(
    q1: &[f64],
    q2: &[f64],
    grid: &TimeGrid,
    t: &[f64],
    k: usize,
    l: usize,
    m: usize,
    slope: f64,
    sqrt_slope: f64,
) -> f64 {
    let gamma_m = t[l] + slope * (t[m] - t[k]);
    let q2_at = grid.interp(q2, gamma_m);
    (q1[m] - sqrt_slope * q2_at).powi(2)
}

/// All coprime step pairs `(di, dj)` with components in `1..=span`.
///
/// Coprimality avoids redundant steps: `(2, 2)` traces the same lattice
/// direction as `(1, 1)` but would skip the intermediate cell.
fn coprime_steps(span: usize) -> Vec<(usize, usize)> {
    let mut steps = Vec::new();
    for di in 1..=span {
        for dj in 1..=span {
            if gcd(di, dj) == 1 {
                steps.push((di, dj));
            }
        }
    }
    steps
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}
