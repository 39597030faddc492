//! Fisher-Rao geometry over the space of warping functions.
//!
//! A warping `phi` is represented by its square-root derivative
//! `psi = sqrt(phi')`, which lies on the unit sphere of the L2 function
//! space: `∫ psi² dt = phi(1) - phi(0) = 1`. Geodesic distances, exponential
//! and logarithm maps are therefore the standard sphere formulas, evaluated
//! with quadrature on the fixed grid. All arccos-domain and zero-norm
//! guards live here so every caller gets the same numerical safety.

use tracing::{debug, instrument};

use crate::error::SrsfError;
use crate::grid::TimeGrid;
use crate::warping::WarpingFunction;

/// Below this norm a tangent vector is treated as zero and the exponential
/// map degenerates to the identity.
const DEGENERATE_TOL: f64 = 1e-10;

/// Karcher-mean iteration parameters.
const MEAN_MAX_ITER: usize = 500;
const MEAN_STEP: f64 = 0.3;
const MEAN_TOL: f64 = 1e-6;

/// Riemannian geometry of the warping space over a fixed domain grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpingManifold {
    grid: TimeGrid,
}

impl WarpingManifold {
    /// Create a manifold configuration over the given grid.
    #[must_use]
    pub fn new(grid: TimeGrid) -> Self {
        Self { grid }
    }

    /// Return the domain grid.
    #[must_use]
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Square-root-derivative representation `psi = sqrt(phi')` of a
    /// warping. The derivative is clipped at zero before the square root to
    /// absorb finite-difference noise on flat segments.
    #[must_use]
    pub fn tangent(&self, phi: &WarpingFunction) -> Vec<f64> {
        self.grid
            .gradient(phi.samples())
            .into_iter()
            .map(|d| d.max(0.0).sqrt())
            .collect()
    }

    /// Representation of the identity warping: `psi ≡ 1`.
    #[must_use]
    pub fn identity_tangent(&self) -> Vec<f64> {
        vec![1.0; self.grid.len()]
    }

    /// L2 inner product `∫ a(t) b(t) dt` via trapezoidal quadrature.
    #[must_use]
    pub fn inner_product(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "inner product length mismatch");
        let prod: Vec<f64> = a.iter().zip(b).map(|(x, y)| x * y).collect();
        self.grid.trapz(&prod)
    }

    /// L2 norm induced by [`inner_product`][WarpingManifold::inner_product].
    ///
    /// For any `psi` produced by [`tangent`][WarpingManifold::tangent] this
    /// is 1 by construction (unit-sphere invariant); callers use it as a
    /// self-check.
    #[must_use]
    pub fn norm(&self, a: &[f64]) -> f64 {
        self.inner_product(a, a).max(0.0).sqrt()
    }

    /// Spherical geodesic distance `arccos(⟨psi1, psi2⟩)` between two
    /// unit-norm representations. The inner product is clamped to the
    /// arccos domain to guard against floating-point overshoot.
    #[must_use]
    pub fn geodesic_distance(&self, psi1: &[f64], psi2: &[f64]) -> f64 {
        clamp_unit(self.inner_product(psi1, psi2)).acos()
    }

    /// Sphere logarithm map: the tangent vector at `base` pointing to
    /// `point`, plus the geodesic angle `theta`.
    ///
    /// Degenerates to the zero vector when the two points coincide within
    /// tolerance.
    #[must_use]
    pub fn log(&self, base: &[f64], point: &[f64]) -> (Vec<f64>, f64) {
        let theta = clamp_unit(self.inner_product(base, point)).acos();
        if theta < DEGENERATE_TOL {
            return (vec![0.0; point.len()], theta);
        }
        let scale = theta / theta.sin();
        let cos_theta = theta.cos();
        let v = point
            .iter()
            .zip(base)
            .map(|(&p, &b)| scale * (p - cos_theta * b))
            .collect();
        (v, theta)
    }

    /// Sphere exponential map: walk from `base` along `tangent`.
    ///
    /// `exp(base, v) = cos(|v|) base + sin(|v|) v / |v|`, scaled by the
    /// tangent norm. A tangent with norm below tolerance maps to `base`
    /// unchanged.
    #[must_use]
    pub fn exp(&self, base: &[f64], tangent: &[f64]) -> Vec<f64> {
        let r = self.norm(tangent);
        if r < DEGENERATE_TOL {
            return base.to_vec();
        }
        let (cos_r, sin_r) = (r.cos(), r.sin());
        base.iter()
            .zip(tangent)
            .map(|(&b, &v)| cos_r * b + sin_r * v / r)
            .collect()
    }

    /// Rebuild a warping function from a square-root-derivative
    /// representation: cumulative quadrature of `psi²`, renormalized to the
    /// boundary conditions.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SrsfError::DegenerateWarping`] | `psi²` integrates to zero |
    /// | [`SrsfError::NonFiniteValue`] | `psi` contains NaN or infinity |
    pub fn to_warping(&self, psi: &[f64]) -> Result<WarpingFunction, SrsfError> {
        if let Some(index) = psi.iter().position(|v| !v.is_finite()) {
            return Err(SrsfError::NonFiniteValue { index });
        }
        let squared: Vec<f64> = psi.iter().map(|&v| v * v).collect();
        let mut phi = self.grid.cumtrapz(&squared);
        let total = phi[phi.len() - 1];
        if total <= 0.0 {
            return Err(SrsfError::DegenerateWarping);
        }
        for v in &mut phi {
            *v /= total;
        }
        WarpingFunction::new(phi)
    }

    /// Karcher mean of a set of warpings under the Fisher-Rao metric.
    ///
    /// Iterative sphere averaging: lift every representation into the
    /// tangent space at the current estimate, average, and walk back along
    /// the exponential map until the mean tangent norm falls below
    /// tolerance.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SrsfError::EmptyWarpingSet`] | `warpings` is empty |
    /// | [`SrsfError::LengthMismatch`] | A warping does not match the grid length |
    /// | [`SrsfError::DegenerateWarping`] | The mean representation collapses |
    #[instrument(skip(self, warpings), fields(n = warpings.len()))]
    pub fn karcher_mean(&self, warpings: &[WarpingFunction]) -> Result<WarpingFunction, SrsfError> {
        if warpings.is_empty() {
            return Err(SrsfError::EmptyWarpingSet);
        }
        let n_grid = self.grid.len();
        if let Some(w) = warpings.iter().find(|w| w.len() != n_grid) {
            return Err(SrsfError::LengthMismatch {
                expected: n_grid,
                actual: w.len(),
            });
        }

        let psis: Vec<Vec<f64>> = warpings.iter().map(|w| self.tangent(w)).collect();

        // Seed with the member closest to the elementwise mean.
        let mut elementwise = vec![0.0; n_grid];
        for psi in &psis {
            for (acc, &v) in elementwise.iter_mut().zip(psi) {
                *acc += v;
            }
        }
        let count = psis.len() as f64;
        for v in &mut elementwise {
            *v /= count;
        }
        let seed = psis
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da: f64 = a.iter().zip(&elementwise).map(|(x, m)| (x - m).powi(2)).sum();
                let db: f64 = b.iter().zip(&elementwise).map(|(x, m)| (x - m).powi(2)).sum();
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
            .expect("non-empty set was checked above");
        let mut mu = psis[seed].clone();

        for iteration in 0..MEAN_MAX_ITER {
            let mut vbar = vec![0.0; n_grid];
            for psi in &psis {
                let (v, _) = self.log(&mu, psi);
                for (acc, x) in vbar.iter_mut().zip(v) {
                    *acc += x;
                }
            }
            for v in &mut vbar {
                *v /= count;
            }

            let residual = self.norm(&vbar);
            debug!(iteration, residual, "mean iteration complete");
            if residual < MEAN_TOL {
                break;
            }

            let step: Vec<f64> = vbar.iter().map(|&v| MEAN_STEP * v).collect();
            mu = self.exp(&mu, &step);
        }

        self.to_warping(&mu)
    }
}

/// Clamp to the arccos domain `[-1, 1]`.
fn clamp_unit(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}
