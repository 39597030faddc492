//! Amplitude-phase elastic distance orchestrator.
//!
//! Splits the difference between two functions into an amplitude part
//! (shape mismatch after optimal warping) and a phase part (how far the
//! optimal warping is from the identity under the Fisher-Rao metric).
//! The warping itself comes from one of the pluggable solvers, or from a
//! caller-supplied external routine with the dynamic-programming solver as
//! the fallback.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use elastica_srsf::{DpSolver, Srsf, TimeGrid, WarpingFunction, WarpingManifold};

use crate::config::GradientConfig;
use crate::error::AlignError;
use crate::gradient;
use crate::reparam::ReparamRoutine;

/// Which built-in solver produces the optimal warping.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Exact search over a monotone lattice. Deterministic.
    DynamicProgramming(DpSolver),
    /// Multi-restart gradient descent on the warping manifold. Seeded.
    Gradient(GradientConfig),
}

impl Default for Strategy {
    fn default() -> Self {
        Self::DynamicProgramming(DpSolver::new())
    }
}

/// The two components of the elastic distance. Both are finite and
/// non-negative whenever the orchestrator returns `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistancePair {
    /// L2 mismatch of the square-root slope functions after alignment.
    pub amplitude: f64,
    /// Geodesic distance of the optimal warping from the identity.
    pub phase: f64,
}

/// Amplitude-phase distance calculator over a fixed domain grid.
///
/// Construct with [`ApDistance::new`], optionally select a solver with
/// [`with_strategy`][ApDistance::with_strategy] or inject an external
/// routine with [`with_external_routine`][ApDistance::with_external_routine],
/// then call [`distance`][ApDistance::distance] per function pair. The
/// calculator is cheap to clone and reusable across calls.
///
/// The convention throughout is that the second function is warped onto the
/// first, so `distance(f1, f2)` and `distance(f2, f1)` agree only
/// approximately on discrete grids.
#[derive(Debug, Clone)]
pub struct ApDistance {
    grid: TimeGrid,
    srsf: Srsf,
    manifold: WarpingManifold,
    strategy: Strategy,
    external: Option<Arc<dyn ReparamRoutine>>,
}

impl ApDistance {
    /// Create a calculator with the default dynamic-programming strategy.
    #[must_use]
    pub fn new(grid: TimeGrid) -> Self {
        Self {
            srsf: Srsf::new(grid.clone()),
            manifold: WarpingManifold::new(grid.clone()),
            grid,
            strategy: Strategy::default(),
            external: None,
        }
    }

    /// Select the solver used when no external routine applies.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Inject an external reparameterization routine. It is tried first on
    /// every call; on any failure the built-in dynamic-programming solver
    /// takes over.
    #[must_use]
    pub fn with_external_routine(mut self, routine: Arc<dyn ReparamRoutine>) -> Self {
        self.external = Some(routine);
        self
    }

    /// Return the domain grid.
    #[must_use]
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Compute the amplitude and phase distances between two functions
    /// sampled on the grid.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::Srsf`] | Input validation or the DP solver failed |
    /// | [`AlignError::NonConvergence`] | Every gradient restart diverged |
    /// | [`AlignError::NonFiniteDistance`] | A computed distance is NaN or infinite |
    pub fn distance(&self, f1: &[f64], f2: &[f64]) -> Result<DistancePair, AlignError> {
        self.distance_with_warping(f1, f2).map(|(pair, _)| pair)
    }

    /// Like [`distance`][ApDistance::distance], additionally returning the
    /// optimal warping that aligns `f2` onto `f1`.
    ///
    /// # Errors
    ///
    /// Same as [`distance`][ApDistance::distance].
    #[instrument(skip(self, f1, f2), fields(n = self.grid.len()))]
    pub fn distance_with_warping(
        &self,
        f1: &[f64],
        f2: &[f64],
    ) -> Result<(DistancePair, WarpingFunction), AlignError> {
        let q1 = self.srsf.to_srsf(f1)?;
        let q2 = self.srsf.to_srsf(f2)?;

        // Identical slope functions need no alignment. This also covers
        // pairs of constant functions, whose slope functions are both zero
        // regardless of the constants' values.
        if q1 == q2 {
            let pair = DistancePair {
                amplitude: 0.0,
                phase: 0.0,
            };
            return Ok((pair, WarpingFunction::identity(&self.grid)));
        }

        let phi = self.solve_warping(&q1, &q2)?;

        let warped = self.srsf.warp_srsf(&q2, &phi)?;
        let sq: Vec<f64> = q1.iter().zip(&warped).map(|(a, b)| (a - b).powi(2)).collect();
        let amplitude = self.grid.trapz(&sq).max(0.0).sqrt();
        if !amplitude.is_finite() {
            return Err(AlignError::NonFiniteDistance {
                kind: "amplitude",
                value: amplitude,
            });
        }

        let psi = self.manifold.tangent(&phi);
        let phase = self
            .manifold
            .geodesic_distance(&psi, &self.manifold.identity_tangent());
        if !phase.is_finite() {
            return Err(AlignError::NonFiniteDistance {
                kind: "phase",
                value: phase,
            });
        }

        info!(amplitude, phase, "distance computed");
        Ok((DistancePair { amplitude, phase }, phi))
    }

    /// Produce the optimal warping for a pair of slope functions: external
    /// routine first when present, otherwise the configured strategy.
    fn solve_warping(&self, q1: &[f64], q2: &[f64]) -> Result<WarpingFunction, AlignError> {
        if let Some(routine) = &self.external {
            match self.run_external(routine.as_ref(), q1, q2) {
                Ok(phi) => return Ok(phi),
                Err(err) => {
                    warn!(error = %err, "external routine failed, falling back to DP");
                    let solver = match &self.strategy {
                        Strategy::DynamicProgramming(solver) => *solver,
                        Strategy::Gradient(_) => DpSolver::new(),
                    };
                    return Ok(solver.solve(q1, q2, &self.grid)?);
                }
            }
        }

        match &self.strategy {
            Strategy::DynamicProgramming(solver) => Ok(solver.solve(q1, q2, &self.grid)?),
            Strategy::Gradient(config) => gradient::solve(q1, q2, &self.grid, config),
        }
    }

    fn run_external(
        &self,
        routine: &dyn ReparamRoutine,
        q1: &[f64],
        q2: &[f64],
    ) -> Result<WarpingFunction, AlignError> {
        let samples = routine.reparameterize(q1, q2, &self.grid)?;
        Ok(WarpingFunction::new(samples)?)
    }
}
