//! Injection point for external reparameterization routines.

use elastica_srsf::TimeGrid;

use crate::error::AlignError;

/// A reparameterization routine supplied by the caller, typically wrapping a
/// precompiled native solver.
///
/// Given two square-root slope functions sampled on `grid`, the routine
/// returns the warping samples `phi(t)` that align the second onto the
/// first: non-decreasing values in `[0, 1]` with the endpoints at 0 and 1,
/// one per grid point. The orchestrator validates the output and falls back
/// to the built-in dynamic-programming solver when the routine errors or
/// returns an invalid warping, so implementations are free to fail fast.
pub trait ReparamRoutine: Send + Sync + std::fmt::Debug {
    /// Compute warping samples aligning `q2` onto `q1`.
    ///
    /// # Errors
    ///
    /// Implementations return [`AlignError::ExternalRoutine`] (or any other
    /// variant) to signal failure; the caller treats every error as a
    /// fallback trigger.
    fn reparameterize(
        &self,
        q1: &[f64],
        q2: &[f64],
        grid: &TimeGrid,
    ) -> Result<Vec<f64>, AlignError>;
}
