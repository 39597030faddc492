//! Warping functions: validated monotone self-maps of the unit domain.

use crate::error::SrsfError;
use crate::grid::{interp_monotone, TimeGrid};

/// Tolerance for the boundary conditions `phi(0) = 0`, `phi(1) = 1`.
pub(crate) const BOUNDARY_TOL: f64 = 1e-6;

/// Tolerance for monotonicity: adjacent samples may dip by at most this much
/// before construction fails. Smaller dips are treated as floating-point
/// noise and flattened.
pub(crate) const MONOTONE_TOL: f64 = 1e-9;

/// Owned, validated warping function sampled on a [`TimeGrid`].
///
/// Invariants held after construction: samples lie in `[0, 1]`, are
/// non-decreasing, and the endpoints are exactly 0 and 1.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpingFunction(Vec<f64>);

impl WarpingFunction {
    /// Create a warping function, validating monotonicity and boundary
    /// conditions within tolerance. Sub-tolerance floating-point noise is
    /// repaired: samples are clamped to `[0, 1]`, flattened to be
    /// non-decreasing, and the endpoints pinned.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SrsfError::TooFewSamples`] | Fewer than 2 samples |
    /// | [`SrsfError::NonFiniteValue`] | Any sample is NaN or infinite |
    /// | [`SrsfError::WarpingBoundary`] | Endpoints differ from 0 / 1 beyond tolerance |
    /// | [`SrsfError::WarpingDecreasing`] | Samples decrease beyond tolerance |
    pub fn new(samples: Vec<f64>) -> Result<Self, SrsfError> {
        if samples.len() < 2 {
            return Err(SrsfError::TooFewSamples { len: samples.len() });
        }
        if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
            return Err(SrsfError::NonFiniteValue { index });
        }

        let last = samples.len() - 1;
        if samples[0].abs() > BOUNDARY_TOL || (samples[last] - 1.0).abs() > BOUNDARY_TOL {
            return Err(SrsfError::WarpingBoundary {
                start: samples[0],
                end: samples[last],
            });
        }
        if let Some(index) =
            (1..samples.len()).find(|&i| samples[i] < samples[i - 1] - MONOTONE_TOL)
        {
            return Err(SrsfError::WarpingDecreasing { index });
        }

        // Repair sub-tolerance noise so the invariants hold exactly.
        let mut repaired = samples;
        repaired[0] = 0.0;
        repaired[last] = 1.0;
        let mut running: f64 = 0.0;
        for v in &mut repaired {
            let clamped = v.clamp(0.0, 1.0);
            running = running.max(clamped);
            *v = running;
        }
        repaired[last] = 1.0;

        Ok(Self(repaired))
    }

    /// The identity warping `phi(t) = t` on the given grid.
    #[must_use]
    pub fn identity(grid: &TimeGrid) -> Self {
        Self(grid.as_slice().to_vec())
    }

    /// Return the warping samples.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.0
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the warping has no samples.
    ///
    /// A constructed [`WarpingFunction`] always holds at least two samples,
    /// so this always returns `false` for valid instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Maximum absolute deviation from the identity warping on `grid`.
    #[must_use]
    pub fn deviation_from_identity(&self, grid: &TimeGrid) -> f64 {
        self.0
            .iter()
            .zip(grid.as_slice())
            .map(|(&p, &t)| (p - t).abs())
            .fold(0.0, f64::max)
    }

    /// Compose `self` after `inner`: returns `self ∘ inner`, evaluated by
    /// interpolating `self` at the sample points of `inner`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SrsfError::LengthMismatch`] | `inner` is sampled on a different-length grid |
    pub fn compose(
        &self,
        inner: &WarpingFunction,
        grid: &TimeGrid,
    ) -> Result<WarpingFunction, SrsfError> {
        if inner.len() != self.len() || grid.len() != self.len() {
            return Err(SrsfError::LengthMismatch {
                expected: self.len(),
                actual: inner.len(),
            });
        }
        let composed: Vec<f64> = inner
            .samples()
            .iter()
            .map(|&x| grid.interp(&self.0, x))
            .collect();
        // Interpolation of two valid warpings stays within tolerance of a
        // valid warping, so construction only repairs floating-point noise.
        WarpingFunction::new(composed)
    }

    /// Functional inverse, resampled onto `grid`.
    ///
    /// Computed by interpolating the swapped coordinate pairs `(phi(t), t)`.
    /// Flat segments of `self` are inverted to their smallest abscissa. The
    /// result is renormalized to the boundary conditions.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SrsfError::LengthMismatch`] | `grid` has a different length |
    pub fn inverse(&self, grid: &TimeGrid) -> Result<WarpingFunction, SrsfError> {
        if grid.len() != self.len() {
            return Err(SrsfError::LengthMismatch {
                expected: self.len(),
                actual: grid.len(),
            });
        }
        let t = grid.as_slice();
        let mut inv: Vec<f64> = t
            .iter()
            .map(|&x| interp_monotone(&self.0, t, x))
            .collect();

        // Renormalize: interpolation endpoints can drift when self is flat
        // near a boundary.
        let last = inv.len() - 1;
        let (start, end) = (inv[0], inv[last]);
        let span = end - start;
        if span <= 0.0 {
            return Err(SrsfError::DegenerateWarping);
        }
        for v in &mut inv {
            *v = (*v - start) / span;
        }

        WarpingFunction::new(inv)
    }
}

impl AsRef<[f64]> for WarpingFunction {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> TimeGrid {
        TimeGrid::uniform(n).unwrap()
    }

    /// phi(t) = t^2, a valid warping with a flat-ish start.
    fn quadratic(n: usize) -> WarpingFunction {
        let g = grid(n);
        let samples: Vec<f64> = g.as_slice().iter().map(|&t| t * t).collect();
        WarpingFunction::new(samples).unwrap()
    }

    #[test]
    fn identity_matches_grid() {
        let g = grid(11);
        let id = WarpingFunction::identity(&g);
        assert_eq!(id.samples(), g.as_slice());
        assert_eq!(id.deviation_from_identity(&g), 0.0);
    }

    #[test]
    fn rejects_bad_boundary() {
        let result = WarpingFunction::new(vec![0.1, 0.5, 1.0]);
        assert!(matches!(result, Err(SrsfError::WarpingBoundary { .. })));

        let result = WarpingFunction::new(vec![0.0, 0.5, 0.9]);
        assert!(matches!(result, Err(SrsfError::WarpingBoundary { .. })));
    }

    #[test]
    fn rejects_decreasing() {
        let result = WarpingFunction::new(vec![0.0, 0.6, 0.4, 1.0]);
        assert!(matches!(result, Err(SrsfError::WarpingDecreasing { index: 2 })));
    }

    #[test]
    fn rejects_nan() {
        let result = WarpingFunction::new(vec![0.0, f64::NAN, 1.0]);
        assert!(matches!(result, Err(SrsfError::NonFiniteValue { index: 1 })));
    }

    #[test]
    fn repairs_subtolerance_noise() {
        // Tiny negative dip and endpoint drift, both inside tolerance.
        let phi = WarpingFunction::new(vec![1e-9, 0.5, 0.5 - 1e-12, 1.0 - 1e-9]).unwrap();
        let s = phi.samples();
        assert_eq!(s[0], 0.0);
        assert_eq!(s[3], 1.0);
        assert!(s.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn accepts_flat_segments() {
        let phi = WarpingFunction::new(vec![0.0, 0.5, 0.5, 1.0]).unwrap();
        assert_eq!(phi.samples(), &[0.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn compose_with_identity_is_noop() {
        let n = 21;
        let g = grid(n);
        let phi = quadratic(n);
        let id = WarpingFunction::identity(&g);

        let left = phi.compose(&id, &g).unwrap();
        let right = id.compose(&phi, &g).unwrap();
        for i in 0..n {
            assert!((left.samples()[i] - phi.samples()[i]).abs() < 1e-12);
            assert!((right.samples()[i] - phi.samples()[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn compose_preserves_invariants() {
        let n = 33;
        let g = grid(n);
        let phi = quadratic(n);
        let composed = phi.compose(&phi, &g).unwrap();
        let s = composed.samples();
        assert_eq!(s[0], 0.0);
        assert_eq!(s[n - 1], 1.0);
        assert!(s.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn inverse_of_identity_is_identity() {
        let g = grid(17);
        let id = WarpingFunction::identity(&g);
        let inv = id.inverse(&g).unwrap();
        assert!(inv.deviation_from_identity(&g) < 1e-12);
    }

    #[test]
    fn inverse_composes_to_identity() {
        let n = 101;
        let g = grid(n);
        let phi = quadratic(n);
        let inv = phi.inverse(&g).unwrap();
        let composed = phi.compose(&inv, &g).unwrap();
        // Linear interpolation on 101 points bounds the round-trip error.
        assert!(
            composed.deviation_from_identity(&g) < 1e-2,
            "deviation {}",
            composed.deviation_from_identity(&g)
        );
    }

    #[test]
    fn inverse_flat_segment_takes_smallest_abscissa() {
        // phi holds the value 0.5 at abscissas 1/3 and 2/3; the inverse at
        // 0.5 must pick the smallest abscissa of the run.
        let phi = WarpingFunction::new(vec![0.0, 0.5, 0.5, 1.0]).unwrap();
        let g = grid(4);
        let inv = phi.inverse(&g).unwrap();
        // t = 1/3 maps to phi = 0.5 first at abscissa 1/3.
        let at_half = interp_monotone(phi.samples(), g.as_slice(), 0.5);
        assert!((at_half - 1.0 / 3.0).abs() < 1e-12);
        assert!(inv.samples().windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn compose_length_mismatch() {
        let g = grid(5);
        let phi = quadratic(5);
        let other = quadratic(7);
        assert!(matches!(
            phi.compose(&other, &g),
            Err(SrsfError::LengthMismatch { .. })
        ));
    }
}
