//! Validated domain grid with the shared numeric kernels.

use crate::error::SrsfError;

/// Owned, validated sampling grid over `[0, 1]`.
///
/// Guaranteed to hold at least two strictly increasing, finite samples.
/// The constructor normalizes the samples so the first is exactly 0 and the
/// last exactly 1; every transform and solver in this workspace operates on
/// the normalized domain.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid(Vec<f64>);

impl TimeGrid {
    /// Create a grid from raw samples, validating and normalizing to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SrsfError::TooFewSamples`] | Fewer than 2 samples |
    /// | [`SrsfError::NonFiniteValue`] | Any sample is NaN or infinite |
    /// | [`SrsfError::NonMonotonicGrid`] | Samples are not strictly increasing |
    pub fn new(samples: Vec<f64>) -> Result<Self, SrsfError> {
        if samples.len() < 2 {
            return Err(SrsfError::TooFewSamples { len: samples.len() });
        }
        if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
            return Err(SrsfError::NonFiniteValue { index });
        }
        if let Some(index) = (1..samples.len()).find(|&i| samples[i] <= samples[i - 1]) {
            return Err(SrsfError::NonMonotonicGrid { index });
        }

        let start = samples[0];
        let span = samples[samples.len() - 1] - start;
        let mut normalized: Vec<f64> = samples.iter().map(|&t| (t - start) / span).collect();
        // Pin the endpoints against floating-point residue.
        normalized[0] = 0.0;
        let last = normalized.len() - 1;
        normalized[last] = 1.0;

        Ok(Self(normalized))
    }

    /// Create a uniform grid of `n` samples over `[0, 1]`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SrsfError::TooFewSamples`] | `n < 2` |
    pub fn uniform(n: usize) -> Result<Self, SrsfError> {
        if n < 2 {
            return Err(SrsfError::TooFewSamples { len: n });
        }
        let step = 1.0 / (n - 1) as f64;
        let mut samples: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
        samples[n - 1] = 1.0;
        Ok(Self(samples))
    }

    /// Return the number of grid samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the grid has no samples.
    ///
    /// A [`TimeGrid`] constructed via [`TimeGrid::new`] always holds at least
    /// two samples, so this always returns `false` for valid instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the underlying samples.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Trapezoidal quadrature of `y` over the grid.
    ///
    /// `y` must have the same length as the grid; callers inside this crate
    /// guarantee that, so the check is a debug assertion only.
    #[must_use]
    pub fn trapz(&self, y: &[f64]) -> f64 {
        debug_assert_eq!(y.len(), self.0.len(), "integrand length mismatch");
        let t = &self.0;
        let mut acc = 0.0;
        for i in 1..t.len() {
            acc += (t[i] - t[i - 1]) * (y[i] + y[i - 1]) / 2.0;
        }
        acc
    }

    /// Cumulative trapezoidal integral of `y`, starting at 0.
    #[must_use]
    pub fn cumtrapz(&self, y: &[f64]) -> Vec<f64> {
        debug_assert_eq!(y.len(), self.0.len(), "integrand length mismatch");
        let t = &self.0;
        let mut out = Vec::with_capacity(t.len());
        out.push(0.0);
        let mut acc = 0.0;
        for i in 1..t.len() {
            acc += (t[i] - t[i - 1]) * (y[i] + y[i - 1]) / 2.0;
            out.push(acc);
        }
        out
    }

    /// Finite-difference gradient of `y` over the grid.
    ///
    /// Central differences in the interior, one-sided at the endpoints.
    #[must_use]
    pub fn gradient(&self, y: &[f64]) -> Vec<f64> {
        debug_assert_eq!(y.len(), self.0.len(), "gradient input length mismatch");
        let t = &self.0;
        let n = t.len();
        let mut g = vec![0.0; n];
        g[0] = (y[1] - y[0]) / (t[1] - t[0]);
        g[n - 1] = (y[n - 1] - y[n - 2]) / (t[n - 1] - t[n - 2]);
        for i in 1..n - 1 {
            g[i] = (y[i + 1] - y[i - 1]) / (t[i + 1] - t[i - 1]);
        }
        g
    }

    /// Linearly interpolate the sampled function `y` (over this grid) at `x`.
    ///
    /// `x` outside `[0, 1]` clamps to the boundary values.
    #[must_use]
    pub fn interp(&self, y: &[f64], x: f64) -> f64 {
        debug_assert_eq!(y.len(), self.0.len(), "interpolant length mismatch");
        interp_monotone(&self.0, y, x)
    }
}

impl AsRef<[f64]> for TimeGrid {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Linear interpolation over non-decreasing abscissas `xs`.
///
/// Clamps outside the range. Within a flat run of equal abscissas the first
/// (smallest-index) ordinate wins, which is the tie-break the warping inverse
/// relies on.
pub(crate) fn interp_monotone(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    // First index with xs[k] >= x; for ties this lands on the start of the
    // flat run.
    let k = xs.partition_point(|&v| v < x);
    if xs[k] == x {
        return ys[k];
    }
    let (x0, x1) = (xs[k - 1], xs[k]);
    let (y0, y1) = (ys[k - 1], ys[k]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
