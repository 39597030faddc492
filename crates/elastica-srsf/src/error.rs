//! Error types for SRSF transforms, warping functions, and discrete alignment.

/// Errors from grid validation, SRSF transforms, warping-function
/// construction, and the dynamic-programming alignment solver.
#[derive(Debug, thiserror::Error)]
pub enum SrsfError {
    /// Returned when a domain grid has fewer than two samples.
    #[error("domain grid must contain at least 2 samples, got {len}")]
    TooFewSamples {
        /// Number of samples provided.
        len: usize,
    },

    /// Returned when a domain grid is not strictly increasing.
    #[error("domain grid is not strictly increasing at index {index}")]
    NonMonotonicGrid {
        /// First index where `t[index] <= t[index - 1]`.
        index: usize,
    },

    /// Returned when a sampled function does not match the grid length.
    #[error("expected {expected} samples to match the domain grid, got {actual}")]
    LengthMismatch {
        /// Grid length.
        expected: usize,
        /// Length of the offending input.
        actual: usize,
    },

    /// Returned when an input contains NaN, infinity, or negative infinity.
    #[error("input contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned when a warping function violates its boundary conditions.
    #[error("warping must map 0 to 0 and 1 to 1, got endpoints [{start}, {end}]")]
    WarpingBoundary {
        /// Value at the left endpoint.
        start: f64,
        /// Value at the right endpoint.
        end: f64,
    },

    /// Returned when a warping function decreases beyond tolerance.
    #[error("warping is decreasing at index {index}")]
    WarpingDecreasing {
        /// First index where the samples decrease beyond tolerance.
        index: usize,
    },

    /// Returned when a square-root-derivative representation integrates to
    /// zero and cannot be renormalized into a warping function.
    #[error("warping derivative integrates to zero")]
    DegenerateWarping,

    /// Returned when the averaging routine receives no warpings.
    #[error("cannot average an empty set of warpings")]
    EmptyWarpingSet,

    /// Returned when no monotone path reaches the terminal corner of the
    /// alignment lattice. Unreachable for well-formed inputs; a hard stop
    /// rather than a silent wrong answer.
    #[error("no monotone alignment path reaches the terminal corner")]
    AlignmentFailure,
}
