use elastica_srsf::SrsfError;

/// Errors from gradient alignment and the amplitude-phase orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// Returned when every gradient restart diverged to a non-finite cost.
    /// An expected outcome on ill-conditioned inputs; callers may retry
    /// with a different seed or restart count.
    #[error("all {n_restarts} gradient restarts diverged to non-finite cost")]
    NonConvergence {
        /// Number of restarts attempted.
        n_restarts: usize,
    },

    /// Returned when a computed distance is NaN or infinite. Converted to an
    /// error at the orchestrator boundary; never returned as a silent NaN.
    #[error("computed {kind} distance is not finite: {value}")]
    NonFiniteDistance {
        /// Which distance misbehaved: "amplitude" or "phase".
        kind: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Returned by external reparameterization routines. On the orchestrator
    /// path this triggers a fallback to the built-in DP solver rather than
    /// propagating.
    #[error("external reparameterization routine failed: {message}")]
    ExternalRoutine {
        /// Routine-supplied failure description.
        message: String,
    },

    /// Wraps an SRSF error encountered during alignment.
    #[error("SRSF error during alignment: {0}")]
    Srsf(#[from] SrsfError),
}
