//! Configuration builder for the continuous gradient alignment solver.

/// Configuration for gradient-descent alignment on the warping manifold.
///
/// Construct via [`GradientConfig::new`], then chain `with_*` methods to
/// override defaults.
///
/// # Defaults
///
/// | Parameter    | Default |
/// |--------------|---------|
/// | `max_iter`   | 100     |
/// | `step_size`  | 0.05    |
/// | `n_restarts` | 10      |
/// | `n_basis`    | 4       |
/// | `init_scale` | 0.2     |
/// | `tol`        | 1e-6    |
/// | `seed`       | 42      |
#[derive(Debug, Clone, PartialEq)]
pub struct GradientConfig {
    pub(crate) max_iter: usize,
    pub(crate) step_size: f64,
    pub(crate) n_restarts: usize,
    pub(crate) n_basis: usize,
    pub(crate) init_scale: f64,
    pub(crate) tol: f64,
    pub(crate) seed: u64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GradientConfig {
    /// Create a configuration with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_iter: 100,
            step_size: 0.05,
            n_restarts: 10,
            n_basis: 4,
            init_scale: 0.2,
            tol: 1e-6,
            seed: 42,
        }
    }

    /// Set the maximum number of descent iterations per restart.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the descent step size (learning rate).
    #[must_use]
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    /// Set the number of independent restarts. The first restart always
    /// starts from the identity warping; the rest perturb randomly. Higher
    /// values reduce the risk of a poor local minimum. Values below 1 are
    /// clamped to 1.
    #[must_use]
    pub fn with_n_restarts(mut self, n_restarts: usize) -> Self {
        self.n_restarts = n_restarts.max(1);
        self
    }

    /// Set the number of Fourier harmonics parameterizing the tangent space
    /// at the identity (each harmonic contributes a sine and a cosine
    /// coefficient). Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_n_basis(mut self, n_basis: usize) -> Self {
        self.n_basis = n_basis.max(1);
        self
    }

    /// Set the magnitude of the random initial perturbation for restarts
    /// after the first.
    #[must_use]
    pub fn with_init_scale(mut self, init_scale: f64) -> Self {
        self.init_scale = init_scale;
        self
    }

    /// Set the convergence tolerance. A restart stops early when the cost
    /// improvement falls below this threshold.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the random seed. Per-restart sub-seeds are derived from it, so
    /// runs with the same seed and configuration are reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the maximum number of descent iterations per restart.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Return the descent step size.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Return the number of independent restarts.
    #[must_use]
    pub fn n_restarts(&self) -> usize {
        self.n_restarts
    }

    /// Return the number of Fourier harmonics.
    #[must_use]
    pub fn n_basis(&self) -> usize {
        self.n_basis
    }

    /// Return the random initial perturbation magnitude.
    #[must_use]
    pub fn init_scale(&self) -> f64 {
        self.init_scale
    }

    /// Return the convergence tolerance.
    #[must_use]
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
