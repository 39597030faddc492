//! Square-root slope framework for elastic function alignment.
//!
//! Pure math library with zero I/O. Provides the SRSF transform and its
//! inverse, validated warping functions with composition and inversion,
//! Fisher-Rao geometry over the warping space (inner products, geodesic
//! distances, exponential/logarithm maps, Karcher means), and the
//! deterministic dynamic-programming alignment solver.

mod dp;
mod error;
mod grid;
mod manifold;
mod srsf;
mod warping;

pub use dp::DpSolver;
pub use error::SrsfError;
pub use grid::TimeGrid;
pub use manifold::WarpingManifold;
pub use srsf::Srsf;
pub use warping::WarpingFunction;
