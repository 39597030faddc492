//! Elastic amplitude-phase distance between sampled functions.
//!
//! Builds on [`elastica_srsf`] (transform, warping geometry, DP alignment)
//! and adds the stochastic layer: a seeded multi-restart gradient solver on
//! the warping manifold, pluggable solver strategies, an injection point
//! for external reparameterization routines, and the [`ApDistance`]
//! orchestrator that turns a function pair into an amplitude and a phase
//! distance.
//!
//! # Example
//!
//! ```
//! use elastica_align::ApDistance;
//! use elastica_srsf::TimeGrid;
//!
//! let grid = TimeGrid::uniform(51)?;
//! let f1: Vec<f64> = grid
//!     .as_slice()
//!     .iter()
//!     .map(|&t| (2.0 * std::f64::consts::PI * t).sin())
//!     .collect();
//! let f2: Vec<f64> = grid
//!     .as_slice()
//!     .iter()
//!     .map(|&t| (2.0 * std::f64::consts::PI * t + 0.5).sin())
//!     .collect();
//!
//! let pair = ApDistance::new(grid).distance(&f1, &f2)?;
//! assert!(pair.amplitude >= 0.0 && pair.phase >= 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod distance;
mod error;
mod gradient;
mod reparam;

pub use config::GradientConfig;
pub use distance::{ApDistance, DistancePair, Strategy};
pub use error::AlignError;
pub use reparam::ReparamRoutine;

pub use elastica_srsf::DpSolver;
