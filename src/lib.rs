//! Sequential Monte Carlo visual object tracker with online Bayesian
//! hyperparameter learning.
//!
//! The [`filter::ParticleFilter`] tracks a single bounding box over a frame
//! stream by scoring particles against a reference colour histogram (and an
//! optional shape descriptor). The [`pmmh::Pmmh`] sampler wraps the filter and
//! periodically re-estimates its motion and observation hyperparameters with
//! particle marginal Metropolis–Hastings over a lagged window of frames.
//!
//! Feature extraction, image I/O and rendering are consumed through the
//! [`features::FeatureExtractor`] and [`render::Renderer`] contracts.

use thiserror::Error;

/// Histogram distances
pub mod distance;

/// Frame and feature extraction contracts
pub mod features;

/// Particle filter implementation
pub mod filter;

/// Likelihood models used to score particles and as priors
pub mod likelihood;

/// Particle marginal Metropolis-Hastings sampler
pub mod pmmh;

/// Commonly used types
pub mod prelude;

/// Overlay drawing contract
pub mod render;

/// Synthetic frames, extractors and scene generators used by tests, benches and demos
pub mod test_stuff;

/// Utility types
pub mod utils;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Errors {
    #[error("Reference ROI must have positive width and height.")]
    DegenerateRoi,
    #[error("The tracker must be initialized first.")]
    NotInitialized,
    #[error("Frame window is empty - marginal likelihood cannot be evaluated.")]
    EmptyFrameWindow,
    #[error("Hyperparameters are not valid: {0}")]
    InvalidHyperparameters(String),
    #[error("Dimension mismatch: expected {expected}, got {actual}.")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Covariance matrix is not positive definite.")]
    SingularCovariance,
}

/// Tolerance used by approximate comparisons
pub const EPS: f64 = 0.00001;

/// Approximate comparison for floating point structures
///
pub trait EstimateClose {
    fn almost_same(&self, other: &Self, eps: f64) -> bool;
}

impl EstimateClose for f64 {
    fn almost_same(&self, other: &Self, eps: f64) -> bool {
        (self - other).abs() < eps
    }
}
