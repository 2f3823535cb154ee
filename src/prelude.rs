use crate::features;
use crate::filter;
use crate::pmmh;

pub use features::{FeatureExtractor, Frame, Histogram};
pub use filter::options::{ObservationModel, ParticleFilterOptions};
pub use filter::params::{GaussianParams, Hyperparameters, MotionParams, ObservationParams};
pub use filter::ParticleFilter;
pub use pmmh::options::{PmmhOptions, PriorParams, StepSizes};
pub use pmmh::Pmmh;

pub use crate::likelihood::DiscreteLikelihood;
pub use crate::render::{Color, Renderer};
pub use crate::utils::bbox::{BoundingBox, FrameSize};
