use crate::filter::params::{GaussianParams, MotionParams};
use crate::likelihood::DiscreteLikelihood;

/// How a particle region is scored against the reference
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObservationModel {
    /// Gaussian over the Bhattacharyya distance of the colour histograms
    #[default]
    Continuous,
    /// Discrete likelihood over the raw colour histogram counts
    Discrete(DiscreteLikelihood),
}

/// Class that is used to configure the particle filter
#[derive(Debug, Clone)]
pub struct ParticleFilterOptions {
    pub(crate) particles: usize,
    pub(crate) ess_threshold: f64,
    pub(crate) motion: MotionParams,
    pub(crate) color: GaussianParams,
    pub(crate) shape: GaussianParams,
    pub(crate) observation_model: ObservationModel,
    pub(crate) use_shape: bool,
    pub(crate) seed: Option<u64>,
}

impl ParticleFilterOptions {
    /// The number of particles kept by the filter.
    ///
    pub fn particles(mut self, n: usize) -> Self {
        assert!(n > 0, "The number of particles must be a positive number");
        self.particles = n;
        self
    }

    /// Resampling happens when the effective sample size divided by the number of particles
    /// falls strictly below the threshold. The same condition forces every particle to restart
    /// on the next prediction.
    ///
    pub fn ess_threshold(mut self, threshold: f64) -> Self {
        assert!(
            threshold > 0.0 && threshold <= 1.0,
            "ESS threshold must be within (0, 1]"
        );
        self.ess_threshold = threshold;
        self
    }

    /// Initial motion noise. The sampler may replace it later.
    ///
    pub fn motion(mut self, motion: MotionParams) -> Self {
        assert!(motion.is_valid(), "Motion noise must be positive");
        self.motion = motion;
        self
    }

    /// Initial gaussian over the colour histogram distance
    ///
    pub fn color_likelihood(mut self, params: GaussianParams) -> Self {
        assert!(params.is_valid(), "Colour likelihood std must be positive");
        self.color = params;
        self
    }

    /// Initial gaussian over the shape descriptor distance
    ///
    pub fn shape_likelihood(mut self, params: GaussianParams) -> Self {
        assert!(params.is_valid(), "Shape likelihood std must be positive");
        self.shape = params;
        self
    }

    /// Observation model used by the sampler when it replays the frame window
    ///
    pub fn observation_model(mut self, model: ObservationModel) -> Self {
        self.observation_model = model;
        self
    }

    /// Adds the shape descriptor term to the particle score
    ///
    pub fn use_shape(mut self, enabled: bool) -> Self {
        self.use_shape = enabled;
        self
    }

    /// Seeds the random source; without a seed the filter draws from the OS entropy.
    ///
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn get_particles(&self) -> usize {
        self.particles
    }

    pub fn get_observation_model(&self) -> ObservationModel {
        self.observation_model
    }
}

impl Default for ParticleFilterOptions {
    fn default() -> Self {
        Self {
            particles: 300,
            ess_threshold: 0.7,
            motion: MotionParams::default(),
            color: GaussianParams::default(),
            shape: GaussianParams::default(),
            observation_model: ObservationModel::default(),
            use_shape: false,
            seed: None,
        }
    }
}
