use crate::filter::options::ParticleFilterOptions;

/// Random-walk step sizes of the continuous hyperparameters
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSizes {
    pub position_std: f64,
    pub velocity_std: f64,
    pub scale_std: f64,
    /// Step of the colour and shape likelihood means
    pub mean: f64,
    /// Step of the colour and shape likelihood standard deviations
    pub std: f64,
}

impl Default for StepSizes {
    fn default() -> Self {
        Self {
            position_std: 0.1,
            velocity_std: 0.01,
            scale_std: 0.01,
            mean: 0.01,
            std: 0.01,
        }
    }
}

impl StepSizes {
    fn is_valid(&self) -> bool {
        [
            self.position_std,
            self.velocity_std,
            self.scale_std,
            self.mean,
            self.std,
        ]
        .iter()
        .all(|s| s.is_finite() && *s > 0.0)
    }
}

/// Hyperparameters of the priors placed over the learned parameters
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriorParams {
    /// Gamma prior shape for the positive scale parameters
    pub gamma_shape: f64,
    /// Gamma prior scale for the positive scale parameters
    pub gamma_scale: f64,
    /// Standard deviation of the zero-centered gaussian prior over the likelihood means
    pub mean_sd: f64,
    /// Symmetric Dirichlet concentration over the histogram proportions
    pub dirichlet_concentration: f64,
}

impl Default for PriorParams {
    fn default() -> Self {
        Self {
            gamma_shape: 1.0,
            gamma_scale: 1.0,
            mean_sd: 0.1,
            dirichlet_concentration: 1.0,
        }
    }
}

/// Class that is used to configure the PMMH sampler
#[derive(Debug, Clone)]
pub struct PmmhOptions {
    pub(crate) filter: ParticleFilterOptions,
    pub(crate) lag: usize,
    pub(crate) mcmc_steps: usize,
    pub(crate) mcmc_every: usize,
    pub(crate) steps: StepSizes,
    pub(crate) proposal_concentration: f64,
    pub(crate) prior: PriorParams,
    pub(crate) threads: usize,
    pub(crate) seed: Option<u64>,
}

impl PmmhOptions {
    /// Options of the live filter; the shadow filters are built from the same options.
    ///
    pub fn filter(mut self, opts: ParticleFilterOptions) -> Self {
        self.filter = opts;
        self
    }

    /// Shortcut to set the number of particles of the live and shadow filters
    ///
    pub fn particles(mut self, n: usize) -> Self {
        self.filter = self.filter.particles(n);
        self
    }

    /// The number of the last frames replayed to evaluate the marginal likelihood.
    ///
    pub fn lag(mut self, n: usize) -> Self {
        assert!(n > 0, "Lag must be a positive number");
        self.lag = n;
        self
    }

    /// The number of Metropolis-Hastings steps run by every sampling round.
    ///
    pub fn mcmc_steps(mut self, n: usize) -> Self {
        self.mcmc_steps = n;
        self
    }

    /// Sampling runs once every `n` frames.
    ///
    pub fn mcmc_every(mut self, n: usize) -> Self {
        assert!(n > 0, "MCMC cadence must be a positive number");
        self.mcmc_every = n;
        self
    }

    pub fn step_sizes(mut self, steps: StepSizes) -> Self {
        assert!(steps.is_valid(), "Step sizes must be positive");
        self.steps = steps;
        self
    }

    /// The proportions are proposed from `Gamma(k * current, 1)`; `k` is the multiplier.
    ///
    pub fn proposal_concentration(mut self, k: f64) -> Self {
        assert!(k > 0.0, "Proposal concentration must be positive");
        self.proposal_concentration = k;
        self
    }

    pub fn prior(mut self, prior: PriorParams) -> Self {
        self.prior = prior;
        self
    }

    /// The number of worker threads used by the filters.
    ///
    pub fn threads(mut self, n: usize) -> Self {
        assert!(n > 0, "The number of threads must be a positive number");
        self.threads = n;
        self
    }

    /// Seeds the sampler; the live and shadow filters are seeded from the sampler's generator.
    ///
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn get_lag(&self) -> usize {
        self.lag
    }

    pub fn get_mcmc_steps(&self) -> usize {
        self.mcmc_steps
    }
}

impl Default for PmmhOptions {
    fn default() -> Self {
        Self {
            filter: ParticleFilterOptions::default(),
            lag: 3,
            mcmc_steps: 5,
            mcmc_every: 1,
            steps: StepSizes::default(),
            proposal_concentration: 1.0,
            prior: PriorParams::default(),
            threads: num_cpus::get(),
            seed: None,
        }
    }
}
