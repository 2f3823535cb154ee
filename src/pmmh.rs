/// Metropolis-Hastings acceptance rule
pub mod acceptance;

/// Builder options of the sampler
pub mod options;

/// Priors over the hyperparameters
pub mod prior;

/// Proposal kernels
pub mod proposal;

/// Lagged frame window
pub mod window;

use crate::features::{FeatureExtractor, Frame, ReferenceModel};
use crate::filter::options::ParticleFilterOptions;
use crate::filter::params::Hyperparameters;
use crate::filter::ParticleFilter;
use crate::pmmh::acceptance::{AcceptanceStats, Decision};
use crate::pmmh::options::PmmhOptions;
use crate::pmmh::prior::Prior;
use crate::pmmh::proposal::Proposal;
use crate::pmmh::window::FrameWindow;
use crate::render::Renderer;
use crate::utils::bbox::BoundingBox;
use crate::Errors;
use anyhow::Result;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Particle marginal Metropolis-Hastings sampler wrapped around a live particle filter
///
/// Every `update` advances the live filter by one frame, appends the frame to the lagged
/// window and, at the configured cadence, runs a round of Metropolis-Hastings moves over the
/// filter hyperparameters. The marginal likelihood of a hyperparameter vector is estimated
/// by a disposable shadow filter replaying the window.
///
pub struct Pmmh<E: FeatureExtractor> {
    opts: PmmhOptions,
    extractor: Arc<E>,
    filter: ParticleFilter<E>,
    window: FrameWindow<E::Frame>,
    reference: Option<ReferenceModel>,
    estimates: Vec<BoundingBox>,
    theta: Hyperparameters,
    prior: Prior,
    proposal: Proposal,
    stats: AcceptanceStats,
    frames: usize,
    rng: StdRng,
    pool: ThreadPool,
}

impl<E: FeatureExtractor> Pmmh<E> {
    pub fn new(opts: PmmhOptions, extractor: Arc<E>) -> Result<Self> {
        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let filter_opts = match opts.seed {
            Some(_) => opts.filter.clone().seed(rng.gen()),
            None => opts.filter.clone(),
        };
        let pool = ThreadPoolBuilder::new().num_threads(opts.threads).build()?;

        Ok(Self {
            filter: ParticleFilter::new(&filter_opts, extractor.clone()),
            window: FrameWindow::new(opts.lag),
            reference: None,
            estimates: Vec::default(),
            theta: Hyperparameters::default(),
            prior: Prior::new(&opts.prior)?,
            proposal: Proposal::new(opts.steps, opts.proposal_concentration),
            stats: AcceptanceStats::default(),
            frames: 0,
            rng,
            pool,
            extractor,
            opts,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.reference.is_some()
    }

    /// Initializes the live filter on the first frame and seeds the hyperparameters from it
    ///
    pub fn initialize(&mut self, frame: Arc<E::Frame>, roi: BoundingBox) -> Result<()> {
        self.filter.initialize_from_frame(&frame, roi)?;
        self.reference = self.filter.reference().cloned();
        self.theta = self.filter.hyperparameters();
        self.window.clear();
        self.window.push(frame, roi);
        self.estimates = vec![roi];
        self.stats = AcceptanceStats::default();
        self.frames = 0;
        Ok(())
    }

    /// Rebuilds the live filter population around the reference region; the learned
    /// hyperparameters are kept
    ///
    pub fn reinitialize(&mut self) -> Result<()> {
        let reference = self.reference.as_ref().ok_or(Errors::NotInitialized)?;
        let frame_size = self.filter.frame_size();
        self.filter.reinitialize();
        self.filter.initialize(
            reference.roi,
            frame_size,
            reference.histogram.clone(),
            reference.descriptor.clone(),
        )?;
        self.filter.update_model(&self.theta)?;
        info!("Sampler reinitialized at {:?}", reference.roi);
        Ok(())
    }

    /// Advances the live filter motion model
    ///
    pub fn predict(&mut self) -> Result<()> {
        let filter = &mut self.filter;
        self.pool.install(|| filter.predict())
    }

    /// Scores the live filter particles against the frame with the configured observation
    /// model
    ///
    pub fn update_filter(&mut self, frame: &E::Frame) -> Result<()> {
        let model = self.opts.filter.get_observation_model();
        let filter = &mut self.filter;
        self.pool.install(|| filter.update_with(frame, model))
    }

    /// Processes the next frame: predict, update, window bookkeeping and, at the configured
    /// cadence, a round of Metropolis-Hastings moves
    ///
    pub fn update(&mut self, frame: Arc<E::Frame>) -> Result<()> {
        if !self.is_initialized() {
            return Err(Errors::NotInitialized.into());
        }
        self.predict()?;
        self.update_filter(&frame)?;

        let estimate = self.filter.estimate();
        let roi = if estimate.is_empty() {
            self.window
                .latest()
                .map(|(_, roi)| *roi)
                .unwrap_or(estimate)
        } else {
            estimate
        };
        self.window.push(frame, roi);
        self.frames += 1;

        if self.frames % self.opts.mcmc_every == 0 {
            self.run_mcmc()?;
        }
        Ok(())
    }

    /// Estimates the marginal likelihood of the window under `theta` with a disposable filter
    ///
    /// The window has to hold at least two frames to carry any evidence; with a single frame
    /// the result is zero.
    ///
    pub fn marginal_likelihood(&mut self, theta: &Hyperparameters) -> Result<f64> {
        let reference = self.reference.as_ref().ok_or(Errors::NotInitialized)?;
        let opts = self.opts.filter.clone().seed(self.rng.gen());
        let extractor = self.extractor.clone();
        let window = &self.window;
        self.pool
            .install(|| replay(extractor, &opts, reference, window, theta))
    }

    /// Runs `mcmc_steps` Metropolis-Hastings moves; returns the number of accepted moves
    ///
    pub fn run_mcmc(&mut self) -> Result<usize> {
        if self.window.len() < 2 {
            debug!("MCMC skipped: the window holds {} frame(s)", self.window.len());
            return Ok(0);
        }
        let current = self.theta.clone();
        let mut current_ml = self.marginal_likelihood(&current)?;
        if !current_ml.is_finite() {
            warn!("Baseline marginal likelihood is not finite: {}", current_ml);
        }

        let mut accepted = 0;
        for step in 0..self.opts.mcmc_steps {
            let candidate = self.proposal.propose(&self.theta, &mut self.rng);
            let candidate_ml = if candidate.validate().is_ok() {
                let ml = self.marginal_likelihood(&candidate).unwrap_or_else(|e| {
                    warn!("Candidate replay failed: {}", e);
                    f64::NAN
                });
                if !ml.is_finite() {
                    warn!("Candidate marginal likelihood is not finite: {}", ml);
                }
                ml
            } else {
                f64::NAN
            };

            let rng = &mut self.rng;
            let decision = acceptance::decide(
                &candidate,
                candidate_ml,
                &self.theta,
                current_ml,
                &self.prior,
                || rng.gen(),
            );
            self.stats.record(decision);

            if decision == Decision::Accepted {
                self.filter.update_model(&candidate)?;
                info!(
                    "MCMC step {} accepted, marginal likelihood {:.3} -> {:.3}, motion {:?}",
                    step, current_ml, candidate_ml, candidate.motion
                );
                self.theta = candidate;
                current_ml = candidate_ml;
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    /// Estimate of the live filter; it is appended to the estimate history
    ///
    pub fn estimate(&mut self) -> BoundingBox {
        let estimate = self.filter.estimate();
        self.estimates.push(estimate);
        estimate
    }

    /// Same as `estimate`, and draws the result
    ///
    pub fn draw_estimate<R: Renderer>(&mut self, renderer: &mut R) -> BoundingBox {
        let estimate = self.filter.draw_estimate(renderer);
        self.estimates.push(estimate);
        estimate
    }

    pub fn draw_particles<R: Renderer>(&self, renderer: &mut R) {
        self.filter.draw_particles(renderer);
    }

    /// Estimate history; the first entry is the reference region
    ///
    pub fn estimates(&self) -> &[BoundingBox] {
        &self.estimates
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.theta
    }

    pub fn stats(&self) -> AcceptanceStats {
        self.stats
    }

    pub fn acceptance_rate(&self) -> f64 {
        self.stats.rate()
    }

    pub fn filter(&self) -> &ParticleFilter<E> {
        &self.filter
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}

/// Runs a fresh filter over the window under `theta` and returns its marginal likelihood.
///
/// The filter is initialized on the oldest frame with the region believed for it, then every
/// following frame is predicted and observed.
///
fn replay<E: FeatureExtractor>(
    extractor: Arc<E>,
    opts: &ParticleFilterOptions,
    reference: &ReferenceModel,
    window: &FrameWindow<E::Frame>,
    theta: &Hyperparameters,
) -> Result<f64> {
    let mut frames = window.iter();
    let (first, roi) = frames.next().ok_or(Errors::EmptyFrameWindow)?;

    let mut shadow = ParticleFilter::new(opts, extractor);
    shadow.initialize(
        *roi,
        first.size(),
        reference.histogram.clone(),
        reference.descriptor.clone(),
    )?;
    shadow.update_model(theta)?;

    let model = opts.get_observation_model();
    for (frame, _) in frames {
        shadow.predict()?;
        shadow.update_with(frame, model)?;
    }
    Ok(shadow.marginal_likelihood())
}
