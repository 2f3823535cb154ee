/// Builder options of the filter
pub mod options;

/// Motion and observation hyperparameters
pub mod params;

/// Particle state
pub mod particle;

/// Log-domain weight normalization and multinomial resampling
pub mod resample;

use crate::distance::{bhattacharyya, INCOMPARABLE};
use crate::features::{epsilon_floor, FeatureExtractor, Frame, Histogram, ReferenceModel};
use crate::filter::options::{ObservationModel, ParticleFilterOptions};
use crate::filter::params::{GaussianParams, Hyperparameters, MotionParams, ObservationParams};
use crate::filter::particle::{Particle, ParticleState};
use crate::likelihood::gaussian::Gaussian;
use crate::likelihood::{DiscreteLikelihood, DiscreteModels, LogLikelihood};
use crate::render::{Color, Renderer};
use crate::utils::bbox::{BoundingBox, FrameSize};
use crate::Errors;
use anyhow::Result;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Gamma, StandardNormal};
use rayon::prelude::*;
use std::sync::Arc;

/// Sequential Monte Carlo tracker of a single rectangular object
///
/// The filter keeps `N` particles with log-domain weights. Every frame is processed as
/// `predict` followed by `update` (or `update_discrete`); the update calls `resample`, which
/// normalizes the weights, accumulates the log marginal likelihood and resamples the
/// population when the effective sample size ratio falls below the threshold.
///
pub struct ParticleFilter<E: FeatureExtractor> {
    extractor: Arc<E>,
    opts: ParticleFilterOptions,
    rng: StdRng,
    particles: Vec<Particle>,
    log_weights: Vec<f64>,
    // log(sum(exp(w))) of the weights carried into the next update
    carried_log_mass: f64,
    ess: f64,
    marginal_likelihood: f64,
    evidence_steps: usize,
    time_stamp: usize,
    motion: MotionParams,
    color_likelihood: Gaussian,
    shape_likelihood: Gaussian,
    discrete: Option<DiscreteModels>,
    concentration: Option<Vec<f64>>,
    reference: Option<ReferenceModel>,
    frame_size: FrameSize,
}

impl<E: FeatureExtractor> ParticleFilter<E> {
    /// Creates an uninitialized filter
    ///
    pub fn new(opts: &ParticleFilterOptions, extractor: Arc<E>) -> Self {
        let rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            extractor,
            opts: opts.clone(),
            rng,
            particles: Vec::default(),
            log_weights: Vec::default(),
            carried_log_mass: 0.0,
            ess: 0.0,
            marginal_likelihood: 0.0,
            evidence_steps: 0,
            time_stamp: 0,
            motion: opts.motion,
            color_likelihood: Gaussian::new(opts.color.mean, opts.color.std),
            shape_likelihood: Gaussian::new(opts.shape.mean, opts.shape.std),
            discrete: None,
            concentration: None,
            reference: None,
            frame_size: FrameSize::default(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.reference.is_some()
    }

    /// Spawns the particle population around the reference region
    ///
    /// # Parameters
    /// * `reference_roi` - region of the object in the first frame; must have a positive area
    /// * `frame_size` - dimensions of the frames processed later
    /// * `reference_histogram` - colour histogram of the object
    /// * `reference_descriptor` - shape descriptor of the object, if the extractor has one
    ///
    pub fn initialize(
        &mut self,
        reference_roi: BoundingBox,
        frame_size: FrameSize,
        reference_histogram: Histogram,
        reference_descriptor: Option<Histogram>,
    ) -> Result<()> {
        if reference_roi.is_empty() {
            return Err(Errors::DegenerateRoi.into());
        }
        let n = self.opts.particles;
        let motion = self.motion;
        let rng = &mut self.rng;

        self.particles = (0..n)
            .map(|_| {
                let scale = 1.0 + gauss(rng, motion.scale_std);
                Particle::new(ParticleState {
                    x: (reference_roi.x() + gauss(rng, motion.position_std)).round(),
                    y: (reference_roi.y() + gauss(rng, motion.position_std)).round(),
                    width: (reference_roi.width() * scale.abs()).round(),
                    height: (reference_roi.height() * scale.abs()).round(),
                    dx: gauss(rng, motion.velocity_std),
                    dy: gauss(rng, motion.velocity_std),
                    scale,
                })
            })
            .collect();

        let alpha = reference_histogram
            .iter()
            .map(|v| reference_concentration(*v, rng))
            .collect::<Vec<_>>();
        let mut discrete = DiscreteModels::new(&alpha);
        if let Some(c) = &self.concentration {
            if c.len() == discrete.dims() {
                discrete.set_concentration(c);
            }
        }

        self.discrete = Some(discrete);
        self.log_weights = vec![0.0; n];
        self.carried_log_mass = (n as f64).ln();
        self.ess = 0.0;
        self.marginal_likelihood = 0.0;
        self.evidence_steps = 0;
        self.time_stamp = 0;
        self.frame_size = frame_size;
        self.reference = Some(ReferenceModel {
            roi: reference_roi,
            histogram: reference_histogram,
            descriptor: reference_descriptor,
        });
        debug!(
            "Particle filter initialized with {} particles around {:?}",
            n, reference_roi
        );
        Ok(())
    }

    /// Extracts the reference model from the frame and initializes the filter with it
    ///
    /// Fails with `DegenerateRoi` when the region does not overlap the frame.
    ///
    pub fn initialize_from_frame(&mut self, frame: &E::Frame, roi: BoundingBox) -> Result<()> {
        let reference = ReferenceModel::extract(self.extractor.as_ref(), frame, roi)?;
        self.initialize(roi, frame.size(), reference.histogram, reference.descriptor)
    }

    /// Drops the population and the accumulated evidence. The learned hyperparameters survive
    /// and are used by the next `initialize`.
    ///
    pub fn reinitialize(&mut self) {
        self.particles.clear();
        self.log_weights.clear();
        self.carried_log_mass = 0.0;
        self.ess = 0.0;
        self.marginal_likelihood = 0.0;
        self.evidence_steps = 0;
        self.time_stamp = 0;
        self.discrete = None;
        self.reference = None;
    }

    /// Propagates every particle through the motion model.
    ///
    /// A particle moves smoothly with its velocity plus gaussian noise unless the new box
    /// leaves the frame or the previous effective sample size ratio is below the threshold.
    /// In those cases it restarts: either near the reference region or at a uniformly drawn
    /// in-frame position, with a fresh velocity and scale.
    ///
    pub fn predict(&mut self) -> Result<()> {
        let reference_roi = self.reference.as_ref().ok_or(Errors::NotInitialized)?.roi;
        let restart_all = self.ess_ratio() < self.opts.ess_threshold;
        let motion = self.motion;
        let frame = self.frame_size;
        let rng = &mut self.rng;
        let mut restarts = 0;

        let next = self
            .particles
            .iter()
            .map(|p| {
                let s = p.state;
                let moved = ParticleState {
                    x: (s.x + s.dx + gauss(rng, motion.position_std)).round(),
                    y: (s.y + s.dy + gauss(rng, motion.position_std)).round(),
                    width: s.width.round(),
                    height: s.height.round(),
                    ..s
                };
                if !restart_all && moved.bbox().is_within(&frame) {
                    p.advance(moved)
                } else {
                    restarts += 1;
                    p.advance(restart(&s, &reference_roi, &frame, &motion, rng))
                }
            })
            .collect::<Vec<_>>();

        self.particles = next;
        self.time_stamp += 1;
        trace!(
            "Prediction {}: {} of {} particles restarted",
            self.time_stamp,
            restarts,
            self.particles.len()
        );
        Ok(())
    }

    /// Scores the particles with the continuous colour (and optionally shape) likelihood and
    /// resamples
    ///
    pub fn update(&mut self, frame: &E::Frame) -> Result<()> {
        self.update_with(frame, ObservationModel::Continuous)
    }

    /// Scores the particles with a discrete likelihood over the histogram counts and resamples
    ///
    pub fn update_discrete(&mut self, frame: &E::Frame, kind: DiscreteLikelihood) -> Result<()> {
        self.update_with(frame, ObservationModel::Discrete(kind))
    }

    /// Scores the particles with the chosen observation model and resamples
    ///
    pub fn update_with(&mut self, frame: &E::Frame, model: ObservationModel) -> Result<()> {
        let reference = self.reference.as_ref().ok_or(Errors::NotInitialized)?;
        let scorer = Scorer {
            extractor: self.extractor.as_ref(),
            reference,
            color: &self.color_likelihood,
            shape: &self.shape_likelihood,
            discrete: self.discrete.as_ref(),
            use_shape: self.opts.use_shape,
            frame_size: frame.size(),
            model,
        };

        let scores = self
            .particles
            .par_iter()
            .map(|p| scorer.score(frame, p))
            .collect::<Vec<_>>();

        self.log_weights
            .iter_mut()
            .zip(scores)
            .for_each(|(w, s)| *w += s);
        self.resample();
        Ok(())
    }

    /// Normalizes the weights, accumulates the marginal likelihood and resamples the
    /// population when the effective sample size ratio is strictly below the threshold.
    ///
    /// Returns `true` when the population was resampled.
    ///
    pub fn resample(&mut self) -> bool {
        if self.particles.is_empty() {
            return false;
        }
        let n = self.particles.len();
        let (weights, norm_const) = resample::normalize(&self.log_weights);

        self.marginal_likelihood += norm_const - self.carried_log_mass;
        self.evidence_steps += 1;
        self.ess = resample::effective_sample_size(&weights);

        if self.ess_ratio() < self.opts.ess_threshold {
            let cumsum = resample::cumulative_sum(&weights);
            let indices = resample::multinomial_indices(&cumsum, n, &mut self.rng);
            self.particles = indices.into_iter().map(|i| self.particles[i]).collect();
            self.log_weights = vec![0.0; n];
            self.carried_log_mass = (n as f64).ln();
            debug!(
                "Resampled {} particles, ESS ratio {:.3}",
                n,
                self.ess / n as f64
            );
            true
        } else {
            let max = resample::max_weight(&self.log_weights);
            if max.is_finite() {
                self.log_weights.iter_mut().for_each(|w| *w -= max);
                self.carried_log_mass = norm_const - max;
            } else {
                self.log_weights = vec![0.0; n];
                self.carried_log_mass = (n as f64).ln();
            }
            false
        }
    }

    /// Installs new motion and observation hyperparameters.
    ///
    /// The concentration vector is re-normalized to proportions: the multinomial receives them
    /// as they are, the Dirichlet and Poisson models receive them scaled by the reference mass.
    /// An empty concentration leaves the discrete models untouched.
    ///
    pub fn update_model(&mut self, params: &Hyperparameters) -> Result<()> {
        params.validate()?;
        let observation = &params.observation;
        if !observation.alpha.is_empty() {
            if let Some(discrete) = &mut self.discrete {
                if discrete.dims() != observation.alpha.len() {
                    return Err(Errors::DimensionMismatch {
                        expected: discrete.dims(),
                        actual: observation.alpha.len(),
                    }
                    .into());
                }
                discrete.set_concentration(&observation.alpha);
            }
            self.concentration = Some(observation.alpha.clone());
        }
        self.motion = params.motion;
        self.color_likelihood = Gaussian::new(observation.color.mean, observation.color.std);
        self.shape_likelihood = Gaussian::new(observation.shape.mean, observation.shape.std);
        Ok(())
    }

    pub fn motion_params(&self) -> MotionParams {
        self.motion
    }

    /// Observation parameters currently in use; the concentration is reported as proportions
    ///
    pub fn observation_params(&self) -> ObservationParams {
        ObservationParams {
            color: GaussianParams::new(self.color_likelihood.mean(), self.color_likelihood.std()),
            shape: GaussianParams::new(self.shape_likelihood.mean(), self.shape_likelihood.std()),
            alpha: self
                .discrete
                .as_ref()
                .map(|d| d.proportions().to_vec())
                .unwrap_or_default(),
        }
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters::new(self.motion_params(), self.observation_params())
    }

    /// Effective sample size computed by the last resampling step, in `(0, N]`
    ///
    pub fn ess(&self) -> f64 {
        self.ess
    }

    pub fn ess_ratio(&self) -> f64 {
        if self.particles.is_empty() {
            0.0
        } else {
            self.ess / self.particles.len() as f64
        }
    }

    /// Log marginal likelihood accumulated since the initialization
    ///
    /// Every resample adds the log normalizer of the scored weights minus the log mass of the
    /// weights carried into the update. The carried mass is `ln N` after the initialization or
    /// a resample and the shifted normalizer otherwise.
    ///
    pub fn marginal_likelihood(&self) -> f64 {
        self.marginal_likelihood
    }

    /// The number of terms accumulated into the marginal likelihood
    ///
    pub fn evidence_steps(&self) -> usize {
        self.evidence_steps
    }

    /// The number of predictions since the initialization
    ///
    pub fn time_stamp(&self) -> usize {
        self.time_stamp
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn log_weights(&self) -> &[f64] {
        &self.log_weights
    }

    /// Normalized linear weights
    ///
    pub fn weights(&self) -> Vec<f64> {
        resample::normalize(&self.log_weights).0
    }

    pub fn reference(&self) -> Option<&ReferenceModel> {
        self.reference.as_ref()
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    /// Weighted mean box of the population
    ///
    /// The result is the empty box when the filter is not initialized or the mean box does not
    /// lie strictly inside the frame.
    ///
    pub fn estimate(&self) -> BoundingBox {
        if self.particles.is_empty() {
            return BoundingBox::default();
        }
        let (x, y, w, h) = self.particles.iter().zip(self.weights()).fold(
            (0.0, 0.0, 0.0, 0.0),
            |(x, y, w, h), (p, weight)| {
                let s = &p.state;
                (
                    x + weight * s.x,
                    y + weight * s.y,
                    w + weight * s.width,
                    h + weight * s.height,
                )
            },
        );

        let (x1, x2) = min_max(x.round(), (x + w).round());
        let (y1, y2) = min_max(y.round(), (y + h).round());

        let bbox = BoundingBox::new(x1, y1, x2 - x1, y2 - y1);
        if bbox.is_within(&self.frame_size) {
            bbox
        } else {
            BoundingBox::default()
        }
    }

    /// Computes the estimate and draws it when it is not empty
    ///
    pub fn draw_estimate<R: Renderer>(&self, renderer: &mut R) -> BoundingBox {
        let estimate = self.estimate();
        if !estimate.is_empty() {
            renderer.rectangle(&estimate, Color::ESTIMATE);
        }
        estimate
    }

    pub fn draw_particles<R: Renderer>(&self, renderer: &mut R) {
        for p in &self.particles {
            renderer.rectangle(&p.bbox().rounded(), Color::PARTICLE);
        }
    }
}

struct Scorer<'a, E: FeatureExtractor> {
    extractor: &'a E,
    reference: &'a ReferenceModel,
    color: &'a Gaussian,
    shape: &'a Gaussian,
    discrete: Option<&'a DiscreteModels>,
    use_shape: bool,
    frame_size: FrameSize,
    model: ObservationModel,
}

impl<'a, E: FeatureExtractor> Scorer<'a, E> {
    /// Log-likelihood increment of a particle; incomparable terms contribute nothing
    ///
    fn score(&self, frame: &E::Frame, particle: &Particle) -> f64 {
        let region = match self.region(particle) {
            Some(r) => r,
            None => return 0.0,
        };
        let histogram = self.extractor.color_histogram(frame, &region);

        let mut ll = match self.model {
            ObservationModel::Continuous => {
                let d = bhattacharyya(&self.reference.histogram, &histogram);
                if d != INCOMPARABLE {
                    self.color.log_likelihood(&d)
                } else {
                    0.0
                }
            }
            ObservationModel::Discrete(kind) => match self.discrete {
                Some(models) if models.dims() == histogram.len() => {
                    models.log_likelihood(kind, epsilon_floor(&histogram).as_slice())
                }
                _ => 0.0,
            },
        };

        if self.use_shape {
            ll += self.shape_score(frame, &region);
        }
        ll
    }

    fn shape_score(&self, frame: &E::Frame, region: &BoundingBox) -> f64 {
        let candidate = self.extractor.shape_descriptor(frame, region);
        match (&self.reference.descriptor, candidate) {
            (Some(r), Some(c)) if r.shape() == c.shape() => {
                let d = bhattacharyya(r, &c);
                if d != INCOMPARABLE {
                    self.shape.log_likelihood(&d)
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    /// The particle box with degenerate dimensions replaced by the reference ones, clipped to
    /// the frame
    ///
    fn region(&self, particle: &Particle) -> Option<BoundingBox> {
        let s = &particle.state;
        let reference = &self.reference.roi;
        let width = if s.width > 0.0 { s.width } else { reference.width() };
        let height = if s.height > 0.0 { s.height } else { reference.height() };
        let region = BoundingBox::new(s.x, s.y, width, height)
            .rounded()
            .clip(&self.frame_size);
        if region.is_empty() {
            None
        } else {
            Some(region)
        }
    }
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    (a.min(b), a.max(b))
}

fn gauss<R: Rng + ?Sized>(rng: &mut R, std: f64) -> f64 {
    std * rng.sample::<f64, _>(StandardNormal)
}

/// Gamma(v, 1) draw for a non-zero reference bin, machine epsilon otherwise
///
fn reference_concentration<R: Rng + ?Sized>(v: f64, rng: &mut R) -> f64 {
    if v == 0.0 {
        return f64::EPSILON;
    }
    match Gamma::new(v, 1.0) {
        Ok(g) => g.sample(rng).max(f64::EPSILON),
        Err(_) => f64::EPSILON,
    }
}

fn restart<R: Rng + ?Sized>(
    s: &ParticleState,
    reference: &BoundingBox,
    frame: &FrameSize,
    motion: &MotionParams,
    rng: &mut R,
) -> ParticleState {
    let dx = gauss(rng, motion.velocity_std);
    let dy = gauss(rng, motion.velocity_std);
    let width = (reference.width() * s.scale.abs()).round();
    let height = (reference.height() * s.scale.abs()).round();

    let (x, y) = if rng.gen::<f64>() < 0.5 {
        (
            (reference.x() + gauss(rng, motion.position_std)).round(),
            (reference.y() + gauss(rng, motion.position_std)).round(),
        )
    } else {
        (
            uniform_coordinate(frame.width as f64 - width, reference.x(), rng),
            uniform_coordinate(frame.height as f64 - height, reference.y(), rng),
        )
    };

    ParticleState {
        x,
        y,
        width,
        height,
        dx,
        dy,
        scale: 1.0 + gauss(rng, motion.scale_std),
    }
}

/// Integer coordinate drawn uniformly from `[0, upper]`, `fallback` when the draw is not
/// strictly inside the range
///
fn uniform_coordinate<R: Rng + ?Sized>(upper: f64, fallback: f64, rng: &mut R) -> f64 {
    if upper < 1.0 {
        return fallback;
    }
    let v = rng.gen_range(0..=upper as i64) as f64;
    if v > 0.0 && v < upper {
        v
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use crate::filter::options::ParticleFilterOptions;
    use crate::filter::params::{GaussianParams, Hyperparameters, MotionParams};
    use crate::filter::particle::{Particle, ParticleState};
    use crate::filter::{resample, ParticleFilter};
    use crate::likelihood::DiscreteLikelihood;
    use crate::render::{Color, Renderer};
    use crate::test_stuff::{GridExtractor, SceneGen, SyntheticFrame};
    use crate::utils::bbox::{BoundingBox, FrameSize};
    use crate::EPS;
    use std::sync::Arc;

    fn filter(particles: usize, threshold: f64) -> ParticleFilter<GridExtractor> {
        let opts = ParticleFilterOptions::default()
            .particles(particles)
            .ess_threshold(threshold)
            .seed(7);
        ParticleFilter::new(&opts, Arc::new(GridExtractor::default()))
    }

    fn initialized(particles: usize, threshold: f64) -> (ParticleFilter<GridExtractor>, SceneGen) {
        let scene = SceneGen::new(
            FrameSize::new(100, 100),
            BoundingBox::new(40.0, 40.0, 20.0, 20.0),
            (0.0, 0.0),
        );
        let mut f = filter(particles, threshold);
        f.initialize_from_frame(&scene.frame(0), scene.roi(0))
            .unwrap();
        (f, scene)
    }

    #[derive(Default)]
    struct Recorder {
        boxes: Vec<(BoundingBox, Color)>,
    }

    impl Renderer for Recorder {
        fn rectangle(&mut self, bbox: &BoundingBox, color: Color) {
            self.boxes.push((*bbox, color));
        }
    }

    #[test]
    fn uniform_weights_after_init() {
        let (f, _) = initialized(16, 0.7);
        assert!(f.is_initialized());
        assert_eq!(f.particles().len(), 16);
        assert_eq!(f.marginal_likelihood(), 0.0);
        assert!(f.weights().iter().all(|w| (w - 1.0 / 16.0).abs() < EPS));
    }

    #[test]
    fn degenerate_roi() {
        let mut f = filter(4, 0.7);
        let frame = SyntheticFrame::new(10, 10, [0, 0, 0]);
        assert!(f
            .initialize_from_frame(&frame, BoundingBox::new(1.0, 1.0, 0.0, 5.0))
            .is_err());
        assert!(!f.is_initialized());
        assert!(f.predict().is_err());
        assert!(f.update(&frame).is_err());
        assert!(f.estimate().is_empty());
    }

    #[test]
    fn roi_outside_frame() {
        let mut f = filter(4, 0.7);
        let frame = SyntheticFrame::new(100, 100, [0, 0, 0]);
        assert!(f
            .initialize_from_frame(&frame, BoundingBox::new(200.0, 200.0, 10.0, 10.0))
            .is_err());
        assert!(!f.is_initialized());
    }

    #[test]
    fn ess_within_bounds() {
        let (mut f, scene) = initialized(50, 0.7);
        for t in 1..5 {
            f.predict().unwrap();
            f.update(&scene.frame(t)).unwrap();
            assert!(f.ess() > 0.0 && f.ess() <= 50.0 + EPS);
            let sum = f.weights().iter().sum::<f64>();
            assert!((sum - 1.0).abs() < EPS);
        }
    }

    fn resample_with(log_weights: &[f64], threshold: f64) -> bool {
        let (mut f, _) = initialized(log_weights.len(), threshold);
        f.log_weights = log_weights.to_vec();
        f.resample()
    }

    #[test]
    fn resample_threshold() {
        let log_weights = [0.6_f64.ln(), 0.4_f64.ln(), -1000.0, -1000.0];
        let (w, _) = resample::normalize(&log_weights);
        let ratio = resample::effective_sample_size(&w) / 4.0;
        assert!((ratio - 0.480_769).abs() < 1e-5);

        assert!(!resample_with(&log_weights, ratio));
        assert!(resample_with(&log_weights, ratio + 1e-9));
        assert!(!resample_with(&log_weights, ratio - 1e-9));
    }

    #[test]
    fn resample_resets_weights() {
        let (mut f, _) = initialized(4, 0.5);
        f.log_weights = vec![0.0, -1000.0, -1000.0, -1000.0];
        let first = f.particles()[0].state;
        assert!(f.resample());
        assert!(f.weights().iter().all(|w| (w - 0.25).abs() < EPS));
        assert!(f.particles().iter().all(|p| p.state == first));
    }

    #[test]
    fn kept_weights_are_max_subtracted() {
        let (mut f, _) = initialized(4, 0.5);
        f.log_weights = vec![1000.0; 4];
        assert!(!f.resample());
        assert!(f.log_weights().iter().all(|w| *w == 0.0));
        assert!(f.weights().iter().all(|w| (w - 0.25).abs() < EPS));
        assert!(f.marginal_likelihood().is_finite());
        assert!((f.marginal_likelihood() - 1000.0).abs() < EPS);
    }

    #[test]
    fn marginal_likelihood_persists() {
        let (mut f, scene) = initialized(30, 0.7);
        for t in 1..4 {
            f.predict().unwrap();
            f.update(&scene.frame(t)).unwrap();
            assert_eq!(f.evidence_steps(), t);
        }
        let ml = f.marginal_likelihood();
        assert!(ml.is_finite());
        assert_ne!(ml, 0.0);

        f.reinitialize();
        assert!(!f.is_initialized());
        assert_eq!(f.marginal_likelihood(), 0.0);
        assert_eq!(f.evidence_steps(), 0);
    }

    #[test]
    fn estimate_outside_frame() {
        let (mut f, _) = initialized(4, 0.7);
        let far = ParticleState {
            x: 200.0,
            y: 200.0,
            width: 10.0,
            height: 10.0,
            scale: 1.0,
            ..Default::default()
        };
        f.particles = vec![Particle::new(far); 4];
        assert!(f.estimate().is_empty());
    }

    #[test]
    fn estimate_is_weighted_mean() {
        let (mut f, _) = initialized(2, 0.7);
        let a = ParticleState {
            x: 10.0,
            y: 10.0,
            width: 10.0,
            height: 10.0,
            scale: 1.0,
            ..Default::default()
        };
        let b = ParticleState {
            x: 30.0,
            ..a
        };
        f.particles = vec![Particle::new(a), Particle::new(b)];
        f.log_weights = vec![0.0, 0.0];
        let e = f.estimate();
        assert_eq!(e, BoundingBox::new(20.0, 10.0, 10.0, 10.0));

        let mut r = Recorder::default();
        f.draw_particles(&mut r);
        assert_eq!(f.draw_estimate(&mut r), e);
        assert_eq!(r.boxes.len(), 3);
        assert_eq!(r.boxes[2].1, Color::ESTIMATE);
    }

    #[test]
    fn predict_keeps_particles_in_frame() {
        let (mut f, _) = initialized(100, 0.7);
        let size = f.frame_size();
        for _ in 0..10 {
            f.predict().unwrap();
        }
        assert_eq!(f.time_stamp(), 10);
        let inside = f
            .particles()
            .iter()
            .filter(|p| p.bbox().is_within(&size))
            .count();
        assert!(inside > 50);
    }

    fn placed(x: f64) -> Particle {
        Particle::new(ParticleState {
            x,
            y: 10.0,
            width: 10.0,
            height: 10.0,
            dx: 5.0,
            dy: 0.0,
            scale: 1.0,
        })
    }

    #[test]
    fn predict_moves_or_restarts() {
        let (mut f, _) = initialized(4, 0.5);
        f.particles = vec![placed(10.0), placed(20.0), placed(30.0), placed(95.0)];
        f.ess = 4.0;
        f.predict().unwrap();

        for (p, x0) in f.particles()[..3].iter().zip([10.0, 20.0, 30.0]) {
            assert!((p.state.x - (x0 + 5.0)).abs() <= 6.0);
            assert!((p.state.y - 10.0).abs() <= 6.0);
            assert_eq!(p.state.x, p.state.x.round());
            assert_eq!(p.state.width, 10.0);
            assert_eq!(p.state.height, 10.0);
            assert_eq!(p.state.dx, 5.0);
            assert_eq!(p.state.scale, 1.0);
            assert_eq!(p.previous.x, x0);
        }

        let restarted = f.particles()[3];
        assert_eq!(restarted.previous.x, 95.0);
        assert_eq!(restarted.state.width, 20.0);
        assert_eq!(restarted.state.height, 20.0);
        assert_ne!(restarted.state.scale, 1.0);
        assert_ne!(restarted.state.dx, 5.0);
    }

    #[test]
    fn predict_restarts_all_below_threshold() {
        let (mut f, _) = initialized(4, 0.5);
        f.particles = vec![placed(10.0), placed(20.0), placed(30.0), placed(40.0)];
        f.ess = 1.0;
        assert!(f.ess_ratio() < 0.5);
        f.predict().unwrap();

        for p in f.particles() {
            assert_eq!(p.state.width, 20.0);
            assert_eq!(p.state.height, 20.0);
            assert_ne!(p.state.scale, 1.0);
            assert_eq!(p.previous.width, 10.0);
        }
    }

    #[test]
    fn marginal_likelihood_uses_carried_mass() {
        let (mut f, _) = initialized(2, 0.01);

        f.log_weights = vec![0.0, 3.0_f64.ln()];
        assert!(!f.resample());
        assert!((f.marginal_likelihood() - 2.0_f64.ln()).abs() < EPS);

        // equal scores on top of carried non-uniform weights add nothing
        assert!(!f.resample());
        assert!((f.marginal_likelihood() - 2.0_f64.ln()).abs() < EPS);
        assert!((f.weights()[1] - 0.75).abs() < EPS);
    }

    #[test]
    fn discrete_update() {
        for kind in [
            DiscreteLikelihood::Multinomial,
            DiscreteLikelihood::Dirichlet,
            DiscreteLikelihood::Poisson,
        ] {
            let (mut f, scene) = initialized(30, 0.7);
            f.predict().unwrap();
            f.update_discrete(&scene.frame(1), kind).unwrap();
            assert!(f.marginal_likelihood().is_finite());
            assert!(f.weights().iter().all(|w| w.is_finite()));
        }
    }

    #[test]
    fn update_model_rescales_concentration() {
        let (mut f, _) = initialized(10, 0.7);
        let dims = f.observation_params().alpha.len();
        assert!(dims > 0);

        let mut params = Hyperparameters::default();
        params.motion = MotionParams::new(2.0, 0.5, 0.05);
        params.observation.color = GaussianParams::new(0.1, 0.2);
        params.observation.alpha = vec![2.0; dims];
        f.update_model(&params).unwrap();

        assert_eq!(f.motion_params(), params.motion);
        let observed = f.observation_params();
        assert_eq!(observed.color, params.observation.color);
        assert!(observed
            .alpha
            .iter()
            .all(|p| (p - 1.0 / dims as f64).abs() < EPS));

        params.observation.alpha = vec![1.0; dims + 1];
        assert!(f.update_model(&params).is_err());
        params.observation.alpha = vec![1.0; dims];
        params.motion.position_std = 0.0;
        assert!(f.update_model(&params).is_err());
    }

    #[test]
    fn tracks_stationary_object() {
        let (mut f, scene) = initialized(300, 0.7);
        let truth = scene.roi(0);
        for t in 1..20 {
            f.predict().unwrap();
            f.update(&scene.frame(t)).unwrap();
        }
        let estimate = f.estimate();
        assert!(
            estimate.iou(&truth) > 0.3,
            "estimate {:?} is too far from {:?}",
            estimate,
            truth
        );
    }
}
