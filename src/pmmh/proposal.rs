use crate::filter::params::{GaussianParams, Hyperparameters, MotionParams, ObservationParams};
use crate::likelihood::normalize;
use crate::pmmh::options::StepSizes;
use rand::Rng;
use rand_distr::{Distribution, Gamma, StandardNormal};

/// Component-wise proposal kernel
///
/// Continuous coordinates take an independent gaussian random-walk step. The histogram
/// proportions are drawn from `Gamma(k * current, 1)` per coordinate, floored at machine
/// epsilon and renormalized. Positivity is not enforced here; invalid candidates are rejected
/// by the acceptance rule.
///
#[derive(Clone, Debug)]
pub struct Proposal {
    steps: StepSizes,
    concentration: f64,
}

impl Proposal {
    pub fn new(steps: StepSizes, concentration: f64) -> Self {
        Self {
            steps,
            concentration,
        }
    }

    pub fn propose<R: Rng + ?Sized>(&self, current: &Hyperparameters, rng: &mut R) -> Hyperparameters {
        let s = &self.steps;
        let m = &current.motion;
        let o = &current.observation;

        let motion = MotionParams::new(
            random_walk(m.position_std, s.position_std, rng),
            random_walk(m.velocity_std, s.velocity_std, rng),
            random_walk(m.scale_std, s.scale_std, rng),
        );
        let observation = ObservationParams {
            color: self.gaussian(&o.color, rng),
            shape: self.gaussian(&o.shape, rng),
            alpha: self.proportions(&o.alpha, rng),
        };
        Hyperparameters::new(motion, observation)
    }

    fn gaussian<R: Rng + ?Sized>(&self, g: &GaussianParams, rng: &mut R) -> GaussianParams {
        GaussianParams::new(
            random_walk(g.mean, self.steps.mean, rng),
            random_walk(g.std, self.steps.std, rng),
        )
    }

    fn proportions<R: Rng + ?Sized>(&self, alpha: &[f64], rng: &mut R) -> Vec<f64> {
        let draws = alpha
            .iter()
            .map(|a| {
                let v = match Gamma::new(self.concentration * a, 1.0) {
                    Ok(g) => g.sample(rng),
                    Err(_) => 0.0,
                };
                if v.is_finite() && v > f64::EPSILON {
                    v
                } else {
                    f64::EPSILON
                }
            })
            .collect::<Vec<_>>();
        normalize(&draws)
    }
}

fn random_walk<R: Rng + ?Sized>(value: f64, step: f64, rng: &mut R) -> f64 {
    value + step * rng.sample::<f64, _>(StandardNormal)
}
