use crate::filter::params::{GaussianParams, Hyperparameters};
use crate::likelihood::dirichlet::Dirichlet;
use crate::pmmh::options::PriorParams;
use crate::Errors;
use anyhow::Result;
use statrs::distribution::{Continuous, Gamma, Normal};

/// Joint prior over the hyperparameter blocks
///
/// * standard deviations (motion noise, likelihood spread) - Gamma;
/// * likelihood means - zero-centered gaussian;
/// * histogram proportions - symmetric Dirichlet.
///
pub struct Prior {
    scale: Gamma,
    mean: Normal,
    concentration: f64,
}

impl Prior {
    pub fn new(params: &PriorParams) -> Result<Self> {
        let invalid = |e: statrs::StatsError| Errors::InvalidHyperparameters(e.to_string());
        let scale = Gamma::new(params.gamma_shape, 1.0 / params.gamma_scale).map_err(invalid)?;
        let mean = Normal::new(0.0, params.mean_sd).map_err(invalid)?;
        let c = params.dirichlet_concentration;
        if !c.is_finite() || c <= 0.0 {
            return Err(Errors::InvalidHyperparameters(format!(
                "Dirichlet concentration {}",
                c
            ))
            .into());
        }
        Ok(Self {
            scale,
            mean,
            concentration: params.dirichlet_concentration,
        })
    }

    /// Log prior density of the whole vector
    ///
    pub fn log_density(&self, theta: &Hyperparameters) -> f64 {
        let motion = &theta.motion;
        let observation = &theta.observation;

        let scales = [motion.position_std, motion.velocity_std, motion.scale_std]
            .iter()
            .map(|s| self.scale.ln_pdf(*s))
            .sum::<f64>();

        let proportions = if observation.alpha.is_empty() {
            0.0
        } else {
            Dirichlet::symmetric(observation.alpha.len(), self.concentration)
                .log_density(&observation.alpha)
        };

        scales
            + self.gaussian_block(&observation.color)
            + self.gaussian_block(&observation.shape)
            + proportions
    }

    fn gaussian_block(&self, g: &GaussianParams) -> f64 {
        self.mean.ln_pdf(g.mean) + self.scale.ln_pdf(g.std)
    }
}

#[cfg(test)]
mod tests {
    use crate::filter::params::{GaussianParams, Hyperparameters, MotionParams};
    use crate::pmmh::options::PriorParams;
    use crate::pmmh::prior::Prior;
    use crate::EPS;

    #[test]
    fn log_density() {
        let prior = Prior::new(&PriorParams::default()).unwrap();
        let mut theta = Hyperparameters::default();
        theta.motion = MotionParams::new(1.0, 1.0, 1.0);
        theta.observation.color = GaussianParams::new(0.0, 1.0);
        theta.observation.shape = GaussianParams::new(0.0, 1.0);

        // Exp(1) at 1.0 is -1 per scale, N(0, 0.1) at 0 is ln(10) - ln(sqrt(2pi)) per mean
        let expected = -5.0 + 2.0 * (10.0_f64.ln() - 0.918_938_533);
        assert!((prior.log_density(&theta) - expected).abs() < EPS);

        theta.observation.alpha = vec![0.5, 0.5];
        assert!((prior.log_density(&theta) - expected).abs() < EPS);
    }

    #[test]
    fn prefers_small_noise() {
        let prior = Prior::new(&PriorParams::default()).unwrap();
        let mut small = Hyperparameters::default();
        small.motion = MotionParams::new(0.5, 0.1, 0.1);
        let mut large = small.clone();
        large.motion.position_std = 5.0;
        assert!(prior.log_density(&small) > prior.log_density(&large));
    }

    #[test]
    fn invalid_params() {
        let params = PriorParams {
            gamma_shape: -1.0,
            ..Default::default()
        };
        assert!(Prior::new(&params).is_err());
    }
}
