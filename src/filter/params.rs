use crate::Errors;
use anyhow::Result;

/// Motion model noise (`theta_x`)
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    /// Standard deviation of the position random walk, pixels
    pub position_std: f64,
    /// Standard deviation of the velocity random walk, pixels per frame
    pub velocity_std: f64,
    /// Standard deviation of the scale random walk
    pub scale_std: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            position_std: 1.0,
            velocity_std: 0.1,
            scale_std: 0.1,
        }
    }
}

impl MotionParams {
    pub fn new(position_std: f64, velocity_std: f64, scale_std: f64) -> Self {
        Self {
            position_std,
            velocity_std,
            scale_std,
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.position_std, self.velocity_std, self.scale_std]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Mean and standard deviation of a gaussian over a histogram distance
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianParams {
    pub mean: f64,
    pub std: f64,
}

impl GaussianParams {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    pub fn is_valid(&self) -> bool {
        self.mean.is_finite() && self.std.is_finite() && self.std > 0.0
    }
}

impl Default for GaussianParams {
    fn default() -> Self {
        Self::new(0.0, 0.1)
    }
}

/// Observation model parameters (`theta_y`)
///
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ObservationParams {
    /// Gaussian over the colour histogram distance
    pub color: GaussianParams,
    /// Gaussian over the shape descriptor distance
    pub shape: GaussianParams,
    /// Concentration over the colour histogram bins, used by the discrete likelihoods.
    /// Empty when the discrete models are not built yet.
    pub alpha: Vec<f64>,
}

impl ObservationParams {
    pub fn is_valid(&self) -> bool {
        self.color.is_valid()
            && self.shape.is_valid()
            && self.alpha.iter().all(|a| a.is_finite() && *a > 0.0)
    }
}

/// Full hyperparameter vector learned by the sampler
///
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Hyperparameters {
    pub motion: MotionParams,
    pub observation: ObservationParams,
}

impl Hyperparameters {
    pub fn new(motion: MotionParams, observation: ObservationParams) -> Self {
        Self {
            motion,
            observation,
        }
    }

    /// Checks the positivity constraints of every block
    ///
    pub fn validate(&self) -> Result<()> {
        if !self.motion.is_valid() {
            return Err(Errors::InvalidHyperparameters(format!("{:?}", self.motion)).into());
        }
        if !self.observation.is_valid() {
            return Err(
                Errors::InvalidHyperparameters(format!("{:?}", self.observation)).into(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::filter::params::{GaussianParams, Hyperparameters, MotionParams};

    #[test]
    fn validation() {
        let mut h = Hyperparameters::default();
        assert!(h.validate().is_ok());

        h.motion = MotionParams::new(1.0, -0.1, 0.1);
        assert!(h.validate().is_err());

        h.motion = MotionParams::default();
        h.observation.color = GaussianParams::new(-3.0, 0.1);
        assert!(h.validate().is_ok());

        h.observation.alpha = vec![0.5, 0.0];
        assert!(h.validate().is_err());
    }
}
