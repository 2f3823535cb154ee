use crate::likelihood::LogLikelihood;
use rand::Rng;
use rand_distr::StandardNormal;
use statrs::consts::LN_SQRT_2PI;

/// Univariate gaussian model
///
/// Used to score the Bhattacharyya distance between the reference and the candidate histograms.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Gaussian {
    mean: f64,
    std: f64,
}

impl Default for Gaussian {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl Gaussian {
    /// Constructor
    ///
    /// # Parameters
    /// * `mean` - the mean
    /// * `std` - the standard deviation, must be positive
    ///
    pub fn new(mean: f64, std: f64) -> Self {
        assert!(std > 0.0, "Standard deviation must be positive");
        Self { mean, std }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    /// Maximum likelihood estimate from the samples
    ///
    pub fn fit(data: &[f64]) -> Self {
        if data.is_empty() {
            return Self::default();
        }
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let var = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        Self::new(mean, var.sqrt().max(f64::EPSILON))
    }

    /// Draws `n` samples from the model
    ///
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n)
            .map(|_| self.mean + self.std * rng.sample::<f64, _>(StandardNormal))
            .collect()
    }
}

impl LogLikelihood<f64> for Gaussian {
    fn log_likelihood(&self, x: &f64) -> f64 {
        let z = (x - self.mean) / self.std;
        -0.5 * z * z - self.std.ln() - LN_SQRT_2PI
    }
}
