use crate::likelihood::{floor_positive, LogLikelihood};
use anyhow::Result;
use rand::Rng;
use rand_distr::Distribution;
use statrs::function::gamma::ln_gamma;

/// Dirichlet-multinomial (Polya) model over histogram counts
///
/// Also provides the Dirichlet log-density of a probability vector, which is used as the prior
/// for probability-vector hyperparameters.
///
#[derive(Clone, Debug)]
pub struct Dirichlet {
    alpha: Vec<f64>,
}

impl Dirichlet {
    pub fn new(alpha: &[f64]) -> Self {
        Self {
            alpha: floor_positive(alpha),
        }
    }

    /// Symmetric Dirichlet of `dims` bins
    ///
    pub fn symmetric(dims: usize, concentration: f64) -> Self {
        Self::new(&vec![concentration; dims])
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn set_alpha(&mut self, alpha: &[f64]) {
        self.alpha = floor_positive(alpha);
    }

    /// Log-density of the probability vector `p` under `Dir(alpha)`
    ///
    pub fn log_density(&self, p: &[f64]) -> f64 {
        let total = self.alpha.iter().sum::<f64>();
        let mut acc = ln_gamma(total);
        for (a, x) in self.alpha.iter().zip(p) {
            acc += (a - 1.0) * x.ln() - ln_gamma(*a);
        }
        acc
    }

    /// Draws a probability vector
    ///
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>> {
        let dist = rand_distr::Dirichlet::new(&self.alpha)?;
        Ok(dist.sample(rng))
    }
}

impl LogLikelihood<[f64]> for Dirichlet {
    fn log_likelihood(&self, counts: &[f64]) -> f64 {
        let n = counts.iter().sum::<f64>();
        let total = self.alpha.iter().sum::<f64>();
        let mut acc = ln_gamma(total) - ln_gamma(n + total) + ln_gamma(n + 1.0);
        for (x, a) in counts.iter().zip(&self.alpha) {
            acc += ln_gamma(x + a) - ln_gamma(*a) - ln_gamma(x + 1.0);
        }
        acc
    }
}
