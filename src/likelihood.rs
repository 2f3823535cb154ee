/// Dirichlet-multinomial (Polya) model for histogram counts
pub mod dirichlet;

/// Univariate gaussian model
pub mod gaussian;

/// Bayesian logistic regression with a Laplace posterior
pub mod logistic_regression;

/// Multinomial model for histogram counts
pub mod multinomial;

/// Multivariate gaussian with posterior sampling
pub mod mvn_gaussian;

/// Independent Poisson model for histogram counts
pub mod poisson;

use crate::likelihood::dirichlet::Dirichlet;
use crate::likelihood::multinomial::Multinomial;
use crate::likelihood::poisson::Poisson;

/// Capability shared by all the likelihood models
///
pub trait LogLikelihood<O: ?Sized> {
    fn log_likelihood(&self, observation: &O) -> f64;
}

/// Discrete likelihood used to score raw histogram counts
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiscreteLikelihood {
    #[default]
    Multinomial,
    Dirichlet,
    Poisson,
}

/// The discrete models built from one concentration vector.
///
/// The multinomial receives the proportions `p = alpha / sum(alpha)`, the Dirichlet and Poisson
/// models receive `m * p`, where `m` is the concentration mass the models were created with.
///
#[derive(Clone, Debug)]
pub struct DiscreteModels {
    multinomial: Multinomial,
    dirichlet: Dirichlet,
    poisson: Poisson,
    mass: f64,
}

impl DiscreteModels {
    pub fn new(alpha: &[f64]) -> Self {
        let alpha = floor_positive(alpha);
        let mass = alpha.iter().sum::<f64>();
        Self {
            multinomial: Multinomial::new(&alpha),
            dirichlet: Dirichlet::new(&alpha),
            poisson: Poisson::new(&alpha),
            mass,
        }
    }

    /// Installs a new concentration vector; it is re-normalized to proportions first
    ///
    pub fn set_concentration(&mut self, alpha: &[f64]) {
        let proportions = normalize(&floor_positive(alpha));
        let scaled = proportions.iter().map(|p| p * self.mass).collect::<Vec<_>>();
        self.multinomial.set_theta(&proportions);
        self.dirichlet.set_alpha(&scaled);
        self.poisson.set_lambda(&scaled);
    }

    /// Proportions currently installed into the multinomial
    ///
    pub fn proportions(&self) -> &[f64] {
        self.multinomial.theta()
    }

    pub fn concentration(&self) -> &[f64] {
        self.dirichlet.alpha()
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn dims(&self) -> usize {
        self.multinomial.theta().len()
    }

    pub fn log_likelihood(&self, kind: DiscreteLikelihood, counts: &[f64]) -> f64 {
        match kind {
            DiscreteLikelihood::Multinomial => self.multinomial.log_likelihood(counts),
            DiscreteLikelihood::Dirichlet => self.dirichlet.log_likelihood(counts),
            DiscreteLikelihood::Poisson => self.poisson.log_likelihood(counts),
        }
    }
}

/// Floors every non-positive or non-finite value with machine epsilon
///
pub fn floor_positive(v: &[f64]) -> Vec<f64> {
    v.iter()
        .map(|x| {
            if x.is_finite() && *x > 0.0 {
                *x
            } else {
                f64::EPSILON
            }
        })
        .collect()
}

/// Scales the vector to sum to one
///
pub fn normalize(v: &[f64]) -> Vec<f64> {
    let sum = v.iter().sum::<f64>();
    if sum > 0.0 && sum.is_finite() {
        v.iter().map(|x| x / sum).collect()
    } else {
        vec![1.0 / v.len() as f64; v.len()]
    }
}

#[cfg(test)]
mod tests {
    use crate::features::{epsilon_floor, Histogram};
    use crate::likelihood::{normalize, DiscreteLikelihood, DiscreteModels};
    use crate::EPS;

    #[test]
    fn concentration_is_rescaled() {
        let mut models = DiscreteModels::new(&[2.0, 2.0, 4.0, 2.0]);
        assert!((models.mass() - 10.0).abs() < EPS);
        assert!((models.proportions()[2] - 0.4).abs() < EPS);

        models.set_concentration(&[1.0, 1.0, 1.0, 1.0]);
        assert!(models.proportions().iter().all(|p| (p - 0.25).abs() < EPS));
        assert!(models.concentration().iter().all(|a| (a - 2.5).abs() < EPS));
    }

    #[test]
    fn degenerate_theta_stays_finite() {
        let reference = Histogram::from_row_slice(2, 2, &[1.0, 0.0, 1.0, 0.0]);
        let floored = epsilon_floor(&reference);
        assert!(floored.iter().all(|v| *v != 0.0));

        let models = DiscreteModels::new(&[1.0, 0.0, 0.0, 0.0]);
        let uniform = [1.0, 1.0, 1.0, 1.0];
        let ll = models.log_likelihood(DiscreteLikelihood::Multinomial, &uniform);
        assert!(ll.is_finite());
        assert!(ll < -100.0);

        let concentrated = [4.0, f64::EPSILON, f64::EPSILON, f64::EPSILON];
        let ll_match = models.log_likelihood(DiscreteLikelihood::Multinomial, &concentrated);
        assert!(ll_match > ll);

        for kind in [DiscreteLikelihood::Dirichlet, DiscreteLikelihood::Poisson] {
            assert!(models.log_likelihood(kind, &uniform).is_finite());
        }
    }

    #[test]
    fn normalization() {
        let p = normalize(&[1.0, 3.0]);
        assert!((p[0] - 0.25).abs() < EPS);
        let p = normalize(&[0.0, 0.0]);
        assert!((p[0] - 0.5).abs() < EPS);
    }
}
