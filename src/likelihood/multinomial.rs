use crate::likelihood::{floor_positive, normalize, LogLikelihood};
use nalgebra::DMatrix;
use statrs::function::gamma::ln_gamma;

/// Multinomial model over histogram bins
///
/// Bin probabilities are floored with machine epsilon, so that even a degenerate
/// (all mass in one bin) parameter produces finite log-likelihoods.
///
#[derive(Clone, Debug)]
pub struct Multinomial {
    theta: Vec<f64>,
}

impl Multinomial {
    pub fn new(theta: &[f64]) -> Self {
        Self {
            theta: normalize(&floor_positive(theta)),
        }
    }

    /// Estimates bin probabilities from count rows with additive smoothing `alpha`
    ///
    pub fn fit(counts: &DMatrix<f64>, alpha: f64) -> Self {
        let totals = counts
            .column_iter()
            .map(|c| c.sum() + alpha)
            .collect::<Vec<_>>();
        Self::new(&totals)
    }

    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    pub fn set_theta(&mut self, theta: &[f64]) {
        self.theta = normalize(&floor_positive(theta));
    }
}

impl LogLikelihood<[f64]> for Multinomial {
    fn log_likelihood(&self, counts: &[f64]) -> f64 {
        let n = counts.iter().sum::<f64>();
        let (mut coef, mut ll) = (ln_gamma(n + 1.0), 0.0);
        for (x, p) in counts.iter().zip(&self.theta) {
            coef -= ln_gamma(x + 1.0);
            ll += x * p.ln();
        }
        coef + ll
    }
}

#[cfg(test)]
mod tests {
    use crate::likelihood::multinomial::Multinomial;
    use crate::likelihood::LogLikelihood;
    use crate::EPS;
    use nalgebra::DMatrix;

    #[test]
    fn log_likelihood() {
        let m = Multinomial::new(&[0.5, 0.5]);
        // P(x = [1, 1]) = 2 * 0.25
        assert!((m.log_likelihood(&[1.0, 1.0]) - 0.5_f64.ln()).abs() < EPS);

        let skewed = Multinomial::new(&[0.9, 0.1]);
        assert!(skewed.log_likelihood(&[2.0, 0.0]) > skewed.log_likelihood(&[0.0, 2.0]));
    }

    #[test]
    fn fit() {
        let counts = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 3.0, 1.0, 0.0, 1.0]);
        let m = Multinomial::fit(&counts, 1.0);
        let theta = m.theta();
        assert!((theta[0] - 3.0 / 9.0).abs() < EPS);
        assert!((theta[1] - 1.0 / 9.0).abs() < EPS);
        assert!((theta[2] - 5.0 / 9.0).abs() < EPS);
    }
}
