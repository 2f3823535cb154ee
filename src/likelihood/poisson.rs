use crate::likelihood::{floor_positive, LogLikelihood};
use nalgebra::DMatrix;
use statrs::function::gamma::ln_gamma;

/// Independent Poisson counts per histogram bin
///
#[derive(Clone, Debug)]
pub struct Poisson {
    lambda: Vec<f64>,
}

impl Poisson {
    pub fn new(lambda: &[f64]) -> Self {
        Self {
            lambda: floor_positive(lambda),
        }
    }

    /// Per-bin rates estimated as the mean of the count rows
    ///
    pub fn fit(counts: &DMatrix<f64>) -> Self {
        let rows = counts.nrows().max(1) as f64;
        let lambda = counts
            .column_iter()
            .map(|c| c.sum() / rows)
            .collect::<Vec<_>>();
        Self::new(&lambda)
    }

    pub fn lambda(&self) -> &[f64] {
        &self.lambda
    }

    pub fn set_lambda(&mut self, lambda: &[f64]) {
        self.lambda = floor_positive(lambda);
    }
}

impl LogLikelihood<[f64]> for Poisson {
    fn log_likelihood(&self, counts: &[f64]) -> f64 {
        counts
            .iter()
            .zip(&self.lambda)
            .map(|(x, l)| x * l.ln() - l - ln_gamma(x + 1.0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::likelihood::poisson::Poisson;
    use crate::likelihood::LogLikelihood;
    use crate::EPS;
    use nalgebra::DMatrix;

    #[test]
    fn log_likelihood() {
        let p = Poisson::new(&[2.0]);
        // P(x = 2 | 2) = 2 * e^-2
        assert!((p.log_likelihood(&[2.0]) - (2.0_f64.ln() - 2.0)).abs() < EPS);
        assert!(p.log_likelihood(&[2.0]) > p.log_likelihood(&[9.0]));

        let zero_rate = Poisson::new(&[0.0, 1.0]);
        assert!(zero_rate.log_likelihood(&[1.0, 1.0]).is_finite());
    }

    #[test]
    fn fit() {
        let counts = DMatrix::from_row_slice(2, 2, &[1.0, 4.0, 3.0, 0.0]);
        let p = Poisson::fit(&counts);
        assert!((p.lambda()[0] - 2.0).abs() < EPS);
        assert!((p.lambda()[1] - 2.0).abs() < EPS);
    }
}
