use crate::likelihood::LogLikelihood;
use crate::Errors;
use anyhow::Result;
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use rand::Rng;
use rand_distr::StandardNormal;
use statrs::consts::LN_SQRT_2PI;

/// Multivariate gaussian
///
pub struct MvnGaussian {
    mean: DVector<f64>,
    cholesky: Cholesky<f64, Dyn>,
}

impl MvnGaussian {
    /// Constructor
    ///
    /// # Parameters
    /// * `mean` - mean vector
    /// * `covariance` - symmetric positive definite covariance matrix
    ///
    pub fn new(mean: DVector<f64>, covariance: DMatrix<f64>) -> Result<Self> {
        if covariance.nrows() != mean.len() || covariance.ncols() != mean.len() {
            return Err(Errors::DimensionMismatch {
                expected: mean.len(),
                actual: covariance.nrows(),
            }
            .into());
        }
        let cholesky = Cholesky::new(covariance).ok_or(Errors::SingularCovariance)?;
        Ok(Self { mean, cholesky })
    }

    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    pub fn dims(&self) -> usize {
        self.mean.len()
    }

    /// Draws `n` samples, one per row
    ///
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> DMatrix<f64> {
        let dims = self.dims();
        let l = self.cholesky.l();
        let mut samples = DMatrix::zeros(n, dims);
        for mut row in samples.row_iter_mut() {
            let z = DVector::from_fn(dims, |_, _| rng.sample::<f64, _>(StandardNormal));
            let x = &self.mean + &l * z;
            row.copy_from(&x.transpose());
        }
        samples
    }
}

impl LogLikelihood<DVector<f64>> for MvnGaussian {
    fn log_likelihood(&self, x: &DVector<f64>) -> f64 {
        let diff = x - &self.mean;
        let solved = self.cholesky.solve(&diff);
        let mahalanobis = diff.dot(&solved);
        let log_det = 2.0 * self.cholesky.l().diagonal().map(|v| v.ln()).sum();
        -0.5 * (mahalanobis + log_det) - self.dims() as f64 * LN_SQRT_2PI
    }
}

#[cfg(test)]
mod tests {
    use crate::likelihood::mvn_gaussian::MvnGaussian;
    use crate::likelihood::LogLikelihood;
    use crate::EPS;
    use nalgebra::{DMatrix, DVector};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn standard_log_likelihood() {
        let g = MvnGaussian::new(DVector::zeros(2), DMatrix::identity(2, 2)).unwrap();
        let ll = g.log_likelihood(&DVector::zeros(2));
        assert!((ll + 1.837_877_066).abs() < EPS);
    }

    #[test]
    fn sample_moments() {
        let mut rng = StdRng::seed_from_u64(3);
        let cov = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let g = MvnGaussian::new(DVector::from_vec(vec![1.0, -1.0]), cov).unwrap();
        let samples = g.sample(20_000, &mut rng);
        let mean = samples.row_mean();
        assert!((mean[0] - 1.0).abs() < 0.05);
        assert!((mean[1] + 1.0).abs() < 0.05);
    }

    #[test]
    fn not_positive_definite() {
        let cov = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(MvnGaussian::new(DVector::zeros(2), cov).is_err());
        assert!(MvnGaussian::new(DVector::zeros(3), DMatrix::identity(2, 2)).is_err());
    }
}
