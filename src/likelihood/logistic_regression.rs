use crate::likelihood::mvn_gaussian::MvnGaussian;
use crate::Errors;
use anyhow::Result;
use log::debug;
use nalgebra::{DMatrix, DVector};
use rand::Rng;

/// Bayesian logistic regression with an L2 (gaussian) prior on the weights
///
/// The weights are trained with gradient descent, the posterior is approximated with a gaussian
/// centered on the trained weights with the inverse Hessian as covariance (Laplace
/// approximation). Predictions average the sigmoid outputs over posterior samples.
///
pub struct LogisticRegression {
    n_iter: usize,
    learning_rate: f64,
    tol: f64,
    lambda: f64,
    weights: Option<DVector<f64>>,
    posterior_covariance: Option<DMatrix<f64>>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(100, 0.01, 0.001, 1.0)
    }
}

impl LogisticRegression {
    /// Constructor
    ///
    /// # Parameters
    /// * `n_iter` - maximum number of gradient steps
    /// * `learning_rate` - gradient step size
    /// * `tol` - training stops when the gradient norm falls below the value
    /// * `lambda` - precision of the weights prior
    ///
    pub fn new(n_iter: usize, learning_rate: f64, tol: f64, lambda: f64) -> Self {
        assert!(lambda > 0.0, "Prior precision must be positive");
        Self {
            n_iter,
            learning_rate,
            tol,
            lambda,
            weights: None,
            posterior_covariance: None,
        }
    }

    /// Trained weights, the bias is the last element
    ///
    pub fn weights(&self) -> Option<&DVector<f64>> {
        self.weights.as_ref()
    }

    /// Trains the model on rows of `x` with binary labels `y`.
    ///
    /// Returns the log-posterior (up to a constant) after every iteration.
    ///
    pub fn train(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<Vec<f64>> {
        if x.nrows() != y.len() {
            return Err(Errors::DimensionMismatch {
                expected: x.nrows(),
                actual: y.len(),
            }
            .into());
        }
        let x = with_bias(x);
        let mut weights = DVector::from_element(x.ncols(), 1.0);
        let mut trace = Vec::with_capacity(self.n_iter);

        for i in 0..self.n_iter {
            let phi = sigmoid(&x, &weights);
            let grad = x.transpose() * (&phi - y) + self.lambda * &weights;
            trace.push(log_likelihood(y, &phi) + self.log_prior(&weights));
            weights -= self.learning_rate * &grad;
            if grad.norm() < self.tol {
                debug!("Logistic regression converged after {} iterations", i + 1);
                break;
            }
        }

        let phi = sigmoid(&x, &weights);
        let covariance = self
            .hessian(&x, &phi)
            .try_inverse()
            .ok_or(Errors::SingularCovariance)?;
        self.posterior_covariance = Some(covariance);
        self.weights = Some(weights);
        Ok(trace)
    }

    /// Posterior predictive probability of the positive class for every row of `x`
    ///
    /// # Parameters
    /// * `x` - samples, one per row
    /// * `n_samples` - number of posterior weight samples to average over
    /// * `rng` - random source
    ///
    pub fn predict<R: Rng + ?Sized>(
        &self,
        x: &DMatrix<f64>,
        n_samples: usize,
        rng: &mut R,
    ) -> Result<DVector<f64>> {
        let (weights, covariance) = match (&self.weights, &self.posterior_covariance) {
            (Some(w), Some(c)) => (w, c),
            _ => return Err(Errors::NotInitialized.into()),
        };
        if x.ncols() + 1 != weights.len() {
            return Err(Errors::DimensionMismatch {
                expected: weights.len() - 1,
                actual: x.ncols(),
            }
            .into());
        }

        let posterior = MvnGaussian::new(weights.clone(), covariance.clone())?;
        let x = with_bias(x);
        let samples = posterior.sample(n_samples.max(1), rng);
        let mut phi = DVector::zeros(x.nrows());
        for row in samples.row_iter() {
            phi += sigmoid(&x, &row.transpose());
        }
        Ok(phi / samples.nrows() as f64)
    }

    fn log_prior(&self, weights: &DVector<f64>) -> f64 {
        let dims = weights.len() as f64;
        0.5 * dims * self.lambda.ln() - 0.5 * self.lambda * weights.norm_squared()
    }

    fn hessian(&self, x: &DMatrix<f64>, phi: &DVector<f64>) -> DMatrix<f64> {
        let d = phi.map(|p| p * (1.0 - p) + f64::MIN_POSITIVE);
        let weighted = DMatrix::from_diagonal(&d) * x;
        x.transpose() * weighted + DMatrix::identity(x.ncols(), x.ncols()) * self.lambda
    }
}

fn with_bias(x: &DMatrix<f64>) -> DMatrix<f64> {
    let cols = x.ncols();
    x.clone().insert_column(cols, 1.0)
}

/// Sigmoid of `x * w` with the linear term clipped to keep both tails representable
///
fn sigmoid(x: &DMatrix<f64>, w: &DVector<f64>) -> DVector<f64> {
    let max_cut = -f64::EPSILON.ln();
    let min_cut = -(1.0 / f64::MIN_POSITIVE - 1.0).ln();
    (x * w).map(|eta| {
        let mu = (-eta).clamp(min_cut, max_cut);
        1.0 / (1.0 + mu.exp())
    })
}

fn log_likelihood(y: &DVector<f64>, phi: &DVector<f64>) -> f64 {
    y.iter()
        .zip(phi.iter())
        .map(|(y, p)| y * p.ln() + (1.0 - y) * (1.0 - p + f64::MIN_POSITIVE).ln())
        .sum()
}
