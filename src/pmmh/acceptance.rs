use crate::filter::params::Hyperparameters;
use crate::pmmh::prior::Prior;

/// Outcome of a Metropolis-Hastings step
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected,
    /// Rejected without drawing `u`: a marginal likelihood is not finite or the candidate
    /// violates a positivity constraint
    Invalid,
}

/// `log p(y|θ') - log p(y|θ) + log p(θ') - log p(θ)`
///
pub fn log_acceptance(
    candidate: &Hyperparameters,
    candidate_ml: f64,
    current: &Hyperparameters,
    current_ml: f64,
    prior: &Prior,
) -> f64 {
    candidate_ml - current_ml + prior.log_density(candidate) - prior.log_density(current)
}

/// Block accept/reject of the candidate. `draw_u` supplies the uniform variate and is called
/// only when the candidate is admissible.
///
pub fn decide<F>(
    candidate: &Hyperparameters,
    candidate_ml: f64,
    current: &Hyperparameters,
    current_ml: f64,
    prior: &Prior,
    draw_u: F,
) -> Decision
where
    F: FnOnce() -> f64,
{
    if !candidate_ml.is_finite() || !current_ml.is_finite() || candidate.validate().is_err() {
        return Decision::Invalid;
    }
    let log_ratio = log_acceptance(candidate, candidate_ml, current, current_ml, prior);
    if draw_u().ln() < log_ratio {
        Decision::Accepted
    } else {
        Decision::Rejected
    }
}

/// Counters of the sampler moves
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcceptanceStats {
    pub proposed: usize,
    pub accepted: usize,
    pub invalid: usize,
}

impl AcceptanceStats {
    pub fn record(&mut self, decision: Decision) {
        self.proposed += 1;
        match decision {
            Decision::Accepted => self.accepted += 1,
            Decision::Invalid => self.invalid += 1,
            Decision::Rejected => {}
        }
    }

    pub fn rate(&self) -> f64 {
        if self.proposed == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposed as f64
        }
    }
}
