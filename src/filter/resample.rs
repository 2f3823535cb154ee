use rand::Rng;

/// `log(sum(exp(w)))` computed with the maximum subtracted before exponentiation
///
/// Returns `-inf` for an empty slice or when every weight is `-inf`.
///
pub fn log_sum_exp(log_weights: &[f64]) -> f64 {
    let max = max_weight(log_weights);
    if !max.is_finite() {
        return max;
    }
    max + log_weights
        .iter()
        .map(|w| (w - max).exp())
        .sum::<f64>()
        .ln()
}

/// The largest of the weights, `-inf` for an empty slice
///
pub fn max_weight(log_weights: &[f64]) -> f64 {
    log_weights.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Normalizes log-weights into linear weights that sum to one.
///
/// Returns the weights and the normalization constant `log(sum(exp(w)))`. When the constant is
/// not finite, the weights are uniform.
///
pub fn normalize(log_weights: &[f64]) -> (Vec<f64>, f64) {
    let norm_const = log_sum_exp(log_weights);
    if !norm_const.is_finite() {
        let n = log_weights.len().max(1) as f64;
        return (vec![1.0 / n; log_weights.len()], norm_const);
    }
    let weights = log_weights
        .iter()
        .map(|w| (w - norm_const).exp())
        .collect();
    (weights, norm_const)
}

/// Effective sample size `1 / sum(w^2)` of normalized weights
///
pub fn effective_sample_size(weights: &[f64]) -> f64 {
    1.0 / weights.iter().map(|w| w * w).sum::<f64>()
}

pub fn cumulative_sum(weights: &[f64]) -> Vec<f64> {
    weights
        .iter()
        .scan(0.0, |acc, w| {
            *acc += w;
            Some(*acc)
        })
        .collect()
}

/// Draws `n` indices proportionally to the weights given as a cumulative sum.
///
/// Every uniform draw selects the first index whose cumulative sum is not less than the draw.
///
pub fn multinomial_indices<R: Rng + ?Sized>(cumsum: &[f64], n: usize, rng: &mut R) -> Vec<usize> {
    let last = cumsum.len().saturating_sub(1);
    (0..n)
        .map(|_| {
            let u: f64 = rng.gen();
            cumsum.partition_point(|c| *c < u).min(last)
        })
        .collect()
}
