use crate::features::Histogram;
use itertools::izip;

/// Distance value that marks two histograms as incomparable
///
pub const INCOMPARABLE: f64 = 1.0;

/// Bhattacharyya distance between two histograms
///
/// The result is in `[0, 1]`, `0` for identical (up to scale) histograms. When the histogram
/// shapes don't match or one of them carries no mass the distance is [INCOMPARABLE](INCOMPARABLE).
///
pub fn bhattacharyya(h1: &Histogram, h2: &Histogram) -> f64 {
    if h1.shape() != h2.shape() {
        return INCOMPARABLE;
    }

    let (mut s1, mut s2, mut acc) = (0.0, 0.0, 0.0);
    for (a, b) in izip!(h1.iter(), h2.iter()) {
        s1 += a;
        s2 += b;
        acc += (a * b).sqrt();
    }

    let norm = s1 * s2;
    let scale = if norm.abs() > f64::EPSILON {
        1.0 / norm.sqrt()
    } else {
        1.0
    };

    (1.0 - acc * scale).max(0.0).sqrt()
}
