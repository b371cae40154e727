//! Small descriptive statistics used by the outlier filter and the fitters.

/// Quantile with linear interpolation between order statistics.
///
/// For sorted values `v` of length `n` the quantile `q` sits at position
/// `h = (n - 1) * q`; the result interpolates between `v[floor(h)]` and
/// `v[ceil(h)]`. Returns `None` for empty input or `q` outside `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Root mean squared difference between two equally long slices.
pub fn rmse(actual: &[f64], fitted: &[f64]) -> f64 {
    let n = actual.len().min(fitted.len());
    if n == 0 {
        return 0.0;
    }
    let sse: f64 = actual
        .iter()
        .zip(fitted.iter())
        .map(|(a, f)| (a - f) * (a - f))
        .sum();
    (sse / n as f64).sqrt()
}
