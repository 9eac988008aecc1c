// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Small descriptive-statistics helpers shared by the cleaning and analysis
//! stages. Inputs are expected to be free of `NaN`.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let var = values
        .iter()
        .map(|v| {
            let centered = v - mu;
            centered * centered
        })
        .sum::<f64>()
        / values.len() as f64;
    Some(var.sqrt())
}

/// Sorts a copy of `values` ascending.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile `q` in `[0, 1]` of pre-sorted values with linear interpolation
/// between closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !q.is_finite() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Quantile `q` in `[0, 1]` of unsorted values.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted_copy(values), q)
}

/// Median; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) * 0.5)
    }
}

/// Ordinary least-squares line through `(t, y)` samples as `(intercept, slope)`.
pub fn fit_linear(samples: &[(f64, f64)]) -> Option<(f64, f64)> {
    let m = samples.len() as f64;
    let (sum_t, sum_y, sum_tt, sum_ty) = samples
        .iter()
        .fold((0.0, 0.0, 0.0, 0.0), |(st, sy, stt, sty), (t, y)| {
            (st + *t, sy + *y, stt + t * t, sty + t * y)
        });
    let denom = m * sum_tt - sum_t * sum_t;
    if !denom.is_finite() || denom.abs() <= f64::EPSILON {
        return None;
    }
    let slope = (m * sum_ty - sum_t * sum_y) / denom;
    let intercept = (sum_y - slope * sum_t) / m;
    Some((intercept, slope))
}

/// Pearson correlation of paired samples.
///
/// Returns `0.0` when fewer than two pairs exist or either side has no
/// variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let inv_len = 1.0 / n as f64;
    let mean_x = x[..n].iter().sum::<f64>() * inv_len;
    let mean_y = y[..n].iter().sum::<f64>() * inv_len;
    let mut numer = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;
    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        numer += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }
    let denom = denom_x.sqrt() * denom_y.sqrt();
    if !denom.is_finite() || denom <= 1e-12 {
        0.0
    } else {
        (numer / denom).clamp(-1.0, 1.0)
    }
}

/// Denominator guard: an exactly-zero scale becomes `1.0`.
pub fn unit_if_zero(scale: f64) -> f64 {
    if scale == 0.0 { 1.0 } else { scale }
}
