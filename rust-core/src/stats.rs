//! Small descriptive-statistics helpers over `f64` samples.

pub fn mean(vals: &[f64]) -> Option<f64> {
    if vals.is_empty() {
        return None;
    }
    Some(vals.iter().sum::<f64>() / vals.len() as f64)
}

/// Median; even-length samples average the middle pair.
pub fn median(vals: &[f64]) -> Option<f64> {
    if vals.is_empty() {
        return None;
    }
    let sorted = sorted(vals);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Drops values outside `[Q1 - 1.5 * IQR, Q3 + 1.5 * IQR]`. Bounds are inclusive.
pub fn iqr_filter(vals: &[f64]) -> Vec<f64> {
    if vals.is_empty() {
        return Vec::new();
    }
    let sorted = sorted(vals);
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;
    vals.iter()
        .copied()
        .filter(|v| *v >= lower && *v <= upper)
        .collect()
}

fn sorted(vals: &[f64]) -> Vec<f64> {
    let mut out = vals.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Linear interpolation between closest ranks, `pos = q * (n - 1)`.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
