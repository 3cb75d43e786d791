//! # Correlation Statistics
//!
//! Pearson product-moment and Spearman rank correlation between projected
//! ideology and reference scores.
//!
//! Both coefficients need at least two finite pairs and a non-constant
//! sequence on each side. Outside that they are undefined and the functions
//! return `None` rather than a made-up 0 or 1. Spearman ranks ties by their
//! average rank.
//!
//! A sequence counts as constant when its spread around the mean is within
//! floating-point noise of its own magnitude, so data at any scale works.
//!
//! Inputs are `f32` (embedding precision); sums are accumulated in `f64`.

use serde::Serialize;

/// Minimum number of pairs for a defined correlation
pub const MIN_SAMPLES: usize = 2;

/// Both coefficients over the same paired samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    /// Pearson's r
    pub pearson_r: f64,
    /// Spearman's rho
    pub spearman_rho: f64,
    /// Number of pairs
    pub samples: usize,
}

impl Correlation {
    /// Compute both coefficients, `None` when either is undefined
    pub fn between(x: &[f32], y: &[f32]) -> Option<Self> {
        Some(Self {
            pearson_r: pearson(x, y)?,
            spearman_rho: spearman(x, y)?,
            samples: x.len(),
        })
    }
}

impl std::fmt::Display for Correlation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pearson's r = {:.4}, Spearman's rho = {:.4} (n = {})",
            self.pearson_r, self.spearman_rho, self.samples
        )
    }
}

/// Pearson product-moment correlation
///
/// `None` for mismatched lengths, fewer than [`MIN_SAMPLES`] pairs, a
/// non-finite value, or a constant sequence.
pub fn pearson(x: &[f32], y: &[f32]) -> Option<f64> {
    let x: Vec<f64> = x.iter().map(|&v| v as f64).collect();
    let y: Vec<f64> = y.iter().map(|&v| v as f64).collect();
    pearson_f64(&x, &y)
}

/// Spearman rank correlation (Pearson over tie-averaged ranks)
pub fn spearman(x: &[f32], y: &[f32]) -> Option<f64> {
    if x.len() != y.len() || !all_finite(x) || !all_finite(y) {
        return None;
    }
    pearson_f64(&rank(x), &rank(y))
}

fn pearson_f64(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n != y.len() || n < MIN_SAMPLES {
        return None;
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return None;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        num += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    if is_constant(denom_x, x) || is_constant(denom_y, y) {
        return None;
    }
    let denom = denom_x.sqrt() * denom_y.sqrt();
    if !denom.is_finite() || denom == 0.0 {
        return None;
    }
    Some((num / denom).clamp(-1.0, 1.0))
}

/// Sum of squared deviations indistinguishable from rounding error
fn is_constant(sum_sq_dev: f64, values: &[f64]) -> bool {
    let magnitude: f64 = values.iter().map(|v| v * v).sum();
    let noise = 4.0 * values.len() as f64 * f64::EPSILON;
    sum_sq_dev <= magnitude * noise * noise
}

fn all_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// 1-based ranks, ties sharing the mean of the ranks they span
fn rank(values: &[f32]) -> Vec<f64> {
    let mut order: Vec<(usize, f32)> = values.iter().copied().enumerate().collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![0.0f64; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && order[j].1 == order[i].1 {
            j += 1;
        }
        let shared = (i + j - 1) as f64 / 2.0 + 1.0;
        for &(idx, _) in &order[i..j] {
            ranks[idx] = shared;
        }
        i = j;
    }
    ranks
}
