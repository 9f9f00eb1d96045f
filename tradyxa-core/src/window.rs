//! Trailing-window iteration and the small set of statistics built on it.
//!
//! Every rolling feature and derived series goes through [`trailing`] so the
//! "no lookahead, default until the window is full" rule lives in one place.
//! A window ending at index `i` covers `[i + 1 - size, i]`.

/// Iterator over fixed-size trailing windows of a slice.
///
/// Yields `(end_index, window)` for every index whose trailing window is
/// complete; indices before `size - 1` are skipped. A zero size yields nothing.
#[derive(Debug, Clone)]
pub struct TrailingWindows<'a, T> {
    data: &'a [T],
    size: usize,
    end: usize,
}

impl<'a, T> Iterator for TrailingWindows<'a, T> {
    type Item = (usize, &'a [T]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.size == 0 || self.end >= self.data.len() {
            return None;
        }
        let i = self.end;
        self.end += 1;
        Some((i, &self.data[i + 1 - self.size..=i]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.size == 0 {
            0
        } else {
            self.data.len().saturating_sub(self.end)
        };
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for TrailingWindows<'_, T> {}

/// Trailing windows of `size` elements over `data`.
pub fn trailing<T>(data: &[T], size: usize) -> TrailingWindows<'_, T> {
    TrailingWindows {
        data,
        size,
        end: size.saturating_sub(1),
    }
}

/// Apply `f` to every complete trailing window.
///
/// Output has the same length as `values`; positions without a full window
/// hold 0.0 and non-finite results are replaced with 0.0.
pub fn rolling<T, F>(values: &[T], size: usize, f: F) -> Vec<f64>
where
    F: Fn(&[T]) -> f64,
{
    let mut out = vec![0.0; values.len()];
    for (i, window) in trailing(values, size) {
        out[i] = finite_or_zero(f(window));
    }
    out
}

/// Map NaN and ±Inf to 0.0.
#[inline]
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

/// Sample variance (n − 1 denominator). `None` for fewer than two values.
pub fn sample_variance(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    Some(ss / (xs.len() - 1) as f64)
}

/// Sample standard deviation (n − 1 denominator).
pub fn sample_std(xs: &[f64]) -> Option<f64> {
    sample_variance(xs).map(f64::sqrt)
}

/// Population covariance (n denominator) of paired observations.
pub fn population_covariance(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    Some(pairs.iter().map(|(x, y)| (x - mx) * (y - my)).sum::<f64>() / n)
}

/// Percentile of an ascending-sorted slice using linear interpolation.
///
/// `p` is in percent (0–100). Empty input yields 0.0.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

/// Sort a copy of `values` ascending (NaN-tolerant total order).
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

/// Min-max normalize to [0, 1]. A constant (or empty) series maps to all zeros.
pub fn normalize_to_01(xs: &[f64]) -> Vec<f64> {
    let (mn, mx) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    if xs.is_empty() || !(mx - mn).is_finite() || mx - mn < 1e-12 {
        return vec![0.0; xs.len()];
    }
    xs.iter().map(|x| (x - mn) / (mx - mn)).collect()
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Round to `dp` decimal places.
pub fn round_dp(x: f64, dp: i32) -> f64 {
    let f = 10f64.powi(dp);
    (x * f).round() / f
}
