//! Elementary statistics used by the aggregations.
use serde::Serialize;

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Quantile of an ascending-sorted slice with linear interpolation between
/// the closest ranks. `q` is in [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }
    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        Some(sorted[lower])
    } else {
        let frac = rank - lower as f64;
        Some(sorted[lower] * (1.0 - frac) + sorted[upper] * frac)
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width histogram. `edges` has `counts.len() + 1` entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning the observed range.
    ///
    /// Bins are half-open except the last, which also includes the maximum.
    /// A constant sample spans `[v - 0.5, v + 0.5]`. Empty input or zero bins
    /// yields an empty histogram.
    pub fn compute(values: &[f64], bins: usize) -> Self {
        let (Some(mut lo), Some(mut hi)) = (min(values), max(values)) else {
            return Self::default();
        };
        if bins == 0 {
            return Self::default();
        }
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let step = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * step).collect();
        let mut counts = vec![0usize; bins];

        for &v in values {
            let idx = ((v - lo) / step).floor() as usize;
            counts[idx.min(bins - 1)] += 1;
        }

        Histogram { edges, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate `(left, right, count)` per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| (w[0], w[1], c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(min(&[]), None);
        assert_eq!(max(&[]), None);
    }

    #[test]
    fn mean_min_max_known() {
        let v = [2.0, 4.0, 9.0];
        assert!((mean(&v).unwrap() - 5.0).abs() < 1e-10);
        assert_eq!(min(&v), Some(2.0));
        assert_eq!(max(&v), Some(9.0));
    }

    #[test]
    fn quantile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&v, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&v, 1.0), Some(4.0));
        assert!((quantile_sorted(&v, 0.5).unwrap() - 2.5).abs() < 1e-10);
        assert!((quantile_sorted(&v, 0.25).unwrap() - 1.75).abs() < 1e-10);
        assert_eq!(quantile_sorted(&[7.0], 0.75), Some(7.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn histogram_conserves_count() {
        let values: Vec<f64> = (0..=100).map(|i| i as f64).collect();
        let h = Histogram::compute(&values, 15);
        assert_eq!(h.counts.len(), 15);
        assert_eq!(h.edges.len(), 16);
        assert_eq!(h.total(), values.len());
        assert_eq!(h.edges[0], 0.0);
        assert!((h.edges[15] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_max_lands_in_last_bin() {
        let h = Histogram::compute(&[0.0, 10.0], 5);
        assert_eq!(h.counts, vec![1, 0, 0, 0, 1]);
    }

    #[test]
    fn histogram_constant_sample() {
        let h = Histogram::compute(&[42.0, 42.0, 42.0], 15);
        assert_eq!(h.total(), 3);
        assert_eq!(h.edges[0], 41.5);
        assert!((h.edges[15] - 42.5).abs() < 1e-9);
    }

    #[test]
    fn histogram_empty_input() {
        let h = Histogram::compute(&[], 15);
        assert!(h.is_empty());
        assert_eq!(h.total(), 0);
        assert_eq!(h.bins().count(), 0);
    }
}
