//! Binning, normal fit, and chart text for difference histograms
//!
//! Everything here is pure arithmetic on the difference series; nothing
//! touches the plotting backend.

use std::f64::consts::PI;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Number of histogram bins. Fixed, independent of sample size.
pub const BIN_COUNT: usize = 50;

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins over the observed value range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `BIN_COUNT + 1` ascending bin edges.
    pub edges: Vec<f64>,
    /// Number of values in each bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into [`BIN_COUNT`] bins.
    ///
    /// Non-finite values are ignored. The range is `[min, max]` of the
    /// remaining values, widened to `[v - 0.5, v + 0.5]` when they are all
    /// equal and `[0, 1]` when there are none. A spread too wide to measure
    /// in `f64` is clamped to `±f64::MAX / 4` and the outliers land in the
    /// end bins. The last bin is closed on the right so the maximum is
    /// counted.
    pub fn from_values(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let range = bin_range(&finite);
        let width = (range.end - range.start) / BIN_COUNT as f64;

        let edges: Vec<f64> = (0..=BIN_COUNT)
            .map(|i| range.start + i as f64 * width)
            .collect();

        let mut counts = vec![0usize; BIN_COUNT];
        for &v in &finite {
            let idx = ((v - range.start) / width).floor() as usize;
            counts[idx.min(BIN_COUNT - 1)] += 1;
        }

        Self { edges, counts }
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    pub fn range(&self) -> Range<f64> {
        self.edges[0]..self.edges[BIN_COUNT]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Bar heights: raw counts, or a probability density when `density` is
    /// set (bars integrate to 1 over the range; all zero for no data).
    pub fn heights(&self, density: bool) -> Vec<f64> {
        let total = self.total();
        if !density || total == 0 {
            return self.counts.iter().map(|&c| c as f64).collect();
        }
        let norm = total as f64 * self.bin_width();
        self.counts.iter().map(|&c| c as f64 / norm).collect()
    }

    /// `(left, right, height)` for every bin.
    pub fn bars(&self, density: bool) -> Vec<(f64, f64, f64)> {
        self.edges
            .windows(2)
            .zip(self.heights(density))
            .map(|(w, h)| (w[0], w[1], h))
            .collect()
    }
}

fn bin_range(finite: &[f64]) -> Range<f64> {
    if finite.is_empty() {
        return 0.0..1.0;
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    if !spread.is_finite() {
        let limit = f64::MAX / 4.0;
        return min.max(-limit)..max.min(limit);
    }
    if spread <= f64::EPSILON * max.abs().max(1.0) {
        return (min - 0.5)..(max + 0.5);
    }
    min..max
}

// ---------------------------------------------------------------------------
// Normal fit
// ---------------------------------------------------------------------------

/// Sample mean and population standard deviation of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalFit {
    pub mean: f64,
    pub std_dev: f64,
}

impl NormalFit {
    /// Fit a normal distribution. `None` when there is no finite value or
    /// the variance is zero, since the density is undefined there.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let variance = finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        if !(std_dev.is_finite() && std_dev > 0.0) {
            return None;
        }
        Some(Self { mean, std_dev })
    }

    pub fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.std_dev;
        (-0.5 * z * z).exp() / (self.std_dev * (2.0 * PI).sqrt())
    }

    /// Density evaluated at each of `xs`.
    pub fn curve(&self, xs: &[f64]) -> Vec<(f64, f64)> {
        xs.iter().map(|&x| (x, self.pdf(x))).collect()
    }
}

// ---------------------------------------------------------------------------
// Chart text
// ---------------------------------------------------------------------------

/// Every piece of text drawn on a difference histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartLabels {
    /// `"<primary> vs. <secondary>"`
    pub title: String,
    /// `"n = <count>"`
    pub subtitle: String,
    /// `"<primary> - <secondary> <unit>"`
    pub x_label: String,
    pub y_label: String,
}

impl ChartLabels {
    pub fn new(primary: &str, secondary: &str, units: &str, count: usize, norm_curve: bool) -> Self {
        let y_label = if norm_curve {
            "Probability per unit difference"
        } else {
            "Frequency"
        };
        Self {
            title: format!("{primary} vs. {secondary}"),
            subtitle: format!("n = {count}"),
            x_label: format!("{primary} - {secondary} {units}"),
            y_label: y_label.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bins_span_observed_range() {
        let values: Vec<f64> = (0..=100).map(|i| i as f64 / 10.0).collect();
        let hist = Histogram::from_values(&values);

        assert_eq!(hist.edges.len(), BIN_COUNT + 1);
        assert_eq!(hist.counts.len(), BIN_COUNT);
        assert_eq!(hist.range(), 0.0..10.0);
        assert!((hist.bin_width() - 0.2).abs() < 1e-12);
        assert_eq!(hist.total(), values.len());
        // Maximum lands in the last bin.
        assert!(hist.counts[BIN_COUNT - 1] >= 1);
    }

    #[test]
    fn test_empty_series() {
        let hist = Histogram::from_values(&[]);
        assert_eq!(hist.range(), 0.0..1.0);
        assert_eq!(hist.total(), 0);
        assert!(hist.heights(true).iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_single_value_gets_unit_range() {
        let hist = Histogram::from_values(&[2.0, 2.0, 2.0]);
        assert_eq!(hist.range(), 1.5..2.5);
        assert_eq!(hist.total(), 3);
        assert_eq!(hist.counts[BIN_COUNT / 2], 3);
    }

    #[test]
    fn test_overflowing_spread_is_clamped() {
        let hist = Histogram::from_values(&[1.7e308, -1.7e308, 0.0]);
        assert!(hist.edges.iter().all(|e| e.is_finite()));
        assert!(hist.bin_width().is_finite() && hist.bin_width() > 0.0);
        let range = hist.range();
        assert_eq!(range.start, -f64::MAX / 4.0);
        assert!((range.end / (f64::MAX / 4.0) - 1.0).abs() < 1e-12);
        assert_eq!(hist.total(), 3);
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[BIN_COUNT - 1], 1);
        assert!(hist.heights(true).iter().all(|h| h.is_finite()));
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let hist = Histogram::from_values(&[1.0, f64::NAN, 3.0, f64::INFINITY]);
        assert_eq!(hist.total(), 2);
        assert_eq!(hist.range(), 1.0..3.0);
    }

    #[test]
    fn test_density_integrates_to_one() {
        let values: Vec<f64> = (0..1000).map(|i| ((i * 37) % 101) as f64 * 0.03 - 1.5).collect();
        let hist = Histogram::from_values(&values);
        let area: f64 = hist.heights(true).iter().map(|h| h * hist.bin_width()).sum();
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bars_pair_edges_with_heights() {
        let hist = Histogram::from_values(&[0.0, 1.0]);
        let bars = hist.bars(false);
        assert_eq!(bars.len(), BIN_COUNT);
        assert_eq!(bars[0], (0.0, hist.edges[1], 1.0));
        assert_eq!(bars[BIN_COUNT - 1].2, 1.0);
    }

    #[test]
    fn test_normal_fit() {
        let fit = NormalFit::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((fit.mean - 3.0).abs() < 1e-12);
        assert!((fit.std_dev - 2.0f64.sqrt()).abs() < 1e-12);

        let peak = 1.0 / (fit.std_dev * (2.0 * PI).sqrt());
        assert!((fit.pdf(3.0) - peak).abs() < 1e-12);
        assert!(fit.pdf(0.0) < fit.pdf(2.0));
    }

    #[test]
    fn test_normal_fit_degenerate() {
        assert_eq!(NormalFit::from_values(&[]), None);
        assert_eq!(NormalFit::from_values(&[4.2]), None);
        assert_eq!(NormalFit::from_values(&[4.2, 4.2, 4.2]), None);
        assert_eq!(NormalFit::from_values(&[f64::NAN]), None);
    }

    #[test]
    fn test_curve_evaluated_at_edges() {
        let hist = Histogram::from_values(&[-1.0, 0.0, 1.0]);
        let fit = NormalFit::from_values(&[-1.0, 0.0, 1.0]).unwrap();
        let curve = fit.curve(&hist.edges);
        assert_eq!(curve.len(), BIN_COUNT + 1);
        assert_eq!(curve[0].0, -1.0);
        assert!(curve.iter().all(|&(_, y)| y > 0.0 && y.is_finite()));
    }

    #[test]
    fn test_labels() {
        let labels = ChartLabels::new("MUR", "ICOADS", "(°C)", 1, false);
        assert_eq!(labels.title, "MUR vs. ICOADS");
        assert_eq!(labels.subtitle, "n = 1");
        assert_eq!(labels.x_label, "MUR - ICOADS (°C)");
        assert_eq!(labels.y_label, "Frequency");

        let labels = ChartLabels::new("MUR", "ICOADS", "(g/L)", 0, true);
        assert_eq!(labels.subtitle, "n = 0");
        assert_eq!(labels.y_label, "Probability per unit difference");
    }
}
