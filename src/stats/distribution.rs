//! Distribution inputs and the shapes derived from them (histogram, density,
//! box and violin summaries, scatter series).

use std::collections::BTreeMap;

use crate::data::filter::FilteredView;
use crate::data::model::NumericColumn;

/// Raw values of `column` in view order, missing cells dropped.
pub fn distribution_inputs(view: &FilteredView<'_>, column: NumericColumn) -> Vec<f64> {
    view.iter()
        .filter_map(|rec| rec.value(column))
        .filter(|v| !v.is_nan())
        .collect()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Upper bound on histogram bins, whatever the rule asks for.
pub const MAX_BINS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinRule {
    Fixed(usize),
    /// Larger of the Sturges and Freedman–Diaconis bin counts.
    Auto,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
    /// Count normalised so the histogram integrates to 1.
    pub density: f64,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
///
/// The bin count is clamped to `1..=MAX_BINS`.
pub fn histogram(values: &[f64], rule: BinRule) -> Vec<Bin> {
    if values.is_empty() {
        return Vec::new();
    }

    let (mut min, mut max) = min_max(values);
    let constant = min == max;
    if constant {
        min -= 0.5;
        max += 0.5;
    }

    let num_bins = match rule {
        BinRule::Fixed(n) => n,
        BinRule::Auto if constant => 1,
        BinRule::Auto => auto_bin_count(values, max - min),
    }
    .clamp(1, MAX_BINS);

    let bin_width = (max - min) / num_bins as f64;
    let mut counts = vec![0usize; num_bins];
    for &v in values {
        let idx = (((v - min) / bin_width) as usize).min(num_bins - 1);
        counts[idx] += 1;
    }

    let n = values.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let start = min + i as f64 * bin_width;
            Bin {
                start,
                end: start + bin_width,
                count,
                density: count as f64 / (n * bin_width),
            }
        })
        .collect()
}

fn auto_bin_count(values: &[f64], range: f64) -> usize {
    let n = values.len() as f64;
    let sturges = (n.log2() + 1.0).ceil() as usize;

    let (q1, _, q3) = quartiles(values);
    let iqr = q3 - q1;
    if iqr <= 0.0 {
        return sturges;
    }
    let fd_width = 2.0 * iqr / n.cbrt();
    // A single far outlier stretches the range without widening the IQR.
    let fd = (range / fd_width).ceil().min(MAX_BINS as f64) as usize;
    sturges.max(fd).min(values.len())
}

// ---------------------------------------------------------------------------
// Kernel density
// ---------------------------------------------------------------------------

/// Gaussian KDE sampled at `points` evenly spaced positions.
///
/// The grid extends three bandwidths past the data on each side. Empty when
/// there are fewer than two values or they are all equal.
pub fn kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
    if values.len() < 2 || points < 2 {
        return Vec::new();
    }

    let n = values.len() as f64;
    let sd = sample_std_dev(values);
    if sd == 0.0 {
        return Vec::new();
    }
    // Scott's factor n^(-1/5) on the sample standard deviation
    let bandwidth = sd * n.powf(-0.2);

    let (min, max) = min_max(values);
    let lo = min - 3.0 * bandwidth;
    let hi = max + 3.0 * bandwidth;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (points - 1) as f64;
            let density: f64 = values
                .iter()
                .map(|&v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum();
            (x, density * norm)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Box / violin summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Most extreme values within 1.5 IQR of the box.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let (q1, median, q3) = quartiles_sorted(&sorted);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let lower_whisker = sorted.iter().copied().find(|&v| v >= lower_fence).unwrap_or(q1);
    let upper_whisker = sorted.iter().rev().copied().find(|&v| v <= upper_fence).unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < lower_fence || v > upper_fence)
        .collect();

    Some(BoxSummary {
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViolinSummary {
    pub summary: BoxSummary,
    pub density: Vec<(f64, f64)>,
}

pub fn violin_summary(values: &[f64], points: usize) -> Option<ViolinSummary> {
    Some(ViolinSummary {
        summary: box_summary(values)?,
        density: kde(values, points),
    })
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

/// `(x, y)` pairs grouped by batting team, rows with either value missing dropped.
pub fn scatter_by_team(
    view: &FilteredView<'_>,
    x: NumericColumn,
    y: NumericColumn,
) -> BTreeMap<String, Vec<[f64; 2]>> {
    let mut series: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    for rec in view.iter() {
        if let (Some(xv), Some(yv)) = (rec.value(x), rec.value(y)) {
            series
                .entry(rec.batting_team.clone())
                .or_default()
                .push([xv, yv]);
        }
    }
    series
}

// -- helpers --

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (n - 1.0)).sqrt()
}

/// Quartiles using linear interpolation between closest ranks.
pub fn quartiles(values: &[f64]) -> (f64, f64, f64) {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quartiles_sorted(&sorted)
}

fn quartiles_sorted(sorted: &[f64]) -> (f64, f64, f64) {
    if sorted.is_empty() {
        return (f64::NAN, f64::NAN, f64::NAN);
    }
    (
        interpolate(sorted, 0.25),
        interpolate(sorted, 0.5),
        interpolate(sorted, 0.75),
    )
}

fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let idx = (sorted.len() - 1) as f64 * q;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let fraction = idx - lower as f64;
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}
