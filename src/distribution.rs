//! Per-column distribution summaries that back the EDA figures.
//!
//! - [`value_counts`] — frequency of each distinct value, most frequent first
//! - [`histogram`] — equal-width bins over the data range
//! - [`boxplot_stats`] — quartiles, 1.5×IQR whiskers and outliers
//!
//! # Example
//!
//! ```
//! use u_eda::distribution::{boxplot_stats, histogram};
//!
//! let data = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
//! let hist = histogram(&data, 4).unwrap();
//! assert_eq!(hist.counts.iter().sum::<usize>(), 6);
//!
//! let bp = boxplot_stats(&data).unwrap();
//! assert_eq!(bp.outliers, vec![100.0]);
//! ```

use serde::Serialize;

use crate::dataframe::Column;

/// Whisker reach in multiples of the interquartile range.
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

// ── Value counts ──────────────────────────────────────────────────────

/// Counts present values of a column, sorted by count descending.
///
/// Ties keep the order of first appearance. Missing values are not
/// counted.
///
/// ```
/// use u_eda::dataframe::Column;
/// use u_eda::distribution::value_counts;
///
/// let col = Column::from_strings(vec![
///     Some("b".into()), Some("a".into()), None, Some("a".into()),
/// ]);
/// assert_eq!(value_counts(&col), vec![("a".to_string(), 2), ("b".to_string(), 1)]);
/// ```
pub fn value_counts(col: &Column) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slots: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for idx in col.validity().valid_indices() {
        let Some(key) = col.value_string(idx) else {
            continue;
        };
        match slots.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ── Histogram ─────────────────────────────────────────────────────────

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramResult {
    /// Bin edges (length = number of bins + 1).
    pub edges: Vec<f64>,
    /// Observations per bin; the last bin includes its right edge.
    pub counts: Vec<usize>,
}

impl HistogramResult {
    /// Largest bin count.
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Bins finite values into `n_bins` equal-width bins spanning min..max.
///
/// A constant sample is centred in the range `v - 0.5 .. v + 0.5`.
/// Returns `None` if there are no finite values or `n_bins` is zero.
pub fn histogram(data: &[f64], n_bins: usize) -> Option<HistogramResult> {
    let finite: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || n_bins == 0 {
        return None;
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / n_bins as f64;
    let edges: Vec<f64> = (0..=n_bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; n_bins];
    for v in finite {
        let bin = (((v - lo) / width) as usize).min(n_bins - 1);
        counts[bin] += 1;
    }

    Some(HistogramResult { edges, counts })
}

// ── Boxplot ───────────────────────────────────────────────────────────

/// Five-number summary plus outliers, as drawn by a Tukey boxplot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxplotStats {
    /// Number of values summarized.
    pub count: usize,
    /// 25th percentile.
    pub q1: f64,
    /// 50th percentile.
    pub median: f64,
    /// 75th percentile.
    pub q3: f64,
    /// Q3 - Q1.
    pub iqr: f64,
    /// Smallest value no further than 1.5×IQR below Q1.
    pub whisker_low: f64,
    /// Largest value no further than 1.5×IQR above Q3.
    pub whisker_high: f64,
    /// Values beyond the whiskers, ascending.
    pub outliers: Vec<f64>,
}

impl BoxplotStats {
    /// Lowest drawn point (whisker or outlier).
    pub fn lower_extent(&self) -> f64 {
        self.outliers
            .first()
            .map_or(self.whisker_low, |&o| o.min(self.whisker_low))
    }

    /// Highest drawn point (whisker or outlier).
    pub fn upper_extent(&self) -> f64 {
        self.outliers
            .last()
            .map_or(self.whisker_high, |&o| o.max(self.whisker_high))
    }
}

/// Computes boxplot statistics over the finite values of `data`.
///
/// Quartiles use linear interpolation between order statistics. Returns
/// `None` when no finite value is present.
pub fn boxplot_stats(data: &[f64]) -> Option<BoxplotStats> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let (q1, median, q3) = match sorted.as_slice() {
        [only] => (*only, *only, *only),
        _ => (
            u_numflow::stats::quantile(&sorted, 0.25)?,
            u_numflow::stats::median(&sorted)?,
            u_numflow::stats::quantile(&sorted, 0.75)?,
        ),
    };
    let iqr = q3 - q1;
    let lower_fence = q1 - WHISKER_IQR_FACTOR * iqr;
    let upper_fence = q3 + WHISKER_IQR_FACTOR * iqr;

    let inside = || sorted.iter().copied().filter(|&v| v >= lower_fence && v <= upper_fence);
    let whisker_low = inside().next().unwrap_or(q1);
    let whisker_high = inside().last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < lower_fence || v > upper_fence)
        .collect();

    Some(BoxplotStats {
        count: sorted.len(),
        q1,
        median,
        q3,
        iqr,
        whisker_low,
        whisker_high,
        outliers,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────
