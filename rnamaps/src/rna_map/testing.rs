//! Sliding-window comparison of treatment vs matched-control signal with
//! FDR correction across all window positions.

use log::debug;

use crate::error::AnalysisError;
use crate::stats::{benjamini_hochberg, mann_whitney_greater};

use super::{mean_ignoring_missing, SignalMatrix};

pub const DEFAULT_BIN_SIZE: usize = 10;
/// Adjusted p-value threshold for reporting a bin as significant.
pub const SIGNIFICANCE_LEVEL: f64 = 0.01;

/// Outcome of one sliding window position.
#[derive(Debug, Clone)]
pub struct BinResult {
    pub start: usize,
    pub end: usize,
    pub p_value: f64,
    pub adj_p: f64,
    /// Present when the span had no usable row-means on one side. Such bins
    /// are kept in the correction set at p = 1 and are never significant.
    pub error: Option<AnalysisError>,
}

impl BinResult {
    pub fn is_defined(&self) -> bool {
        self.error.is_none()
    }
}

/// A contiguous positional span where treatment signal exceeds the matched
/// control at the configured FDR.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SignificantBin {
    pub start: usize,
    pub end: usize,
    pub adj_p: f64,
}

/// All evaluated window positions, in position order.
#[derive(Debug, Clone)]
pub struct BinnedTest {
    pub bins: Vec<BinResult>,
}

impl BinnedTest {
    pub fn significant(&self) -> Vec<SignificantBin> {
        self.bins
            .iter()
            .filter(|b| b.is_defined() && b.adj_p <= SIGNIFICANCE_LEVEL)
            .map(|b| SignificantBin {
                start: b.start,
                end: b.end,
                adj_p: b.adj_p,
            })
            .collect()
    }
}

/// Slide `bin_size`-wide windows (stride 1) over both matrices and test each
/// span with a one-sided rank-sum test, alternative "treatment greater".
/// All raw p-values are BH-corrected in one pass; a span where either group
/// has zero non-missing row-means is flagged `InsufficientData` and assigned
/// p = 1 instead of aborting the sweep.
pub fn test_binned(treatment: &SignalMatrix, control: &SignalMatrix, bin_size: usize) -> BinnedTest {
    let width = treatment.width();
    assert_eq!(
        width,
        control.width(),
        "treatment and control matrices must share the positional layout"
    );
    assert!(bin_size >= 1 && bin_size <= width);

    let n_bins = width - bin_size + 1;
    let mut raw = Vec::with_capacity(n_bins);
    let mut errors: Vec<Option<AnalysisError>> = Vec::with_capacity(n_bins);

    for start in 0..n_bins {
        let end = start + bin_size;
        let t = span_means(treatment, start, end);
        let c = span_means(control, start, end);
        if t.is_empty() || c.is_empty() {
            debug!("bin [{}, {}) lacks data on one side", start, end);
            raw.push(1.0);
            errors.push(Some(AnalysisError::InsufficientData { start, end }));
        } else {
            raw.push(mann_whitney_greater(&t, &c));
            errors.push(None);
        }
    }

    let adjusted = benjamini_hochberg(&raw);
    let bins = raw
        .into_iter()
        .zip(adjusted)
        .zip(errors)
        .enumerate()
        .map(|(start, ((p_value, adj_p), error))| BinResult {
            start,
            end: start + bin_size,
            p_value,
            adj_p,
            error,
        })
        .collect();

    BinnedTest { bins }
}

/// Missing-aware per-row means over `[start, end)`; rows with no non-missing
/// cell in the span drop out.
fn span_means(matrix: &SignalMatrix, start: usize, end: usize) -> Vec<f64> {
    matrix
        .rows
        .iter()
        .filter_map(|row| mean_ignoring_missing(row[start..end].iter().copied()))
        .collect()
}
