//! RNA-map core: positional signal extraction around splice-site boundaries,
//! quantile-matched control selection, and binned significance testing.

pub mod assemble;
pub mod matching;
pub mod normalize;
pub mod testing;
pub mod window;

use crate::models::RegulationCategory;

/// Bases read into the exon from the splice site.
pub const EXON_FLANK: usize = 50;
/// Bases read into the intron from the splice site.
pub const INTRON_FLANK: usize = 300;
/// Fixed window length: intron flank + splice-site base + exon flank.
pub const WINDOW_LEN: usize = INTRON_FLANK + 1 + EXON_FLANK;

/// One event's aligned signal around a boundary. `None` marks positions
/// beyond the event's actual exon/intron reach (padding), never a zero count.
pub type PositionalWindow = Vec<Option<f64>>;

/// Rows of aligned windows, one per event, in insertion order.
#[derive(Debug, Clone)]
pub struct SignalMatrix {
    pub event_ids: Vec<String>,
    pub rows: Vec<PositionalWindow>,
    pub category: RegulationCategory,
}

impl SignalMatrix {
    pub fn new(category: RegulationCategory) -> Self {
        SignalMatrix {
            event_ids: Vec::new(),
            rows: Vec::new(),
            category,
        }
    }

    pub fn push(&mut self, event_id: String, window: PositionalWindow) {
        self.event_ids.push(event_id);
        self.rows.push(window);
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(WINDOW_LEN, Vec::len)
    }

    /// Column-wise means over the non-missing cells; a column with no
    /// non-missing cell stays `None`.
    pub fn column_means(&self) -> Vec<Option<f64>> {
        (0..self.width())
            .map(|col| mean_ignoring_missing(self.rows.iter().map(|row| row[col])))
            .collect()
    }
}

/// Mean over the `Some` entries; `None` when every entry is missing.
pub fn mean_ignoring_missing(cells: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in cells.flatten() {
        sum += v;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_means_skip_missing() {
        let mut matrix = SignalMatrix::new(RegulationCategory::Enhanced);
        matrix.push("a".into(), vec![Some(1.0), None, None]);
        matrix.push("b".into(), vec![Some(3.0), Some(4.0), None]);
        let means = matrix.column_means();
        assert_eq!(means, vec![Some(2.0), Some(4.0), None]);
    }
}
