//! Per-event min-max rescaling of signal rows.

use super::SignalMatrix;

/// Rescale every row to [0, 1] by its own min/max, ignoring missing cells.
pub fn normalize_rows(matrix: &mut SignalMatrix) {
    for row in &mut matrix.rows {
        normalize_row(row);
    }
}

/// `(x - min) / (max - min)` over the non-missing cells. A degenerate row
/// (max == min) maps every non-missing cell to 0; an all-missing row is left
/// untouched. Missing cells stay missing.
pub fn normalize_row(row: &mut [Option<f64>]) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in row.iter().flatten() {
        min = min.min(*v);
        max = max.max(*v);
    }
    if !min.is_finite() {
        return;
    }

    let span = max - min;
    for cell in row.iter_mut() {
        if let Some(v) = *cell {
            *cell = Some(if span == 0.0 { 0.0 } else { (v - min) / span });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescales_to_unit_interval() {
        let mut row = vec![Some(2.0), Some(4.0), Some(6.0)];
        normalize_row(&mut row);
        assert_eq!(row, vec![Some(0.0), Some(0.5), Some(1.0)]);
    }

    #[test]
    fn missing_cells_stay_missing() {
        let mut row = vec![Some(1.0), None, Some(3.0)];
        normalize_row(&mut row);
        assert_eq!(row, vec![Some(0.0), None, Some(1.0)]);
    }

    #[test]
    fn constant_rows_become_zero_not_nan() {
        let mut row = vec![Some(5.0), Some(5.0), None];
        normalize_row(&mut row);
        assert_eq!(row, vec![Some(0.0), Some(0.0), None]);

        let mut single = vec![None, Some(7.0)];
        normalize_row(&mut single);
        assert_eq!(single, vec![None, Some(0.0)]);
    }

    #[test]
    fn all_missing_rows_pass_through() {
        let mut row: Vec<Option<f64>> = vec![None, None];
        normalize_row(&mut row);
        assert_eq!(row, vec![None, None]);
    }

    #[test]
    fn idempotent_on_normalized_rows() {
        let mut row = vec![Some(0.1), Some(0.9), None, Some(0.4)];
        normalize_row(&mut row);
        let once = row.clone();
        normalize_row(&mut row);
        assert_eq!(row, once);
    }
}
