use std::collections::HashMap;

use polars::prelude::*;
use tracing::{info, warn};

use crate::helper_functions::read_csv;
use crate::models::{Dataset, GenomicEvent, RegulationCategory, Segment, SegmentLabel, Strand};

/// Event annotation table: one row per segment, with the event's regulation
/// category and baseline PSI repeated on each row.
///
/// Expected columns: `event_id`, `segment` (C1/A/C2), `chrom`, `start`,
/// `end`, `strand`, `category`, `psi`.
pub struct EventAnnotations {
    pub path: String,
}

/// Events grouped by regulation category, plus the per-event baseline PSI
/// used for control matching.
#[derive(Debug, Default)]
pub struct EventSet {
    pub enhanced: Vec<GenomicEvent>,
    pub repressed: Vec<GenomicEvent>,
    pub control_pool: Vec<GenomicEvent>,
    pub psi: HashMap<String, f64>,
}

impl Dataset for EventAnnotations {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading event annotations from {}", self.path);
        read_csv(&self.path)
    }
}

impl EventAnnotations {
    pub fn load_events(&self) -> PolarsResult<EventSet> {
        let df = self.load()?;
        let set = events_from_frame(&df)?;
        info!(
            "Loaded {} enhanced, {} repressed, {} non-regulated events",
            set.enhanced.len(),
            set.repressed.len(),
            set.control_pool.len()
        );
        Ok(set)
    }
}

/// Group the per-segment rows into events; table order defines event order
/// downstream. Rows that cannot be interpreted are warned about and skipped;
/// structural validation of each event happens in the extractor.
pub fn events_from_frame(df: &DataFrame) -> PolarsResult<EventSet> {
    let event_ids = df.column("event_id")?.str()?;
    let labels = df.column("segment")?.str()?;
    let chroms = df.column("chrom")?.str()?;
    let starts = df.column("start")?.i64()?;
    let ends = df.column("end")?.i64()?;
    let strands = df.column("strand")?.str()?;
    let categories = df.column("category")?.str()?;
    let psis = df.column("psi")?.f64()?;

    let mut order: Vec<String> = Vec::new();
    let mut segments: HashMap<String, Vec<Segment>> = HashMap::new();
    let mut category_of: HashMap<String, RegulationCategory> = HashMap::new();
    let mut set = EventSet::default();

    for i in 0..df.height() {
        let (Some(id), Some(label), Some(chrom), Some(start), Some(end), Some(strand)) = (
            event_ids.get(i),
            labels.get(i),
            chroms.get(i),
            starts.get(i),
            ends.get(i),
            strands.get(i),
        ) else {
            warn!("row {}: incomplete segment record, skipping", i);
            continue;
        };

        let Some(label) = SegmentLabel::from_code(label) else {
            warn!("row {}: unknown segment label '{}', skipping", i, label);
            continue;
        };
        let Some(strand) = Strand::from_symbol(strand) else {
            warn!("row {}: unknown strand '{}', skipping", i, strand);
            continue;
        };

        if !segments.contains_key(id) {
            order.push(id.to_string());
        }
        segments.entry(id.to_string()).or_default().push(Segment {
            label,
            chrom: chrom.to_string(),
            start,
            end,
            strand,
        });

        if let Some(category) = categories.get(i).and_then(RegulationCategory::from_label) {
            category_of.entry(id.to_string()).or_insert(category);
        }
        if let Some(psi) = psis.get(i) {
            set.psi.entry(id.to_string()).or_insert(psi);
        }
    }

    for id in order {
        let event = GenomicEvent {
            segments: segments.remove(&id).unwrap_or_default(),
            id: id.clone(),
        };
        match category_of.get(&id) {
            Some(RegulationCategory::Enhanced) => set.enhanced.push(event),
            Some(RegulationCategory::Repressed) => set.repressed.push(event),
            Some(RegulationCategory::NonRegulated) => set.control_pool.push(event),
            None => warn!("event {}: no regulation category, dropped", id),
        }
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn groups_segments_into_events() {
        let df = df![
            "event_id" => &["e1", "e1", "e1", "e2", "e2", "e2"],
            "segment" => &["C1", "A", "C2", "C1", "A", "C2"],
            "chrom" => &["chr1", "chr1", "chr1", "chr1", "chr1", "chr1"],
            "start" => &[100i64, 300, 600, 1100, 1300, 1600],
            "end" => &[200i64, 400, 700, 1200, 1400, 1700],
            "strand" => &["+", "+", "+", "+", "+", "+"],
            "category" => &["enhanced", "enhanced", "enhanced", "non-regulated", "non-regulated", "non-regulated"],
            "psi" => &[0.4f64, 0.4, 0.4, 0.7, 0.7, 0.7]
        ]
        .unwrap();

        let set = events_from_frame(&df).unwrap();
        assert_eq!(set.enhanced.len(), 1);
        assert_eq!(set.repressed.len(), 0);
        assert_eq!(set.control_pool.len(), 1);
        assert_eq!(set.enhanced[0].id, "e1");
        assert_eq!(set.enhanced[0].segments.len(), 3);
        assert_eq!(set.psi["e2"], 0.7);
    }

    #[test]
    fn unknown_labels_are_skipped_not_fatal() {
        let df = df![
            "event_id" => &["e1", "e1"],
            "segment" => &["C1", "X9"],
            "chrom" => &["chr1", "chr1"],
            "start" => &[100i64, 300],
            "end" => &[200i64, 400],
            "strand" => &["+", "+"],
            "category" => &["repressed", "repressed"],
            "psi" => &[0.2f64, 0.2]
        ]
        .unwrap();

        let set = events_from_frame(&df).unwrap();
        assert_eq!(set.repressed.len(), 1);
        assert_eq!(set.repressed[0].segments.len(), 1);
    }
}
