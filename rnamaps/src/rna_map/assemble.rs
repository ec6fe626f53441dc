//! Per-category orchestration: match controls once, then build, normalize and
//! test the four boundary matrices.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::error::AnalysisError;
use crate::models::{GenomicEvent, RegulationCategory, SignalTrack};

use super::matching::match_controls;
use super::normalize::normalize_rows;
use super::testing::{test_binned, BinResult, SignificantBin, DEFAULT_BIN_SIZE};
use super::window::{extract, Boundary};
use super::SignalMatrix;

#[derive(Debug, Clone)]
pub struct RnaMapConfig {
    pub bin_size: usize,
    pub quantile_cutpoints: Vec<f64>,
    pub seed: u64,
}

impl Default for RnaMapConfig {
    fn default() -> Self {
        RnaMapConfig {
            bin_size: DEFAULT_BIN_SIZE,
            quantile_cutpoints: vec![0.0, 0.25, 0.5, 0.75, 1.0],
            seed: 42,
        }
    }
}

/// Everything downstream rendering needs for one boundary of one category.
#[derive(Debug, Clone)]
pub struct RnaMapProfile {
    pub boundary: Boundary,
    pub category: RegulationCategory,
    pub n_treatment: usize,
    pub n_control: usize,
    pub mean_treatment: Vec<Option<f64>>,
    pub mean_control: Vec<Option<f64>>,
    pub bins: Vec<BinResult>,
    pub significant: Vec<SignificantBin>,
}

/// Build the four boundary profiles for one regulation category.
///
/// The matched-control set is drawn once per category, against the
/// category's PSI distribution, and reused across all four boundaries. The
/// boundary pipelines share no mutable state, so evaluation order does not
/// affect the results.
pub fn assemble_rna_maps(
    treatment_events: &[GenomicEvent],
    control_pool: &[GenomicEvent],
    psi: &HashMap<String, f64>,
    track: &SignalTrack,
    category: RegulationCategory,
    cfg: &RnaMapConfig,
) -> Result<Vec<RnaMapProfile>, AnalysisError> {
    let target_scores: Vec<f64> = treatment_events
        .iter()
        .filter_map(|e| psi.get(&e.id))
        .copied()
        .collect();
    let pool: Vec<(String, f64)> = control_pool
        .iter()
        .filter_map(|e| psi.get(&e.id).map(|&s| (e.id.clone(), s)))
        .collect();

    let matched = match_controls(
        &pool,
        &target_scores,
        &cfg.quantile_cutpoints,
        treatment_events.len(),
        cfg.seed,
    )?;
    let matched_ids: HashSet<&str> = matched.iter().map(|(id, _)| id.as_str()).collect();
    let matched_events: Vec<&GenomicEvent> = control_pool
        .iter()
        .filter(|e| matched_ids.contains(e.id.as_str()))
        .collect();

    info!(
        "{}: matched {} of {} pool events against {} treatment events",
        category.name(),
        matched_events.len(),
        control_pool.len(),
        treatment_events.len()
    );

    let mut profiles = Vec::with_capacity(Boundary::ALL.len());
    for boundary in Boundary::ALL {
        let mut treatment = build_matrix(treatment_events.iter(), boundary, track, category)?;
        let mut control = build_matrix(
            matched_events.iter().copied(),
            boundary,
            track,
            RegulationCategory::NonRegulated,
        )?;
        normalize_rows(&mut treatment);
        normalize_rows(&mut control);

        let test = test_binned(&treatment, &control, cfg.bin_size);
        let significant = test.significant();
        info!(
            "{} / {}: {} significant bins",
            category.name(),
            boundary.label(),
            significant.len()
        );

        profiles.push(RnaMapProfile {
            boundary,
            category,
            n_treatment: treatment.rows.len(),
            n_control: control.rows.len(),
            mean_treatment: treatment.column_means(),
            mean_control: control.column_means(),
            bins: test.bins,
            significant,
        });
    }

    Ok(profiles)
}

fn build_matrix<'a>(
    events: impl Iterator<Item = &'a GenomicEvent>,
    boundary: Boundary,
    track: &SignalTrack,
    category: RegulationCategory,
) -> Result<SignalMatrix, AnalysisError> {
    let mut matrix = SignalMatrix::new(category);
    for event in events {
        let window = extract(event, boundary, track)?;
        matrix.push(event.id.clone(), window);
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Segment, SegmentLabel, Strand};
    use crate::rna_map::{EXON_FLANK, WINDOW_LEN};

    /// Cassette event with generous flanks at an isolated locus.
    fn event(id: &str, base: i64) -> GenomicEvent {
        let seg = |label, start: i64, end: i64| Segment {
            label,
            chrom: "chr1".into(),
            start: base + start,
            end: base + end,
            strand: Strand::Plus,
        };
        GenomicEvent {
            id: id.into(),
            segments: vec![
                seg(SegmentLabel::UpstreamConstant, 0, 100),
                seg(SegmentLabel::Alternative, 500, 600),
                seg(SegmentLabel::DownstreamConstant, 1000, 1100),
            ],
        }
    }

    #[test]
    fn produces_four_full_profiles() {
        let spacing = 10_000;
        let treatment: Vec<GenomicEvent> = (0..12)
            .map(|i| event(&format!("t{}", i), i * spacing))
            .collect();
        let pool: Vec<GenomicEvent> = (0..30)
            .map(|i| event(&format!("c{}", i), (100 + i) * spacing))
            .collect();

        let mut psi = HashMap::new();
        for (i, e) in treatment.iter().enumerate() {
            psi.insert(e.id.clone(), i as f64 / 11.0);
        }
        for (i, e) in pool.iter().enumerate() {
            psi.insert(e.id.clone(), i as f64 / 29.0);
        }

        // plant treatment-only signal in intron 1, just past the C1 donor
        let mut track = SignalTrack::default();
        for e in &treatment {
            let c1_end = e.segment(SegmentLabel::UpstreamConstant).unwrap().end;
            for pos in c1_end..c1_end + 30 {
                track.add("chr1", Strand::Plus, pos, 5.0);
            }
            // background elsewhere so normalization has a range
            track.add("chr1", Strand::Plus, c1_end + 200, 1.0);
        }
        for e in &pool {
            let c1_end = e.segment(SegmentLabel::UpstreamConstant).unwrap().end;
            track.add("chr1", Strand::Plus, c1_end + 200, 1.0);
        }

        let cfg = RnaMapConfig {
            quantile_cutpoints: vec![0.0, 0.5, 1.0],
            ..RnaMapConfig::default()
        };
        let profiles = assemble_rna_maps(
            &treatment,
            &pool,
            &psi,
            &track,
            RegulationCategory::Enhanced,
            &cfg,
        )
        .unwrap();

        assert_eq!(profiles.len(), 4);
        for profile in &profiles {
            assert_eq!(profile.mean_treatment.len(), WINDOW_LEN);
            assert_eq!(profile.mean_control.len(), WINDOW_LEN);
            assert_eq!(profile.n_treatment, 12);
            // 12 / 2 bins -> 6 matched controls per bin
            assert_eq!(profile.n_control, 12);
            assert_eq!(profile.bins.len(), WINDOW_LEN - cfg.bin_size + 1);
        }

        // the planted intron-1 stripe sits right after the donor site of the
        // upstream boundary; that profile must flag it
        let upstream = &profiles[0];
        assert_eq!(upstream.boundary, Boundary::Upstream3Prime);
        assert!(!upstream.significant.is_empty());
        assert!(upstream
            .significant
            .iter()
            .all(|b| b.start >= EXON_FLANK - DEFAULT_BIN_SIZE && b.start <= EXON_FLANK + 31));

        // no stripe was planted around the downstream acceptor
        let downstream = &profiles[3];
        assert_eq!(downstream.boundary, Boundary::Downstream5Prime);
        assert!(downstream.significant.is_empty());
    }

    #[test]
    fn malformed_event_aborts_with_its_id() {
        let mut bad = event("broken", 0);
        bad.segments.remove(1);
        let treatment = vec![bad];
        let pool: Vec<GenomicEvent> = (0..4).map(|i| event(&format!("c{}", i), (i + 1) * 10_000)).collect();
        let mut psi = HashMap::new();
        psi.insert("broken".to_string(), 0.5);
        for e in &pool {
            psi.insert(e.id.clone(), 0.5);
        }
        let track = SignalTrack::default();

        let err = assemble_rna_maps(
            &treatment,
            &pool,
            &psi,
            &track,
            RegulationCategory::Repressed,
            &RnaMapConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
