//! Fixed-width signal windows around the four splice-site boundaries of a
//! cassette-exon event.

use crate::error::AnalysisError;
use crate::models::{GenomicEvent, Segment, SegmentLabel, SignalTrack};

use super::{PositionalWindow, EXON_FLANK, INTRON_FLANK, WINDOW_LEN};

/// The four boundaries of a cassette-exon event, named by the exon whose edge
/// is examined and by which transcript edge of that exon it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// 3' edge of the upstream constant exon (donor into intron 1).
    Upstream3Prime,
    /// 5' edge of the alternative exon (acceptor out of intron 1).
    Alternative5Prime,
    /// 3' edge of the alternative exon (donor into intron 2).
    Alternative3Prime,
    /// 5' edge of the downstream constant exon (acceptor out of intron 2).
    Downstream5Prime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    FivePrime,
    ThreePrime,
}

impl Boundary {
    pub const ALL: [Boundary; 4] = [
        Boundary::Upstream3Prime,
        Boundary::Alternative5Prime,
        Boundary::Alternative3Prime,
        Boundary::Downstream5Prime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Boundary::Upstream3Prime => "upstream_3p",
            Boundary::Alternative5Prime => "alternative_5p",
            Boundary::Alternative3Prime => "alternative_3p",
            Boundary::Downstream5Prime => "downstream_5p",
        }
    }

    /// Index of the splice-site base in the assembled window: donor windows
    /// run exon-side first, acceptor windows intron-side first.
    pub fn site_index(self) -> usize {
        match self.layout().1 {
            Edge::ThreePrime => EXON_FLANK,
            Edge::FivePrime => INTRON_FLANK,
        }
    }

    /// Dispatch table: the examined exon, which transcript edge of it, and
    /// the segment across the intervening intron.
    fn layout(self) -> (SegmentLabel, Edge, SegmentLabel) {
        match self {
            Boundary::Upstream3Prime => (
                SegmentLabel::UpstreamConstant,
                Edge::ThreePrime,
                SegmentLabel::Alternative,
            ),
            Boundary::Alternative5Prime => (
                SegmentLabel::Alternative,
                Edge::FivePrime,
                SegmentLabel::UpstreamConstant,
            ),
            Boundary::Alternative3Prime => (
                SegmentLabel::Alternative,
                Edge::ThreePrime,
                SegmentLabel::DownstreamConstant,
            ),
            Boundary::Downstream5Prime => (
                SegmentLabel::DownstreamConstant,
                Edge::FivePrime,
                SegmentLabel::Alternative,
            ),
        }
    }
}

/// Extract the aligned 351-position window for one event at one boundary.
///
/// The window covers `min(300, intron_width)` intron bases, the splice-site
/// base itself (the intron-side junction base), and `min(50, exon_width)`
/// exon bases, read 5'->3' on the transcript strand. Acceptor windows lay
/// intron before exon, donor windows exon before intron; whichever side falls
/// short of its flank cap is padded with `None` at the outer end, so the
/// result is always exactly 351 positions long.
///
/// A zero-width intervening region is valid (reach 0); annotation gaps that
/// come out negative clip to zero. Missing segments or segments on different
/// chromosomes/strands fail with `MalformedEvent` carrying the event id.
pub fn extract(
    event: &GenomicEvent,
    boundary: Boundary,
    track: &SignalTrack,
) -> Result<PositionalWindow, AnalysisError> {
    let (exon_label, edge, across_label) = boundary.layout();
    let exon = find_segment(event, exon_label)?;
    let across = find_segment(event, across_label)?;

    if exon.chrom != across.chrom {
        return Err(AnalysisError::malformed(
            &event.id,
            format!("segments {} and {} on different chromosomes", exon_label.code(), across_label.code()),
        ));
    }
    if exon.strand != across.strand {
        return Err(AnalysisError::malformed(
            &event.id,
            format!("segments {} and {} on different strands", exon_label.code(), across_label.code()),
        ));
    }

    let strand = exon.strand;
    let dir = strand.step();

    // Transcript-order gap between the examined exon edge and the segment
    // across the junction; overlapping annotations clip to zero.
    let gap = match edge {
        Edge::ThreePrime => (across.five_prime() - exon.three_prime()) * dir - 1,
        Edge::FivePrime => (exon.five_prime() - across.three_prime()) * dir - 1,
    };
    let intron_width = gap.max(0);

    let exon_reach = exon.width().clamp(0, EXON_FLANK as i64) as usize;
    let intron_reach = intron_width.min(INTRON_FLANK as i64) as usize;

    let edge_coord = match edge {
        Edge::ThreePrime => exon.three_prime(),
        Edge::FivePrime => exon.five_prime(),
    };

    // Transcript offsets relative to the exon edge base (offset 0). The
    // splice-site base is the intron-side junction base: offset +1 for a
    // donor, -1 for an acceptor.
    let (lo, hi, left_pad, right_pad) = match edge {
        Edge::ThreePrime => (
            1 - exon_reach as i64,
            1 + intron_reach as i64,
            EXON_FLANK - exon_reach,
            INTRON_FLANK - intron_reach,
        ),
        Edge::FivePrime => (
            -1 - intron_reach as i64,
            exon_reach as i64 - 1,
            INTRON_FLANK - intron_reach,
            EXON_FLANK - exon_reach,
        ),
    };

    let mut window: PositionalWindow = Vec::with_capacity(WINDOW_LEN);
    window.resize(left_pad, None);
    for t in lo..=hi {
        let pos = edge_coord + dir * t;
        window.push(Some(track.value(&exon.chrom, strand, pos)));
    }
    window.extend(std::iter::repeat(None).take(right_pad));

    debug_assert_eq!(window.len(), WINDOW_LEN);
    Ok(window)
}

fn find_segment(event: &GenomicEvent, label: SegmentLabel) -> Result<&Segment, AnalysisError> {
    event
        .segment(label)
        .ok_or_else(|| AnalysisError::malformed(&event.id, format!("missing segment {}", label.code())))
}
