use std::collections::HashMap;

use polars::prelude::*;

pub fn polars_err(e: Box<dyn std::error::Error>) -> PolarsError {
    PolarsError::ComputeError(format!("{}", e).into())
}

/// Trait representing a tabular input source of the pipeline.
pub trait Dataset {
    fn load(&self) -> PolarsResult<DataFrame>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    pub fn from_symbol(s: &str) -> Option<Strand> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        }
    }

    /// Transcript direction as a genomic step: +1 on the plus strand, -1 on minus.
    pub fn step(self) -> i64 {
        match self {
            Strand::Plus => 1,
            Strand::Minus => -1,
        }
    }
}

/// Exonic segment roles of a cassette-exon event: upstream constant (C1),
/// alternative (A), downstream constant (C2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentLabel {
    UpstreamConstant,
    Alternative,
    DownstreamConstant,
}

impl SegmentLabel {
    pub fn from_code(code: &str) -> Option<SegmentLabel> {
        match code {
            "C1" => Some(SegmentLabel::UpstreamConstant),
            "A" => Some(SegmentLabel::Alternative),
            "C2" => Some(SegmentLabel::DownstreamConstant),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            SegmentLabel::UpstreamConstant => "C1",
            SegmentLabel::Alternative => "A",
            SegmentLabel::DownstreamConstant => "C2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegulationCategory {
    Enhanced,
    Repressed,
    NonRegulated,
}

impl RegulationCategory {
    pub fn from_label(label: &str) -> Option<RegulationCategory> {
        match label {
            "enhanced" => Some(RegulationCategory::Enhanced),
            "repressed" => Some(RegulationCategory::Repressed),
            "non-regulated" | "non_regulated" | "control" => Some(RegulationCategory::NonRegulated),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RegulationCategory::Enhanced => "enhanced",
            RegulationCategory::Repressed => "repressed",
            RegulationCategory::NonRegulated => "non-regulated",
        }
    }
}

/// One annotated exonic segment, half-open interval `[start, end)`.
#[derive(Debug, Clone)]
pub struct Segment {
    pub label: SegmentLabel,
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
}

impl Segment {
    pub fn width(&self) -> i64 {
        self.end - self.start
    }

    /// Genomic coordinate of the segment's transcript 5' edge base.
    pub fn five_prime(&self) -> i64 {
        match self.strand {
            Strand::Plus => self.start,
            Strand::Minus => self.end - 1,
        }
    }

    /// Genomic coordinate of the segment's transcript 3' edge base.
    pub fn three_prime(&self) -> i64 {
        match self.strand {
            Strand::Plus => self.end - 1,
            Strand::Minus => self.start,
        }
    }
}

/// One alternative-splicing event: an identifier plus its annotated segments.
/// Read-only once constructed; a well-formed cassette event carries exactly
/// one segment per label.
#[derive(Debug, Clone)]
pub struct GenomicEvent {
    pub id: String,
    pub segments: Vec<Segment>,
}

impl GenomicEvent {
    pub fn segment(&self, label: SegmentLabel) -> Option<&Segment> {
        self.segments.iter().find(|s| s.label == label)
    }
}

/// Strand-separated per-base crosslink coverage over the analysed loci.
/// Positions without recorded signal read as zero, so lookups are total.
#[derive(Debug, Clone, Default)]
pub struct SignalTrack {
    plus: HashMap<String, HashMap<i64, f64>>,
    minus: HashMap<String, HashMap<i64, f64>>,
}

impl SignalTrack {
    fn side(&self, strand: Strand) -> &HashMap<String, HashMap<i64, f64>> {
        match strand {
            Strand::Plus => &self.plus,
            Strand::Minus => &self.minus,
        }
    }

    pub fn add(&mut self, chrom: &str, strand: Strand, pos: i64, count: f64) {
        let side = match strand {
            Strand::Plus => &mut self.plus,
            Strand::Minus => &mut self.minus,
        };
        *side
            .entry(chrom.to_string())
            .or_default()
            .entry(pos)
            .or_insert(0.0) += count;
    }

    pub fn value(&self, chrom: &str, strand: Strand, pos: i64) -> f64 {
        self.side(strand)
            .get(chrom)
            .and_then(|positions| positions.get(&pos))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn covered_positions(&self) -> usize {
        self.plus
            .values()
            .chain(self.minus.values())
            .map(|positions| positions.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_lookups_are_total() {
        let mut track = SignalTrack::default();
        track.add("chr1", Strand::Plus, 100, 3.0);
        track.add("chr1", Strand::Plus, 100, 2.0);
        assert_eq!(track.value("chr1", Strand::Plus, 100), 5.0);
        assert_eq!(track.value("chr1", Strand::Minus, 100), 0.0);
        assert_eq!(track.value("chr2", Strand::Plus, 100), 0.0);
    }

    #[test]
    fn segment_edges_follow_strand() {
        let plus = Segment {
            label: SegmentLabel::Alternative,
            chrom: "chr1".into(),
            start: 100,
            end: 140,
            strand: Strand::Plus,
        };
        assert_eq!(plus.five_prime(), 100);
        assert_eq!(plus.three_prime(), 139);

        let minus = Segment {
            strand: Strand::Minus,
            ..plus.clone()
        };
        assert_eq!(minus.five_prime(), 139);
        assert_eq!(minus.three_prime(), 100);
    }
}
