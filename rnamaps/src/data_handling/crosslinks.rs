use polars::prelude::*;
use tracing::info;

use crate::helper_functions::read_bedgraph;
use crate::models::{SignalTrack, Strand};

/// Strand-separated iCLIP crosslink coverage, one bedGraph-style file per
/// strand (`chrom  start  end  count`, no header, half-open intervals).
pub struct CrosslinkTracks {
    pub plus_path: String,
    pub minus_path: String,
}

impl CrosslinkTracks {
    pub fn load_track(&self) -> PolarsResult<SignalTrack> {
        let mut track = SignalTrack::default();
        for (path, strand) in [
            (&self.plus_path, Strand::Plus),
            (&self.minus_path, Strand::Minus),
        ] {
            info!("Reading crosslink coverage from {}", path);
            let df = read_bedgraph(path)?;
            add_intervals(&mut track, &df, strand)?;
        }
        info!("Signal track covers {} positions", track.covered_positions());
        Ok(track)
    }
}

fn add_intervals(track: &mut SignalTrack, df: &DataFrame, strand: Strand) -> PolarsResult<()> {
    let chroms = df.column("column_1")?.str()?;
    let starts = df.column("column_2")?.i64()?;
    let ends = df.column("column_3")?.i64()?;
    let counts = df.column("column_4")?.cast(&DataType::Float64)?;
    let counts = counts.f64()?;

    for i in 0..df.height() {
        if let (Some(chrom), Some(start), Some(end), Some(count)) =
            (chroms.get(i), starts.get(i), ends.get(i), counts.get(i))
        {
            for pos in start..end {
                track.add(chrom, strand, pos, count);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn expands_intervals_per_base() {
        let df = df![
            "column_1" => &["chr1", "chr1"],
            "column_2" => &[10i64, 12],
            "column_3" => &[13i64, 14],
            "column_4" => &[2i64, 5]
        ]
        .unwrap();

        let mut track = SignalTrack::default();
        add_intervals(&mut track, &df, Strand::Plus).unwrap();

        assert_eq!(track.value("chr1", Strand::Plus, 10), 2.0);
        assert_eq!(track.value("chr1", Strand::Plus, 11), 2.0);
        // overlapping intervals accumulate
        assert_eq!(track.value("chr1", Strand::Plus, 12), 7.0);
        assert_eq!(track.value("chr1", Strand::Plus, 13), 5.0);
        assert_eq!(track.value("chr1", Strand::Plus, 14), 0.0);
        assert_eq!(track.value("chr1", Strand::Minus, 10), 0.0);
    }
}
