use std::env;
use std::fs::File;
use std::path::PathBuf;

use plotters::style::RGBColor;
use polars::prelude::*;

use crate::models::RegulationCategory;

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

pub fn read_csv(file_path: &str) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()
}

/// Headerless tab-separated bedGraph-style table; columns come back as
/// `column_1` .. `column_4`.
pub fn read_bedgraph(file_path: &str) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(false)
        .with_parse_options(CsvParseOptions::default().with_separator(b'\t'))
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()
}

pub fn dataframe_to_csv(df: &mut DataFrame, path: &str, include_header: bool) -> PolarsResult<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(include_header)
        .finish(df)?;
    Ok(())
}

pub fn colour_for_category(category: RegulationCategory) -> RGBColor {
    match category {
        RegulationCategory::Enhanced => RGBColor(220, 50, 47),
        RegulationCategory::Repressed => RGBColor(38, 139, 210),
        RegulationCategory::NonRegulated => RGBColor(130, 130, 130),
    }
}
