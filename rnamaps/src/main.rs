use std::fs::{create_dir_all, File};
use std::path::Path;

use polars::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::analysis::correlation::{correlate_expression_psi, plot_top_correlations};
use crate::analysis::rna_map_plot::plot_rna_map;
use crate::config::RunConfig;
use crate::data_handling::crosslinks::CrosslinkTracks;
use crate::data_handling::events::EventAnnotations;
use crate::data_handling::tcga::TcgaTables;
use crate::helper_functions::dataframe_to_csv;
use crate::models::{Dataset, RegulationCategory};
use crate::rna_map::assemble::{assemble_rna_maps, RnaMapConfig, RnaMapProfile};

mod analysis;
mod config;
mod data_handling;
mod error;
mod helper_functions;
mod models;
mod rna_map;
mod stats;

const GENE_NAME: &str = "HNRNPH1";
const MAX_SCATTER_PLOTS: usize = 12;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting the {} RNA-map analysis", GENE_NAME);

    let config = RunConfig::load_or_default(Path::new("config.json"));
    create_dir_all(&config.output_dir)?;
    create_dir_all(&config.figures_dir)?;

    // Initialize dataset loaders
    let annotations = EventAnnotations {
        path: config.events_path.clone(),
    };
    let tracks = CrosslinkTracks {
        plus_path: config.crosslinks_plus_path.clone(),
        minus_path: config.crosslinks_minus_path.clone(),
    };

    let events = annotations.load_events()?;
    let track = tracks.load_track()?;

    let map_config = RnaMapConfig {
        bin_size: config.bin_size,
        quantile_cutpoints: config.quantile_cutpoints.clone(),
        seed: config.seed,
    };

    for (category, group) in [
        (RegulationCategory::Enhanced, &events.enhanced),
        (RegulationCategory::Repressed, &events.repressed),
    ] {
        if group.is_empty() {
            warn!("No {} events, skipping", category.name());
            continue;
        }

        let profiles = assemble_rna_maps(
            group,
            &events.control_pool,
            &events.psi,
            &track,
            category,
            &map_config,
        )?;

        for profile in &profiles {
            write_profile_outputs(profile, &config)?;
        }
    }

    // TCGA arm: runs only when the cohort tables are present.
    if Path::new(&config.tcga_psi_path).exists() && Path::new(&config.tcga_expression_path).exists()
    {
        let tcga = TcgaTables {
            psi_path: config.tcga_psi_path.clone(),
            expression_path: config.tcga_expression_path.clone(),
        };
        let cohort = tcga.load()?;

        let mut results = correlate_expression_psi(&cohort, GENE_NAME)?;
        dataframe_to_csv(
            &mut results,
            &format!("{}/tcga_correlations.csv", config.output_dir),
            true,
        )?;
        plot_top_correlations(
            &cohort,
            &results,
            GENE_NAME,
            &config.figures_dir,
            MAX_SCATTER_PLOTS,
        )?;
    } else {
        info!("TCGA tables not found, skipping the correlation analysis");
    }

    info!("Done");
    Ok(())
}

fn write_profile_outputs(profile: &RnaMapProfile, config: &RunConfig) -> anyhow::Result<()> {
    let stem = format!("{}_{}", profile.category.name(), profile.boundary.label());

    // per-position means, 1-based positions
    let positions: Vec<i64> = (1..=profile.mean_treatment.len() as i64).collect();
    let mut means = DataFrame::new(vec![
        Column::from(Series::new(PlSmallStr::from("position"), positions)),
        Column::from(Series::new(
            PlSmallStr::from("mean_treatment"),
            profile.mean_treatment.clone(),
        )),
        Column::from(Series::new(
            PlSmallStr::from("mean_control"),
            profile.mean_control.clone(),
        )),
    ])?;
    dataframe_to_csv(
        &mut means,
        &format!("{}/rna_map_{}.csv", config.output_dir, stem),
        true,
    )?;

    let bins_path = format!("{}/significant_bins_{}.json", config.output_dir, stem);
    serde_json::to_writer_pretty(File::create(&bins_path)?, &profile.significant)?;
    info!(
        "{}: wrote {} significant bins to {}",
        stem,
        profile.significant.len(),
        bins_path
    );

    plot_rna_map(
        profile,
        &format!("{}/rna_map_{}.png", config.figures_dir, stem),
    )?;
    Ok(())
}
