//! TCGA cohort analysis: Spearman correlation between HNRNPH1 expression and
//! event inclusion across tumor samples, with FDR correction, plus
//! scatterplots for the strongest associations.

use std::collections::HashMap;

use plotters::prelude::*;
use polars::prelude::*;
use tracing::{info, warn};

use crate::helper_functions::colour_for_category;
use crate::models::{polars_err, RegulationCategory};
use crate::stats::{benjamini_hochberg, spearman};

/// FDR threshold for flagging a correlation as significant.
pub const CORRELATION_FDR: f64 = 0.05;

struct EventObservations {
    category: String,
    /// (expression, psi) per sample
    points: Vec<(f64, f64)>,
}

/// Per-event correlation of expression vs inclusion over the joined cohort
/// frame (`sample`, `event_id`, `category`, `psi`, `expression`). Returns a
/// frame with one row per testable event:
/// gene, event_id, category, rho, p_value, adj_p, significant.
pub fn correlate_expression_psi(df: &DataFrame, gene: &str) -> PolarsResult<DataFrame> {
    let (order, observations) = observations_by_event(df)?;

    let mut event_ids = Vec::new();
    let mut categories = Vec::new();
    let mut rhos = Vec::new();
    let mut p_values = Vec::new();

    for id in &order {
        let obs = &observations[id];
        let expr: Vec<f64> = obs.points.iter().map(|(e, _)| *e).collect();
        let psi: Vec<f64> = obs.points.iter().map(|(_, p)| *p).collect();
        match spearman(&expr, &psi) {
            Some((rho, p)) => {
                event_ids.push(id.clone());
                categories.push(obs.category.clone());
                rhos.push(rho);
                p_values.push(p);
            }
            None => warn!(
                "event {}: {} observations, correlation undefined, dropped",
                id,
                obs.points.len()
            ),
        }
    }

    let adjusted = benjamini_hochberg(&p_values);
    let significant: Vec<bool> = adjusted.iter().map(|&q| q <= CORRELATION_FDR).collect();
    info!(
        "TCGA: {} of {} events significant at FDR {}",
        significant.iter().filter(|&&s| s).count(),
        event_ids.len(),
        CORRELATION_FDR
    );

    let genes = vec![gene.to_string(); event_ids.len()];
    DataFrame::new(vec![
        Column::from(Series::new(PlSmallStr::from("gene"), genes)),
        Column::from(Series::new(PlSmallStr::from("event_id"), event_ids)),
        Column::from(Series::new(PlSmallStr::from("category"), categories)),
        Column::from(Series::new(PlSmallStr::from("rho"), rhos)),
        Column::from(Series::new(PlSmallStr::from("p_value"), p_values)),
        Column::from(Series::new(PlSmallStr::from("adj_p"), adjusted)),
        Column::from(Series::new(PlSmallStr::from("significant"), significant)),
    ])
}

/// Scatterplot every significant event, strongest |rho| first, up to
/// `max_plots` figures.
pub fn plot_top_correlations(
    df: &DataFrame,
    results: &DataFrame,
    gene: &str,
    figures_dir: &str,
    max_plots: usize,
) -> PolarsResult<()> {
    let (_, observations) = observations_by_event(df)?;

    let event_ids = results.column("event_id")?.str()?;
    let rhos = results.column("rho")?.f64()?;
    let adjusted = results.column("adj_p")?.f64()?;
    let flags = results.column("significant")?.bool()?;

    let mut hits: Vec<(&str, f64, f64)> = Vec::new();
    for i in 0..results.height() {
        if let (Some(id), Some(rho), Some(adj_p), Some(true)) =
            (event_ids.get(i), rhos.get(i), adjusted.get(i), flags.get(i))
        {
            hits.push((id, rho, adj_p));
        }
    }
    hits.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

    for (id, rho, adj_p) in hits.into_iter().take(max_plots) {
        let Some(obs) = observations.get(id) else {
            continue;
        };
        let path = format!("{}/correlation_{}.png", figures_dir, id);
        plot_scatter(obs, id, gene, rho, adj_p, &path)?;
    }
    Ok(())
}

fn observations_by_event(
    df: &DataFrame,
) -> PolarsResult<(Vec<String>, HashMap<String, EventObservations>)> {
    let event_ids = df.column("event_id")?.str()?;
    let categories = df.column("category")?.str()?;
    let psis = df.column("psi")?.f64()?;
    let expressions = df.column("expression")?.f64()?;

    let mut order = Vec::new();
    let mut observations: HashMap<String, EventObservations> = HashMap::new();
    for i in 0..df.height() {
        if let (Some(id), Some(psi), Some(expression)) =
            (event_ids.get(i), psis.get(i), expressions.get(i))
        {
            let entry = observations
                .entry(id.to_string())
                .or_insert_with(|| {
                    order.push(id.to_string());
                    EventObservations {
                        category: categories.get(i).unwrap_or("non-regulated").to_string(),
                        points: Vec::new(),
                    }
                });
            entry.points.push((expression, psi));
        }
    }
    Ok((order, observations))
}

fn plot_scatter(
    obs: &EventObservations,
    event_id: &str,
    gene: &str,
    rho: f64,
    adj_p: f64,
    output_path: &str,
) -> PolarsResult<()> {
    let x_min = obs.points.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
    let x_max = obs
        .points
        .iter()
        .map(|(x, _)| *x)
        .fold(f64::NEG_INFINITY, f64::max);
    let pad = (x_max - x_min).max(1e-9) * 0.05;

    let colour = RegulationCategory::from_label(&obs.category)
        .map(colour_for_category)
        .unwrap_or(RGBColor(0, 0, 0));

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| polars_err(Box::new(e)))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} vs {} (rho = {:.2}, q = {:.1e})", gene, event_id, rho, adj_p),
            ("sans-serif bold", 24),
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min - pad..x_max + pad, 0.0..1.0)
        .map_err(|e| polars_err(Box::new(e)))?;

    chart
        .configure_mesh()
        .x_desc(format!("{} expression", gene))
        .y_desc("PSI")
        .axis_desc_style(("sans-serif", 20))
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| polars_err(Box::new(e)))?;

    chart
        .draw_series(
            obs.points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, colour.mix(0.7).filled())),
        )
        .map_err(|e| polars_err(Box::new(e)))?;

    info!("Correlation scatter saved to: {}", output_path);
    Ok(())
}
