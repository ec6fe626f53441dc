//! RNA-map figures: mean normalized crosslink signal around each splice-site
//! boundary, treatment vs matched control, with significant bins shaded.

use plotters::prelude::*;
use polars::prelude::*;
use tracing::info;

use crate::helper_functions::colour_for_category;
use crate::models::polars_err;
use crate::rna_map::assemble::RnaMapProfile;
use crate::rna_map::WINDOW_LEN;

pub fn plot_rna_map(profile: &RnaMapProfile, output_path: &str) -> PolarsResult<()> {
    let caption_font = ("sans-serif bold", 26);
    let axis_font = ("sans-serif", 22);
    let label_font = ("sans-serif bold", 18);

    let colour = colour_for_category(profile.category);
    let control_colour = RGBColor(130, 130, 130);

    let root = BitMapBackend::new(output_path, (900, 650)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| polars_err(Box::new(e)))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "{}: {} (n = {} vs {})",
                profile.category.name(),
                profile.boundary.label(),
                profile.n_treatment,
                profile.n_control
            ),
            caption_font,
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(50)
        .build_cartesian_2d(0i32..WINDOW_LEN as i32, 0.0..1.0)
        .map_err(|e| polars_err(Box::new(e)))?;

    chart
        .configure_mesh()
        .x_desc("Window position")
        .y_desc("Mean normalized crosslink signal")
        .axis_desc_style(axis_font)
        .label_style(label_font)
        .draw()
        .map_err(|e| polars_err(Box::new(e)))?;

    // shaded spans first so the signal lines draw on top of them
    chart
        .draw_series(profile.significant.iter().map(|bin| {
            Rectangle::new(
                [(bin.start as i32, 0.0), (bin.end as i32, 1.0)],
                colour.mix(0.15).filled(),
            )
        }))
        .map_err(|e| polars_err(Box::new(e)))?;

    // splice-site marker
    let site = profile.boundary.site_index() as i32;
    chart
        .draw_series(LineSeries::new(
            vec![(site, 0.0), (site, 1.0)],
            BLACK.mix(0.3).stroke_width(2),
        ))
        .map_err(|e| polars_err(Box::new(e)))?;

    chart
        .draw_series(LineSeries::new(
            series_points(&profile.mean_treatment),
            colour.stroke_width(3),
        ))
        .map_err(|e| polars_err(Box::new(e)))?
        .label(profile.category.name())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], colour.stroke_width(3)));

    chart
        .draw_series(LineSeries::new(
            series_points(&profile.mean_control),
            control_colour.stroke_width(3),
        ))
        .map_err(|e| polars_err(Box::new(e)))?
        .label("matched control")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 25, y)], control_colour.stroke_width(3))
        });

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(label_font)
        .legend_area_size(25)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(|e| polars_err(Box::new(e)))?;

    info!("RNA map saved to: {}", output_path);
    Ok(())
}

fn series_points(means: &[Option<f64>]) -> Vec<(i32, f64)> {
    means
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as i32, v)))
        .collect()
}
