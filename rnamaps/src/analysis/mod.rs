pub mod correlation;
pub mod rna_map_plot;
