use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

/// Run parameters, read from an optional `config.json` next to the data;
/// anything not set there falls back to the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub events_path: String,
    pub crosslinks_plus_path: String,
    pub crosslinks_minus_path: String,
    pub tcga_psi_path: String,
    pub tcga_expression_path: String,
    pub output_dir: String,
    pub figures_dir: String,
    pub seed: u64,
    pub bin_size: usize,
    pub quantile_cutpoints: Vec<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            events_path: "./data/regulated_events.csv".to_string(),
            crosslinks_plus_path: "./data/iclip/crosslinks_plus.bedgraph".to_string(),
            crosslinks_minus_path: "./data/iclip/crosslinks_minus.bedgraph".to_string(),
            tcga_psi_path: "./data/tcga/event_psi.csv".to_string(),
            tcga_expression_path: "./data/tcga/hnrnph1_expression.csv".to_string(),
            output_dir: "./results".to_string(),
            figures_dir: "./figures".to_string(),
            seed: 42,
            bin_size: 10,
            quantile_cutpoints: vec![0.0, 0.25, 0.5, 0.75, 1.0],
        }
    }
}

impl RunConfig {
    pub fn load_or_default(path: &Path) -> RunConfig {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    info!("Loaded run configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!(
                        "Could not parse {}: {}; using default configuration",
                        path.display(),
                        e
                    );
                    RunConfig::default()
                }
            },
            Err(_) => RunConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{"seed": 7, "bin_size": 20}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.bin_size, 20);
        assert_eq!(config.output_dir, "./results");
        assert_eq!(config.quantile_cutpoints.len(), 5);
    }
}
