use polars::prelude::*;
use tracing::info;

use crate::helper_functions::read_csv;
use crate::models::Dataset;

/// TCGA cohort tables: per-sample event inclusion (`sample`, `event_id`,
/// `category`, `psi`) and per-sample gene expression (`sample`,
/// `expression`). `load` joins them into one long frame, one row per
/// (sample, event) pair.
pub struct TcgaTables {
    pub psi_path: String,
    pub expression_path: String,
}

impl Dataset for TcgaTables {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading TCGA inclusion table from {}", self.psi_path);
        let psi = read_csv(&self.psi_path)?;
        info!("Reading TCGA expression table from {}", self.expression_path);
        let expression = read_csv(&self.expression_path)?;

        let joined = psi.join(
            &expression,
            ["sample"],
            ["sample"],
            JoinArgs::new(JoinType::Inner),
            None,
        )?;
        info!(
            "TCGA cohort: {} (sample, event) observations",
            joined.height()
        );
        Ok(joined)
    }
}
