use std::path::PathBuf;

use crate::aggregate::monthly_mean_diff;
use crate::chart::render_chart;
use crate::config::Config;
use crate::error::AppError;
use crate::loader::load_price_records;
use crate::transform::derive_records;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub months: usize,
    pub output: PathBuf,
}

/// Load, derive, aggregate and render in one pass. Stops at the first error;
/// nothing is written unless every earlier stage succeeded.
pub fn run(config: &Config) -> Result<RunSummary, AppError> {
    config
        .validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;

    let raw = load_price_records(&config.data.input_path, &config.data)?;
    let derived = derive_records(&raw);
    let series = monthly_mean_diff(&derived);
    let output = render_chart(&series, &config.chart)?;

    Ok(RunSummary {
        rows: raw.len(),
        months: series.len(),
        output,
    })
}
