//! The fetch → normalize → aggregate run behind one dashboard.

use crate::analysis::{compute_insights, Normalizer};
use crate::config::{Config, DashboardConfig};
use crate::error::PipelineError;
use crate::models::{RecordTable, Report, ReportMetadata};
use crate::source::{load, DataSource, Fetcher};
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Load `source` and compute the report.
pub async fn run(
    config: &Config,
    source: &DataSource,
    fetcher: &Fetcher,
) -> Result<Report, PipelineError> {
    let started = Instant::now();

    let table = load(source, fetcher).await?;
    build_report(table, config, &source.to_string(), started)
}

/// Normalize and aggregate an already-loaded table.
pub fn build_report(
    mut table: RecordTable,
    config: &Config,
    source: &str,
    started: Instant,
) -> Result<Report, PipelineError> {
    if table.is_empty() {
        return Err(PipelineError::EmptyResult);
    }

    let normalizer = Normalizer::new(&config.normalize.pattern)?;
    match normalizer.apply(&mut table, &config.columns.college) {
        Some(changed) => debug!(
            "Normalized {} '{}' values",
            changed, config.columns.college
        ),
        None => debug!(
            "Column '{}' absent, nothing to normalize",
            config.columns.college
        ),
    }

    check_settings(&config.dashboard)?;
    let insights = compute_insights(&table, &config.columns, &config.dashboard);

    let metadata = ReportMetadata {
        source: source.to_string(),
        generated_at: Utc::now(),
        rows: table.len(),
        columns: table.columns().to_vec(),
        duration_seconds: started.elapsed().as_secs_f64(),
    };
    info!(
        "Computed dashboard for {} rows in {:.2}s",
        metadata.rows, metadata.duration_seconds
    );

    Ok(Report { metadata, insights })
}

/// Settings the aggregates cannot work with.
fn check_settings(dashboard: &DashboardConfig) -> Result<(), PipelineError> {
    if dashboard.histogram_bins == 0 {
        return Err(PipelineError::InvalidSetting(
            "histogram_bins must be at least 1".to_string(),
        ));
    }
    if dashboard.top_courses == 0 || dashboard.top_colleges == 0 {
        return Err(PipelineError::InvalidSetting(
            "top_courses and top_colleges must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Write rendered output to `path`.
pub fn write_output(path: &Path, content: &str) -> Result<(), PipelineError> {
    std::fs::write(path, content).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}
