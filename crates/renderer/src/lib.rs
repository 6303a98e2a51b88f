//! # Report Renderer
//!
//! Persists the engine's three output structures (plus the run overview) to
//! their published formats and draws the cumulative-return chart. This crate
//! consumes the `ReportBundle` contract only and contains no statistical
//! logic of its own.
//!
//! Artifacts, matching the published performance page:
//!
//! - `<data_dir>/quant_metrics.json` — the formatted metrics table;
//! - `<data_dir>/quant_monthly.json` — month label + formatted percent;
//! - `<data_dir>/quant_overview.json` — the run summary;
//! - `<assets_dir>/returns.json` — the per-observation cumulative series;
//! - `<assets_dir>/cumulative.svg` — the cumulative-return line chart.

use analytics::ReportBundle;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod chart;
pub mod error;

pub use error::RenderError;

/// Destination descriptor for one render run: injected by the caller, never
/// read from process-wide state.
#[derive(Debug, Clone)]
pub struct OutputTarget {
    /// Directory for the JSON tables.
    pub data_dir: PathBuf,
    /// Directory for the series artifact and the chart.
    pub assets_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
}

/// One row of the persisted monthly table. The published page consumes a
/// pre-formatted percent string.
#[derive(Debug, Serialize)]
struct MonthlyArtifactRow<'a> {
    month: &'a str,
    #[serde(rename = "return")]
    value: String,
}

/// Writes every artifact for `bundle` under `target`, creating the output
/// directories if absent.
pub fn render(bundle: &ReportBundle, target: &OutputTarget) -> Result<(), RenderError> {
    fs::create_dir_all(&target.data_dir)?;
    fs::create_dir_all(&target.assets_dir)?;

    write_json(&target.data_dir.join("quant_metrics.json"), &bundle.table)?;

    let monthly: Vec<MonthlyArtifactRow<'_>> = bundle
        .monthly
        .iter()
        .map(|m| MonthlyArtifactRow {
            month: &m.month,
            value: format!("{:.2}%", m.value * 100.0),
        })
        .collect();
    write_json(&target.data_dir.join("quant_monthly.json"), &monthly)?;

    write_json(&target.data_dir.join("quant_overview.json"), &bundle.overview)?;
    write_json(&target.assets_dir.join("returns.json"), &bundle.series)?;

    let svg = chart::cumulative_chart(&bundle.series, target.chart_width, target.chart_height);
    fs::write(target.assets_dir.join("cumulative.svg"), svg)?;

    info!(
        data_dir = %target.data_dir.display(),
        assets_dir = %target.assets_dir.display(),
        "report artifacts written"
    );
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RenderError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
