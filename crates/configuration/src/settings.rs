use core_types::CompoundingMode;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the report generator.
///
/// Every section has sensible defaults, so the application runs without a
/// settings file at all; the file and the CLI only override.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input: Input,
    pub output: Output,
    pub engine: Engine,
    pub chart: Chart,
}

/// Where the source return table lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Input {
    /// Path to the returns CSV export.
    pub returns_csv: PathBuf,
}

/// Destination descriptor for the rendered artifacts. The JSON tables and
/// the chart go to separate directories, mirroring how the published site
/// splits data files from assets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Output {
    /// Directory for the JSON tables (metrics, monthly, overview).
    pub data_dir: PathBuf,
    /// Directory for chart assets and the per-observation series.
    pub assets_dir: PathBuf,
}

/// Parameters for the metrics engine itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Engine {
    /// The cumulative-curve convention. Explicit, never inferred from data.
    pub compounding: CompoundingMode,
}

/// Pixel dimensions of the rendered cumulative chart.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Chart {
    pub width: u32,
    pub height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: Input::default(),
            output: Output::default(),
            engine: Engine::default(),
            chart: Chart::default(),
        }
    }
}

impl Default for Input {
    fn default() -> Self {
        Self {
            returns_csv: PathBuf::from("data/quant/returns.csv"),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("_data"),
            assets_dir: PathBuf::from("assets/quant"),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            compounding: CompoundingMode::Additive,
        }
    }
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            width: 1350,
            height: 720,
        }
    }
}
