use analytics::{MetricRow, MetricsEngine};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::Settings;
use core_types::CompoundingMode;
use renderer::OutputTarget;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The main entry point for the tearsheet report generator.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = configuration::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Report(args) => handle_report(args, settings, Source::Trades),
        Commands::Monthly(args) => handle_report(args, settings, Source::Periods),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Generates the published performance-page artifacts from a returns table.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to an explicit settings file (defaults to ./tearsheet.toml when
    /// present, built-in defaults otherwise).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the report from a trade-level returns export
    /// (Timestamp / Rebated_ROI / Rebated_Net_Profit / Symbol).
    Report(ReportArgs),
    /// Build the report from a plain monthly return table (Month / Return).
    /// Defaults to the multiplicative cumulative convention.
    Monthly(ReportArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// Source CSV; overrides the configured input path.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Compounding convention ("additive" or "multiplicative"); overrides
    /// the configured mode.
    #[arg(long)]
    mode: Option<CompoundingMode>,
}

/// Which table shape the loader should expect.
enum Source {
    Trades,
    Periods,
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

/// Handles the orchestration of one report run: load, compute, print, render.
fn handle_report(args: ReportArgs, settings: Settings, source: Source) -> anyhow::Result<()> {
    let input = args
        .input
        .unwrap_or_else(|| settings.input.returns_csv.clone());
    // Precedence: CLI flag, then the settings file; the monthly table shape
    // compounds period over period unless told otherwise.
    let mode = args.mode.unwrap_or(match source {
        Source::Trades => settings.engine.compounding,
        Source::Periods => CompoundingMode::Multiplicative,
    });

    let observations = match source {
        Source::Trades => loader::load_trade_returns(&input)?,
        Source::Periods => loader::load_period_returns(&input)?,
    };

    info!(count = observations.len(), %mode, "computing performance metrics");
    let bundle = MetricsEngine::new().calculate(&observations, mode)?;

    print_metrics_table(&bundle.table);

    let target = OutputTarget {
        data_dir: settings.output.data_dir.clone(),
        assets_dir: settings.output.assets_dir.clone(),
        chart_width: settings.chart.width,
        chart_height: settings.chart.height,
    };
    renderer::render(&bundle, &target)?;

    info!("Generated quant artifacts");
    Ok(())
}

/// Echoes the formatted metrics table to the terminal.
fn print_metrics_table(rows: &[MetricRow]) {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value", "Note"]);
    for row in rows {
        table.add_row(vec![&row.label, &row.value, &row.note]);
    }
    println!("{table}");
}
