mod bootstrap;

use anyhow::Result;
use water_core::formatting::{render_csv, render_report, render_summary};
use water_core::models::OutputFormat;
use water_core::settings::Settings;
use water_data::aggregator::ConsumptionAggregator;
use water_data::analysis::{analyze_export, AnalysisResult};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Water Impact v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, Format: {}, View: {}, Timezone: {}",
        settings.input.display(),
        settings.format,
        settings.view,
        settings.timezone
    );

    let analysis = match analyze_export(&settings.input, &settings.timezone) {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::error!("Analysis failed: {}", e);
            eprintln!("Error: {e}");
            if let Some(hint) = e.hint() {
                eprintln!("{hint}");
            }
            std::process::exit(1);
        }
    };

    tracing::debug!(
        "Loaded in {:.3}s, parsed in {:.3}s",
        analysis.metadata.load_time_seconds,
        analysis.metadata.parse_time_seconds
    );

    println!("{}", render(&settings, &analysis)?);
    Ok(())
}

/// Render the analysis in the format chosen on the command line.
fn render(settings: &Settings, analysis: &AnalysisResult) -> Result<String> {
    let data = &analysis.data;
    let output = match settings.output_format() {
        OutputFormat::Summary => {
            let view = settings.view_mode();
            let periods = ConsumptionAggregator::periods_for_view(&data.daily_consumption, view);
            render_summary(data, view, &periods)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::Csv => render_csv(data),
        OutputFormat::Report => render_report(data),
    };
    Ok(output)
}
