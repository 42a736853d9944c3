//! Main analysis pipeline.
//!
//! Chains export loading, normalisation and aggregation, returning an
//! [`AnalysisResult`] ready for rendering.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use tracing::info;
use water_core::error::Result;
use water_core::models::{ParsedConversation, WaterConsumptionData};

use crate::aggregator::WaterCalculator;
use crate::normalizer::normalize_conversations;
use crate::reader::load_export_text;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Path of the analysed export, or `None` for in-memory text.
    pub source: Option<String>,
    /// Canonical messages that survived normalisation.
    pub messages_processed: usize,
    /// Distinct calendar days with at least one message.
    pub days_with_activity: usize,
    /// Wall-clock seconds spent reading and unpacking the export.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent normalising and aggregating.
    pub parse_time_seconds: f64,
}

/// The complete output of [`analyze_export`] / [`analyze_text`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub data: WaterConsumptionData,
    pub conversation: ParsedConversation,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Load the export at `path` and analyse it, grouping days in `timezone`.
pub fn analyze_export(path: &Path, timezone: &str) -> Result<AnalysisResult> {
    let load_start = Instant::now();
    let text = load_export_text(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let mut result = analyze_text(&text, timezone)?;
    result.metadata.source = Some(path.display().to_string());
    result.metadata.load_time_seconds = load_time;
    Ok(result)
}

/// Analyse conversation JSON already held in memory.
pub fn analyze_text(text: &str, timezone: &str) -> Result<AnalysisResult> {
    let parse_start = Instant::now();
    let conversation = normalize_conversations(text)?;
    let data = WaterCalculator::with_timezone(timezone).calculate(&conversation);
    let parse_time = parse_start.elapsed().as_secs_f64();

    info!(
        "Analysed {} messages across {} active days",
        conversation.total_messages,
        data.daily_consumption.len()
    );

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        source: None,
        messages_processed: conversation.total_messages,
        days_with_activity: data.daily_consumption.len(),
        load_time_seconds: 0.0,
        parse_time_seconds: parse_time,
    };

    Ok(AnalysisResult {
        data,
        conversation,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
