use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalised conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMessage {
    /// Source identifier, or `"msg-<index>"` when the export carried none.
    pub id: String,
    /// Author role, e.g. `"user"` or `"assistant"`.
    pub role: String,
    /// Message text; always contains at least one non-whitespace character.
    pub text: String,
    /// Unix epoch seconds (fractional).
    pub timestamp_seconds: f64,
}

impl CanonicalMessage {
    /// The message timestamp as a UTC instant.
    ///
    /// Timestamps outside chrono's representable range map to the epoch.
    pub fn timestamp(&self) -> DateTime<Utc> {
        crate::time_utils::epoch_seconds_to_datetime(self.timestamp_seconds)
            .unwrap_or_default()
    }
}

/// Earliest and latest message instants of a conversation export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Whole-day span, rounded up and never below one.
    pub fn days_active(&self) -> u32 {
        crate::calculations::days_active(self.start, self.end)
    }
}

/// Output of the conversation normaliser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConversation {
    /// Messages in source encounter order.
    pub messages: Vec<CanonicalMessage>,
    /// Always equal to `messages.len()` and at least one.
    pub total_messages: usize,
    pub date_range: DateRange,
}

/// Water usage attributed to one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyConsumption {
    /// Calendar day, `"%Y-%m-%d"`.
    pub date: String,
    pub water_liters: f64,
    pub messages: u32,
}

/// Water usage rolled up over a week or a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodConsumption {
    /// Period key: week start `"%Y-%m-%d"` or month `"%Y-%m"`.
    pub period: String,
    pub water_liters: f64,
    pub messages: u32,
    /// Number of active days that fell into the period.
    pub days: u32,
}

/// Everyday equivalents of the total water figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparisons {
    pub shower_minutes: f64,
    pub coffee_cups: u64,
    pub car_washes: f64,
}

/// Output of the consumption aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterConsumptionData {
    pub total_water_liters: f64,
    pub total_messages: usize,
    pub days_active: u32,
    pub water_bottles: u64,
    /// One row per day with activity, ascending by date.
    pub daily_consumption: Vec<DailyConsumption>,
    pub comparisons: Comparisons,
}

/// Period granularity used when presenting the time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Daily,
    Weekly,
    Monthly,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(ViewMode::Daily),
            "weekly" => Ok(ViewMode::Weekly),
            "monthly" => Ok(ViewMode::Monthly),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

/// Output format of the command-line report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Summary,
    Json,
    Csv,
    Report,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(OutputFormat::Summary),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "report" => Ok(OutputFormat::Report),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(ts: f64) -> CanonicalMessage {
        CanonicalMessage {
            id: "m".to_string(),
            role: "user".to_string(),
            text: "hello".to_string(),
            timestamp_seconds: ts,
        }
    }

    #[test]
    fn test_message_timestamp_conversion() {
        let msg = message(1_700_000_000.5);
        let ts = msg.timestamp();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_date_range_days_active_same_instant() {
        let t = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let range = DateRange { start: t, end: t };
        assert_eq!(range.days_active(), 1);
    }

    #[test]
    fn test_water_data_serializes_camel_case() {
        let data = WaterConsumptionData {
            total_water_liters: 1.0,
            total_messages: 2,
            days_active: 1,
            water_bottles: 2,
            daily_consumption: vec![DailyConsumption {
                date: "2024-01-15".to_string(),
                water_liters: 1.0,
                messages: 2,
            }],
            comparisons: Comparisons {
                shower_minutes: 0.1,
                coffee_cups: 7,
                car_washes: 0.025,
            },
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["totalWaterLiters"], 1.0);
        assert_eq!(json["dailyConsumption"][0]["waterLiters"], 1.0);
        assert_eq!(json["comparisons"]["coffeeCups"], 7);
    }

    #[test]
    fn test_view_mode_from_str() {
        assert_eq!("Weekly".parse::<ViewMode>(), Ok(ViewMode::Weekly));
        assert!("hourly".parse::<ViewMode>().is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
