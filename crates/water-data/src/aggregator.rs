//! Water consumption aggregation over daily, weekly and monthly windows.

use std::collections::BTreeMap;

use water_core::calculations::{
    comparisons, liters_for_messages, water_bottles, WATER_PER_QUERY_LITERS,
};
use water_core::models::{
    CanonicalMessage, DailyConsumption, ParsedConversation, PeriodConsumption, ViewMode,
    WaterConsumptionData,
};
use water_core::time_utils::{month_key, parse_day_key, week_start_key, TimezoneHandler};

// ── Public API ────────────────────────────────────────────────────────────────

/// Aggregate a parsed conversation using UTC calendar days.
pub fn aggregate_water_consumption(parsed: &ParsedConversation) -> WaterConsumptionData {
    WaterCalculator::default().calculate(parsed)
}

// ── WaterCalculator ───────────────────────────────────────────────────────────

/// Stateless calculator; the timezone only affects which day a message lands on.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterCalculator {
    timezone: TimezoneHandler,
}

impl WaterCalculator {
    /// Calculator that buckets days in the named IANA timezone.
    pub fn with_timezone(tz_name: &str) -> Self {
        Self {
            timezone: TimezoneHandler::new(tz_name),
        }
    }

    /// Derive totals, the daily series and everyday comparisons.
    pub fn calculate(&self, parsed: &ParsedConversation) -> WaterConsumptionData {
        let total_water_liters = liters_for_messages(parsed.total_messages);

        WaterConsumptionData {
            total_water_liters,
            total_messages: parsed.total_messages,
            days_active: parsed.date_range.days_active(),
            water_bottles: water_bottles(total_water_liters),
            daily_consumption: ConsumptionAggregator::aggregate_daily(
                &parsed.messages,
                &self.timezone,
            ),
            comparisons: comparisons(total_water_liters),
        }
    }
}

// ── ConsumptionAggregator ─────────────────────────────────────────────────────

/// Groups messages and daily rows into calendar periods.
pub struct ConsumptionAggregator;

impl ConsumptionAggregator {
    /// One row per calendar day that has messages, ascending by date.
    pub fn aggregate_daily(
        messages: &[CanonicalMessage],
        timezone: &TimezoneHandler,
    ) -> Vec<DailyConsumption> {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for message in messages {
            *counts.entry(timezone.day_key(message.timestamp())).or_default() += 1;
        }

        counts
            .into_iter()
            .map(|(date, messages)| DailyConsumption {
                date,
                water_liters: f64::from(messages) * WATER_PER_QUERY_LITERS,
                messages,
            })
            .collect()
    }

    /// Roll daily rows up into Sunday-started weeks.
    pub fn rollup_weekly(daily: &[DailyConsumption]) -> Vec<PeriodConsumption> {
        Self::rollup(daily, |date| week_start_key(date))
    }

    /// Roll daily rows up into calendar months.
    pub fn rollup_monthly(daily: &[DailyConsumption]) -> Vec<PeriodConsumption> {
        Self::rollup(daily, |date| month_key(date))
    }

    /// Rows for `view`; the daily view passes rows through unchanged.
    pub fn periods_for_view(daily: &[DailyConsumption], view: ViewMode) -> Vec<PeriodConsumption> {
        match view {
            ViewMode::Daily => daily
                .iter()
                .map(|d| PeriodConsumption {
                    period: d.date.clone(),
                    water_liters: d.water_liters,
                    messages: d.messages,
                    days: 1,
                })
                .collect(),
            ViewMode::Weekly => Self::rollup_weekly(daily),
            ViewMode::Monthly => Self::rollup_monthly(daily),
        }
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Generic roll-up driver.
    ///
    /// `key_fn` maps a calendar date to the period key; rows whose date does
    /// not parse are skipped.
    fn rollup(
        daily: &[DailyConsumption],
        key_fn: impl Fn(chrono::NaiveDate) -> String,
    ) -> Vec<PeriodConsumption> {
        let mut map: BTreeMap<String, PeriodConsumption> = BTreeMap::new();

        for day in daily {
            let Some(date) = parse_day_key(&day.date) else {
                continue;
            };
            let key = key_fn(date);
            let period = map.entry(key.clone()).or_insert_with(|| PeriodConsumption {
                period: key,
                water_liters: 0.0,
                messages: 0,
                days: 0,
            });
            period.water_liters += day.water_liters;
            period.messages += day.messages;
            period.days += 1;
        }

        map.into_values().collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use water_core::models::DateRange;
    use water_core::time_utils::datetime_to_epoch_seconds;

    fn make_message(ts_str: &str) -> CanonicalMessage {
        let ts = DateTime::parse_from_rfc3339(ts_str)
            .unwrap()
            .with_timezone(&Utc);
        CanonicalMessage {
            id: ts_str.to_string(),
            role: "user".to_string(),
            text: "hello".to_string(),
            timestamp_seconds: datetime_to_epoch_seconds(ts),
        }
    }

    fn parsed_from(messages: Vec<CanonicalMessage>, range: DateRange) -> ParsedConversation {
        ParsedConversation {
            total_messages: messages.len(),
            messages,
            date_range: range,
        }
    }

    fn range_of(messages: &[CanonicalMessage]) -> DateRange {
        let start = messages.iter().map(|m| m.timestamp()).min().unwrap();
        let end = messages.iter().map(|m| m.timestamp()).max().unwrap();
        DateRange { start, end }
    }

    fn daily(date: &str, messages: u32) -> DailyConsumption {
        DailyConsumption {
            date: date.to_string(),
            water_liters: f64::from(messages) * 0.5,
            messages,
        }
    }

    // ── aggregate_water_consumption ───────────────────────────────────────────

    #[test]
    fn test_fifty_messages_over_42_days() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::days(42);
        let messages: Vec<CanonicalMessage> = (0..50)
            .map(|i| {
                let ts = start + Duration::hours(i64::from(i) * 20);
                make_message(&ts.to_rfc3339())
            })
            .collect();
        let data = aggregate_water_consumption(&parsed_from(messages, DateRange { start, end }));

        assert_eq!(data.total_water_liters, 25.0);
        assert_eq!(data.total_messages, 50);
        assert_eq!(data.days_active, 42);
        assert_eq!(data.water_bottles, 50);
        assert!((data.comparisons.shower_minutes - 1.85).abs() < 0.005);
        assert_eq!(data.comparisons.coffee_cups, 167);
        assert_eq!(data.comparisons.car_washes, 0.625);
    }

    #[test]
    fn test_single_instant_is_one_day() {
        let messages = vec![make_message("2024-01-15T10:00:00Z")];
        let range = range_of(&messages);
        let data = aggregate_water_consumption(&parsed_from(messages, range));
        assert_eq!(data.days_active, 1);
        assert_eq!(data.water_bottles, 1);
        assert_eq!(data.daily_consumption, vec![daily("2024-01-15", 1)]);
    }

    #[test]
    fn test_daily_sum_matches_total_and_deterministic() {
        let messages = vec![
            make_message("2024-01-20T08:00:00Z"),
            make_message("2024-01-10T23:59:59Z"),
            make_message("2024-01-15T08:00:00Z"),
            make_message("2024-01-10T00:00:00Z"),
        ];
        let range = range_of(&messages);
        let parsed = parsed_from(messages, range);
        let first = aggregate_water_consumption(&parsed);
        let second = aggregate_water_consumption(&parsed);

        assert_eq!(first, second);
        let sum: u32 = first.daily_consumption.iter().map(|d| d.messages).sum();
        assert_eq!(sum as usize, first.total_messages);
        assert_eq!(first.total_water_liters, first.total_messages as f64 * 0.5);
        assert_eq!(first.days_active, 11);
    }

    // ── aggregate_daily ───────────────────────────────────────────────────────

    #[test]
    fn test_daily_groups_by_utc_date_sorted() {
        let messages = vec![
            make_message("2024-01-16T10:00:00Z"),
            make_message("2024-01-15T08:00:00Z"),
            make_message("2024-01-15T20:00:00Z"),
        ];
        let rows = ConsumptionAggregator::aggregate_daily(&messages, &TimezoneHandler::utc());
        assert_eq!(rows, vec![daily("2024-01-15", 2), daily("2024-01-16", 1)]);
    }

    #[test]
    fn test_daily_no_synthesized_gap_days() {
        let messages = vec![
            make_message("2024-01-01T10:00:00Z"),
            make_message("2024-01-05T10:00:00Z"),
        ];
        let rows = ConsumptionAggregator::aggregate_daily(&messages, &TimezoneHandler::utc());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_daily_in_named_timezone() {
        let messages = vec![make_message("2024-01-15T20:00:00Z")];
        let calc = WaterCalculator::with_timezone("Asia/Tokyo");
        let range = range_of(&messages);
        let data = calc.calculate(&parsed_from(messages, range));
        assert_eq!(data.daily_consumption[0].date, "2024-01-16");
    }

    // ── roll-ups ──────────────────────────────────────────────────────────────

    #[test]
    fn test_rollup_weekly_sunday_start() {
        // 2024-01-13 is a Saturday, 2024-01-14 a Sunday.
        let rows = vec![
            daily("2024-01-13", 1),
            daily("2024-01-14", 2),
            daily("2024-01-17", 3),
        ];
        let weeks = ConsumptionAggregator::rollup_weekly(&rows);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].period, "2024-01-07");
        assert_eq!(weeks[0].messages, 1);
        assert_eq!(weeks[1].period, "2024-01-14");
        assert_eq!(weeks[1].messages, 5);
        assert_eq!(weeks[1].days, 2);
        assert_eq!(weeks[1].water_liters, 2.5);
    }

    #[test]
    fn test_rollup_monthly() {
        let rows = vec![
            daily("2024-01-31", 1),
            daily("2024-02-01", 2),
            daily("2024-02-20", 2),
        ];
        let months = ConsumptionAggregator::rollup_monthly(&rows);
        let keys: Vec<&str> = months.iter().map(|m| m.period.as_str()).collect();
        assert_eq!(keys, vec!["2024-01", "2024-02"]);
        assert_eq!(months[1].messages, 4);
    }

    #[test]
    fn test_periods_for_daily_view_passthrough() {
        let rows = vec![daily("2024-01-13", 1), daily("2024-01-14", 2)];
        let periods = ConsumptionAggregator::periods_for_view(&rows, ViewMode::Daily);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1].period, "2024-01-14");
        assert_eq!(periods[1].days, 1);
    }
}
