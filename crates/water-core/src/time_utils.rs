use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

// ── Epoch conversion ──────────────────────────────────────────────────────────

/// Convert fractional Unix epoch seconds into a UTC [`DateTime`].
///
/// Returns `None` for non-finite values and instants chrono cannot represent.
pub fn epoch_seconds_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = ((secs - whole) * 1_000_000_000.0).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Convert a UTC [`DateTime`] into fractional Unix epoch seconds.
pub fn datetime_to_epoch_seconds(dt: DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1_000_000_000.0
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Maps instants onto calendar periods in a fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    tz: Tz,
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self::utc()
    }
}

impl TimezoneHandler {
    /// Handler that buckets by UTC calendar date.
    pub fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    /// Create a handler for the given IANA timezone name.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// The configured timezone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Calendar date of `dt` in this handler's timezone.
    pub fn local_date(&self, dt: DateTime<Utc>) -> NaiveDate {
        dt.with_timezone(&self.tz).date_naive()
    }

    /// Day key `"%Y-%m-%d"` for `dt`.
    pub fn day_key(&self, dt: DateTime<Utc>) -> String {
        self.local_date(dt).format("%Y-%m-%d").to_string()
    }
}

// ── Period keys over day keys ─────────────────────────────────────────────────

/// Parse a `"%Y-%m-%d"` day key.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Key of the Sunday-started week containing `date`, as `"%Y-%m-%d"`.
pub fn week_start_key(date: NaiveDate) -> String {
    let offset = i64::from(date.weekday().num_days_from_sunday());
    (date - Duration::days(offset)).format("%Y-%m-%d").to_string()
}

/// Month key `"%Y-%m"` of `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_epoch_seconds_round_trip_whole() {
        let dt = epoch_seconds_to_datetime(1_700_000_000.0).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap());
        assert_eq!(datetime_to_epoch_seconds(dt), 1_700_000_000.0);
    }

    #[test]
    fn test_epoch_seconds_negative_fraction() {
        let dt = epoch_seconds_to_datetime(-0.25).unwrap();
        assert_eq!(dt.timestamp(), -1);
        assert_eq!(dt.timestamp_subsec_millis(), 750);
    }

    #[test]
    fn test_epoch_seconds_out_of_range() {
        assert!(epoch_seconds_to_datetime(f64::NAN).is_none());
        assert!(epoch_seconds_to_datetime(1e300).is_none());
    }

    #[test]
    fn test_day_key_utc() {
        let handler = TimezoneHandler::utc();
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap();
        assert_eq!(handler.day_key(dt), "2024-01-15");
    }

    #[test]
    fn test_day_key_named_timezone_shifts_date() {
        let handler = TimezoneHandler::new("Asia/Tokyo");
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap();
        assert_eq!(handler.day_key(dt), "2024-01-16");
    }

    #[test]
    fn test_invalid_timezone_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Not/AZone");
        assert_eq!(handler.tz(), Tz::UTC);
        assert!(!TimezoneHandler::validate_timezone("Not/AZone"));
        assert!(TimezoneHandler::validate_timezone("Europe/Berlin"));
    }

    #[test]
    fn test_week_start_key_is_sunday() {
        // 2024-01-17 is a Wednesday.
        let date = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();
        assert_eq!(week_start_key(date), "2024-01-14");
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 14).unwrap();
        assert_eq!(week_start_key(sunday), "2024-01-14");
    }

    #[test]
    fn test_month_key() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(month_key(date), "2024-02");
        assert_eq!(parse_day_key("2024-02-29"), Some(date));
        assert!(parse_day_key("not-a-date").is_none());
    }
}
