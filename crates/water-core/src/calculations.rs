//! Fixed physical ratios and the conversions derived from them.

use chrono::{DateTime, Utc};

use crate::models::Comparisons;

/// Estimated litres of water consumed per assistant query.
pub const WATER_PER_QUERY_LITERS: f64 = 0.5;
/// Size of one water bottle in millilitres.
pub const WATER_BOTTLE_ML: f64 = 500.0;
/// Shower flow rate in litres per minute.
pub const SHOWER_LITERS_PER_MINUTE: f64 = 13.5;
/// Size of one cup of coffee in millilitres.
pub const COFFEE_ML_PER_CUP: f64 = 150.0;
/// Water used by one car wash in litres.
pub const CAR_WASH_LITERS: f64 = 40.0;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Total litres for `messages` queries.
pub fn liters_for_messages(messages: usize) -> f64 {
    messages as f64 * WATER_PER_QUERY_LITERS
}

/// Number of 500 mL bottles needed to hold `liters`, rounded up.
pub fn water_bottles(liters: f64) -> u64 {
    ((liters * 1000.0) / WATER_BOTTLE_ML).ceil() as u64
}

/// Everyday equivalents of `liters`.
pub fn comparisons(liters: f64) -> Comparisons {
    Comparisons {
        shower_minutes: liters / SHOWER_LITERS_PER_MINUTE,
        coffee_cups: ((liters * 1000.0) / COFFEE_ML_PER_CUP).ceil() as u64,
        car_washes: liters / CAR_WASH_LITERS,
    }
}

/// Span between `start` and `end` in days, rounded up, minimum one.
///
/// Computed at millisecond precision so that a range one millisecond past a
/// whole day counts as the next day.
pub fn days_active(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let millis = (end - start).num_milliseconds() as f64;
    let days = (millis / MILLIS_PER_DAY).ceil();
    if days < 1.0 {
        1
    } else {
        days as u32
    }
}
