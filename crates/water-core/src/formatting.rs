//! Plain-text renderings of [`WaterConsumptionData`]: CSV, report and summary.

use std::fmt::Write as _;

use crate::models::{PeriodConsumption, ViewMode, WaterConsumptionData};

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use water_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by one ULP at the target precision so exact midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        // `frac_str` starts with "0.", e.g. "0.50".
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a litre amount with one decimal place, e.g. `"25.0L"`.
pub fn format_liters(liters: f64) -> String {
    format!("{}L", format_number(liters, 1))
}

/// Render the daily series as CSV: `Date,Water Liters,Messages`.
pub fn render_csv(data: &WaterConsumptionData) -> String {
    let mut rows = vec!["Date,Water Liters,Messages".to_string()];
    rows.extend(
        data.daily_consumption
            .iter()
            .map(|d| format!("{},{},{}", d.date, d.water_liters, d.messages)),
    );
    rows.join("\n")
}

/// Render the full plain-text impact report.
pub fn render_report(data: &WaterConsumptionData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "AI Chat Water Impact Analysis Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(
        out,
        "- Total Water Consumed: {:.1} liters",
        data.total_water_liters
    );
    let _ = writeln!(
        out,
        "- Total Messages: {}",
        format_number(data.total_messages as f64, 0)
    );
    let _ = writeln!(out, "- Days Active: {}", data.days_active);
    let _ = writeln!(out, "- Equivalent Water Bottles: {}", data.water_bottles);
    let _ = writeln!(out);
    let _ = writeln!(out, "Environmental Comparisons:");
    let _ = writeln!(
        out,
        "- Shower Time: {:.1} minutes",
        data.comparisons.shower_minutes
    );
    let _ = writeln!(
        out,
        "- Cups of Coffee: {}",
        format_number(data.comparisons.coffee_cups as f64, 0)
    );
    let _ = writeln!(out, "- Car Wash Cycles: {:.1}", data.comparisons.car_washes);
    let _ = writeln!(out);
    let _ = writeln!(out, "Daily Consumption:");
    for day in &data.daily_consumption {
        let _ = writeln!(
            out,
            "{}: {:.1}L ({} messages)",
            day.date, day.water_liters, day.messages
        );
    }
    out.trim_end().to_string()
}

/// Render a short terminal summary followed by the chosen period table.
pub fn render_summary(
    data: &WaterConsumptionData,
    view: ViewMode,
    periods: &[PeriodConsumption],
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Water consumed:  {}",
        format_liters(data.total_water_liters)
    );
    let _ = writeln!(
        out,
        "Messages:        {}",
        format_number(data.total_messages as f64, 0)
    );
    let _ = writeln!(out, "Days active:     {}", data.days_active);
    let _ = writeln!(out, "Water bottles:   {}", data.water_bottles);
    let _ = writeln!(
        out,
        "Equivalent to {:.1} min of showering, {} cups of coffee, {:.1} car washes",
        data.comparisons.shower_minutes,
        format_number(data.comparisons.coffee_cups as f64, 0),
        data.comparisons.car_washes
    );
    let _ = writeln!(out);

    let label = match view {
        ViewMode::Daily => "Day",
        ViewMode::Weekly => "Week of",
        ViewMode::Monthly => "Month",
    };
    let _ = writeln!(out, "{:<12} {:>10} {:>10}", label, "Liters", "Messages");
    for period in periods {
        let _ = writeln!(
            out,
            "{:<12} {:>10} {:>10}",
            period.period,
            format_number(period.water_liters, 1),
            period.messages
        );
    }
    out.trim_end().to_string()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let remainder = s.len() % 3;
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
