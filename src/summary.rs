//! Plain-text health summary sent to the language model.
//!
//! The summary is the only artifact derived from the user's records that
//! leaves the service: averages over the batch followed by a per-day listing.

use std::fmt::Write;

use crate::DailyHealthRecord;

/// Summary text used when the batch is empty.
pub const EMPTY_SUMMARY: &str = "No health data available.";

/// Averages across a batch of daily records.
///
/// Steps, active minutes, heart rate and calories are whole numbers; sleep and
/// distance keep one decimal place. Halves round up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub steps: f64,
    pub active_minutes: f64,
    pub sleep_hours: f64,
    pub heart_rate: f64,
    pub calories: f64,
    pub distance: f64,
}

impl Averages {
    /// Returns `None` for an empty batch.
    pub fn of(records: &[DailyHealthRecord]) -> Option<Self> {
        // ---
        if records.is_empty() {
            return None;
        }
        fn mean(records: &[DailyHealthRecord], field: impl Fn(&DailyHealthRecord) -> f64) -> f64 {
            records.iter().map(field).sum::<f64>() / records.len() as f64
        }

        Some(Self {
            steps: round_half_up(mean(records, |r| r.steps)),
            active_minutes: round_half_up(mean(records, |r| r.active_minutes)),
            sleep_hours: round_tenths(mean(records, |r| r.sleep_hours)),
            heart_rate: round_half_up(mean(records, |r| r.heart_rate.avg)),
            calories: round_half_up(mean(records, |r| r.calories)),
            distance: round_tenths(mean(records, |r| r.distance)),
        })
    }
}

/// Render the fixed-format summary block for a batch of records.
pub fn build_health_summary(records: &[DailyHealthRecord]) -> String {
    // ---
    let Some(avg) = Averages::of(records) else {
        return EMPTY_SUMMARY.to_string();
    };

    let days = records.len();
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "Health Data Summary ({} day{}):",
        days,
        if days > 1 { "s" } else { "" }
    );
    let _ = writeln!(out, "- Average Daily Steps: {} steps", format_grouped(avg.steps));
    let _ = writeln!(out, "- Average Active Minutes: {} minutes", avg.active_minutes);
    let _ = writeln!(out, "- Average Sleep Duration: {} hours", avg.sleep_hours);
    let _ = writeln!(out, "- Average Heart Rate: {} BPM", avg.heart_rate);
    let _ = writeln!(out, "- Average Calories Burned: {} kcal", format_grouped(avg.calories));
    let _ = writeln!(out, "- Average Distance: {} km", avg.distance);
    out.push_str("\nDaily Breakdown:");

    for r in records {
        let _ = write!(
            out,
            "\n- {}: {} steps, {} active min, {}h sleep, {} avg BPM",
            r.date,
            format_grouped(r.steps),
            r.active_minutes,
            r.sleep_hours,
            r.heart_rate.avg
        );
    }

    out
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn round_tenths(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Format with comma thousands separators and at most three decimals.
fn format_grouped(value: f64) -> String {
    // ---
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
