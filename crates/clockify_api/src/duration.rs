//! Decoding of the heterogeneous duration encodings used by Clockify.

use crate::models::DurationValue;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Converts a wire duration into fractional hours. Returns `None` for
/// unparseable text so callers can apply the zero-hours fallback policy.
pub fn hours_from_value(value: &DurationValue) -> Option<f64> {
    match value {
        DurationValue::Seconds(seconds) => Some(seconds / SECONDS_PER_HOUR),
        DurationValue::Text(text) => parse_iso_period(text).map(|s| s / SECONDS_PER_HOUR),
    }
}

/// Parses an ISO-8601 time period of the "PT#H#M#S" family into seconds.
/// Hours and minutes are integers, seconds may carry a fractional part.
/// Date components (years/months/days) are not produced by Clockify and are
/// rejected.
pub fn parse_iso_period(text: &str) -> Option<f64> {
    let rest = text.strip_prefix("PT")?;
    if rest.is_empty() {
        return None;
    }

    let mut seconds = 0.0;
    let mut number = String::new();
    for ch in rest.chars() {
        match ch {
            '0'..='9' | '.' => number.push(ch),
            'H' => {
                let hours: u64 = number.parse().ok()?;
                seconds += hours as f64 * 3600.0;
                number.clear();
            }
            'M' => {
                let minutes: u64 = number.parse().ok()?;
                seconds += minutes as f64 * 60.0;
                number.clear();
            }
            'S' => {
                let secs: f64 = number.parse().ok()?;
                seconds += secs;
                number.clear();
            }
            _ => return None,
        }
    }
    if !number.is_empty() {
        // Trailing digits without a unit designator.
        return None;
    }
    Some(seconds)
}
