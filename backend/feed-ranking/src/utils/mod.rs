// Utility functions for feed-ranking

use chrono::{DateTime, Utc};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Age in fractional hours, clamped at zero for timestamps in the future.
pub fn hours_since(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - then).num_milliseconds() as f64;
    (millis / MILLIS_PER_HOUR).max(0.0)
}

/// Exponential decay over a reference window: `exp(-(age / window) * rate)`.
///
/// Returns 1.0 at age 0 and approaches 0 without ever going negative.
pub fn exponential_decay(age_hours: f64, window_hours: f64, rate: f64) -> f64 {
    (-(age_hours.max(0.0) / window_hours) * rate).exp()
}

/// Split a free-text location into trimmed, lower-cased, non-empty parts.
///
/// "Brooklyn, New York , USA" -> ["brooklyn", "new york", "usa"]
pub fn location_parts(location: &str) -> Vec<String> {
    location
        .split(',')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

/// True when any part of one location contains any part of the other.
///
/// Empty comma segments are ignored, so "Paris, " does not overlap every location.
pub fn locations_overlap(a: &str, b: &str) -> bool {
    let a_parts = location_parts(a);
    let b_parts = location_parts(b);

    a_parts.iter().any(|a_part| {
        b_parts
            .iter()
            .any(|b_part| a_part.contains(b_part.as_str()) || b_part.contains(a_part.as_str()))
    })
}
