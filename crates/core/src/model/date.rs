use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A workout date as it arrives from a client or a stored document.
///
/// Older local stores wrote ISO-8601 strings while remote rows and native
/// clients hand over epoch milliseconds, sometimes with a fractional part.
/// All are accepted; any other JSON value is kept as `Other` and
/// normalizes to `None` rather than failing the enclosing document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkoutDate {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// Fractional milliseconds, truncated toward zero.
    Fractional(f64),
    /// ISO-8601 / RFC 3339 text.
    Text(String),
    Other(serde_json::Value),
}

impl WorkoutDate {
    #[must_use]
    pub fn normalize(&self) -> Option<DateTime<Utc>> {
        match self {
            WorkoutDate::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(*ms),
            WorkoutDate::Fractional(ms) if ms.is_finite() => {
                #[allow(clippy::cast_possible_truncation)]
                let whole = ms.trunc() as i64;
                DateTime::<Utc>::from_timestamp_millis(whole)
            }
            WorkoutDate::Fractional(_) | WorkoutDate::Other(_) => None,
            WorkoutDate::Text(raw) => parse_workout_date(raw),
        }
    }
}

impl From<DateTime<Utc>> for WorkoutDate {
    fn from(value: DateTime<Utc>) -> Self {
        WorkoutDate::Text(value.to_rfc3339())
    }
}

/// Parse a textual workout date.
///
/// Accepts RFC 3339 (with offset), a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken
/// as UTC, or a bare `YYYY-MM-DD` taken as midnight UTC.
#[must_use]
pub fn parse_workout_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
