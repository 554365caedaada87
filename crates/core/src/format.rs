use chrono::{DateTime, Utc};

const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Short label for how long ago `date` was, relative to `now`.
///
/// The day count is the absolute difference rounded up, so anything within
/// the last 24 hours reads as "Yesterday" and the exact same instant as
/// "0 days ago". Beyond a week the month and day are shown ("Jan 5").
#[must_use]
pub fn relative_day_label(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (now - date).num_milliseconds().unsigned_abs();
    let days = diff_ms.div_ceil(MILLIS_PER_DAY);
    match days {
        1 => "Yesterday".to_owned(),
        0..=7 => format!("{days} days ago"),
        _ => date.format("%b %-d").to_string(),
    }
}

/// Label for an optional date; undated entries read "Never".
#[must_use]
pub fn last_performed_label(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    date.map_or_else(|| "Never".to_owned(), |d| relative_day_label(d, now))
}

/// "1h 5m" for an hour or more, otherwise "45m".
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        format!("{hours}h {rest}m")
    } else {
        format!("{minutes}m")
    }
}

/// Long date used in workout history ("Mon, Jan 15, 2024").
#[must_use]
pub fn history_date(date: DateTime<Utc>) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}

/// Weight without a trailing `.0` for whole numbers.
#[must_use]
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{weight:.0}")
    } else {
        format!("{weight}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn within_a_day_is_yesterday() {
        assert_eq!(relative_day_label(now() - Duration::hours(3), now()), "Yesterday");
        assert_eq!(relative_day_label(now() - Duration::days(1), now()), "Yesterday");
    }

    #[test]
    fn up_to_a_week_counts_days() {
        assert_eq!(
            relative_day_label(now() - Duration::days(1) - Duration::minutes(1), now()),
            "2 days ago"
        );
        assert_eq!(relative_day_label(now() - Duration::days(7), now()), "7 days ago");
        assert_eq!(relative_day_label(now(), now()), "0 days ago");
    }

    #[test]
    fn older_dates_show_month_and_day() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        assert_eq!(relative_day_label(date, now()), "Mar 5");
    }

    #[test]
    fn future_dates_use_absolute_difference() {
        assert_eq!(relative_day_label(now() + Duration::hours(2), now()), "Yesterday");
    }

    #[test]
    fn never_for_missing_dates() {
        assert_eq!(last_performed_label(None, now()), "Never");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(60), "1h 0m");
        assert_eq!(format_duration(125), "2h 5m");
    }

    #[test]
    fn history_date_format() {
        assert_eq!(history_date(now()), "Wed, Mar 20, 2024");
    }

    #[test]
    fn weights() {
        assert_eq!(format_weight(100.0), "100");
        assert_eq!(format_weight(102.5), "102.5");
    }
}
