use chrono::{DateTime, Duration, Utc};

/// Time source injected into services so workout timing is testable.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Whole minutes elapsed between `start` and `end`, rounded down.
///
/// Negative spans (clock skew) clamp to zero and very long spans saturate.
#[must_use]
pub fn elapsed_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let minutes = (end - start).num_minutes().max(0);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_minutes_rounds_down() {
        let start = fixed_now();
        let end = start + Duration::seconds(59 * 60 + 59);
        assert_eq!(elapsed_minutes(start, end), 59);
    }

    #[test]
    fn elapsed_minutes_clamps_negative_spans() {
        let start = fixed_now();
        assert_eq!(elapsed_minutes(start, start - Duration::minutes(5)), 0);
    }

    #[test]
    fn fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::minutes(45));
        assert_eq!(elapsed_minutes(fixed_now(), clock.now()), 45);
        assert!(clock.is_fixed());
    }
}
