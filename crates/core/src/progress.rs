//! Per-exercise progress derived from workout history.
//!
//! Everything here is a pure function of the workouts passed in. Nothing is
//! cached; callers recompute on every read.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::{Workout, WorkoutSet, max_weight, saturating_len};

//
// ─── TYPES ─────────────────────────────────────────────────────────────────────
//

/// One appearance of an exercise in a workout.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub date: Option<DateTime<Utc>>,
    /// Only the completed sets of that appearance, in logged order.
    pub completed_sets: Vec<WorkoutSet>,
}

impl SessionEntry {
    /// Heaviest completed set of the session, `0` when none were completed.
    #[must_use]
    pub fn max_weight(&self) -> f64 {
        max_weight(&self.completed_sets)
    }

    fn sort_key(&self) -> i64 {
        self.date.map_or(0, |d| d.timestamp_millis())
    }
}

/// Summary of all recorded performances of one exercise name.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseProgress {
    /// Spelling of the first occurrence seen.
    pub name: String,
    pub total_completed_sets: u32,
    pub max_weight: f64,
    pub max_reps: u32,
    /// Most recent workout date in which the exercise appeared at all,
    /// whether or not any of its sets were completed.
    pub last_performed: Option<DateTime<Utc>>,
    /// Sessions ordered by date, newest first. Undated sessions come last.
    pub recent_sessions: Vec<SessionEntry>,
}

impl ExerciseProgress {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            total_completed_sets: 0,
            max_weight: 0.0,
            max_reps: 0,
            last_performed: None,
            recent_sessions: Vec::new(),
        }
    }

    fn last_performed_key(&self) -> i64 {
        self.last_performed.map_or(0, |d| d.timestamp_millis())
    }

    #[must_use]
    pub fn trend(&self) -> Trend {
        progress_trend(self)
    }
}

/// Direction of the peak weight between the two most recent sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Neutral => "neutral",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Trend::Up => "Improving",
            Trend::Down => "Declining",
            Trend::Neutral => "Stable",
        }
    }
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

/// Build one progress record per exercise name (case-insensitive).
///
/// `workouts` may be in any order. The result is sorted by `last_performed`
/// descending; records without a date sort as the epoch and ties keep the
/// order in which the names were first seen.
#[must_use]
pub fn aggregate_progress(workouts: &[Workout]) -> Vec<ExerciseProgress> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut records: Vec<ExerciseProgress> = Vec::new();

    for workout in workouts {
        let date = workout.date();
        for exercise in workout.exercises() {
            let slot = *index.entry(exercise.name_key()).or_insert_with(|| {
                records.push(ExerciseProgress::empty(exercise.name()));
                records.len() - 1
            });
            let record = &mut records[slot];

            let completed: Vec<WorkoutSet> = exercise.completed_sets().cloned().collect();
            record.total_completed_sets = record
                .total_completed_sets
                .saturating_add(saturating_len(completed.len()));
            for set in &completed {
                record.max_weight = record.max_weight.max(set.weight());
                record.max_reps = record.max_reps.max(set.reps());
            }
            record.recent_sessions.push(SessionEntry {
                date,
                completed_sets: completed,
            });

            // Any appearance counts, even with nothing completed.
            if date > record.last_performed {
                record.last_performed = date;
            }
        }
    }

    for record in &mut records {
        record
            .recent_sessions
            .sort_by_key(|s| std::cmp::Reverse(s.sort_key()));
    }
    records.sort_by_key(|r| std::cmp::Reverse(r.last_performed_key()));
    records
}

/// Compare the peak completed weight of the two most recent sessions.
///
/// Uses `recent_sessions` as produced by [`aggregate_progress`], which is
/// already ordered newest first regardless of the input workout order.
#[must_use]
pub fn progress_trend(progress: &ExerciseProgress) -> Trend {
    let [latest, previous, ..] = progress.recent_sessions.as_slice() else {
        return Trend::Neutral;
    };
    let latest_max = latest.max_weight();
    let previous_max = previous.max_weight();
    if latest_max > previous_max {
        Trend::Up
    } else if latest_max < previous_max {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

/// Keep the records whose name contains `term`, ignoring case.
#[must_use]
pub fn filter_progress<'a>(
    progress: &'a [ExerciseProgress],
    term: &str,
) -> Vec<&'a ExerciseProgress> {
    let needle = term.trim().to_lowercase();
    progress
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

//
// ─── HISTORY QUERIES ───────────────────────────────────────────────────────────
//

/// Workouts that include `exercise_name`, each narrowed to the matching exercises.
#[must_use]
pub fn exercise_history(workouts: &[Workout], exercise_name: &str) -> Vec<Workout> {
    workouts
        .iter()
        .filter(|w| w.exercises().iter().any(|e| e.matches_name(exercise_name)))
        .map(|w| w.retain_exercises(|e| e.matches_name(exercise_name)))
        .collect()
}

/// The most recent workout; undated workouts only win when nothing is dated.
#[must_use]
pub fn last_workout(workouts: &[Workout]) -> Option<&Workout> {
    workouts
        .iter()
        .enumerate()
        // Earlier position wins ties so an already newest-first list keeps its head.
        .max_by_key(|(pos, w)| (w.sort_key(), std::cmp::Reverse(*pos)))
        .map(|(_, w)| w)
}

/// Headline figures for a list of workouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkoutTotals {
    pub workouts: u32,
    pub exercises: u32,
    pub sets: u32,
    pub completed_sets: u32,
    pub duration_minutes: u32,
}

impl WorkoutTotals {
    #[must_use]
    pub fn from_workouts(workouts: &[Workout]) -> Self {
        workouts.iter().fold(
            Self {
                workouts: saturating_len(workouts.len()),
                ..Self::default()
            },
            |acc, w| Self {
                workouts: acc.workouts,
                exercises: acc
                    .exercises
                    .saturating_add(saturating_len(w.exercises().len())),
                sets: acc.sets.saturating_add(w.total_sets()),
                completed_sets: acc.completed_sets.saturating_add(w.completed_sets()),
                duration_minutes: acc.duration_minutes.saturating_add(w.duration_minutes()),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exercise, ExerciseId, SetId, UserId, WorkoutId};
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 9, 0, 0).unwrap()
    }

    fn set(reps: u32, weight: f64, completed: bool) -> WorkoutSet {
        WorkoutSet::new(SetId::new(1), reps, weight, None, completed).unwrap()
    }

    fn exercise(name: &str, sets: Vec<WorkoutSet>) -> Exercise {
        Exercise::new(ExerciseId::new(1), name, sets).unwrap()
    }

    fn workout(id: u64, date: Option<DateTime<Utc>>, exercises: Vec<Exercise>) -> Workout {
        Workout::new(WorkoutId::new(id), UserId::new(1), date, 45, None, exercises)
    }

    fn bench_scenario() -> (Workout, Workout) {
        let a = workout(
            1,
            Some(day(1)),
            vec![exercise("Bench Press", vec![set(10, 100.0, true)])],
        );
        let b = workout(
            2,
            Some(day(8)),
            vec![exercise("Bench Press", vec![set(8, 110.0, true)])],
        );
        (a, b)
    }

    #[test]
    fn bench_press_scenario_trends_up() {
        let (a, b) = bench_scenario();
        let progress = aggregate_progress(&[a, b]);

        assert_eq!(progress.len(), 1);
        let bench = &progress[0];
        assert_eq!(bench.max_weight, 110.0);
        assert_eq!(bench.max_reps, 10);
        assert_eq!(bench.total_completed_sets, 2);
        assert_eq!(bench.last_performed, Some(day(8)));
        assert_eq!(progress_trend(bench), Trend::Up);
        assert_eq!(bench.trend().label(), "Improving");
    }

    #[test]
    fn trend_ignores_input_order() {
        // Oldest-first input would compare A against B and report "down"
        // if sessions were not re-sorted by date.
        let (a, b) = bench_scenario();
        let oldest_first = aggregate_progress(&[a.clone(), b.clone()]);
        let newest_first = aggregate_progress(&[b, a]);

        assert_eq!(oldest_first[0].recent_sessions[0].date, Some(day(8)));
        assert_eq!(progress_trend(&oldest_first[0]), Trend::Up);
        assert_eq!(progress_trend(&newest_first[0]), Trend::Up);
    }

    #[test]
    fn declining_weight_trends_down() {
        let older = workout(1, Some(day(1)), vec![exercise("Row", vec![set(8, 80.0, true)])]);
        let newer = workout(2, Some(day(3)), vec![exercise("Row", vec![set(8, 70.0, true)])]);
        let progress = aggregate_progress(&[newer, older]);
        assert_eq!(progress_trend(&progress[0]), Trend::Down);
    }

    #[test]
    fn single_session_is_neutral() {
        let w = workout(1, Some(day(1)), vec![exercise("Dips", vec![set(12, 0.0, true)])]);
        let progress = aggregate_progress(&[w]);
        assert_eq!(progress_trend(&progress[0]), Trend::Neutral);
        assert_eq!(Trend::Neutral.as_str(), "neutral");
    }

    #[test]
    fn empty_session_counts_as_zero_weight() {
        let older = workout(1, Some(day(1)), vec![exercise("Squat", vec![set(5, 100.0, true)])]);
        let newer = workout(2, Some(day(2)), vec![exercise("Squat", vec![set(5, 120.0, false)])]);
        let progress = aggregate_progress(&[older, newer]);
        assert_eq!(progress[0].recent_sessions[0].max_weight(), 0.0);
        assert_eq!(progress_trend(&progress[0]), Trend::Down);
    }

    #[test]
    fn names_merge_case_insensitively() {
        let w1 = workout(1, Some(day(1)), vec![exercise("Squat", vec![set(5, 100.0, true)])]);
        let w2 = workout(
            2,
            Some(day(2)),
            vec![exercise("squat", vec![set(3, 120.0, true), set(8, 90.0, true)])],
        );
        let progress = aggregate_progress(&[w1, w2]);

        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].name, "Squat");
        assert_eq!(progress[0].total_completed_sets, 3);
        assert_eq!(progress[0].max_weight, 120.0);
        assert_eq!(progress[0].max_reps, 8);
        assert_eq!(progress[0].recent_sessions.len(), 2);
    }

    #[test]
    fn no_completed_sets_means_zero_maxima() {
        let w = workout(
            1,
            Some(day(4)),
            vec![exercise("Plank", vec![set(1, 20.0, false), set(1, 25.0, false)])],
        );
        let progress = aggregate_progress(&[w]);
        assert_eq!(progress[0].max_weight, 0.0);
        assert_eq!(progress[0].max_reps, 0);
        assert_eq!(progress[0].total_completed_sets, 0);
    }

    #[test]
    fn attempted_only_occurrence_still_updates_last_performed() {
        let done = workout(1, Some(day(1)), vec![exercise("Curl", vec![set(10, 15.0, true)])]);
        let attempted = workout(
            2,
            Some(day(9)),
            vec![exercise("Curl", vec![set(10, 30.0, false)])],
        );
        let progress = aggregate_progress(&[done, attempted]);

        let curl = &progress[0];
        assert_eq!(curl.last_performed, Some(day(9)));
        assert_eq!(curl.total_completed_sets, 1);
        assert_eq!(curl.max_weight, 15.0);
        assert_eq!(curl.max_reps, 10);
    }

    #[test]
    fn completed_totals_match_input() {
        let w1 = workout(
            1,
            Some(day(1)),
            vec![
                exercise("Bench", vec![set(5, 60.0, true), set(5, 60.0, false)]),
                exercise("Row", vec![set(5, 50.0, true)]),
            ],
        );
        let w2 = workout(
            2,
            None,
            vec![exercise("bench", vec![set(5, 65.0, true), set(5, 65.0, true)])],
        );
        let workouts = [w1, w2];
        let expected: u32 = workouts.iter().map(Workout::completed_sets).sum();
        let total: u32 = aggregate_progress(&workouts)
            .iter()
            .map(|p| p.total_completed_sets)
            .sum();
        assert_eq!(total, expected);
        assert_eq!(total, 4);
    }

    #[test]
    fn sorted_by_last_performed_with_undated_last_and_stable_ties() {
        let undated = workout(1, None, vec![exercise("Lunge", vec![])]);
        let tie = workout(
            2,
            Some(day(5)),
            vec![exercise("Press", vec![]), exercise("Shrug", vec![])],
        );
        let latest = workout(3, Some(day(6)), vec![exercise("Deadlift", vec![])]);

        let progress = aggregate_progress(&[undated, tie, latest]);
        let names: Vec<_> = progress.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Deadlift", "Press", "Shrug", "Lunge"]);
        assert_eq!(progress[3].last_performed, None);
    }

    #[test]
    fn undated_sessions_sort_after_dated_ones() {
        let undated = workout(1, None, vec![exercise("Row", vec![set(5, 200.0, true)])]);
        let dated = workout(2, Some(day(2)), vec![exercise("Row", vec![set(5, 60.0, true)])]);
        let progress = aggregate_progress(&[undated, dated]);
        assert_eq!(progress[0].recent_sessions[0].date, Some(day(2)));
        assert_eq!(progress_trend(&progress[0]), Trend::Down);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let w = workout(
            1,
            Some(day(1)),
            vec![
                exercise("Bench Press", vec![]),
                exercise("Leg Press", vec![]),
                exercise("Squat", vec![]),
            ],
        );
        let progress = aggregate_progress(&[w]);
        let hits: Vec<_> = filter_progress(&progress, "PRESS")
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(hits, ["Bench Press", "Leg Press"]);
        assert_eq!(filter_progress(&progress, "").len(), 3);
    }

    #[test]
    fn exercise_history_narrows_workouts() {
        let w1 = workout(
            1,
            Some(day(1)),
            vec![exercise("Squat", vec![]), exercise("Bench", vec![])],
        );
        let w2 = workout(2, Some(day(2)), vec![exercise("Row", vec![])]);
        let history = exercise_history(&[w1, w2], "SQUAT");

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id(), WorkoutId::new(1));
        assert_eq!(history[0].exercises().len(), 1);
        assert_eq!(history[0].exercises()[0].name(), "Squat");
    }

    #[test]
    fn last_workout_picks_latest_date() {
        assert!(last_workout(&[]).is_none());
        let older = workout(1, Some(day(1)), vec![]);
        let newer = workout(2, Some(day(1) + Duration::hours(1)), vec![]);
        let undated = workout(3, None, vec![]);
        let workouts = [older, undated, newer];
        assert_eq!(last_workout(&workouts).unwrap().id(), WorkoutId::new(2));
    }

    #[test]
    fn totals_sum_across_workouts() {
        let w1 = workout(
            1,
            Some(day(1)),
            vec![exercise("A", vec![set(1, 1.0, true), set(1, 1.0, false)])],
        );
        let w2 = workout(
            2,
            Some(day(2)),
            vec![exercise("B", vec![]), exercise("C", vec![set(1, 1.0, true)])],
        );
        let totals = WorkoutTotals::from_workouts(&[w1, w2]);
        assert_eq!(
            totals,
            WorkoutTotals {
                workouts: 2,
                exercises: 3,
                sets: 3,
                completed_sets: 2,
                duration_minutes: 90,
            }
        );
    }
}
