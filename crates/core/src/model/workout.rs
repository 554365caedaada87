use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{ExerciseId, SetId, UserId, WorkoutId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum WorkoutError {
    #[error("exercise name cannot be empty")]
    EmptyExerciseName,

    #[error("weight must be a finite, non-negative number (got {0})")]
    InvalidWeight(f64),
}

//
// ─── SET ───────────────────────────────────────────────────────────────────────
//

/// Values entered when a set is marked done.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetInput {
    pub reps: u32,
    pub weight: f64,
    pub notes: Option<String>,
}

impl SetInput {
    #[must_use]
    pub fn new(reps: u32, weight: f64) -> Self {
        Self {
            reps,
            weight,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One attempt at an exercise.
///
/// Only sets with `completed = true` count toward totals and maxima.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSet {
    id: SetId,
    reps: u32,
    weight: f64,
    notes: Option<String>,
    completed: bool,
}

impl WorkoutSet {
    /// Build a set from stored or imported values.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutError::InvalidWeight` for negative or non-finite weights.
    pub fn new(
        id: SetId,
        reps: u32,
        weight: f64,
        notes: Option<String>,
        completed: bool,
    ) -> Result<Self, WorkoutError> {
        validate_weight(weight)?;
        Ok(Self {
            id,
            reps,
            weight,
            notes: normalize_notes(notes),
            completed,
        })
    }

    /// A freshly added, not yet performed set.
    #[must_use]
    pub fn pending(id: SetId) -> Self {
        Self {
            id,
            reps: 0,
            weight: 0.0,
            notes: None,
            completed: false,
        }
    }

    pub(crate) fn complete(&mut self, input: SetInput) -> Result<(), WorkoutError> {
        validate_weight(input.weight)?;
        self.reps = input.reps;
        self.weight = input.weight;
        self.notes = normalize_notes(input.notes);
        self.completed = true;
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> SetId {
        self.id
    }

    #[must_use]
    pub fn reps(&self) -> u32 {
        self.reps
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

fn validate_weight(weight: f64) -> Result<(), WorkoutError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(WorkoutError::InvalidWeight(weight))
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
}

/// Highest weight among the given sets, `0` when there are none.
#[must_use]
pub fn max_weight<'a>(sets: impl IntoIterator<Item = &'a WorkoutSet>) -> f64 {
    sets.into_iter().map(WorkoutSet::weight).fold(0.0, f64::max)
}

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// A named movement performed within a workout.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    id: ExerciseId,
    name: String,
    sets: Vec<WorkoutSet>,
}

impl Exercise {
    /// # Errors
    ///
    /// Returns `WorkoutError::EmptyExerciseName` if the trimmed name is empty.
    pub fn new(
        id: ExerciseId,
        name: impl Into<String>,
        sets: Vec<WorkoutSet>,
    ) -> Result<Self, WorkoutError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WorkoutError::EmptyExerciseName);
        }
        Ok(Self {
            id,
            name: trimmed.to_owned(),
            sets,
        })
    }

    #[must_use]
    pub fn id(&self) -> ExerciseId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key under which exercises are merged for progress tracking.
    #[must_use]
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }

    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name_key() == name.trim().to_lowercase()
    }

    #[must_use]
    pub fn sets(&self) -> &[WorkoutSet] {
        &self.sets
    }

    pub fn completed_sets(&self) -> impl Iterator<Item = &WorkoutSet> {
        self.sets.iter().filter(|s| s.is_completed())
    }

    #[must_use]
    pub fn completed_count(&self) -> u32 {
        saturating_len(self.completed_sets().count())
    }

    pub(crate) fn push_set(&mut self, set: WorkoutSet) {
        self.sets.push(set);
    }

    pub(crate) fn set_mut(&mut self, id: SetId) -> Option<&mut WorkoutSet> {
        self.sets.iter_mut().find(|s| s.id == id)
    }
}

//
// ─── WORKOUT ───────────────────────────────────────────────────────────────────
//

/// A finished workout that has not been assigned a store id yet.
///
/// `date` is `None` only for imported records that never had a usable date.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub user_id: UserId,
    pub date: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub notes: Option<String>,
    pub exercises: Vec<Exercise>,
}

impl NewWorkout {
    #[must_use]
    pub fn into_workout(self, id: WorkoutId) -> Workout {
        Workout {
            id,
            user_id: self.user_id,
            date: self.date,
            duration_minutes: self.duration_minutes,
            notes: self.notes,
            exercises: self.exercises,
        }
    }
}

/// One completed training session. Immutable once built.
///
/// `date` is optional because imported records may carry a missing or
/// malformed date; such workouts sort as if performed at the epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    user_id: UserId,
    date: Option<DateTime<Utc>>,
    duration_minutes: u32,
    notes: Option<String>,
    exercises: Vec<Exercise>,
}

impl Workout {
    #[must_use]
    pub fn new(
        id: WorkoutId,
        user_id: UserId,
        date: Option<DateTime<Utc>>,
        duration_minutes: u32,
        notes: Option<String>,
        exercises: Vec<Exercise>,
    ) -> Self {
        Self {
            id,
            user_id,
            date,
            duration_minutes,
            notes: normalize_notes(notes),
            exercises,
        }
    }

    #[must_use]
    pub fn id(&self) -> WorkoutId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    /// Milliseconds since the epoch used for ordering; absent dates are `0`.
    #[must_use]
    pub fn sort_key(&self) -> i64 {
        self.date.map_or(0, |d| d.timestamp_millis())
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn total_sets(&self) -> u32 {
        saturating_len(self.exercises.iter().map(|e| e.sets.len()).sum())
    }

    #[must_use]
    pub fn completed_sets(&self) -> u32 {
        self.exercises
            .iter()
            .map(Exercise::completed_count)
            .fold(0, u32::saturating_add)
    }

    /// Copy of this workout keeping only exercises accepted by `keep`.
    #[must_use]
    pub fn retain_exercises(&self, keep: impl Fn(&Exercise) -> bool) -> Self {
        Self {
            exercises: self.exercises.iter().filter(|e| keep(e)).cloned().collect(),
            ..self.clone()
        }
    }
}

pub(crate) fn saturating_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(id: u64, reps: u32, weight: f64) -> WorkoutSet {
        WorkoutSet::new(SetId::new(id), reps, weight, None, true).unwrap()
    }

    #[test]
    fn exercise_name_is_trimmed_and_required() {
        let ex = Exercise::new(ExerciseId::new(1), "  Bench Press ", vec![]).unwrap();
        assert_eq!(ex.name(), "Bench Press");
        assert_eq!(ex.name_key(), "bench press");

        let err = Exercise::new(ExerciseId::new(2), "   ", vec![]).unwrap_err();
        assert_eq!(err, WorkoutError::EmptyExerciseName);
    }

    #[test]
    fn negative_or_nan_weight_is_rejected() {
        assert!(WorkoutSet::new(SetId::new(1), 5, -1.0, None, true).is_err());
        assert!(WorkoutSet::new(SetId::new(1), 5, f64::NAN, None, true).is_err());
    }

    #[test]
    fn blank_notes_become_none() {
        let set = WorkoutSet::new(SetId::new(1), 5, 20.0, Some("  ".into()), true).unwrap();
        assert_eq!(set.notes(), None);
    }

    #[test]
    fn max_weight_of_nothing_is_zero() {
        assert_eq!(max_weight(std::iter::empty()), 0.0);
        assert_eq!(max_weight(&[done(1, 5, 60.0), done(2, 3, 80.0)]), 80.0);
    }

    #[test]
    fn workout_counts_sets() {
        let ex = Exercise::new(
            ExerciseId::new(1),
            "Row",
            vec![done(1, 8, 50.0), WorkoutSet::pending(SetId::new(2))],
        )
        .unwrap();
        let workout = Workout::new(WorkoutId::new(1), UserId::new(1), None, 30, None, vec![ex]);
        assert_eq!(workout.total_sets(), 2);
        assert_eq!(workout.completed_sets(), 1);
        assert_eq!(workout.sort_key(), 0);
    }
}
