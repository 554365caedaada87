//! The in-progress workout: exercises and sets are appended while training
//! and the whole thing is frozen into a [`NewWorkout`] on finish.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{
    Exercise, ExerciseId, NewWorkout, SetId, SetInput, UserId, WorkoutError, WorkoutSet,
};
use crate::time::elapsed_minutes;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CaptureError {
    #[error("workout has no exercises")]
    Empty,

    #[error("exercise {0} is not part of this workout")]
    UnknownExercise(ExerciseId),

    #[error("set {set} does not belong to exercise {exercise}")]
    UnknownSet { exercise: ExerciseId, set: SetId },

    #[error(transparent)]
    Invalid(#[from] WorkoutError),
}

/// Completed vs. total sets in the active workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureProgress {
    pub completed_sets: u32,
    pub total_sets: u32,
}

/// A workout being logged.
///
/// Exercises and sets can only be appended; the only edit allowed on an
/// existing set is [`ActiveWorkout::complete_set`]. Nothing survives if the
/// value is dropped before [`ActiveWorkout::finish`].
#[derive(Debug, Clone)]
pub struct ActiveWorkout {
    started_at: DateTime<Utc>,
    notes: Option<String>,
    exercises: Vec<Exercise>,
    next_id: u64,
}

impl ActiveWorkout {
    #[must_use]
    pub fn start(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            notes: None,
            exercises: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    /// Append a new exercise with no sets.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Invalid` if the name is blank.
    pub fn add_exercise(&mut self, name: &str) -> Result<ExerciseId, CaptureError> {
        let id = ExerciseId::new(self.next_id);
        let exercise = Exercise::new(id, name, Vec::new())?;
        self.allocate_id();
        self.exercises.push(exercise);
        Ok(id)
    }

    /// Append an empty, incomplete set to an exercise.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::UnknownExercise` if `exercise_id` is not in this workout.
    pub fn add_set(&mut self, exercise_id: ExerciseId) -> Result<SetId, CaptureError> {
        if !self.exercises.iter().any(|e| e.id() == exercise_id) {
            return Err(CaptureError::UnknownExercise(exercise_id));
        }
        let set_id = SetId::new(self.allocate_id());
        let exercise = self.exercise_mut(exercise_id)?;
        exercise.push_set(WorkoutSet::pending(set_id));
        Ok(set_id)
    }

    /// Record reps, weight and notes for a set and mark it completed.
    ///
    /// Calling this again on a completed set overwrites the values.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::UnknownExercise` / `UnknownSet` for bad ids and
    /// `CaptureError::Invalid` for an invalid weight. The set is untouched on error.
    pub fn complete_set(
        &mut self,
        exercise_id: ExerciseId,
        set_id: SetId,
        input: SetInput,
    ) -> Result<&WorkoutSet, CaptureError> {
        let exercise = self.exercise_mut(exercise_id)?;
        let set = exercise.set_mut(set_id).ok_or(CaptureError::UnknownSet {
            exercise: exercise_id,
            set: set_id,
        })?;
        set.complete(input)?;
        Ok(&*set)
    }

    fn exercise_mut(&mut self, id: ExerciseId) -> Result<&mut Exercise, CaptureError> {
        self.exercises
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or(CaptureError::UnknownExercise(id))
    }

    #[must_use]
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> u32 {
        elapsed_minutes(self.started_at, now)
    }

    #[must_use]
    pub fn progress(&self) -> CaptureProgress {
        self.exercises
            .iter()
            .fold(CaptureProgress::default(), |acc, e| CaptureProgress {
                completed_sets: acc.completed_sets.saturating_add(e.completed_count()),
                total_sets: acc
                    .total_sets
                    .saturating_add(u32::try_from(e.sets().len()).unwrap_or(u32::MAX)),
            })
    }

    /// Freeze the logged exercises into a workout dated `now`.
    ///
    /// On success the in-progress list is cleared and the start time moves
    /// to `now`, so the same value logs the next workout from here.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Empty` (leaving state untouched) when no
    /// exercise was added.
    pub fn finish(
        &mut self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<NewWorkout, CaptureError> {
        if self.exercises.is_empty() {
            return Err(CaptureError::Empty);
        }
        let duration_minutes = self.elapsed_minutes(now);
        self.started_at = now;
        Ok(NewWorkout {
            user_id,
            date: Some(now),
            duration_minutes,
            notes: self.notes.take(),
            exercises: std::mem::take(&mut self.exercises),
        })
    }
}
