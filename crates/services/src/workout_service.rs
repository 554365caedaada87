use std::sync::Arc;

use replog_core::capture::ActiveWorkout;
use replog_core::model::{NewWorkout, UserId, Workout};
use replog_core::progress::{
    ExerciseProgress, WorkoutTotals, aggregate_progress, exercise_history, last_workout,
};
use storage::repository::WorkoutRepository;

use crate::Clock;
use crate::error::WorkoutServiceError;

/// Saves finished workouts and answers history and progress queries.
#[derive(Clone)]
pub struct WorkoutService {
    clock: Clock,
    workouts: Arc<dyn WorkoutRepository>,
}

impl WorkoutService {
    #[must_use]
    pub fn new(clock: Clock, workouts: Arc<dyn WorkoutRepository>) -> Self {
        Self { clock, workouts }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Start logging a new workout at the current time.
    #[must_use]
    pub fn start_workout(&self) -> ActiveWorkout {
        ActiveWorkout::start(self.clock.now())
    }

    /// Finish `active` and persist it for `user_id`.
    ///
    /// `active` is only cleared once the workout has been stored; on any
    /// error it is left exactly as it was so the user can retry.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutServiceError::Capture` when the workout has no exercises.
    /// Returns `WorkoutServiceError::Storage` if persistence fails.
    pub async fn save_finished(
        &self,
        active: &mut ActiveWorkout,
        user_id: UserId,
    ) -> Result<Workout, WorkoutServiceError> {
        let mut finishing = active.clone();
        let draft = finishing.finish(user_id, self.clock.now())?;
        let id = self.workouts.insert_workout(&draft).await?;
        *active = finishing;
        tracing::info!(
            workout_id = %id,
            user_id = %user_id,
            exercises = draft.exercises.len(),
            duration_minutes = draft.duration_minutes,
            "workout saved"
        );
        Ok(draft.into_workout(id))
    }

    /// Workouts of `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutServiceError::Storage` if repository access fails.
    pub async fn list_workouts(&self, user_id: UserId) -> Result<Vec<Workout>, WorkoutServiceError> {
        Ok(self.workouts.list_workouts(user_id).await?)
    }

    /// Per-exercise progress over all of the user's workouts.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutServiceError::Storage` if repository access fails.
    pub async fn progress(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ExerciseProgress>, WorkoutServiceError> {
        let workouts = self.workouts.list_workouts(user_id).await?;
        Ok(aggregate_progress(&workouts))
    }

    /// Workouts containing `exercise_name`, narrowed to that exercise.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutServiceError::Storage` if repository access fails.
    pub async fn exercise_history(
        &self,
        user_id: UserId,
        exercise_name: &str,
    ) -> Result<Vec<Workout>, WorkoutServiceError> {
        let workouts = self.workouts.list_workouts(user_id).await?;
        Ok(exercise_history(&workouts, exercise_name))
    }

    /// # Errors
    ///
    /// Returns `WorkoutServiceError::Storage` if repository access fails.
    pub async fn last_workout(
        &self,
        user_id: UserId,
    ) -> Result<Option<Workout>, WorkoutServiceError> {
        let workouts = self.workouts.list_workouts(user_id).await?;
        Ok(last_workout(&workouts).cloned())
    }

    /// # Errors
    ///
    /// Returns `WorkoutServiceError::Storage` if repository access fails.
    pub async fn totals(&self, user_id: UserId) -> Result<WorkoutTotals, WorkoutServiceError> {
        let workouts = self.workouts.list_workouts(user_id).await?;
        Ok(WorkoutTotals::from_workouts(&workouts))
    }

    /// Persist already-built workouts, e.g. from an imported snapshot.
    ///
    /// Workouts keep their own date, including none. Returns the number of
    /// workouts stored.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutServiceError::Storage` if the batch cannot be stored;
    /// in that case nothing is stored.
    pub async fn import(
        &self,
        user_id: UserId,
        workouts: Vec<Workout>,
    ) -> Result<usize, WorkoutServiceError> {
        let drafts: Vec<NewWorkout> = workouts
            .into_iter()
            .map(|workout| NewWorkout {
                user_id,
                date: workout.date(),
                duration_minutes: workout.duration_minutes(),
                notes: workout.notes().map(str::to_owned),
                exercises: workout.exercises().to_vec(),
            })
            .collect();
        let stored = self.workouts.insert_workouts(&drafts).await?.len();
        tracing::info!(user_id = %user_id, stored, "imported workouts");
        Ok(stored)
    }
}
