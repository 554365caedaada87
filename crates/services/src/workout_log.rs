use std::sync::Arc;

use replog_core::capture::ActiveWorkout;
use replog_core::model::{UserId, Workout};
use replog_core::progress::{ExerciseProgress, aggregate_progress, exercise_history, last_workout};

use crate::error::WorkoutServiceError;
use crate::workout_service::WorkoutService;

/// Workouts of one signed-in user, held for the length of a session.
///
/// Every remote call either replaces the list with fresh data or leaves it
/// untouched and records a user-facing message in [`WorkoutLog::error`].
pub struct WorkoutLog {
    user_id: UserId,
    service: Arc<WorkoutService>,
    workouts: Vec<Workout>,
    error: Option<String>,
}

impl WorkoutLog {
    #[must_use]
    pub fn new(user_id: UserId, service: Arc<WorkoutService>) -> Self {
        Self {
            user_id,
            service,
            workouts: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Newest first.
    #[must_use]
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    /// Message from the most recent failed call, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Reload the list from storage.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutServiceError` if loading fails; the current list is kept.
    pub async fn refresh(&mut self) -> Result<(), WorkoutServiceError> {
        match self.service.list_workouts(self.user_id).await {
            Ok(workouts) => {
                self.workouts = workouts;
                self.error = None;
                Ok(())
            }
            Err(err) => Err(self.record(err)),
        }
    }

    /// Save `active` and put the stored workout at the head of the list.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutServiceError` if the workout is empty or cannot be
    /// stored; both the list and `active` are left unchanged.
    pub async fn save(&mut self, active: &mut ActiveWorkout) -> Result<Workout, WorkoutServiceError> {
        match self.service.save_finished(active, self.user_id).await {
            Ok(workout) => {
                self.workouts.insert(0, workout.clone());
                self.error = None;
                Ok(workout)
            }
            Err(err) => Err(self.record(err)),
        }
    }

    #[must_use]
    pub fn progress(&self) -> Vec<ExerciseProgress> {
        aggregate_progress(&self.workouts)
    }

    #[must_use]
    pub fn history(&self, exercise_name: &str) -> Vec<Workout> {
        exercise_history(&self.workouts, exercise_name)
    }

    #[must_use]
    pub fn last_workout(&self) -> Option<&Workout> {
        last_workout(&self.workouts)
    }

    fn record(&mut self, err: WorkoutServiceError) -> WorkoutServiceError {
        tracing::warn!(user_id = %self.user_id, error = %err, "workout log call failed");
        self.error = Some(err.to_string());
        err
    }
}
