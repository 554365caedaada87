use std::collections::HashMap;

use replog_core::model::{
    Exercise, ExerciseId, NewWorkout, SetId, UserId, Workout, WorkoutId, WorkoutSet,
    parse_workout_date,
};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnection, SqliteRow};

use super::SqliteRepository;
use super::mapping::{
    conn, id_i64, local_id_from_i64, ser, u32_from_i64, user_id_from_i64, workout_id_from_i64,
};
use crate::repository::{StorageError, WorkoutRepository, sort_newest_first};

fn position_i64(index: usize) -> Result<i64, StorageError> {
    i64::try_from(index).map_err(|_| StorageError::Serialization("position overflow".into()))
}

fn map_set_row(row: &SqliteRow) -> Result<WorkoutSet, StorageError> {
    let completed: i64 = row.try_get("completed").map_err(ser)?;
    WorkoutSet::new(
        SetId::new(local_id_from_i64(row.try_get("local_id").map_err(ser)?)?),
        u32_from_i64("reps", row.try_get("reps").map_err(ser)?)?,
        row.try_get("weight").map_err(ser)?,
        row.try_get("notes").map_err(ser)?,
        completed != 0,
    )
    .map_err(ser)
}

/// Which workouts' exercises to load in one pass.
#[derive(Clone, Copy)]
enum ExerciseScope {
    Workout(i64),
    User(i64),
}

impl ExerciseScope {
    fn filter(self) -> &'static str {
        match self {
            ExerciseScope::Workout(_) => "e.workout_id = ?1",
            ExerciseScope::User(_) => "e.workout_id IN (SELECT id FROM workouts WHERE user_id = ?1)",
        }
    }

    fn key(self) -> i64 {
        match self {
            ExerciseScope::Workout(id) | ExerciseScope::User(id) => id,
        }
    }
}

async fn insert_one(db: &mut SqliteConnection, workout: &NewWorkout) -> Result<i64, StorageError> {
    let user_id = id_i64("user_id", workout.user_id.value())?;
    let res = sqlx::query(
        r"
        INSERT INTO workouts (user_id, date, duration_minutes, notes)
        VALUES (?1, ?2, ?3, ?4)
        ",
    )
    .bind(user_id)
    .bind(workout.date.map(|d| d.to_rfc3339()))
    .bind(i64::from(workout.duration_minutes))
    .bind(workout.notes.as_deref())
    .execute(&mut *db)
    .await
    .map_err(conn)?;
    let workout_id = res.last_insert_rowid();

    for (position, exercise) in workout.exercises.iter().enumerate() {
        let res = sqlx::query(
            r"
            INSERT INTO exercises (workout_id, local_id, position, name)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(workout_id)
        .bind(id_i64("exercise_id", exercise.id().value())?)
        .bind(position_i64(position)?)
        .bind(exercise.name())
        .execute(&mut *db)
        .await
        .map_err(conn)?;
        let exercise_row = res.last_insert_rowid();

        for (set_position, set) in exercise.sets().iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO sets (exercise_id, local_id, position, reps, weight, notes, completed)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )
            .bind(exercise_row)
            .bind(id_i64("set_id", set.id().value())?)
            .bind(position_i64(set_position)?)
            .bind(i64::from(set.reps()))
            .bind(set.weight())
            .bind(set.notes())
            .bind(i64::from(set.is_completed()))
            .execute(&mut *db)
            .await
            .map_err(conn)?;
        }
    }
    Ok(workout_id)
}

fn workout_from_row(row: &SqliteRow, exercises: Vec<Exercise>) -> Result<Workout, StorageError> {
    let date: Option<String> = row.try_get("date").map_err(ser)?;
    Ok(Workout::new(
        workout_id_from_i64(row.try_get("id").map_err(ser)?)?,
        user_id_from_i64(row.try_get("user_id").map_err(ser)?)?,
        date.as_deref().and_then(parse_workout_date),
        u32_from_i64(
            "duration_minutes",
            row.try_get("duration_minutes").map_err(ser)?,
        )?,
        row.try_get("notes").map_err(ser)?,
        exercises,
    ))
}

impl SqliteRepository {
    /// Exercises with their sets for every workout in `scope`, keyed by
    /// workout row id. Two queries regardless of how many workouts match.
    async fn load_exercises(
        &self,
        scope: ExerciseScope,
    ) -> Result<HashMap<i64, Vec<Exercise>>, StorageError> {
        let exercise_sql = format!(
            "SELECT e.id, e.workout_id, e.local_id, e.name
             FROM exercises e
             WHERE {}
             ORDER BY e.workout_id ASC, e.position ASC",
            scope.filter()
        );
        let exercise_rows = sqlx::query(&exercise_sql)
            .bind(scope.key())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let set_sql = format!(
            "SELECT s.exercise_id, s.local_id, s.reps, s.weight, s.notes, s.completed
             FROM sets s
             JOIN exercises e ON e.id = s.exercise_id
             WHERE {}
             ORDER BY s.exercise_id ASC, s.position ASC",
            scope.filter()
        );
        let set_rows = sqlx::query(&set_sql)
            .bind(scope.key())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut sets_by_exercise: HashMap<i64, Vec<WorkoutSet>> = HashMap::new();
        for row in &set_rows {
            let exercise_id: i64 = row.try_get("exercise_id").map_err(ser)?;
            sets_by_exercise
                .entry(exercise_id)
                .or_default()
                .push(map_set_row(row)?);
        }

        let mut by_workout: HashMap<i64, Vec<Exercise>> = HashMap::new();
        for row in &exercise_rows {
            let row_id: i64 = row.try_get("id").map_err(ser)?;
            let workout_id: i64 = row.try_get("workout_id").map_err(ser)?;
            let exercise = Exercise::new(
                ExerciseId::new(local_id_from_i64(row.try_get("local_id").map_err(ser)?)?),
                row.try_get::<String, _>("name").map_err(ser)?,
                sets_by_exercise.remove(&row_id).unwrap_or_default(),
            )
            .map_err(ser)?;
            by_workout.entry(workout_id).or_default().push(exercise);
        }
        Ok(by_workout)
    }
}

#[async_trait::async_trait]
impl WorkoutRepository for SqliteRepository {
    async fn insert_workout(&self, workout: &NewWorkout) -> Result<WorkoutId, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let workout_id = insert_one(&mut tx, workout).await?;
        tx.commit().await.map_err(conn)?;
        tracing::debug!(
            workout_id,
            exercises = workout.exercises.len(),
            "stored workout"
        );
        workout_id_from_i64(workout_id)
    }

    async fn insert_workouts(
        &self,
        workouts: &[NewWorkout],
    ) -> Result<Vec<WorkoutId>, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let mut ids = Vec::with_capacity(workouts.len());
        for workout in workouts {
            ids.push(workout_id_from_i64(insert_one(&mut tx, workout).await?)?);
        }
        tx.commit().await.map_err(conn)?;
        tracing::debug!(count = ids.len(), "stored workout batch");
        Ok(ids)
    }

    async fn get_workout(&self, id: WorkoutId) -> Result<Option<Workout>, StorageError> {
        let row_id = id_i64("workout_id", id.value())?;
        let row = sqlx::query(
            r"
            SELECT id, user_id, date, duration_minutes, notes
            FROM workouts WHERE id = ?1
            ",
        )
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut exercises = self.load_exercises(ExerciseScope::Workout(row_id)).await?;
        workout_from_row(&row, exercises.remove(&row_id).unwrap_or_default()).map(Some)
    }

    async fn list_workouts(&self, user_id: UserId) -> Result<Vec<Workout>, StorageError> {
        let user = id_i64("user_id", user_id.value())?;
        let rows = sqlx::query(
            r"
            SELECT id, user_id, date, duration_minutes, notes
            FROM workouts
            WHERE user_id = ?1
            ORDER BY id DESC
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut exercises = self.load_exercises(ExerciseScope::User(user)).await?;
        let mut workouts = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.try_get("id").map_err(ser)?;
            workouts.push(workout_from_row(row, exercises.remove(&id).unwrap_or_default())?);
        }
        // Stored text dates may mix formats, so order on the parsed value.
        sort_newest_first(&mut workouts);
        Ok(workouts)
    }
}
