//! Versioned JSON document for keeping workouts on local disk.
//!
//! Dates are written as RFC 3339 strings. On read, both strings and epoch
//! millisecond numbers are accepted; an unreadable date becomes an undated
//! workout rather than failing the whole document.

use std::path::Path;

use replog_core::model::{
    Exercise, ExerciseId, SetId, UserId, Workout, WorkoutDate, WorkoutId, WorkoutSet,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Current document version written by [`WorkoutSnapshot::from_workouts`].
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSnapshot {
    pub version: u32,
    #[serde(default)]
    pub workouts: Vec<WorkoutDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDoc {
    #[serde(default)]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub date: Option<WorkoutDate>,
    /// Whole minutes.
    #[serde(default)]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ExerciseDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDoc {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub sets: Vec<SetDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDoc {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl WorkoutSnapshot {
    #[must_use]
    pub fn from_workouts(workouts: &[Workout]) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            workouts: workouts.iter().map(WorkoutDoc::from_workout).collect(),
        }
    }

    /// Convert documents back into workouts.
    ///
    /// Documents without a `user_id` are assigned to `default_owner`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if an exercise or set violates
    /// the domain rules (blank name, negative weight).
    pub fn into_workouts(self, default_owner: UserId) -> Result<Vec<Workout>, StorageError> {
        self.workouts
            .into_iter()
            .map(|doc| doc.into_workout(default_owner))
            .collect()
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed JSON or a document
    /// written by a newer version.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        let snapshot: Self =
            serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StorageError::Serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the file cannot be read, or a
    /// serialization error for invalid content.
    pub fn read_file(path: &Path) -> Result<Self, StorageError> {
        let raw =
            std::fs::read_to_string(path).map_err(|e| StorageError::Connection(e.to_string()))?;
        Self::from_json(&raw)
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the file cannot be written.
    pub fn write_file(&self, path: &Path) -> Result<(), StorageError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| StorageError::Connection(e.to_string()))
    }
}

impl WorkoutDoc {
    fn from_workout(workout: &Workout) -> Self {
        Self {
            id: workout.id().value(),
            user_id: Some(workout.user_id()),
            date: workout.date().map(WorkoutDate::from),
            duration: workout.duration_minutes(),
            notes: workout.notes().map(str::to_owned),
            exercises: workout
                .exercises()
                .iter()
                .map(|exercise| ExerciseDoc {
                    id: exercise.id().value(),
                    name: exercise.name().to_owned(),
                    sets: exercise
                        .sets()
                        .iter()
                        .map(|set| SetDoc {
                            id: set.id().value(),
                            reps: set.reps(),
                            weight: set.weight(),
                            notes: set.notes().map(str::to_owned),
                            completed: set.is_completed(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn into_workout(self, default_owner: UserId) -> Result<Workout, StorageError> {
        let mut exercises = Vec::with_capacity(self.exercises.len());
        for exercise in self.exercises {
            let mut sets = Vec::with_capacity(exercise.sets.len());
            for set in exercise.sets {
                sets.push(
                    WorkoutSet::new(
                        SetId::new(set.id),
                        set.reps,
                        set.weight,
                        set.notes,
                        set.completed,
                    )
                    .map_err(|e| StorageError::Serialization(e.to_string()))?,
                );
            }
            exercises.push(
                Exercise::new(ExerciseId::new(exercise.id), exercise.name, sets)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?,
            );
        }
        Ok(Workout::new(
            WorkoutId::new(self.id),
            self.user_id.unwrap_or(default_owner),
            self.date.as_ref().and_then(WorkoutDate::normalize),
            self.duration,
            self.notes,
            exercises,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const LEGACY: &str = r#"{
        "version": 1,
        "workouts": [
            {
                "id": 1,
                "date": "2024-01-15T10:30:00Z",
                "duration": 45,
                "exercises": [
                    {
                        "id": 1,
                        "name": "Bench Press",
                        "sets": [
                            {"id": 1, "reps": 10, "weight": 100, "completed": true},
                            {"id": 2, "reps": 0, "weight": 0, "completed": false}
                        ]
                    }
                ]
            },
            {"id": 2, "date": 1705312800000, "duration": 30, "exercises": []},
            {"id": 3, "date": "not a date", "duration": 5, "exercises": []}
        ]
    }"#;

    #[test]
    fn reads_string_and_millisecond_dates() {
        let workouts = WorkoutSnapshot::from_json(LEGACY)
            .unwrap()
            .into_workouts(UserId::new(7))
            .unwrap();

        assert_eq!(workouts.len(), 3);
        assert_eq!(
            workouts[0].date(),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
        );
        assert_eq!(
            workouts[1].date(),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap())
        );
        assert_eq!(workouts[2].date(), None);
        assert_eq!(workouts[0].user_id(), UserId::new(7));
        assert_eq!(workouts[0].completed_sets(), 1);
        assert!(!workouts[0].exercises()[0].sets()[1].is_completed());
    }

    #[test]
    fn odd_date_values_become_undated_workouts() {
        for (raw, expected) in [
            (
                "1705312800000.5",
                Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()),
            ),
            ("true", None),
            ("{}", None),
            ("[1]", None),
            ("null", None),
        ] {
            let json = format!(
                r#"{{"version": 1, "workouts": [{{"id": 1, "date": {raw}, "duration": 30,
                    "exercises": [{{"id": 1, "name": "Squat", "sets": []}}]}}]}}"#
            );
            let workouts = WorkoutSnapshot::from_json(&json)
                .unwrap()
                .into_workouts(UserId::new(1))
                .unwrap();
            assert_eq!(workouts.len(), 1, "{raw}");
            assert_eq!(workouts[0].date(), expected, "{raw}");
            assert_eq!(workouts[0].duration_minutes(), 30);
        }
    }

    #[test]
    fn written_documents_read_back_equal() {
        let workouts = WorkoutSnapshot::from_json(LEGACY)
            .unwrap()
            .into_workouts(UserId::new(7))
            .unwrap();
        let json = WorkoutSnapshot::from_workouts(&workouts).to_json().unwrap();
        assert!(json.contains("\"2024-01-15T10:30:00+00:00\""));

        let again = WorkoutSnapshot::from_json(&json)
            .unwrap()
            .into_workouts(UserId::new(99))
            .unwrap();
        assert_eq!(again, workouts);
    }

    #[test]
    fn newer_versions_are_rejected() {
        let err = WorkoutSnapshot::from_json(r#"{"version": 2, "workouts": []}"#).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn invalid_sets_fail_the_import() {
        let raw = r#"{"version": 1, "workouts": [{"exercises": [
            {"name": "Row", "sets": [{"reps": 5, "weight": -10, "completed": true}]}
        ]}]}"#;
        let err = WorkoutSnapshot::from_json(raw)
            .unwrap()
            .into_workouts(UserId::new(1))
            .unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workouts.json");
        let snapshot = WorkoutSnapshot::from_json(LEGACY).unwrap();
        snapshot.write_file(&path).unwrap();
        assert_eq!(WorkoutSnapshot::read_file(&path).unwrap(), snapshot);
    }
}
