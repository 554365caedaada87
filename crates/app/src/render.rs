use chrono::{DateTime, Utc};
use replog_core::format::{
    format_duration, format_weight, history_date, last_performed_label, relative_day_label,
};
use replog_core::model::{Friend, Notification, Workout};
use replog_core::progress::{ExerciseProgress, WorkoutTotals};

pub fn workout(workout: &Workout, now: DateTime<Utc>) -> Vec<String> {
    let when = workout.date().map_or_else(
        || "Undated".to_owned(),
        |d| format!("{} ({})", history_date(d), relative_day_label(d, now)),
    );
    let mut lines = vec![format!(
        "#{} {} · {} · {}/{} sets",
        workout.id(),
        when,
        format_duration(workout.duration_minutes()),
        workout.completed_sets(),
        workout.total_sets()
    )];
    for exercise in workout.exercises() {
        let sets: Vec<String> = exercise
            .sets()
            .iter()
            .map(|s| {
                if s.is_completed() {
                    format!("{}x{}", format_weight(s.weight()), s.reps())
                } else {
                    "-".to_owned()
                }
            })
            .collect();
        lines.push(format!("  {}: {}", exercise.name(), sets.join(", ")));
    }
    if let Some(notes) = workout.notes() {
        lines.push(format!("  notes: {notes}"));
    }
    lines
}

pub fn progress(record: &ExerciseProgress, now: DateTime<Utc>) -> String {
    format!(
        "{:<24} {:>8} max · {:>3} reps · {:>3} sets · {:<9} · last {}",
        record.name,
        format_weight(record.max_weight),
        record.max_reps,
        record.total_completed_sets,
        record.trend().label(),
        last_performed_label(record.last_performed, now)
    )
}

pub fn totals(totals: &WorkoutTotals) -> String {
    format!(
        "{} workouts · {} exercises · {}/{} sets · {}",
        totals.workouts,
        totals.exercises,
        totals.completed_sets,
        totals.sets,
        format_duration(totals.duration_minutes)
    )
}

pub fn friend(friend: &Friend, now: DateTime<Utc>) -> String {
    let handle = if friend.username.is_empty() {
        String::new()
    } else {
        format!(" @{}", friend.username)
    };
    format!(
        "[{}] {}{} (#{}) · friends since {}",
        friend.initials(),
        friend.display_name,
        handle,
        friend.user_id,
        relative_day_label(friend.connected_at, now)
    )
}

pub fn notification(notification: &Notification, now: DateTime<Utc>) -> String {
    let marker = if notification.read { " " } else { "*" };
    format!(
        "{marker} #{} {}: {} ({})",
        notification.id,
        notification.title,
        notification.message,
        relative_day_label(notification.created_at, now)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use replog_core::model::{
        Exercise, ExerciseId, SetId, UserId, WorkoutId, WorkoutSet,
    };
    use replog_core::time::fixed_now;

    #[test]
    fn workout_lines_show_sets_and_skips() {
        let sets = vec![
            WorkoutSet::new(SetId::new(1), 10, 100.0, None, true).unwrap(),
            WorkoutSet::pending(SetId::new(2)),
        ];
        let exercise = Exercise::new(ExerciseId::new(1), "Bench Press", sets).unwrap();
        let w = Workout::new(
            WorkoutId::new(3),
            UserId::new(1),
            Some(fixed_now() - Duration::hours(5)),
            75,
            Some("good pump".into()),
            vec![exercise],
        );
        let lines = workout(&w, fixed_now());
        assert_eq!(
            lines[0],
            "#3 Tue, Nov 14, 2023 (Yesterday) · 1h 15m · 1/2 sets"
        );
        assert_eq!(lines[1], "  Bench Press: 100x10, -");
        assert_eq!(lines[2], "  notes: good pump");
    }

    #[test]
    fn undated_workouts_render() {
        let w = Workout::new(WorkoutId::new(1), UserId::new(1), None, 5, None, vec![]);
        assert!(workout(&w, fixed_now())[0].contains("Undated"));
    }
}
