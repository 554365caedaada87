mod cli;
mod config;
mod render;

use replog_core::capture::ActiveWorkout;
use replog_core::catalog;
use replog_core::model::{SetInput, UserId};
use replog_core::progress::filter_progress;
use services::{AppServices, Clock};
use storage::snapshot::WorkoutSnapshot;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, SetSpec};
use crate::config::{Config, prepare_sqlite_file};

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Replay `--set` values through the capture flow; repeated names share one exercise.
fn build_workout(
    clock: Clock,
    minutes: u32,
    notes: Option<String>,
    sets: &[SetSpec],
) -> Result<ActiveWorkout, Box<dyn std::error::Error>> {
    let started_at = clock.now() - chrono::Duration::minutes(i64::from(minutes));
    let mut active = ActiveWorkout::start(started_at);
    active.set_notes(notes);
    for entry in sets {
        let name = catalog::canonical_name(&entry.exercise).unwrap_or_default();
        let existing = active
            .exercises()
            .iter()
            .find(|e| e.matches_name(&name))
            .map(replog_core::model::Exercise::id);
        let exercise = match existing {
            Some(id) => id,
            None => active.add_exercise(&name)?,
        };
        let set = active.add_set(exercise)?;
        if let Some((weight, reps)) = entry.performed {
            active.complete_set(exercise, set, SetInput::new(reps, weight))?;
        }
    }
    Ok(active)
}

async fn execute(
    command: Command,
    services: &AppServices,
    clock: Clock,
    user: UserId,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = clock.now();
    match command {
        Command::Help => cli::print_usage(),
        Command::History { exercise } => {
            let workouts = match exercise {
                Some(name) => services.workouts().exercise_history(user, &name).await?,
                None => services.workouts().list_workouts(user).await?,
            };
            if workouts.is_empty() {
                println!("No workouts yet.");
            }
            for workout in &workouts {
                for line in render::workout(workout, now) {
                    println!("{line}");
                }
            }
        }
        Command::Progress { search } => {
            let progress = services.workouts().progress(user).await?;
            let shown = filter_progress(&progress, search.as_deref().unwrap_or(""));
            if shown.is_empty() {
                println!("No exercises found.");
            }
            for record in shown {
                println!("{}", render::progress(record, now));
            }
        }
        Command::Exercises { search } => {
            let names = catalog::search(search.as_deref().unwrap_or(""));
            if names.is_empty() {
                println!("No exercises found. Any other name can be logged as a custom exercise.");
            }
            for name in names {
                println!("{name}");
            }
        }
        Command::Log {
            minutes,
            notes,
            sets,
        } => {
            let mut active = build_workout(clock, minutes, notes, &sets)?;
            let workout = services.workouts().save_finished(&mut active, user).await?;
            println!("Workout saved!");
            for line in render::workout(&workout, now) {
                println!("{line}");
            }
        }
        Command::Friends => {
            let friends = services.friends().list_friends(user).await?;
            if friends.is_empty() {
                println!("No workout buddies yet. Invite someone with `add-friend <email>`.");
            }
            for friend in &friends {
                println!("{}", render::friend(friend, now));
            }
        }
        Command::AddFriend { email } => {
            let message = services.friends().send_friend_request(user, &email).await?;
            println!("{message}");
        }
        Command::Friend { friend } => {
            let view = services.friends().friend_progress(user, friend).await?;
            println!("{}", view.friend.display_name);
            println!("{}", render::totals(&view.totals));
            if let Some(last) = &view.last_workout {
                println!("Last workout:");
                for line in render::workout(last, now) {
                    println!("  {line}");
                }
            }
            for record in &view.progress {
                println!("{}", render::progress(record, now));
            }
        }
        Command::Notifications => {
            let notifications = services.notifications();
            let all = notifications.list(user).await?;
            println!("{} unread", notifications.unread_count(user).await?);
            for notification in &all {
                println!("{}", render::notification(notification, now));
            }
        }
        Command::Accept { notification } => {
            let message = services.friends().accept_request(user, notification).await?;
            println!("{message}");
        }
        Command::Deny { notification } => {
            services.friends().deny_request(user, notification).await?;
            println!("Friend request denied.");
        }
        Command::Export { path } => {
            let workouts = services.workouts().list_workouts(user).await?;
            WorkoutSnapshot::from_workouts(&workouts).write_file(&path)?;
            println!("Exported {} workouts to {}", workouts.len(), path.display());
        }
        Command::Import { path } => {
            let workouts = WorkoutSnapshot::read_file(&path)?.into_workouts(user)?;
            let stored = services.workouts().import(user, workouts).await?;
            println!("Imported {stored} workouts from {}", path.display());
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env();
    let command = cli::parse(std::env::args().skip(1), &mut config).map_err(|e| {
        eprintln!("{e}");
        cli::print_usage();
        e
    })?;
    if command == Command::Help {
        cli::print_usage();
        return Ok(());
    }

    init_tracing(&config.log_filter);
    tracing::debug!(db_url = %config.db_url, user_id = %config.user_id, "starting");

    // Migrations run inside AppServices::new_sqlite.
    prepare_sqlite_file(&config.db_url)?;
    let clock = Clock::default_clock();
    let services = AppServices::new_sqlite(&config.db_url, clock, &config.invites).await?;

    execute(command, &services, clock, config.user_id).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replog_core::time::fixed_clock;

    #[tokio::test]
    async fn logged_sets_reach_progress() {
        let services = AppServices::in_memory(fixed_clock());
        let user = UserId::new(1);
        let sets = vec![
            SetSpec::parse("Bench Press:100x10").unwrap(),
            SetSpec::parse("Squat:140x5").unwrap(),
            SetSpec::parse("bench press:105x8").unwrap(),
            SetSpec::parse("Squat:skip").unwrap(),
        ];
        execute(
            Command::Log {
                minutes: 50,
                notes: None,
                sets,
            },
            &services,
            fixed_clock(),
            user,
        )
        .await
        .unwrap();

        let saved = services.workouts().last_workout(user).await.unwrap().unwrap();
        assert_eq!(saved.duration_minutes(), 50);
        assert_eq!(saved.exercises().len(), 2);
        assert_eq!(saved.exercises()[0].sets().len(), 2);
        assert_eq!(saved.completed_sets(), 3);

        let progress = services.workouts().progress(user).await.unwrap();
        assert_eq!(progress[0].name, "Bench Press");
        assert_eq!(progress[0].max_weight, 105.0);
    }

    #[tokio::test]
    async fn catalogue_names_are_normalized_when_logging() {
        let services = AppServices::in_memory(fixed_clock());
        let user = UserId::new(1);
        let sets = vec![
            SetSpec::parse("deadlift:180x3").unwrap(),
            SetSpec::parse("  Sled Push :40x10").unwrap(),
        ];
        execute(
            Command::Log {
                minutes: 30,
                notes: None,
                sets,
            },
            &services,
            fixed_clock(),
            user,
        )
        .await
        .unwrap();

        let saved = services.workouts().last_workout(user).await.unwrap().unwrap();
        let names: Vec<&str> = saved.exercises().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["Deadlift", "Sled Push"]);
    }
}
