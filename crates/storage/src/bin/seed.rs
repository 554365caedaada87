use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use replog_core::capture::ActiveWorkout;
use replog_core::model::{
    EmailAddress, NewNotification, NewWorkout, Profile, RequestTarget, SetInput, UserId,
    sender_label,
};
use storage::repository::{NewFriendRequest, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    weeks: u32,
    seed: u64,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidWeeks { raw: String },
    InvalidSeed { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidWeeks { raw } => write!(f, "invalid --weeks value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("REPLOG_DB_URL").unwrap_or_else(|_| "sqlite:replog.sqlite3".into());
        let mut weeks = std::env::var("REPLOG_SEED_WEEKS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(4);
        let mut seed = std::env::var("REPLOG_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(7);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--weeks" => {
                    let value = require_value(&mut args, "--weeks")?;
                    weeks = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidWeeks { raw: value.clone() })?;
                }
                "--seed" => {
                    let value = require_value(&mut args, "--seed")?;
                    seed = value
                        .parse::<u64>()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            weeks,
            seed,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:replog.sqlite3)");
    eprintln!("  --weeks <n>               Weeks of training history per user (default: 4)");
    eprintln!("  --seed <n>                Random seed for weights and reps (default: 7)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  REPLOG_DB_URL, REPLOG_SEED_WEEKS, REPLOG_SEED");
}

/// Exercise name and starting working weight.
const PUSH_DAY: [(&str, f64); 3] = [("Bench Press", 80.0), ("Overhead Press", 45.0), ("Dips", 0.0)];
const PULL_DAY: [(&str, f64); 3] = [("Deadlift", 120.0), ("Barbell Row", 60.0), ("Pull Up", 0.0)];
const LEG_DAY: [(&str, f64); 2] = [("Squat", 100.0), ("Romanian Deadlift", 70.0)];

fn demo_workout(
    rng: &mut StdRng,
    user: UserId,
    plan: &[(&str, f64)],
    week: u32,
    finished_at: DateTime<Utc>,
) -> Result<NewWorkout, Box<dyn std::error::Error>> {
    let minutes = rng.random_range(35..75);
    let mut active = ActiveWorkout::start(finished_at - Duration::minutes(minutes));
    for (name, base) in plan {
        let exercise = active.add_exercise(name)?;
        let weight = if *base > 0.0 {
            base + 2.5 * f64::from(week) + 2.5 * f64::from(rng.random_range(0..2_u8))
        } else {
            0.0
        };
        for _ in 0..3 {
            let set = active.add_set(exercise)?;
            // Roughly one set in ten is left undone.
            if rng.random_range(0..10) > 0 {
                let reps = rng.random_range(5..=10);
                active.complete_set(exercise, set, SetInput::new(reps, weight))?;
            }
        }
    }
    Ok(active.finish(user, finished_at)?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let mut rng = StdRng::seed_from_u64(args.seed);

    let people = [
        (1, "mike", "Mike Wilson", "mike@demo.com"),
        (2, "sarah", "Sarah Smith", "sarah@demo.com"),
        (3, "alex", "Alex Chen", "alex@demo.com"),
    ];
    let mut profiles = Vec::with_capacity(people.len());
    for (id, username, display, email) in people {
        let profile = Profile::new(
            UserId::new(id),
            username,
            Some(display.to_owned()),
            EmailAddress::parse(email)?,
        )?;
        storage.profiles.upsert_profile(&profile).await?;
        profiles.push(profile);
    }

    let mut workouts = 0_u32;
    for profile in &profiles {
        for week in 0..args.weeks {
            let week_start = now - Duration::weeks(i64::from(args.weeks - week));
            for (offset, plan) in [(1, &PUSH_DAY[..]), (3, &PULL_DAY[..]), (5, &LEG_DAY[..])] {
                let at = week_start + Duration::days(offset) + Duration::hours(18);
                if at > now {
                    continue;
                }
                let draft = demo_workout(&mut rng, profile.user_id(), plan, week, at)?;
                storage.workouts.insert_workout(&draft).await?;
                workouts += 1;
            }
        }
    }

    let (mike, sarah, alex) = (&profiles[0], &profiles[1], &profiles[2]);
    storage
        .friends
        .insert_friendship(mike.user_id(), sarah.user_id(), now - Duration::days(10))
        .await?;

    let target = RequestTarget::User(mike.user_id());
    if storage
        .friends
        .find_pending_request(alex.user_id(), &target)
        .await?
        .is_none()
    {
        let request_id = storage
            .friends
            .insert_request(&NewFriendRequest {
                from_user: alex.user_id(),
                target,
                created_at: now,
            })
            .await?;
        let sender = sender_label(Some(alex));
        storage
            .notifications
            .insert_notification(&NewNotification::friend_request(
                mike.user_id(),
                &sender,
                request_id,
                now,
            ))
            .await?;
    }

    println!(
        "Seeded {} profiles and {} workouts into {}",
        profiles.len(),
        workouts,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
