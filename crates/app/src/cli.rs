use std::fmt;
use std::path::PathBuf;

use replog_core::model::{NotificationId, UserId};

use crate::config::{Config, normalize_sqlite_url};

#[derive(Debug, PartialEq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidUserId { raw: String },
    InvalidNotificationId { raw: String },
    InvalidMinutes { raw: String },
    InvalidSet { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid user id: {raw}"),
            ArgsError::InvalidNotificationId { raw } => {
                write!(f, "invalid notification id: {raw}")
            }
            ArgsError::InvalidMinutes { raw } => write!(f, "invalid --minutes value: {raw}"),
            ArgsError::InvalidSet { raw } => {
                write!(f, "invalid --set value (expected NAME:WEIGHTxREPS or NAME:skip): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

/// One `--set` of the `log` command.
#[derive(Debug, Clone, PartialEq)]
pub struct SetSpec {
    pub exercise: String,
    /// `None` for a set that was added but not done.
    pub performed: Option<(f64, u32)>,
}

impl SetSpec {
    /// Parse `Bench Press:100x10` or `Bench Press:skip`.
    pub fn parse(raw: &str) -> Result<Self, ArgsError> {
        let invalid = || ArgsError::InvalidSet {
            raw: raw.to_owned(),
        };
        let (name, value) = raw.rsplit_once(':').ok_or_else(invalid)?;
        if name.trim().is_empty() {
            return Err(invalid());
        }
        let value = value.trim();
        let performed = if value.eq_ignore_ascii_case("skip") {
            None
        } else {
            let (weight, reps) = value
                .split_once(['x', 'X'])
                .ok_or_else(invalid)?;
            let weight: f64 = weight.trim().parse().map_err(|_| invalid())?;
            let reps: u32 = reps.trim().parse().map_err(|_| invalid())?;
            Some((weight, reps))
        };
        Ok(Self {
            exercise: name.trim().to_owned(),
            performed,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    History { exercise: Option<String> },
    Progress { search: Option<String> },
    Exercises { search: Option<String> },
    Log {
        minutes: u32,
        notes: Option<String>,
        sets: Vec<SetSpec>,
    },
    Friends,
    AddFriend { email: String },
    Friend { friend: UserId },
    Notifications,
    Accept { notification: NotificationId },
    Deny { notification: NotificationId },
    Export { path: PathBuf },
    Import { path: PathBuf },
    Help,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_notification(raw: Option<String>) -> Result<NotificationId, ArgsError> {
    let raw = raw.ok_or(ArgsError::MissingArgument {
        what: "notification id",
    })?;
    raw.parse()
        .map_err(|_| ArgsError::InvalidNotificationId { raw })
}

/// Parse `[command] [args] [--db URL] [--user ID]`, applying overrides to `config`.
///
/// With no command, `history` is shown.
pub fn parse(
    argv: impl IntoIterator<Item = String>,
    config: &mut Config,
) -> Result<Command, ArgsError> {
    let mut args = argv.into_iter();
    let mut positional: Vec<String> = Vec::new();
    let mut exercise = None;
    let mut search = None;
    let mut minutes = 0_u32;
    let mut notes = None;
    let mut sets = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(&mut args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                config.db_url = normalize_sqlite_url(value);
            }
            "--user" => {
                let value = require_value(&mut args, "--user")?;
                config.user_id = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
            }
            "--exercise" => exercise = Some(require_value(&mut args, "--exercise")?),
            "--search" => search = Some(require_value(&mut args, "--search")?),
            "--notes" => notes = Some(require_value(&mut args, "--notes")?),
            "--minutes" => {
                let value = require_value(&mut args, "--minutes")?;
                minutes = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidMinutes { raw: value.clone() })?;
            }
            "--set" => sets.push(SetSpec::parse(&require_value(&mut args, "--set")?)?),
            "--help" | "-h" => return Ok(Command::Help),
            flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = positional.next();
    let command = match command.as_deref() {
        None | Some("history") => Command::History { exercise },
        Some("progress") => Command::Progress { search },
        Some("exercises") => Command::Exercises { search },
        Some("log") => {
            if sets.is_empty() {
                return Err(ArgsError::MissingArgument { what: "--set" });
            }
            Command::Log {
                minutes,
                notes,
                sets,
            }
        }
        Some("friends") => Command::Friends,
        Some("add-friend") => Command::AddFriend {
            email: positional.next().ok_or(ArgsError::MissingArgument { what: "email" })?,
        },
        Some("friend") => {
            let raw = positional
                .next()
                .ok_or(ArgsError::MissingArgument { what: "friend id" })?;
            Command::Friend {
                friend: raw
                    .parse()
                    .map_err(|_| ArgsError::InvalidUserId { raw: raw.clone() })?,
            }
        }
        Some("notifications") => Command::Notifications,
        Some("accept") => Command::Accept {
            notification: parse_notification(positional.next())?,
        },
        Some("deny") => Command::Deny {
            notification: parse_notification(positional.next())?,
        },
        Some("export") => Command::Export {
            path: positional
                .next()
                .ok_or(ArgsError::MissingArgument { what: "file path" })?
                .into(),
        },
        Some("import") => Command::Import {
            path: positional
                .next()
                .ok_or(ArgsError::MissingArgument { what: "file path" })?
                .into(),
        },
        Some("help") => Command::Help,
        Some(other) => return Err(ArgsError::UnknownCommand(other.to_owned())),
    };

    if let Some(extra) = positional.next() {
        return Err(ArgsError::UnknownArg(extra));
    }
    Ok(command)
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  replog [command] [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  history [--exercise <name>]     Workouts, newest first (default)");
    eprintln!("  progress [--search <term>]      Per-exercise progress and trend");
    eprintln!("  exercises [--search <term>]     Built-in exercise names");
    eprintln!("  log --set <NAME:WxR> ...        Log a finished workout");
    eprintln!("      [--minutes <n>] [--notes <text>]   (use NAME:skip for an undone set)");
    eprintln!("  friends                         Friend list");
    eprintln!("  add-friend <email>              Send a friend request or invitation");
    eprintln!("  friend <user_id>                A friend's workout summary");
    eprintln!("  notifications                   Notifications, newest first");
    eprintln!("  accept <notification_id>        Accept a friend request");
    eprintln!("  deny <notification_id>          Deny a friend request");
    eprintln!("  export <file>                   Write workouts to a JSON snapshot");
    eprintln!("  import <file>                   Load workouts from a JSON snapshot");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>               SQLite URL (default: sqlite:replog.sqlite3)");
    eprintln!("  --user <id>                     Acting user id (default: 1)");
    eprintln!("  -h, --help                      Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  REPLOG_DB_URL, REPLOG_USER_ID, REPLOG_INVITE_URL, REPLOG_APP_URL, REPLOG_LOG");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            db_url: "sqlite::memory:".into(),
            user_id: UserId::new(1),
            invites: services::InviteConfig::default(),
            log_filter: "info".into(),
        }
    }

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn no_command_shows_history() {
        let mut cfg = config();
        assert_eq!(
            parse(args(&[]), &mut cfg).unwrap(),
            Command::History { exercise: None }
        );
    }

    #[test]
    fn global_flags_override_config() {
        let mut cfg = config();
        let cmd = parse(args(&["friends", "--user", "7", "--db", "sqlite::memory:"]), &mut cfg)
            .unwrap();
        assert_eq!(cmd, Command::Friends);
        assert_eq!(cfg.user_id, UserId::new(7));
    }

    #[test]
    fn log_collects_sets() {
        let mut cfg = config();
        let cmd = parse(
            args(&[
                "log",
                "--minutes",
                "45",
                "--set",
                "Bench Press:100x10",
                "--set",
                "Bench Press:skip",
            ]),
            &mut cfg,
        )
        .unwrap();
        let Command::Log { minutes, sets, .. } = cmd else {
            panic!("expected log command");
        };
        assert_eq!(minutes, 45);
        assert_eq!(sets[0].performed, Some((100.0, 10)));
        assert_eq!(sets[1].exercise, "Bench Press");
        assert_eq!(sets[1].performed, None);
    }

    #[test]
    fn exercises_takes_a_search_term() {
        let mut cfg = config();
        assert_eq!(
            parse(args(&["exercises", "--search", "curl"]), &mut cfg).unwrap(),
            Command::Exercises {
                search: Some("curl".into())
            }
        );
    }

    #[test]
    fn malformed_values_are_reported() {
        let mut cfg = config();
        assert!(matches!(
            parse(args(&["log", "--set", "Row"]), &mut cfg),
            Err(ArgsError::InvalidSet { .. })
        ));
        assert!(matches!(
            parse(args(&["log"]), &mut cfg),
            Err(ArgsError::MissingArgument { what: "--set" })
        ));
        assert!(matches!(
            parse(args(&["accept", "abc"]), &mut cfg),
            Err(ArgsError::InvalidNotificationId { .. })
        ));
        assert!(matches!(
            parse(args(&["dance"]), &mut cfg),
            Err(ArgsError::UnknownCommand(_))
        ));
    }
}
