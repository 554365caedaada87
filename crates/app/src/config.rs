use std::path::{Path, PathBuf};

use replog_core::model::UserId;
use services::InviteConfig;

pub const DEFAULT_DB_URL: &str = "sqlite:replog.sqlite3";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings read from `REPLOG_*` variables; flags override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub user_id: UserId,
    pub invites: InviteConfig,
    pub log_filter: String,
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            db_url: var("REPLOG_DB_URL").map_or_else(
                || normalize_sqlite_url(DEFAULT_DB_URL.to_owned()),
                normalize_sqlite_url,
            ),
            user_id: var("REPLOG_USER_ID")
                .and_then(|v| v.parse().ok())
                .unwrap_or(UserId::new(1)),
            invites: InviteConfig::from_env(),
            log_filter: var("REPLOG_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
        }
    }
}

/// Turn `sqlite:relative.db` into an absolute `sqlite://` URL; in-memory
/// and already absolute URLs pass through.
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.contains("mode=memory") {
        return raw;
    }

    let trimmed = raw.trim().to_owned();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_owned();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its directory so `SQLite` can open it.
///
/// # Errors
///
/// Returns an I/O error if the directory or file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> std::io::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Ok(());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}
