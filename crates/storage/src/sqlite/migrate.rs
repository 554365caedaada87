use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Applies pending schema versions in order.
///
/// Version 1 creates profiles, workouts with their exercises and sets, the
/// social tables (requests, friendships, notifications) and their indexes.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        let statements = [
            r"
                CREATE TABLE IF NOT EXISTS profiles (
                    user_id INTEGER PRIMARY KEY,
                    username TEXT NOT NULL,
                    display_name TEXT,
                    email TEXT NOT NULL UNIQUE,
                    avatar_url TEXT
                );
            ",
            // Dates are stored as text and parsed leniently on read.
            r"
                CREATE TABLE IF NOT EXISTS workouts (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    date TEXT,
                    duration_minutes INTEGER NOT NULL CHECK (duration_minutes >= 0),
                    notes TEXT
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS exercises (
                    id INTEGER PRIMARY KEY,
                    workout_id INTEGER NOT NULL,
                    local_id INTEGER NOT NULL,
                    position INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    FOREIGN KEY (workout_id) REFERENCES workouts(id) ON DELETE CASCADE
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS sets (
                    id INTEGER PRIMARY KEY,
                    exercise_id INTEGER NOT NULL,
                    local_id INTEGER NOT NULL,
                    position INTEGER NOT NULL,
                    reps INTEGER NOT NULL CHECK (reps >= 0),
                    weight REAL NOT NULL CHECK (weight >= 0),
                    notes TEXT,
                    completed INTEGER NOT NULL CHECK (completed IN (0, 1)),
                    FOREIGN KEY (exercise_id) REFERENCES exercises(id) ON DELETE CASCADE
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS friend_requests (
                    id INTEGER PRIMARY KEY,
                    from_user INTEGER NOT NULL,
                    to_user INTEGER,
                    to_email TEXT,
                    status TEXT NOT NULL CHECK (status IN ('pending', 'accepted', 'denied')),
                    created_at TEXT NOT NULL,
                    CHECK ((to_user IS NULL) <> (to_email IS NULL))
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS friends (
                    user_id INTEGER NOT NULL,
                    friend_user_id INTEGER NOT NULL,
                    connected_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, friend_user_id)
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS notifications (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    kind TEXT NOT NULL,
                    title TEXT NOT NULL,
                    message TEXT NOT NULL,
                    request_id INTEGER,
                    from_user TEXT,
                    read INTEGER NOT NULL DEFAULT 0 CHECK (read IN (0, 1)),
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (request_id) REFERENCES friend_requests(id) ON DELETE SET NULL
                );
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_workouts_user_date
                    ON workouts (user_id, date);
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_exercises_workout_position
                    ON exercises (workout_id, position);
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_sets_exercise_position
                    ON sets (exercise_id, position);
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_friend_requests_pending
                    ON friend_requests (from_user, status);
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_notifications_user_created
                    ON notifications (user_id, created_at);
            ",
        ];

        for statement in statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
