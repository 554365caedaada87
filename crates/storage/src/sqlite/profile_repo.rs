use replog_core::model::{EmailAddress, Profile, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_profile_row};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        let user_id = id_i64("user_id", profile.user_id().value())?;

        let taken = sqlx::query("SELECT 1 FROM profiles WHERE email = ?1 AND user_id <> ?2")
            .bind(profile.email().as_str())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        if taken.is_some() {
            return Err(StorageError::Conflict);
        }

        sqlx::query(
            r"
            INSERT INTO profiles (user_id, username, display_name, email, avatar_url)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                display_name = excluded.display_name,
                email = excluded.email,
                avatar_url = excluded.avatar_url
            ",
        )
        .bind(user_id)
        .bind(profile.username())
        .bind(profile.display_name())
        .bind(profile.email().as_str())
        .bind(profile.avatar_url())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, username, display_name, email, avatar_url
            FROM profiles WHERE user_id = ?1
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, username, display_name, email, avatar_url
            FROM profiles WHERE email = ?1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_profile_row).transpose()
    }
}
