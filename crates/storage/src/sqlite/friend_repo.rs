use chrono::{DateTime, Utc};
use replog_core::model::{
    FriendRequest, FriendRequestId, FriendRequestStatus, RequestTarget, UserId,
};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_friendship_row, map_request_row, request_id_from_i64};
use crate::repository::{FriendRepository, FriendshipRecord, NewFriendRequest, StorageError};

fn target_columns(target: &RequestTarget) -> Result<(Option<i64>, Option<&str>), StorageError> {
    Ok(match target {
        RequestTarget::User(user) => (Some(id_i64("to_user", user.value())?), None),
        RequestTarget::Email(email) => (None, Some(email.as_str())),
    })
}

#[async_trait::async_trait]
impl FriendRepository for SqliteRepository {
    async fn insert_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestId, StorageError> {
        let (to_user, to_email) = target_columns(&request.target)?;
        let res = sqlx::query(
            r"
            INSERT INTO friend_requests (from_user, to_user, to_email, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id_i64("from_user", request.from_user.value())?)
        .bind(to_user)
        .bind(to_email)
        .bind(FriendRequestStatus::Pending.as_str())
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        request_id_from_i64(res.last_insert_rowid())
    }

    async fn get_request(
        &self,
        id: FriendRequestId,
    ) -> Result<Option<FriendRequest>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, from_user, to_user, to_email, status, created_at
            FROM friend_requests WHERE id = ?1
            ",
        )
        .bind(id_i64("request_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_request_row).transpose()
    }

    async fn find_pending_request(
        &self,
        from_user: UserId,
        target: &RequestTarget,
    ) -> Result<Option<FriendRequest>, StorageError> {
        let (to_user, to_email) = target_columns(target)?;
        let row = sqlx::query(
            r"
            SELECT id, from_user, to_user, to_email, status, created_at
            FROM friend_requests
            WHERE from_user = ?1
              AND to_user IS ?2
              AND to_email IS ?3
              AND status = 'pending'
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(id_i64("from_user", from_user.value())?)
        .bind(to_user)
        .bind(to_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_request_row).transpose()
    }

    async fn set_request_status(
        &self,
        id: FriendRequestId,
        status: FriendRequestStatus,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE friend_requests SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(id_i64("request_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn insert_friendship(
        &self,
        a: UserId,
        b: UserId,
        connected_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let a = id_i64("user_id", a.value())?;
        let b = id_i64("user_id", b.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for (user_id, friend_user_id) in [(a, b), (b, a)] {
            sqlx::query(
                r"
                INSERT INTO friends (user_id, friend_user_id, connected_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id, friend_user_id) DO NOTHING
                ",
            )
            .bind(user_id)
            .bind(friend_user_id)
            .bind(connected_at)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn list_friends(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendshipRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, friend_user_id, connected_at
            FROM friends
            WHERE user_id = ?1
            ORDER BY connected_at ASC, friend_user_id ASC
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_friendship_row).collect()
    }
}
