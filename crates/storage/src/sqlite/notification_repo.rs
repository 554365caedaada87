use replog_core::model::{NewNotification, Notification, NotificationId, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_notification_row, notification_id_from_i64};
use crate::repository::{NotificationRepository, StorageError};

#[async_trait::async_trait]
impl NotificationRepository for SqliteRepository {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationId, StorageError> {
        let request_id = notification
            .request_id
            .map(|id| id_i64("request_id", id.value()))
            .transpose()?;

        let res = sqlx::query(
            r"
            INSERT INTO notifications (user_id, kind, title, message, request_id, from_user, read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
            ",
        )
        .bind(id_i64("user_id", notification.user_id.value())?)
        .bind(notification.kind.as_str())
        .bind(notification.title.as_str())
        .bind(notification.message.as_str())
        .bind(request_id)
        .bind(notification.from_user.as_deref())
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        notification_id_from_i64(res.last_insert_rowid())
    }

    async fn get_notification(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, kind, title, message, request_id, from_user, read, created_at
            FROM notifications WHERE id = ?1
            ",
        )
        .bind(id_i64("notification_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_notification_row).transpose()
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, kind, title, message, request_id, from_user, read, created_at
            FROM notifications
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_notification_row).collect()
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?1")
            .bind(id_i64("notification_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
