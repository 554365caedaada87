use std::sync::Arc;

use replog_core::model::{Notification, NotificationId, UserId};
use storage::repository::NotificationRepository;

use crate::error::NotificationServiceError;

#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    #[must_use]
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Notifications for `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotificationServiceError::Storage` if repository access fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Notification>, NotificationServiceError> {
        Ok(self.notifications.list_notifications(user_id).await?)
    }

    /// # Errors
    ///
    /// Returns `NotificationServiceError::Storage` if repository access fails.
    pub async fn unread_count(&self, user_id: UserId) -> Result<usize, NotificationServiceError> {
        let all = self.notifications.list_notifications(user_id).await?;
        Ok(all.iter().filter(|n| !n.read).count())
    }

    /// Mark one of the user's notifications as read.
    ///
    /// # Errors
    ///
    /// Returns `NotificationServiceError::NotFound` if the notification does
    /// not exist or belongs to someone else.
    pub async fn mark_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<(), NotificationServiceError> {
        let notification = self
            .notifications
            .get_notification(id)
            .await?
            .filter(|n| n.user_id == user_id)
            .ok_or(NotificationServiceError::NotFound)?;
        if !notification.read {
            self.notifications.mark_read(id).await?;
        }
        Ok(())
    }
}
