use std::sync::Arc;

use replog_core::model::UserId;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::friend_service::FriendService;
use crate::invite::{InviteConfig, InviteSender, sender_from_config};
use crate::notification_service::NotificationService;
use crate::workout_log::WorkoutLog;
use crate::workout_service::WorkoutService;

/// Assembles app-facing services over one `Storage`.
#[derive(Clone)]
pub struct AppServices {
    workouts: Arc<WorkoutService>,
    friends: Arc<FriendService>,
    notifications: Arc<NotificationService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        invites: &InviteConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, sender_from_config(invites)))
    }

    /// Build services over in-memory storage, logging invites.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        let config = InviteConfig::default();
        Self::from_storage(&Storage::in_memory(), clock, sender_from_config(&config))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, invites: Arc<dyn InviteSender>) -> Self {
        let workouts = Arc::new(WorkoutService::new(clock, Arc::clone(&storage.workouts)));
        let friends = Arc::new(FriendService::new(
            clock,
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.friends),
            Arc::clone(&storage.notifications),
            Arc::clone(&storage.workouts),
            invites,
        ));
        let notifications = Arc::new(NotificationService::new(Arc::clone(
            &storage.notifications,
        )));

        Self {
            workouts,
            friends,
            notifications,
        }
    }

    #[must_use]
    pub fn workouts(&self) -> Arc<WorkoutService> {
        Arc::clone(&self.workouts)
    }

    #[must_use]
    pub fn friends(&self) -> Arc<FriendService> {
        Arc::clone(&self.friends)
    }

    #[must_use]
    pub fn notifications(&self) -> Arc<NotificationService> {
        Arc::clone(&self.notifications)
    }

    /// Fresh, empty workout log for `user_id`; call `refresh` to load it.
    #[must_use]
    pub fn workout_log(&self, user_id: UserId) -> WorkoutLog {
        WorkoutLog::new(user_id, self.workouts())
    }
}
