use async_trait::async_trait;
use chrono::{DateTime, Utc};
use replog_core::model::{
    EmailAddress, FriendRequest, FriendRequestId, FriendRequestStatus, NewNotification,
    NewWorkout, Notification, NotificationId, Profile, RequestTarget, UserId, Workout, WorkoutId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Friend request before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFriendRequest {
    pub from_user: UserId,
    pub target: RequestTarget,
    pub created_at: DateTime<Utc>,
}

impl NewFriendRequest {
    #[must_use]
    pub fn into_request(self, id: FriendRequestId) -> FriendRequest {
        FriendRequest {
            id,
            from_user: self.from_user,
            target: self.target,
            status: FriendRequestStatus::Pending,
            created_at: self.created_at,
        }
    }
}

/// One side of an accepted friendship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendshipRecord {
    pub user_id: UserId,
    pub friend_user_id: UserId,
    pub connected_at: DateTime<Utc>,
}

/// Repository contract for finished workouts.
#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    /// Persist a finished workout with its exercises and sets, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the workout cannot be stored. Nothing is
    /// stored when an error is returned.
    async fn insert_workout(&self, workout: &NewWorkout) -> Result<WorkoutId, StorageError>;

    /// Persist several workouts at once, returning their ids in input order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any workout cannot be stored; the batch is
    /// all-or-nothing.
    async fn insert_workouts(
        &self,
        workouts: &[NewWorkout],
    ) -> Result<Vec<WorkoutId>, StorageError>;

    /// Fetch a workout by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_workout(&self, id: WorkoutId) -> Result<Option<Workout>, StorageError>;

    /// All workouts of a user, newest first. Undated workouts come last.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_workouts(&self, user_id: UserId) -> Result<Vec<Workout>, StorageError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert or replace a profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email belongs to another user.
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Profile>, StorageError>;
}

#[async_trait]
pub trait FriendRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn insert_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_request(&self, id: FriendRequestId)
    -> Result<Option<FriendRequest>, StorageError>;

    /// Pending request from `from_user` to `target`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_pending_request(
        &self,
        from_user: UserId,
        target: &RequestTarget,
    ) -> Result<Option<FriendRequest>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the request does not exist.
    async fn set_request_status(
        &self,
        id: FriendRequestId,
        status: FriendRequestStatus,
    ) -> Result<(), StorageError>;

    /// Record an accepted friendship in both directions.
    ///
    /// Re-inserting an existing friendship is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn insert_friendship(
        &self,
        a: UserId,
        b: UserId,
        connected_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Accepted friendships of `user_id`, oldest connection first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_friends(&self, user_id: UserId)
    -> Result<Vec<FriendshipRecord>, StorageError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_notification(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, StorageError>;

    /// Notifications for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_notifications(&self, user_id: UserId)
    -> Result<Vec<Notification>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the notification does not exist.
    async fn mark_read(&self, id: NotificationId) -> Result<(), StorageError>;
}

/// Newest first by date; undated workouts sort as the epoch. Ties keep input order.
pub(crate) fn sort_newest_first(workouts: &mut [Workout]) {
    workouts.sort_by_key(|w| std::cmp::Reverse(w.sort_key()));
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    next_id: u64,
    workouts: Vec<Workout>,
    profiles: HashMap<UserId, Profile>,
    requests: Vec<FriendRequest>,
    friendships: Vec<FriendshipRecord>,
    notifications: Vec<Notification>,
}

impl MemoryState {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl WorkoutRepository for InMemoryRepository {
    async fn insert_workout(&self, workout: &NewWorkout) -> Result<WorkoutId, StorageError> {
        let mut guard = self.lock()?;
        let id = WorkoutId::new(guard.allocate());
        guard.workouts.push(workout.clone().into_workout(id));
        Ok(id)
    }

    async fn insert_workouts(
        &self,
        workouts: &[NewWorkout],
    ) -> Result<Vec<WorkoutId>, StorageError> {
        let mut guard = self.lock()?;
        let mut ids = Vec::with_capacity(workouts.len());
        for workout in workouts {
            let id = WorkoutId::new(guard.allocate());
            guard.workouts.push(workout.clone().into_workout(id));
            ids.push(id);
        }
        Ok(ids)
    }

    async fn get_workout(&self, id: WorkoutId) -> Result<Option<Workout>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.workouts.iter().find(|w| w.id() == id).cloned())
    }

    async fn list_workouts(&self, user_id: UserId) -> Result<Vec<Workout>, StorageError> {
        let guard = self.lock()?;
        let mut out: Vec<Workout> = guard
            .workouts
            .iter()
            .rev()
            .filter(|w| w.user_id() == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let taken = guard
            .profiles
            .values()
            .any(|p| p.email() == profile.email() && p.user_id() != profile.user_id());
        if taken {
            return Err(StorageError::Conflict);
        }
        guard.profiles.insert(profile.user_id(), profile.clone());
        Ok(())
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.profiles.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Profile>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.profiles.values().find(|p| p.email() == email).cloned())
    }
}

#[async_trait]
impl FriendRepository for InMemoryRepository {
    async fn insert_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestId, StorageError> {
        let mut guard = self.lock()?;
        let id = FriendRequestId::new(guard.allocate());
        guard.requests.push(request.clone().into_request(id));
        Ok(id)
    }

    async fn get_request(
        &self,
        id: FriendRequestId,
    ) -> Result<Option<FriendRequest>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_pending_request(
        &self,
        from_user: UserId,
        target: &RequestTarget,
    ) -> Result<Option<FriendRequest>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .requests
            .iter()
            .find(|r| {
                r.from_user == from_user
                    && &r.target == target
                    && r.status == FriendRequestStatus::Pending
            })
            .cloned())
    }

    async fn set_request_status(
        &self,
        id: FriendRequestId,
        status: FriendRequestStatus,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let request = guard
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StorageError::NotFound)?;
        request.status = status;
        Ok(())
    }

    async fn insert_friendship(
        &self,
        a: UserId,
        b: UserId,
        connected_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        for (user_id, friend_user_id) in [(a, b), (b, a)] {
            let exists = guard
                .friendships
                .iter()
                .any(|f| f.user_id == user_id && f.friend_user_id == friend_user_id);
            if !exists {
                guard.friendships.push(FriendshipRecord {
                    user_id,
                    friend_user_id,
                    connected_at,
                });
            }
        }
        Ok(())
    }

    async fn list_friends(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendshipRecord>, StorageError> {
        let guard = self.lock()?;
        let mut out: Vec<FriendshipRecord> = guard
            .friendships
            .iter()
            .filter(|f| f.user_id == user_id)
            .copied()
            .collect();
        out.sort_by_key(|f| f.connected_at);
        Ok(out)
    }
}

#[async_trait]
impl NotificationRepository for InMemoryRepository {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationId, StorageError> {
        let mut guard = self.lock()?;
        let id = NotificationId::new(guard.allocate());
        guard
            .notifications
            .push(notification.clone().into_notification(id));
        Ok(id)
    }

    async fn get_notification(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, StorageError> {
        let guard = self.lock()?;
        let mut out: Vec<Notification> = guard
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let notification = guard
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(StorageError::NotFound)?;
        notification.read = true;
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub workouts: Arc<dyn WorkoutRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub friends: Arc<dyn FriendRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            workouts: Arc::new(repo.clone()),
            profiles: Arc::new(repo.clone()),
            friends: Arc::new(repo.clone()),
            notifications: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use replog_core::capture::ActiveWorkout;
    use replog_core::model::SetInput;
    use replog_core::time::fixed_now;

    fn finished(user: u64, at: DateTime<Utc>, exercise: &str) -> NewWorkout {
        let mut active = ActiveWorkout::start(at - Duration::minutes(30));
        let ex = active.add_exercise(exercise).unwrap();
        let set = active.add_set(ex).unwrap();
        active.complete_set(ex, set, SetInput::new(8, 60.0)).unwrap();
        active.finish(UserId::new(user), at).unwrap()
    }

    fn profile(id: u64, email: &str) -> Profile {
        Profile::new(
            UserId::new(id),
            format!("user{id}"),
            None,
            EmailAddress::parse(email).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_only_the_users_workouts_newest_first() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        repo.insert_workout(&finished(1, now - Duration::days(2), "Squat"))
            .await
            .unwrap();
        repo.insert_workout(&finished(2, now, "Row")).await.unwrap();
        let latest = repo
            .insert_workout(&finished(1, now, "Bench"))
            .await
            .unwrap();

        let listed = repo.list_workouts(UserId::new(1)).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id(), latest);
        assert_eq!(listed[0].duration_minutes(), 30);
    }

    #[tokio::test]
    async fn email_must_be_unique_across_users() {
        let repo = InMemoryRepository::new();
        repo.upsert_profile(&profile(1, "a@x.io")).await.unwrap();
        repo.upsert_profile(&profile(1, "a@x.io")).await.unwrap();
        let err = repo.upsert_profile(&profile(2, "a@x.io")).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        let email = EmailAddress::parse("A@X.io").unwrap();
        let found = repo.find_by_email(&email).await.unwrap().unwrap();
        assert_eq!(found.user_id(), UserId::new(1));
    }

    #[tokio::test]
    async fn friendship_is_two_way_and_idempotent() {
        let repo = InMemoryRepository::new();
        let (a, b) = (UserId::new(1), UserId::new(2));
        repo.insert_friendship(a, b, fixed_now()).await.unwrap();
        repo.insert_friendship(b, a, fixed_now()).await.unwrap();

        let of_a = repo.list_friends(a).await.unwrap();
        let of_b = repo.list_friends(b).await.unwrap();
        assert_eq!(of_a.len(), 1);
        assert_eq!(of_a[0].friend_user_id, b);
        assert_eq!(of_b.len(), 1);
        assert_eq!(of_b[0].friend_user_id, a);
    }

    #[tokio::test]
    async fn request_status_updates_and_pending_lookup() {
        let repo = InMemoryRepository::new();
        let target = RequestTarget::User(UserId::new(2));
        let id = repo
            .insert_request(&NewFriendRequest {
                from_user: UserId::new(1),
                target: target.clone(),
                created_at: fixed_now(),
            })
            .await
            .unwrap();

        assert!(
            repo.find_pending_request(UserId::new(1), &target)
                .await
                .unwrap()
                .is_some()
        );
        repo.set_request_status(id, FriendRequestStatus::Denied)
            .await
            .unwrap();
        assert!(
            repo.find_pending_request(UserId::new(1), &target)
                .await
                .unwrap()
                .is_none()
        );
        assert!(matches!(
            repo.set_request_status(FriendRequestId::new(999), FriendRequestStatus::Accepted)
                .await,
            Err(StorageError::NotFound)
        ));
    }
}
