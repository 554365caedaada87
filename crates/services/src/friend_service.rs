use std::sync::Arc;

use replog_core::model::{
    EmailAddress, Friend, FriendRequest, FriendRequestStatus, NewNotification, Notification,
    NotificationId, RequestTarget, UserId, Workout, sender_label,
};
use replog_core::progress::{ExerciseProgress, WorkoutTotals, aggregate_progress, last_workout};
use storage::repository::{
    FriendRepository, NewFriendRequest, NotificationRepository, ProfileRepository,
    WorkoutRepository,
};

use crate::Clock;
use crate::error::FriendServiceError;
use crate::invite::{InviteEmail, InviteSender};

/// What a user may see of a friend's training.
#[derive(Debug, Clone, PartialEq)]
pub struct FriendProgress {
    pub friend: Friend,
    pub totals: WorkoutTotals,
    pub last_workout: Option<Workout>,
    pub progress: Vec<ExerciseProgress>,
}

/// Friend requests, invitations and friend lists.
#[derive(Clone)]
pub struct FriendService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
    friends: Arc<dyn FriendRepository>,
    notifications: Arc<dyn NotificationRepository>,
    workouts: Arc<dyn WorkoutRepository>,
    invites: Arc<dyn InviteSender>,
}

impl FriendService {
    #[must_use]
    pub fn new(
        clock: Clock,
        profiles: Arc<dyn ProfileRepository>,
        friends: Arc<dyn FriendRepository>,
        notifications: Arc<dyn NotificationRepository>,
        workouts: Arc<dyn WorkoutRepository>,
        invites: Arc<dyn InviteSender>,
    ) -> Self {
        Self {
            clock,
            profiles,
            friends,
            notifications,
            workouts,
            invites,
        }
    }

    /// Ask the owner of `email` to become a friend of `from`.
    ///
    /// A known user gets a pending request plus a notification. Anyone else
    /// gets an email-addressed request and an invite; a failed invite is
    /// logged but does not fail the call, since the request already exists.
    /// Returns the confirmation shown to the sender.
    ///
    /// # Errors
    ///
    /// Returns `FriendServiceError::InvalidEmail` for a malformed address,
    /// `SelfRequest`, `AlreadyFriends` or `AlreadyRequested` when no request
    /// should be created, and `Storage` if repository access fails.
    pub async fn send_friend_request(
        &self,
        from: UserId,
        email: &str,
    ) -> Result<String, FriendServiceError> {
        let email = EmailAddress::parse(email).map_err(FriendServiceError::InvalidEmail)?;
        let now = self.clock.now();
        let sender = self.profiles.get_profile(from).await?;
        let sender_name = sender_label(sender.as_ref());

        if let Some(target) = self.profiles.find_by_email(&email).await? {
            let target_id = target.user_id();
            if target_id == from {
                return Err(FriendServiceError::SelfRequest);
            }
            if self.is_friend(from, target_id).await? {
                return Err(FriendServiceError::AlreadyFriends);
            }
            let target = RequestTarget::User(target_id);
            if self
                .friends
                .find_pending_request(from, &target)
                .await?
                .is_some()
            {
                return Err(FriendServiceError::AlreadyRequested);
            }

            let request_id = self
                .friends
                .insert_request(&NewFriendRequest {
                    from_user: from,
                    target,
                    created_at: now,
                })
                .await?;
            self.notifications
                .insert_notification(&NewNotification::friend_request(
                    target_id,
                    &sender_name,
                    request_id,
                    now,
                ))
                .await?;
            tracing::info!(%from, to = %target_id, %request_id, "friend request created");
            return Ok("Friend request sent!".to_owned());
        }

        let target = RequestTarget::Email(email.clone());
        if self
            .friends
            .find_pending_request(from, &target)
            .await?
            .is_some()
        {
            return Err(FriendServiceError::AlreadyRequested);
        }
        let request_id = self
            .friends
            .insert_request(&NewFriendRequest {
                from_user: from,
                target,
                created_at: now,
            })
            .await?;
        tracing::info!(%from, %request_id, "invitation request created");

        let invite = InviteEmail {
            to_email: email,
            from_user: sender_name,
            request_id,
        };
        if let Err(err) = self.invites.send_invite(&invite).await {
            tracing::warn!(%request_id, error = %err, "failed to send invite email");
        }
        Ok("Invitation sent via email!".to_owned())
    }

    /// Accept the request behind `notification_id`, which must belong to `user_id`.
    ///
    /// Returns the confirmation shown to the user.
    ///
    /// # Errors
    ///
    /// Returns `FriendServiceError` if the notification or request is missing,
    /// the request is not addressed to `user_id` or no longer pending, or
    /// storage fails.
    pub async fn accept_request(
        &self,
        user_id: UserId,
        notification_id: NotificationId,
    ) -> Result<String, FriendServiceError> {
        let (notification, request) = self.pending_request(user_id, notification_id).await?;
        let now = self.clock.now();

        self.friends
            .set_request_status(request.id, FriendRequestStatus::Accepted)
            .await?;
        self.friends
            .insert_friendship(request.from_user, user_id, now)
            .await?;
        self.notifications.mark_read(notification.id).await?;

        let from = match notification.from_user {
            Some(name) => name,
            None => sender_label(self.profiles.get_profile(request.from_user).await?.as_ref()),
        };
        tracing::info!(%user_id, friend = %request.from_user, "friend request accepted");
        Ok(format!("You are now friends with {from}"))
    }

    /// Deny the request behind `notification_id`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FriendService::accept_request`].
    pub async fn deny_request(
        &self,
        user_id: UserId,
        notification_id: NotificationId,
    ) -> Result<(), FriendServiceError> {
        let (notification, request) = self.pending_request(user_id, notification_id).await?;
        self.friends
            .set_request_status(request.id, FriendRequestStatus::Denied)
            .await?;
        self.notifications.mark_read(notification.id).await?;
        tracing::info!(%user_id, from = %request.from_user, "friend request denied");
        Ok(())
    }

    /// Accepted friends of `user_id`, oldest connection first.
    ///
    /// # Errors
    ///
    /// Returns `FriendServiceError::Storage` if repository access fails.
    pub async fn list_friends(&self, user_id: UserId) -> Result<Vec<Friend>, FriendServiceError> {
        let records = self.friends.list_friends(user_id).await?;
        let mut friends = Vec::with_capacity(records.len());
        for record in records {
            let profile = self.profiles.get_profile(record.friend_user_id).await?;
            friends.push(Friend::from_profile(
                record.friend_user_id,
                profile.as_ref(),
                record.connected_at,
            ));
        }
        Ok(friends)
    }

    /// Workout summary of `friend_id` as seen by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `FriendServiceError::NotFriends` without an accepted friendship,
    /// or `Storage` if repository access fails.
    pub async fn friend_progress(
        &self,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<FriendProgress, FriendServiceError> {
        let record = self
            .friends
            .list_friends(user_id)
            .await?
            .into_iter()
            .find(|r| r.friend_user_id == friend_id)
            .ok_or(FriendServiceError::NotFriends)?;
        let profile = self.profiles.get_profile(friend_id).await?;
        let workouts = self.workouts.list_workouts(friend_id).await?;

        Ok(FriendProgress {
            friend: Friend::from_profile(friend_id, profile.as_ref(), record.connected_at),
            totals: WorkoutTotals::from_workouts(&workouts),
            last_workout: last_workout(&workouts).cloned(),
            progress: aggregate_progress(&workouts),
        })
    }

    async fn is_friend(&self, user_id: UserId, other: UserId) -> Result<bool, FriendServiceError> {
        Ok(self
            .friends
            .list_friends(user_id)
            .await?
            .iter()
            .any(|r| r.friend_user_id == other))
    }

    async fn pending_request(
        &self,
        user_id: UserId,
        notification_id: NotificationId,
    ) -> Result<(Notification, FriendRequest), FriendServiceError> {
        let notification = self
            .notifications
            .get_notification(notification_id)
            .await?
            .filter(|n| n.user_id == user_id)
            .ok_or(FriendServiceError::NotificationNotFound)?;
        let request_id = notification
            .request_id
            .ok_or(FriendServiceError::NotAFriendRequest)?;
        let request = self
            .friends
            .get_request(request_id)
            .await?
            .ok_or(FriendServiceError::RequestNotFound)?;
        if !request.is_addressed_to(user_id) {
            return Err(FriendServiceError::NotRecipient);
        }
        if request.status != FriendRequestStatus::Pending {
            return Err(FriendServiceError::NotPending(request.status));
        }
        Ok((notification, request))
    }
}
