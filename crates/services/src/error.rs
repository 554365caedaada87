//! Shared error types for the services crate.

use thiserror::Error;

use replog_core::capture::CaptureError;
use replog_core::model::{FriendRequestStatus, SocialError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `WorkoutService` and `WorkoutLog`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkoutServiceError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `FriendService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FriendServiceError {
    #[error("please enter a valid email address")]
    InvalidEmail(#[source] SocialError),
    #[error("you cannot send a friend request to yourself")]
    SelfRequest,
    #[error("friend request already sent")]
    AlreadyRequested,
    #[error("already friends with this user")]
    AlreadyFriends,
    #[error("notification not found")]
    NotificationNotFound,
    #[error("notification is not a friend request")]
    NotAFriendRequest,
    #[error("friend request not found")]
    RequestNotFound,
    #[error("friend request is addressed to someone else")]
    NotRecipient,
    #[error("friend request was already {0}")]
    NotPending(FriendRequestStatus),
    #[error("you are not friends with this user")]
    NotFriends,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `NotificationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotificationServiceError {
    #[error("notification not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while delivering invite emails.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InviteError {
    #[error("invite endpoint returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
