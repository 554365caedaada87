use chrono::{DateTime, Utc};
use replog_core::model::{
    EmailAddress, FriendRequest, FriendRequestId, FriendRequestStatus, Notification,
    NotificationId, NotificationKind, Profile, RequestTarget, UserId, WorkoutId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{FriendshipRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    Ok(UserId::new(i64_to_u64("user_id", v)?))
}

pub(crate) fn workout_id_from_i64(v: i64) -> Result<WorkoutId, StorageError> {
    Ok(WorkoutId::new(i64_to_u64("workout_id", v)?))
}

pub(crate) fn local_id_from_i64(v: i64) -> Result<u64, StorageError> {
    i64_to_u64("local_id", v)
}

pub(crate) fn request_id_from_i64(v: i64) -> Result<FriendRequestId, StorageError> {
    Ok(FriendRequestId::new(i64_to_u64("request_id", v)?))
}

pub(crate) fn notification_id_from_i64(v: i64) -> Result<NotificationId, StorageError> {
    Ok(NotificationId::new(i64_to_u64("notification_id", v)?))
}

pub(crate) fn map_profile_row(row: &SqliteRow) -> Result<Profile, StorageError> {
    let email: String = row.try_get("email").map_err(ser)?;
    let profile = Profile::new(
        user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?,
        row.try_get::<String, _>("username").map_err(ser)?,
        row.try_get::<Option<String>, _>("display_name").map_err(ser)?,
        EmailAddress::parse(&email).map_err(ser)?,
    )
    .map_err(ser)?;
    Ok(profile.with_avatar_url(row.try_get("avatar_url").map_err(ser)?))
}

/// Requests are addressed either to a user id or to an email; exactly one column is set.
pub(crate) fn map_request_row(row: &SqliteRow) -> Result<FriendRequest, StorageError> {
    let to_user: Option<i64> = row.try_get("to_user").map_err(ser)?;
    let to_email: Option<String> = row.try_get("to_email").map_err(ser)?;
    let target = match (to_user, to_email) {
        (Some(user), _) => RequestTarget::User(user_id_from_i64(user)?),
        (None, Some(email)) => RequestTarget::Email(EmailAddress::parse(&email).map_err(ser)?),
        (None, None) => {
            return Err(StorageError::Serialization(
                "friend request without target".into(),
            ));
        }
    };
    let status: String = row.try_get("status").map_err(ser)?;
    Ok(FriendRequest {
        id: request_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        from_user: user_id_from_i64(row.try_get::<i64, _>("from_user").map_err(ser)?)?,
        target,
        status: status.parse::<FriendRequestStatus>().map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_friendship_row(row: &SqliteRow) -> Result<FriendshipRecord, StorageError> {
    let connected_at: DateTime<Utc> = row.try_get("connected_at").map_err(ser)?;
    Ok(FriendshipRecord {
        user_id: user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?,
        friend_user_id: user_id_from_i64(row.try_get::<i64, _>("friend_user_id").map_err(ser)?)?,
        connected_at,
    })
}

pub(crate) fn map_notification_row(row: &SqliteRow) -> Result<Notification, StorageError> {
    let kind: String = row.try_get("kind").map_err(ser)?;
    let read: i64 = row.try_get("read").map_err(ser)?;
    Ok(Notification {
        id: notification_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        user_id: user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?,
        kind: NotificationKind::parse(&kind),
        title: row.try_get("title").map_err(ser)?,
        message: row.try_get("message").map_err(ser)?,
        request_id: row
            .try_get::<Option<i64>, _>("request_id")
            .map_err(ser)?
            .map(request_id_from_i64)
            .transpose()?,
        from_user: row.try_get("from_user").map_err(ser)?,
        read: read != 0,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
