use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{FriendRequestId, NotificationId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SocialError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("unknown friend request status: {0}")]
    UnknownStatus(String),
}

//
// ─── EMAIL ─────────────────────────────────────────────────────────────────────
//

/// Normalized (trimmed, lowercased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// # Errors
    ///
    /// Returns `SocialError::InvalidEmail` unless the value looks like
    /// `local@domain.tld`.
    pub fn parse(value: &str) -> Result<Self, SocialError> {
        let normalized = value.trim().to_lowercase();
        let valid = match normalized.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !normalized.contains(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            return Err(SocialError::InvalidEmail(value.trim().to_owned()));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

/// Public-facing account details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    user_id: UserId,
    username: String,
    display_name: Option<String>,
    email: EmailAddress,
    avatar_url: Option<String>,
}

impl Profile {
    /// # Errors
    ///
    /// Returns `SocialError::EmptyUsername` if the username is blank.
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        display_name: Option<String>,
        email: EmailAddress,
    ) -> Result<Self, SocialError> {
        let username = username.into().trim().to_owned();
        if username.is_empty() {
            return Err(SocialError::EmptyUsername);
        }
        Ok(Self {
            user_id,
            username,
            display_name: display_name
                .map(|n| n.trim().to_owned())
                .filter(|n| !n.is_empty()),
            email,
            avatar_url: None,
        })
    }

    #[must_use]
    pub fn with_avatar_url(mut self, url: Option<String>) -> Self {
        self.avatar_url = url;
        self
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Name used in messages sent on behalf of this user.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Name shown for a possibly unknown sender.
#[must_use]
pub fn sender_label(profile: Option<&Profile>) -> String {
    profile.map_or_else(|| "Someone".to_owned(), |p| p.label().to_owned())
}

//
// ─── FRIEND REQUESTS ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestStatus {
    #[default]
    Pending,
    Accepted,
    Denied,
}

impl FriendRequestStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for FriendRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendRequestStatus {
    type Err = SocialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "denied" => Ok(Self::Denied),
            other => Err(SocialError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Who a friend request was sent to.
///
/// People without an account are invited by email; the request stays
/// addressed to that email until they sign up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    User(UserId),
    Email(EmailAddress),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendRequest {
    pub id: FriendRequestId,
    pub from_user: UserId,
    pub target: RequestTarget,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl FriendRequest {
    #[must_use]
    pub fn is_addressed_to(&self, user_id: UserId) -> bool {
        self.target == RequestTarget::User(user_id)
    }
}

/// An accepted friendship as seen from one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friend {
    pub user_id: UserId,
    pub display_name: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub connected_at: DateTime<Utc>,
}

impl Friend {
    /// Build the friend-list entry for `profile`.
    ///
    /// Falls back to the username, then `"Unknown User"`, for the display name.
    #[must_use]
    pub fn from_profile(
        user_id: UserId,
        profile: Option<&Profile>,
        connected_at: DateTime<Utc>,
    ) -> Self {
        let display_name = profile
            .map(Profile::label)
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown User")
            .to_owned();
        Self {
            user_id,
            display_name,
            username: profile.map(|p| p.username().to_owned()).unwrap_or_default(),
            avatar_url: profile.and_then(|p| p.avatar_url().map(str::to_owned)),
            connected_at,
        }
    }

    /// Uppercased initials of the display name, used for avatar fallbacks.
    #[must_use]
    pub fn initials(&self) -> String {
        self.display_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

//
// ─── NOTIFICATIONS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    FriendRequest,
    Other(String),
}

impl NotificationKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::FriendRequest => "friend_request",
            Self::Other(kind) => kind,
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "friend_request" => Self::FriendRequest,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Draft of a notification before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub request_id: Option<FriendRequestId>,
    pub from_user: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    /// Notification telling `recipient` that `sender` wants to connect.
    #[must_use]
    pub fn friend_request(
        recipient: UserId,
        sender: &str,
        request_id: FriendRequestId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: recipient,
            kind: NotificationKind::FriendRequest,
            title: "New Friend Request".to_owned(),
            message: format!("{sender} wants to be your workout buddy"),
            request_id: Some(request_id),
            from_user: Some(sender.to_owned()),
            created_at,
        }
    }

    #[must_use]
    pub fn into_notification(self, id: NotificationId) -> Notification {
        Notification {
            id,
            user_id: self.user_id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            request_id: self.request_id,
            from_user: self.from_user,
            read: false,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub request_id: Option<FriendRequestId>,
    pub from_user: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
