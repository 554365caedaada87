#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod friend_service;
pub mod invite;
pub mod notification_service;
pub mod workout_log;
pub mod workout_service;

pub use replog_core::Clock;

pub use app_services::AppServices;
pub use error::{
    AppServicesError, FriendServiceError, InviteError, NotificationServiceError,
    WorkoutServiceError,
};
pub use friend_service::{FriendProgress, FriendService};
pub use invite::{HttpInviteSender, InviteConfig, InviteEmail, InviteSender, LogInviteSender};
pub use notification_service::NotificationService;
pub use workout_log::WorkoutLog;
pub use workout_service::WorkoutService;
