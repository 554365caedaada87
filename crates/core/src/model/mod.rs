mod date;
mod ids;
mod social;
mod workout;

pub use date::{WorkoutDate, parse_workout_date};
pub use ids::{
    ExerciseId, FriendRequestId, NotificationId, ParseIdError, SetId, UserId, WorkoutId,
};
pub use social::{
    EmailAddress, Friend, FriendRequest, FriendRequestStatus, NewNotification, Notification,
    NotificationKind, Profile, RequestTarget, SocialError, sender_label,
};
pub use workout::{
    Exercise, NewWorkout, SetInput, Workout, WorkoutError, WorkoutSet, max_weight,
};

pub(crate) use workout::saturating_len;
