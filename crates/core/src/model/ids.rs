use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map($name::new)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }
    };
}

numeric_id!(
    /// Account that owns workouts, profiles and friendships.
    UserId
);
numeric_id!(
    /// Unique identifier for a saved workout.
    WorkoutId
);
numeric_id!(
    /// Identifier for an exercise entry inside a workout.
    ExerciseId
);
numeric_id!(
    /// Identifier for a set inside an exercise.
    SetId
);
numeric_id!(FriendRequestId);
numeric_id!(NotificationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workout_id_display() {
        assert_eq!(WorkoutId::new(42).to_string(), "42");
        assert_eq!(format!("{:?}", WorkoutId::new(42)), "WorkoutId(42)");
    }

    #[test]
    fn user_id_from_str_trims() {
        let id: UserId = " 7 ".parse().unwrap();
        assert_eq!(id, UserId::new(7));
    }

    #[test]
    fn invalid_id_reports_kind() {
        let err = "abc".parse::<SetId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse SetId from string");
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&ExerciseId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
