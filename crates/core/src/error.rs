use thiserror::Error;

use crate::capture::CaptureError;
use crate::model::{SocialError, WorkoutError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Workout(#[from] WorkoutError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Social(#[from] SocialError),
}
