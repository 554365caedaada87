#![forbid(unsafe_code)]

pub mod capture;
pub mod catalog;
pub mod error;
pub mod format;
pub mod model;
pub mod progress;
pub mod time;

pub use error::Error;
pub use time::Clock;
