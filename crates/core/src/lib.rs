#![forbid(unsafe_code)]

pub mod config;
pub mod engagement;
pub mod error;
pub mod insights;
pub mod model;
pub mod recommend;
pub mod strengths;
pub mod time;

pub use config::{ConfigError, EngagementConfig};
pub use error::Error;
pub use time::{Clock, TimeWindow};
