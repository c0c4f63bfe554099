pub mod config;
pub mod error;
pub mod messages;
pub mod report;
pub mod teamcity;

pub use error::{Error, Result};
