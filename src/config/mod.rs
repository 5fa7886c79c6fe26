//! Runtime configuration: [`Settings`](crate::settings::Settings) from disk,
//! overridden by environment variables.

pub(crate) mod helpers;
mod practice;

pub use practice::{AdvisoryConfig, InterchangeConfig, PracticeConfig};
