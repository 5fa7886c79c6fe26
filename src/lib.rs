//! Case-file engine for small law practices.

pub mod config;
pub mod error;
pub mod legal;
pub mod settings;
