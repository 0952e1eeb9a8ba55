//! Common definitions shared across phases
//!
//! Configuration, error types and default constants used throughout wpc.

pub mod config;
pub mod consts;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
