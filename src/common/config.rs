//! Pipeline configuration
//!
//! Defaults live in [`consts`](super::consts); `Config::from_env` overlays the
//! `WPC_*` environment variables and the CLI overlays its own flags last.

use std::time::Duration;

use super::consts::*;
use super::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Deadline for a single validity query; expiry means "not proven"
    pub solver_timeout: Duration,
    pub max_parse_errors: usize,
    /// Re-evaluate `check` statements while interpreting
    pub runtime_checks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solver_timeout: DEFAULT_SOLVER_TIMEOUT,
            max_parse_errors: DEFAULT_MAX_PARSE_ERRORS,
            runtime_checks: true,
        }
    }
}

impl Config {
    /// Defaults overlaid with the `WPC_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay settings from an arbitrary key lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SOLVER_TIMEOUT_MS) {
            let millis: u64 = value.trim().parse().map_err(|_| {
                Error::config_error(format!("{} must be a number of milliseconds, got '{}'", ENV_SOLVER_TIMEOUT_MS, value))
            })?;
            self.solver_timeout = Duration::from_millis(millis);
        }
        if let Some(value) = lookup(ENV_PARSE_MAX_ERRORS) {
            self.max_parse_errors = value.trim().parse().map_err(|_| {
                Error::config_error(format!("{} must be a count, got '{}'", ENV_PARSE_MAX_ERRORS, value))
            })?;
        }
        if let Some(value) = lookup(ENV_RUNTIME_CHECKS) {
            self.runtime_checks = parse_flag(&value)
                .ok_or_else(|| Error::config_error(format!("{} must be a boolean, got '{}'", ENV_RUNTIME_CHECKS, value)))?;
        }
        log::debug!("config: {:?}", self);
        Ok(())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.solver_timeout = timeout;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
