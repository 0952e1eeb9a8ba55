// Defaults and environment knobs shared across phases

use std::time::Duration;

/// Default per-query solver deadline
pub const DEFAULT_SOLVER_TIMEOUT: Duration = Duration::from_secs(10);

/// Parser: failed statements tolerated before the parse is abandoned
pub const DEFAULT_MAX_PARSE_ERRORS: usize = 25;

/// Parser: deepest nesting of blocks and expressions accepted
pub const PARSER_MAX_DEPTH: usize = 256;

// Environment variables read by `Config::from_env`
pub const ENV_SOLVER_TIMEOUT_MS: &str = "WPC_SOLVER_TIMEOUT_MS";
pub const ENV_PARSE_MAX_ERRORS: &str = "WPC_PARSE_MAX_ERRORS";
pub const ENV_RUNTIME_CHECKS: &str = "WPC_RUNTIME_CHECKS";

/// Source file extension picked up by the program suite
pub const SOURCE_EXTENSION: &str = "wp";
