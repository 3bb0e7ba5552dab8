//! Logging utilities.
//!
//! This module centralizes logger initialization. Engine code only talks to
//! the standard `log` facade; `env_logger` is the default backend.

mod init;

pub use init::{init_logging, LoggingConfig};
