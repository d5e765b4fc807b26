//! Logging utilities.
//!
//! Device creation, fallback and recovery report through the `log` facade.
//! This module only wires up the `env_logger` backend for binaries and tools.

mod init;

pub use init::{init_logging, LoggingConfig};
