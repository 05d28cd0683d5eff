//! Logging utilities.
//!
//! The cache only talks to the `log` facade. This module wires up the
//! `env_logger` backend for binaries and tools that want one.

mod init;

pub use init::{init_logging, LoggingConfig};
