//! # ULD Utilities
//!
//! Shared utilities for ULD hosts.
//!
//! Today this is the logging setup: a host calls one of the `init_logging*`
//! functions once at startup, before the first breakpoint can fire.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_for_session, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
