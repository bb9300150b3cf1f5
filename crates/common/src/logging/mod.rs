//! Logging subsystem.

pub mod manager;
pub mod types;


pub use manager::{build_filter, init, init_from_config, LoggingInitConfig};
pub use types::{ConsoleConfig, FileLoggingConfig, LoggerConfig};

// Re-export tracing-appender types for convenience
pub use tracing_appender::rolling::Rotation;
