//! On-disk configuration of the CoreDAO signer.

mod config;

pub use config::{load, ConfigError, LoggingConfig, ReviewConfig, SignerConfig};
