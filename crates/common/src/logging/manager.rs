//! Logging initialization.

use std::{io, path::PathBuf};

use tracing::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{fmt::layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use super::types::{FileLoggingConfig, LoggerConfig};

/// Filter at `default_level`, overridable through `RUST_LOG`.
pub fn build_filter(default_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Initializes the logging subsystem with the provided config.
///
/// Installs the global subscriber, so it must be called at most once per
/// process.
pub fn init(config: LoggerConfig) {
    let filt = build_filter(config.default_level);

    let console_sub = if config.console_config.json_format {
        layer()
            .json()
            .with_writer(io::stderr)
            .with_span_events(config.console_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    } else {
        layer()
            .compact()
            .with_writer(io::stderr)
            .with_span_events(config.console_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    };

    let file_layer = config.file_logging_config.as_ref().map(|file_config| {
        let file_appender = RollingFileAppender::new(
            file_config.rotation.clone(),
            &file_config.directory,
            &file_config.file_name_prefix,
        );

        if file_config.json_format {
            layer()
                .json()
                .with_writer(file_appender)
                .with_ansi(false) // No color codes in files
                .with_filter(filt.clone())
                .boxed()
        } else {
            layer()
                .compact()
                .with_writer(file_appender)
                .with_ansi(false) // No color codes in files
                .with_filter(filt.clone())
                .boxed()
        }
    });

    tracing_subscriber::registry()
        .with(console_sub)
        .with(file_layer)
        .init();

    debug!(service_name = %config.service_name, "logging initialized");
}

/// Configuration parameters for logging initialization from a binary.
#[derive(Debug)]
pub struct LoggingInitConfig<'a> {
    pub service_name: &'a str,
    /// Directory for file-based logging
    pub log_dir: Option<&'a PathBuf>,
    /// Prefix for log file names
    pub log_file_prefix: Option<&'a str>,
    /// Use JSON format instead of compact
    pub json_format: bool,
    /// Raise the default level to DEBUG
    pub verbose: bool,
}

impl LoggingInitConfig<'_> {
    /// Resolves the parameters into a [`LoggerConfig`].
    pub fn to_logger_config(&self) -> LoggerConfig {
        let level = if self.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        };

        let mut lconfig = LoggerConfig::new(self.service_name.to_string())
            .with_default_level(level)
            .with_json_logging(self.json_format);

        if let Some(dir) = self.log_dir {
            let prefix = self
                .log_file_prefix
                .unwrap_or(self.service_name)
                .to_string();
            let file_config =
                FileLoggingConfig::new(dir.clone(), prefix).with_json_format(self.json_format);
            lconfig = lconfig.with_file_logging(file_config);
        }

        lconfig
    }
}

/// Initialize logging from binary configuration with all standard setup.
pub fn init_from_config(config: LoggingInitConfig<'_>) {
    let lconfig = config.to_logger_config();
    let file_config = lconfig.file_logging_config.clone();

    init(lconfig);

    if let Some(file_config) = &file_config {
        info!(
            log_dir = %file_config.directory.display(),
            log_prefix = %file_config.file_name_prefix,
            "file logging enabled"
        );
    }
}
