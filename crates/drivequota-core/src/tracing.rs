//! Tracing setup for drivequota.
//!
//! All binaries install their subscriber through [`init_tracing`] so that
//! `RUST_LOG` handling and output formats stay consistent.
//!
//! ```ignore
//! use drivequota_core::tracing::{init_tracing, TracingConfig};
//!
//! let config = if debug { TracingConfig::debug() } else { TracingConfig::cli() };
//! init_tracing(config)?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Crates whose events pass the default filter.
const OWN_TARGETS: [&str; 3] = ["drivequota", "drivequota_core", "drivequota_providers"];

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber is already installed.
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The filter directive could not be parsed.
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Compact single-line format (default).
    #[default]
    Compact,
    /// Multi-line human-readable format.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for drivequota's own crates when `RUST_LOG` is not set.
    pub level: Level,
    /// Output format.
    pub format: TracingOutputFormat,
    /// Whether to print file and line of each event.
    pub include_location: bool,
    /// Whether to print timestamps.
    pub include_timestamp: bool,
    /// Explicit filter directive, taking precedence over `RUST_LOG`.
    pub directive: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::cli()
    }
}

impl TracingConfig {
    /// Quiet preset for interactive use: warnings only, no timestamps.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            include_location: false,
            include_timestamp: false,
            directive: None,
        }
    }

    /// Preset for `--debug`: request flow and file/line information.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            include_location: true,
            ..Self::cli()
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set an explicit filter directive.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    /// Returns the directive used when neither an explicit one nor
    /// `RUST_LOG` is set.
    pub fn default_directive(&self) -> String {
        OWN_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.directive {
            return Ok(EnvFilter::try_new(directive)?);
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(self.default_directive())?),
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Fails if a subscriber is already installed or the directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.env_filter()?;

    let layer = match config.format {
        TracingOutputFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(std::io::stderr);
            if config.include_timestamp {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
        TracingOutputFormat::Pretty => fmt::layer()
            .pretty()
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        TracingOutputFormat::Json => fmt::layer()
            .json()
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
