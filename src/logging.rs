//! Structured logging setup using the tracing crate.
//!
//! Supports compact, pretty and JSON output. `RUST_LOG` always takes
//! precedence over the configured level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human friendly
    Pretty,
    /// Single line per event
    #[default]
    Compact,
    /// Newline-delimited JSON
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::Config(format!("unknown log format '{}'", other))),
        }
    }
}

/// Builder for the global tracing subscriber.
pub struct LoggingBuilder {
    config: LoggingConfig,
    verbosity: u8,
}

impl LoggingBuilder {
    /// Create a builder from an existing configuration.
    pub fn from_config(config: LoggingConfig) -> Self {
        Self {
            config,
            verbosity: 0,
        }
    }

    /// Raise the level from the command line (`-v` info, `-vv` debug, `-vvv` trace).
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    /// The level used when `RUST_LOG` is not set.
    pub fn effective_level(&self) -> &str {
        match self.verbosity {
            0 => &self.config.level,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn build_filter(&self) -> EnvFilter {
        let level = self.effective_level();
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Build and initialize the global subscriber.
    pub fn init(self) -> Result<()> {
        let env_filter = self.build_filter();
        let with_target = self.verbosity >= 3;

        let registry = tracing_subscriber::registry().with(env_filter);
        let result = match self.config.format {
            LogFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_ansi(self.config.ansi)
                        .with_target(with_target),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_ansi(self.config.ansi)
                        .with_target(with_target),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
                .try_init(),
        };

        result.map_err(|e| Error::Config(e.to_string()))
    }
}
