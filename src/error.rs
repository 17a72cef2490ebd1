//! Error types for the ansible API.
//!
//! Every fallible operation in the crate returns [`Result`], so handlers can
//! map a single error type onto an HTTP status.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for ansible API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the ansible API.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Request Errors
    // ========================================================================
    /// The request parameters cannot form a safe ansible invocation.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// The ansible process could not be started.
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        /// Program that was being started
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The ansible process exceeded the configured timeout.
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    /// The ansible process exited with a status that carries no usable result.
    #[error("Command '{command}' failed with exit code {}", exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ExecutionFailed {
        /// Rendered command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    // ========================================================================
    // Ambient Errors
    // ========================================================================
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }

    /// Whether this error was caused by the caller rather than the execution.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_failed_display() {
        let err = Error::ExecutionFailed {
            command: "ansible all -o".to_string(),
            exit_code: Some(4),
            stderr: "ERROR! boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command 'ansible all -o' failed with exit code 4"
        );

        let signalled = Error::ExecutionFailed {
            command: "ansible all -o".to_string(),
            exit_code: None,
            stderr: String::new(),
        };
        assert!(signalled.to_string().ends_with("exit code none"));
    }

    #[test]
    fn test_timeout_display_keeps_precision() {
        assert_eq!(
            Error::Timeout(Duration::from_millis(200)).to_string(),
            "Command timed out after 200ms"
        );
        assert_eq!(
            Error::Timeout(Duration::from_secs(30)).to_string(),
            "Command timed out after 30s"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::invalid_request("no hosts").is_client_error());
        assert!(!Error::Timeout(Duration::from_secs(5)).is_client_error());
        assert!(!Error::Config("bad".into()).is_client_error());
    }
}
