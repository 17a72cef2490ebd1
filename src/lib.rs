//! # ansible-api - HTTP access to ad-hoc ansible
//!
//! A small, stateless HTTP service in front of the `ansible` command-line
//! tool. One route runs an ad-hoc module against a host pattern, the other
//! lists the hosts a pattern matches.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  HTTP API (axum)                          │
//! │          POST /run          GET /listhosts                │
//! └───────────────────────────────────────────────────────────┘
//!                              │  RunParams / ListHostsParams
//!                              ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │   CommandBuilder  ──►  CommandRunner  ──►  Output parser  │
//! │   (argument vector)   (child process)   (per-line, JSON)  │
//! └───────────────────────────────────────────────────────────┘
//!                              │  RunResult / Vec<String>
//!                              ▼
//!                         JSON response
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ansible_api::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let adhoc = AdHoc::new("ansible", Arc::new(LocalRunner::new()));
//!
//!     let result = adhoc.run(&RunParams::new("webservers").with_module("ping")).await?;
//!     for record in &result.success {
//!         println!("{}: {}", record.host, record.message);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::adhoc::AdHoc;
    pub use crate::command::{AnsibleCommand, CommandBuilder, ListHostsParams, Route, RunParams};
    pub use crate::error::{Error, Result};
    pub use crate::parser::{HostRecord, RunResult};
    pub use crate::runner::{CommandRunner, ExecutionOutput, LocalRunner};
}

/// Error types.
pub mod error;

/// Request parameters and ansible command construction.
pub mod command;

/// Parsing of ansible's one-line output.
pub mod parser;

/// Process execution.
pub mod runner;

/// Build, execute and parse in one call.
pub mod adhoc;

/// HTTP API server.
pub mod api;

/// Configuration loading.
pub mod config;

/// Logging initialisation.
pub mod logging;

/// Returns the current version of the ansible API.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
