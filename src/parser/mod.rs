//! Parsing of `ansible -o` output into structured results.
//!
//! Two entry points:
//!
//! - [`parse_list_hosts`] collects every IPv4-like address printed by
//!   `--list-hosts`.
//! - [`parse_run`] turns the standard output and standard error of an ad-hoc
//!   run into a [`RunResult`]. Each stream is parsed line by line and the two
//!   streams are parsed in parallel.

mod line;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use line::{classify, Line, Payload, IPV4_REGEX};

/// The outcome reported for a single host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Host name or address as printed by ansible
    pub host: String,
    /// Parsed JSON payload on success, raw message text on failure
    #[serde(rename = "msg")]
    pub message: Value,
}

impl HostRecord {
    /// Create a new host record.
    pub fn new(host: impl Into<String>, message: impl Into<Value>) -> Self {
        Self {
            host: host.into(),
            message: message.into(),
        }
    }
}

/// Per-host results of an ad-hoc run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Hosts that reported success, in output order
    pub success: Vec<HostRecord>,
    /// Hosts that reported failure, in output order
    pub failed: Vec<HostRecord>,
}

impl RunResult {
    /// Total number of hosts reported.
    pub fn host_count(&self) -> usize {
        self.success.len() + self.failed.len()
    }

    /// Whether no host reported anything.
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.failed.is_empty()
    }
}

/// Extract every IPv4-like address from `--list-hosts` output, in order.
///
/// Octets are not range checked: `999.1.1.1` is returned as printed.
pub fn parse_list_hosts(stdout: &str) -> Vec<String> {
    IPV4_REGEX
        .find_iter(stdout)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Parse the output of an ad-hoc run.
///
/// Failure lines printed on standard output (`FAILED!`, `UNREACHABLE!`) are
/// reported under `failed`, after the failures found on standard error.
pub fn parse_run(stdout: &str, stderr: &str) -> RunResult {
    let ((success, mut routed), mut failed) =
        rayon::join(|| parse_success_stream(stdout), || parse_failure_stream(stderr));

    failed.append(&mut routed);

    RunResult { success, failed }
}

/// Parse standard output into success records and failures printed there.
fn parse_success_stream(stdout: &str) -> (Vec<HostRecord>, Vec<HostRecord>) {
    let mut success = Vec::new();
    let mut failed = Vec::new();

    for line in stdout.lines() {
        match classify(line) {
            Line::Success { host, payload } => {
                success.push(HostRecord::new(host, payload_value(host, payload)));
            }
            Line::Failure { host, message } => {
                failed.push(HostRecord::new(host, message));
            }
            Line::Other => {}
        }
    }

    (success, failed)
}

/// Parse standard error into failure records.
fn parse_failure_stream(stderr: &str) -> Vec<HostRecord> {
    let mut failed = Vec::new();

    for line in stderr.lines() {
        match classify(line) {
            Line::Failure { host, message } => failed.push(HostRecord::new(host, message)),
            _ if line.trim().is_empty() => {}
            _ => debug!(line = %line, "Skipping stderr line without a host or failure marker"),
        }
    }

    failed
}

fn payload_value(host: &str, payload: Payload<'_>) -> Value {
    match payload {
        Payload::Json(text) => serde_json::from_str(text).unwrap_or_else(|e| {
            warn!(host = %host, error = %e, "Payload is not valid JSON, keeping raw text");
            Value::String(text.to_string())
        }),
        Payload::Text(text) => Value::String(text.to_string()),
    }
}
