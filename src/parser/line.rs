//! Classification of a single line of `ansible -o` output.
//!
//! With `-o` ansible prints one record per host, in one of these shapes:
//!
//! ```text
//! 10.0.0.1 | SUCCESS => {"changed": false, "ping": "pong"}
//! web1 | CHANGED | rc=0 | (stdout) up 3 days
//! 10.0.0.2 | FAILED! => {"changed": false, "msg": "..."}
//! 10.0.0.3 | UNREACHABLE! => {"msg": "..."}
//! 10.0.0.5 | UNREACHABLE!: Failed to connect to the host via ssh
//! 10.0.0.4 | FAILED => SSH encountered an unknown error
//! db1 | FAILED | rc=1 | (stdout)  (stderr) no such file
//! ```
//!
//! Address and payload are taken from the same line, so a host can never be
//! paired with another host's payload.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches four dot-separated runs of one to three digits.
pub(crate) static IPV4_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[0-9]{1,3}\.){3}[0-9]{1,3}").expect("Invalid IPv4 regex")
});

/// Matches a failure marker on a line without status segments and captures
/// the message after it.
static FAILURE_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:FAILED|UNREACHABLE)!?(?: =>|:) (.*)$")
        .expect("Invalid failure marker regex")
});

/// Words ansible prints in the status position, never host names.
const STATUS_KEYWORDS: &[&str] = &[
    "FAILED",
    "FAILED!",
    "UNREACHABLE",
    "UNREACHABLE!",
    "SUCCESS",
    "CHANGED",
];

const SEGMENT_SEPARATOR: &str = " | ";
const PAYLOAD_SEPARATOR: &str = "=>";

/// What a line of output reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    /// A host succeeded; `payload` is the JSON object text if one is present
    Success {
        host: &'a str,
        payload: Payload<'a>,
    },
    /// A host failed; `message` is the raw text after the failure marker
    Failure { host: &'a str, message: &'a str },
    /// Banner, warning, blank line or anything without a host
    Other,
}

/// Payload of a success line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Payload<'a> {
    /// Text from the first `{` to the last `}` of the line
    Json(&'a str),
    /// Status segments without a JSON object, e.g. `CHANGED | rc=0 | (stdout) ok`
    Text(&'a str),
}

/// Classify one line.
pub(crate) fn classify(line: &str) -> Line<'_> {
    let line = line.trim_end_matches('\r');

    let Some(host) = host_of(line) else {
        return Line::Other;
    };

    let status = line
        .split_once(SEGMENT_SEPARATOR)
        .map(|(_, rest)| rest.trim_start());

    match status {
        Some(status) if is_failure_status(status) => {
            return Line::Failure {
                host,
                message: failure_message(status),
            };
        }
        Some(_) => {}
        None => {
            // A marker inside a JSON payload is data, not a status.
            if let Some(caps) = FAILURE_MARKER_REGEX.captures(line) {
                let marker_start = caps.get(0).map_or(0, |m| m.start());
                if line.find('{').map_or(true, |brace| marker_start < brace) {
                    let message = caps.get(1).map_or("", |m| m.as_str().trim());
                    return Line::Failure { host, message };
                }
            }
        }
    }

    if let Some(json) = json_object(line) {
        return Line::Success {
            host,
            payload: Payload::Json(json),
        };
    }

    if status.is_some() {
        if let Some(rest) = line.split_once(SEGMENT_SEPARATOR).map(|(_, rest)| rest.trim()) {
            return Line::Success {
                host,
                payload: Payload::Text(rest),
            };
        }
    }

    Line::Other
}

/// The host a line reports on.
///
/// The leading field before ` | ` or `=>` wins when it is a single token
/// other than a status word; otherwise the first IPv4-like run anywhere on
/// the line is used.
pub(crate) fn host_of(line: &str) -> Option<&str> {
    let head_end = [line.find(SEGMENT_SEPARATOR), line.find(PAYLOAD_SEPARATOR)]
        .into_iter()
        .flatten()
        .min();

    if let Some(end) = head_end {
        let head = line[..end].trim();
        if !head.is_empty()
            && !head.starts_with('[')
            && !head.contains(char::is_whitespace)
            && !STATUS_KEYWORDS.contains(&head.trim_end_matches(':'))
        {
            return Some(head);
        }
    }

    IPV4_REGEX.find(line).map(|m| m.as_str())
}

/// `status` is the line from the first status segment on.
fn is_failure_status(status: &str) -> bool {
    status.starts_with("FAILED") || status.starts_with("UNREACHABLE")
}

/// Text following the status word and its separator (`=>`, `:` or ` | `).
fn failure_message(status: &str) -> &str {
    let rest = status
        .trim_start_matches(|c: char| c.is_ascii_uppercase())
        .trim_start_matches('!');

    rest.strip_prefix(" =>")
        .or_else(|| rest.strip_prefix(':'))
        .or_else(|| rest.strip_prefix(SEGMENT_SEPARATOR))
        .unwrap_or(rest)
        .trim()
}

fn json_object(line: &str) -> Option<&str> {
    let start = line.find('{')?;
    let end = line.rfind('}')?;
    (start < end).then(|| &line[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_json() {
        assert_eq!(
            classify(r#"10.0.0.1 | SUCCESS => {"changed": false, "ping": "pong"}"#),
            Line::Success {
                host: "10.0.0.1",
                payload: Payload::Json(r#"{"changed": false, "ping": "pong"}"#),
            }
        );
    }

    #[test]
    fn test_success_without_status_segment() {
        assert_eq!(
            classify(r#"10.0.0.1 => {"changed": true}"#),
            Line::Success {
                host: "10.0.0.1",
                payload: Payload::Json(r#"{"changed": true}"#),
            }
        );
    }

    #[test]
    fn test_success_with_nested_json() {
        let line = r#"web1 | SUCCESS => {"ansible_facts": {"os": {"family": "Debian"}}}"#;
        match classify(line) {
            Line::Success {
                host,
                payload: Payload::Json(json),
            } => {
                assert_eq!(host, "web1");
                assert!(json.ends_with("}}}"));
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_marker_inside_payload_is_not_a_failure() {
        let line = r#"web1 | SUCCESS => {"stdout": "last run FAILED => retrying"}"#;
        assert!(matches!(classify(line), Line::Success { host: "web1", .. }));
    }

    #[test]
    fn test_command_module_line() {
        assert_eq!(
            classify("web1 | CHANGED | rc=0 | (stdout) up 3 days"),
            Line::Success {
                host: "web1",
                payload: Payload::Text("CHANGED | rc=0 | (stdout) up 3 days"),
            }
        );
    }

    #[test]
    fn test_failure_markers() {
        assert_eq!(
            classify("10.0.0.2 | FAILED => some message"),
            Line::Failure {
                host: "10.0.0.2",
                message: "some message",
            }
        );
        assert_eq!(
            classify(r#"10.0.0.3 | UNREACHABLE! => {"msg": "timed out"}"#),
            Line::Failure {
                host: "10.0.0.3",
                message: r#"{"msg": "timed out"}"#,
            }
        );
        assert_eq!(
            classify("db1 | FAILED | rc=1 | (stdout)  (stderr) no such file"),
            Line::Failure {
                host: "db1",
                message: "rc=1 | (stdout)  (stderr) no such file",
            }
        );
    }

    #[test]
    fn test_unreachable_with_colon() {
        assert_eq!(
            classify("web2 | UNREACHABLE!: Failed to connect to the host via ssh: timed out"),
            Line::Failure {
                host: "web2",
                message: "Failed to connect to the host via ssh: timed out",
            }
        );
        assert_eq!(
            classify("10.0.0.9 UNREACHABLE!: no route to host"),
            Line::Failure {
                host: "10.0.0.9",
                message: "no route to host",
            }
        );
    }

    #[test]
    fn test_status_word_is_never_a_host() {
        assert_eq!(
            classify("FAILED => SSH Error: data could not be sent to 10.0.0.7"),
            Line::Failure {
                host: "10.0.0.7",
                message: "SSH Error: data could not be sent to 10.0.0.7",
            }
        );
        assert_eq!(host_of("FAILED => SSH Error: data could not be sent"), None);
        assert_eq!(classify("FAILED => SSH Error: data could not be sent"), Line::Other);
        assert_eq!(host_of("UNREACHABLE! => {}"), None);
    }

    #[test]
    fn test_marker_in_command_output_is_not_a_failure() {
        assert!(matches!(
            classify("web1 | CHANGED | rc=0 | (stdout) job FAILED: retrying"),
            Line::Success { host: "web1", .. }
        ));
    }

    #[test]
    fn test_noise_lines() {
        assert_eq!(classify(""), Line::Other);
        assert_eq!(
            classify("[WARNING]: provided hosts list is empty, only localhost is available"),
            Line::Other
        );
        assert_eq!(classify("  hosts (2):"), Line::Other);
    }

    #[test]
    fn test_host_falls_back_to_address() {
        assert_eq!(host_of("ssh to 192.168.1.20 => refused"), Some("192.168.1.20"));
        assert_eq!(host_of("no address here"), None);
    }

    #[test]
    fn test_crlf_is_tolerated() {
        assert_eq!(
            classify("10.0.0.2 | FAILED => boom\r"),
            Line::Failure {
                host: "10.0.0.2",
                message: "boom",
            }
        );
    }
}
