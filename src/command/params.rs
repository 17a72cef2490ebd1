//! Typed request parameters for the `run` and `listhosts` routes.
//!
//! The JSON keys are the short ansible flag letters callers already use
//! (`m`, `B`, `P`, ...). Valued parameters accept a string, number or
//! boolean and keep its textual form. Switch parameters (`C`, `s`) are
//! enabled by the presence of the key alone.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Parameters accepted by `POST /run`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunParams {
    /// Host pattern, required
    #[serde(default, deserialize_with = "scalar")]
    pub hosts: Option<String>,
    /// Module name (`-m`)
    #[serde(default, rename = "m", deserialize_with = "scalar")]
    pub module_name: Option<String>,
    /// Run asynchronously, failing after this many seconds (`-B`)
    #[serde(default, rename = "B", deserialize_with = "scalar")]
    pub background: Option<String>,
    /// Poll interval for background jobs (`-P`), only used with `B`
    #[serde(default, rename = "P", deserialize_with = "scalar")]
    pub poll: Option<String>,
    /// Check mode (`-C`)
    #[serde(default, rename = "C", deserialize_with = "presence")]
    pub check: bool,
    /// Connection type (`-c`)
    #[serde(default, rename = "c", deserialize_with = "scalar")]
    pub connection: Option<String>,
    /// Number of parallel processes (`-f`)
    #[serde(default, rename = "f", deserialize_with = "scalar")]
    pub forks: Option<String>,
    /// Inventory path or host list (`-i`)
    #[serde(default, rename = "i", deserialize_with = "scalar")]
    pub inventory: Option<String>,
    /// Further limit the selected hosts (`-l`)
    #[serde(default, rename = "l", deserialize_with = "scalar")]
    pub limit: Option<String>,
    /// Module library path (`-M`)
    #[serde(default, rename = "M", deserialize_with = "scalar")]
    pub module_path: Option<String>,
    /// SSH private key file (`--private-key`)
    #[serde(default, rename = "privatekey", deserialize_with = "scalar")]
    pub private_key: Option<String>,
    /// Run operations with sudo (`-s`)
    #[serde(default, rename = "s", deserialize_with = "presence")]
    pub sudo: bool,
    /// Desired sudo user (`-U`)
    #[serde(default, rename = "U", deserialize_with = "scalar")]
    pub sudo_user: Option<String>,
    /// Connection timeout in seconds (`-T`)
    #[serde(default, rename = "T", deserialize_with = "scalar")]
    pub timeout: Option<String>,
    /// Remote user (`-u`)
    #[serde(default, rename = "u", deserialize_with = "scalar")]
    pub remote_user: Option<String>,
    /// Module arguments (`-a`)
    #[serde(default, rename = "a", deserialize_with = "scalar")]
    pub module_args: Option<String>,
    /// Log the built command at info level
    #[serde(default, deserialize_with = "truthy")]
    pub debug: bool,
}

impl RunParams {
    /// Create parameters targeting the given host pattern.
    pub fn new(hosts: impl Into<String>) -> Self {
        Self {
            hosts: Some(hosts.into()),
            ..Self::default()
        }
    }

    /// Parse a JSON request body.
    ///
    /// The body is read as a map first, so a key given twice keeps its
    /// last value instead of being rejected as a duplicate field.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)
            .map_err(|e| Error::invalid_request(format!("body is not a JSON object: {}", e)))?;

        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| Error::invalid_request(format!("invalid parameter: {}", e)))
    }

    /// Set the module name.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module_name = Some(module.into());
        self
    }

    /// Set the module arguments.
    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.module_args = Some(args.into());
        self
    }

    /// Check the parameters and return the host pattern.
    pub fn validate(&self) -> Result<&str> {
        let hosts = validate_hosts(self.hosts.as_deref())?;

        let valued = [
            ("m", &self.module_name),
            ("B", &self.background),
            ("P", &self.poll),
            ("c", &self.connection),
            ("f", &self.forks),
            ("i", &self.inventory),
            ("l", &self.limit),
            ("M", &self.module_path),
            ("privatekey", &self.private_key),
            ("U", &self.sudo_user),
            ("T", &self.timeout),
            ("u", &self.remote_user),
            ("a", &self.module_args),
        ];
        for (name, value) in valued {
            if let Some(value) = value {
                check_argument(name, value)?;
            }
        }

        Ok(hosts)
    }
}

/// Parameters accepted by `GET /listhosts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListHostsParams {
    /// Host pattern, required
    #[serde(default)]
    pub hosts: Option<String>,
    /// Log the built command at info level
    #[serde(default, deserialize_with = "truthy")]
    pub debug: bool,
}

impl ListHostsParams {
    /// Create parameters for the given host pattern.
    pub fn new(hosts: impl Into<String>) -> Self {
        Self {
            hosts: Some(hosts.into()),
            debug: false,
        }
    }

    /// Check the parameters and return the host pattern.
    pub fn validate(&self) -> Result<&str> {
        validate_hosts(self.hosts.as_deref())
    }
}

fn validate_hosts(hosts: Option<&str>) -> Result<&str> {
    let hosts = hosts
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| Error::invalid_request("missing required parameter 'hosts'"))?;

    if hosts.starts_with('-') {
        return Err(Error::invalid_request(format!(
            "host pattern '{}' must not start with '-'",
            hosts
        )));
    }
    check_argument("hosts", hosts)?;

    Ok(hosts)
}

fn check_argument(name: &str, value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(Error::invalid_request(format!(
            "parameter '{}' contains a NUL byte",
            name
        )));
    }
    Ok(())
}

/// A JSON scalar accepted where ansible expects a textual value.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::UInt(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

fn presence<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

fn truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => false,
        Some(Scalar::Bool(b)) => b,
        Some(Scalar::Int(n)) => n != 0,
        Some(Scalar::UInt(n)) => n != 0,
        Some(Scalar::Float(n)) => n != 0.0,
        Some(Scalar::Text(s)) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "no" | "off"
        ),
    })
}
