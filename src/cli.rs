//! Command-line interface for the ansible API server.

use clap::Parser;
use std::path::PathBuf;

use ansible_api::config::Config;
use ansible_api::logging::LogFormat;

/// HTTP API over the ansible command-line tool
#[derive(Parser, Debug, Clone)]
#[command(name = "ansible-api")]
#[command(author = "Ansible API Contributors")]
#[command(version)]
#[command(about = "Run ad-hoc ansible commands and list hosts over HTTP", long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long, env = "ANSIBLE_API_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind to
    #[arg(short = 'b', long)]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Path to the ansible executable
    #[arg(long = "ansible-bin")]
    pub ansible_bin: Option<String>,

    /// Kill ansible after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Log output format
    #[arg(long = "log-format")]
    pub log_format: Option<LogFormat>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Override configuration values given on the command line.
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(binary) = &self.ansible_bin {
            config.ansible.binary = binary.clone();
        }
        if let Some(timeout) = self.timeout {
            config.ansible.timeout = Some(timeout);
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "ansible-api",
            "--port",
            "9999",
            "--ansible-bin",
            "/opt/bin/ansible",
            "--log-format",
            "json",
            "-vv",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.ansible.binary, "/opt/bin/ansible");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
