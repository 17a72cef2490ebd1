//! Translation of request parameters into an `ansible` invocation.
//!
//! A command is always an argument vector. Parameter values are never
//! interpolated into a shell line, so a host pattern such as
//! `web; rm -rf /` reaches ansible as one literal argument.

mod params;

use std::fmt;

use tracing::{debug, info};

pub use params::{ListHostsParams, RunParams};

use crate::error::Result;

/// Default program name, resolved through `PATH`.
pub const DEFAULT_ANSIBLE_BIN: &str = "ansible";

/// The two operations exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Ad-hoc module execution
    Run,
    /// Host listing
    ListHosts,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Run => write!(f, "run"),
            Route::ListHosts => write!(f, "listhosts"),
        }
    }
}

/// A fully built ansible invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsibleCommand {
    route: Route,
    program: String,
    args: Vec<String>,
}

impl AnsibleCommand {
    /// The route this command was built for.
    pub fn route(&self) -> Route {
        self.route
    }

    /// Program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments, excluding the program itself.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Shell-quoted rendering, for logs and error messages only.
    pub fn render(&self) -> String {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

impl fmt::Display for AnsibleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Builds [`AnsibleCommand`]s for a configured ansible binary.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
}

impl CommandBuilder {
    /// Create a builder invoking `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The configured program.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build `ansible <hosts> -o --list-hosts`.
    pub fn list_hosts(&self, params: &ListHostsParams) -> Result<AnsibleCommand> {
        let hosts = params.validate()?;

        let mut args = self.base_args(hosts);
        args.push("--list-hosts".to_string());

        Ok(self.finish(Route::ListHosts, args, params.debug))
    }

    /// Build `ansible <hosts> -o` followed by one flag per present parameter.
    ///
    /// Flags are emitted in a fixed order so identical parameters always give
    /// an identical command. `-P` is dropped unless `-B` is present.
    pub fn run(&self, params: &RunParams) -> Result<AnsibleCommand> {
        let hosts = params.validate()?;
        let mut args = self.base_args(hosts);

        push_valued(&mut args, "-m", &params.module_name);
        push_valued(&mut args, "-B", &params.background);
        if params.background.is_some() {
            push_valued(&mut args, "-P", &params.poll);
        }
        push_switch(&mut args, "-C", params.check);
        push_valued(&mut args, "-c", &params.connection);
        push_valued(&mut args, "-f", &params.forks);
        push_valued(&mut args, "-i", &params.inventory);
        push_valued(&mut args, "-l", &params.limit);
        push_valued(&mut args, "-M", &params.module_path);
        if let Some(key) = &params.private_key {
            args.push(format!("--private-key={}", key));
        }
        push_switch(&mut args, "-s", params.sudo);
        push_valued(&mut args, "-U", &params.sudo_user);
        push_valued(&mut args, "-T", &params.timeout);
        push_valued(&mut args, "-u", &params.remote_user);
        push_valued(&mut args, "-a", &params.module_args);

        Ok(self.finish(Route::Run, args, params.debug))
    }

    // `-o` keeps ansible at one line per host, which the output parser relies on.
    fn base_args(&self, hosts: &str) -> Vec<String> {
        vec![hosts.to_string(), "-o".to_string()]
    }

    fn finish(&self, route: Route, args: Vec<String>, debug_requested: bool) -> AnsibleCommand {
        let command = AnsibleCommand {
            route,
            program: self.program.clone(),
            args,
        };

        if debug_requested {
            info!(route = %route, command = %command, "Built ansible command");
        } else {
            debug!(route = %route, command = %command, "Built ansible command");
        }

        command
    }
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ANSIBLE_BIN)
    }
}

fn push_valued(args: &mut Vec<String>, flag: &str, value: &Option<String>) {
    if let Some(value) = value {
        args.push(flag.to_string());
        args.push(value.clone());
    }
}

fn push_switch(args: &mut Vec<String>, flag: &str, enabled: bool) {
    if enabled {
        args.push(flag.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(command: &AnsibleCommand) -> Vec<&str> {
        command.args().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_list_hosts_command() {
        let command = CommandBuilder::default()
            .list_hosts(&ListHostsParams::new("webservers"))
            .unwrap();

        assert_eq!(command.route(), Route::ListHosts);
        assert_eq!(command.program(), "ansible");
        assert_eq!(args(&command), vec!["webservers", "-o", "--list-hosts"]);
        assert_eq!(command.render(), "ansible webservers -o --list-hosts");
    }

    #[test]
    fn test_run_command_minimal() {
        let params = RunParams::new("web1,web2").with_module("ping");
        let command = CommandBuilder::default().run(&params).unwrap();

        assert_eq!(command.render(), "ansible web1,web2 -o -m ping");
    }

    #[test]
    fn test_run_command_fixed_flag_order() {
        let params = RunParams {
            hosts: Some("all".into()),
            module_name: Some("shell".into()),
            background: Some("60".into()),
            poll: Some("5".into()),
            check: true,
            connection: Some("local".into()),
            forks: Some("10".into()),
            inventory: Some("/etc/ansible/hosts".into()),
            limit: Some("web*".into()),
            module_path: Some("/opt/modules".into()),
            private_key: Some("/keys/id_rsa".into()),
            sudo: true,
            sudo_user: Some("root".into()),
            timeout: Some("15".into()),
            remote_user: Some("deploy".into()),
            module_args: Some("uptime -p".into()),
            debug: false,
        };
        let command = CommandBuilder::default().run(&params).unwrap();

        assert_eq!(
            args(&command),
            vec![
                "all",
                "-o",
                "-m",
                "shell",
                "-B",
                "60",
                "-P",
                "5",
                "-C",
                "-c",
                "local",
                "-f",
                "10",
                "-i",
                "/etc/ansible/hosts",
                "-l",
                "web*",
                "-M",
                "/opt/modules",
                "--private-key=/keys/id_rsa",
                "-s",
                "-U",
                "root",
                "-T",
                "15",
                "-u",
                "deploy",
                "-a",
                "uptime -p",
            ]
        );
    }

    #[test]
    fn test_poll_without_background_is_dropped() {
        let params = RunParams {
            poll: Some("5".into()),
            ..RunParams::new("all")
        };
        let command = CommandBuilder::default().run(&params).unwrap();

        assert_eq!(args(&command), vec!["all", "-o"]);
    }

    #[test]
    fn test_custom_program() {
        let command = CommandBuilder::new("/usr/local/bin/ansible")
            .run(&RunParams::new("db"))
            .unwrap();
        assert_eq!(command.program(), "/usr/local/bin/ansible");
    }

    #[test]
    fn test_render_quotes_metacharacters() {
        let command = CommandBuilder::default()
            .list_hosts(&ListHostsParams::new("web; rm -rf /"))
            .unwrap();

        assert_eq!(args(&command)[0], "web; rm -rf /");
        assert_eq!(command.render(), "ansible 'web; rm -rf /' -o --list-hosts");
    }

    #[test]
    fn test_missing_hosts_is_rejected() {
        assert!(CommandBuilder::default().run(&RunParams::default()).is_err());
    }

    #[test]
    fn test_route_display() {
        assert_eq!(Route::Run.to_string(), "run");
        assert_eq!(Route::ListHosts.to_string(), "listhosts");
    }
}
