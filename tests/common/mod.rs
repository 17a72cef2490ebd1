//! Shared test utilities for the ansible API test suite.
//!
//! This module provides:
//! - A stub [`CommandRunner`] returning canned output
//! - A helper that serves the API on an ephemeral port
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use ansible_api::api::{ApiConfig, ApiServer};
use ansible_api::command::AnsibleCommand;
use ansible_api::error::{Error, Result};
use ansible_api::runner::{CommandRunner, ExecutionOutput};

/// What the stub runner does when asked to execute a command.
#[derive(Debug, Clone)]
pub enum StubBehavior {
    /// Return this output
    Output(ExecutionOutput),
    /// Fail as if the program did not exist
    SpawnFailure,
    /// Fail as if the timeout elapsed
    Timeout(Duration),
}

/// A runner that never spawns a process.
#[derive(Debug)]
pub struct StubRunner {
    behavior: StubBehavior,
    executed: Mutex<Vec<AnsibleCommand>>,
}

impl StubRunner {
    pub fn new(behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            executed: Mutex::new(Vec::new()),
        })
    }

    /// Stub returning exit status 0 with the given streams.
    pub fn succeeding(stdout: &str, stderr: &str) -> Arc<Self> {
        Self::new(StubBehavior::Output(ExecutionOutput::success(stdout, stderr)))
    }

    /// Stub returning `exit_code` with the given streams.
    pub fn exiting(exit_code: i32, stdout: &str, stderr: &str) -> Arc<Self> {
        Self::new(StubBehavior::Output(ExecutionOutput::failure(
            exit_code, stdout, stderr,
        )))
    }

    /// Commands executed so far.
    pub fn executed(&self) -> Vec<AnsibleCommand> {
        self.executed.lock().unwrap().clone()
    }

    /// Rendered commands executed so far.
    pub fn rendered(&self) -> Vec<String> {
        self.executed().iter().map(AnsibleCommand::render).collect()
    }
}

#[async_trait]
impl CommandRunner for StubRunner {
    async fn execute(&self, command: &AnsibleCommand) -> Result<ExecutionOutput> {
        self.executed.lock().unwrap().push(command.clone());

        match &self.behavior {
            StubBehavior::Output(output) => Ok(output.clone()),
            StubBehavior::SpawnFailure => Err(Error::Spawn {
                program: command.program().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
            StubBehavior::Timeout(limit) => Err(Error::Timeout(*limit)),
        }
    }
}

/// A running test server.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Full URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Serve the API backed by `runner` on an ephemeral local port.
pub async fn spawn_server(runner: Arc<dyn CommandRunner>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = ApiConfig::default().with_address(addr);
    let router = ApiServer::new(config, runner).router();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        addr,
        client: reqwest::Client::new(),
    }
}
