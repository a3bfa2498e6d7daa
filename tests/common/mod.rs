#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use mcp_ssh_server::exec::{ExecOutcome, ExecOutput, RemoteRequest, RemoteRunner};

enum Scripted {
    Outcome(ExecOutcome),
    Fault(String),
    Panic(String),
}

#[derive(Default)]
struct Inner {
    script: VecDeque<Scripted>,
    requests: Vec<RemoteRequest>,
}

/// `RemoteRunner` that plays back queued outcomes and records every request.
/// Clones share the same queue, so a test can keep one handle after moving
/// another into the server. With nothing queued it reports a silent success.
#[derive(Clone, Default)]
pub struct FakeRunner {
    inner: Arc<Mutex<Inner>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: ExecOutcome) -> &Self {
        self.inner.lock().unwrap().script.push_back(Scripted::Outcome(outcome));
        self
    }

    pub fn push_fault(&self, message: &str) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .script
            .push_back(Scripted::Fault(message.to_string()));
        self
    }

    pub fn push_panic(&self, message: &str) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .script
            .push_back(Scripted::Panic(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.inner.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl RemoteRunner for FakeRunner {
    async fn run_remote(&self, request: &RemoteRequest) -> Result<ExecOutcome> {
        let next = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(request.clone());
            inner.script.pop_front()
        };
        match next {
            None => Ok(completed(0, "", "")),
            Some(Scripted::Outcome(outcome)) => Ok(outcome),
            Some(Scripted::Fault(message)) => Err(anyhow!(message)),
            Some(Scripted::Panic(message)) => panic!("{message}"),
        }
    }

    fn strategy_names(&self) -> Vec<&'static str> {
        vec!["sshpass", "expect"]
    }
}

pub fn completed(exit_code: i32, stdout: &str, stderr: &str) -> ExecOutcome {
    ExecOutcome::Completed(ExecOutput {
        strategy: "sshpass",
        exit_code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    })
}
