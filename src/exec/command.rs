// src/exec/command.rs

//! Shell command workload.

use std::collections::HashMap;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::dag::{NodeId, WorkNode};
use crate::errors::WorkloadError;
use crate::exec::backend::{SleepWorkload, Workload, WorkloadFuture};

/// Runs a configured shell command for each node.
///
/// Nodes without a command fall back to [`SleepWorkload`], so a graph file
/// can mix simulated and real work. A non-zero exit status fails the node.
#[derive(Debug, Clone, Default)]
pub struct CommandWorkload {
    commands: HashMap<NodeId, String>,
}

impl CommandWorkload {
    pub fn new(commands: HashMap<NodeId, String>) -> Self {
        Self { commands }
    }

    pub fn command_for(&self, node: &str) -> Option<&str> {
        self.commands.get(node).map(String::as_str)
    }
}

impl Workload for CommandWorkload {
    fn run<'a>(&'a self, node: &'a WorkNode) -> WorkloadFuture<'a> {
        match self.commands.get(&node.id) {
            Some(cmd) => Box::pin(run_command(node, cmd)),
            None => SleepWorkload.run(node),
        }
    }
}

async fn run_command(node: &WorkNode, cmd_line: &str) -> Result<(), WorkloadError> {
    info!(node = %node.id, cmd = %cmd_line, "starting node command");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    };

    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn()?;

    // Always consume both pipes so buffers don't fill; log at debug.
    if let Some(stdout) = child.stdout.take() {
        let node_id = node.id.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(node = %node_id, "stdout: {}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let node_id = node.id.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(node = %node_id, "stderr: {}", line);
            }
        });
    }

    let status = child.wait().await?;
    let code = status.code().unwrap_or(-1);

    info!(
        node = %node.id,
        exit_code = code,
        success = status.success(),
        "node command exited"
    );

    if status.success() {
        Ok(())
    } else {
        Err(WorkloadError::ExitStatus(code))
    }
}
