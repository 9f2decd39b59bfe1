use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use flowdag::dag::WorkNode;
use flowdag::errors::WorkloadError;
use flowdag::exec::{Workload, WorkloadFuture};

/// A fake workload that:
/// - records which nodes were started, in order
/// - tracks how many nodes ran at the same time
/// - sleeps for the node's declared workload
/// - fails the nodes it was told to fail (after sleeping)
#[derive(Debug, Default)]
pub struct RecordingWorkload {
    failing: HashSet<String>,
    started: Mutex<Vec<String>>,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl RecordingWorkload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(nodes: &[&str]) -> Self {
        Self {
            failing: nodes.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Node ids in the order their workload started.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn run_count(&self, node: &str) -> usize {
        self.started
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.as_str() == node)
            .count()
    }

    /// Highest number of workloads observed running at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }
}

impl Workload for RecordingWorkload {
    fn run<'a>(&'a self, node: &'a WorkNode) -> WorkloadFuture<'a> {
        Box::pin(async move {
            self.started.lock().unwrap().push(node.id.clone());
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(node.workload).await;

            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(&node.id) {
                Err(WorkloadError::Message(format!("{} was told to fail", node.id)))
            } else {
                Ok(())
            }
        })
    }
}
