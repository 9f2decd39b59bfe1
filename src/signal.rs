// src/signal.rs

//! One-shot, multi-waiter completion gate.
//!
//! Every node gets a fresh [`CompletionSignal`] per run. The node's own task
//! arrives on it exactly once; any number of dependents await it. The signal
//! is backed by a `tokio::sync::watch` channel, so the arrival is a release
//! and every await that observes it is an acquire: whatever the arriving task
//! wrote before `arrive()` is visible to a waiter after `await_done()`.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::dag::NodeId;
use crate::errors::{FlowdagError, Result};

/// Terminal result carried by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Succeeded,
    /// The node failed or was skipped because of an upstream failure.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalState {
    Pending,
    Done(Completion),
}

#[derive(Debug, Clone)]
pub struct CompletionSignal {
    node: NodeId,
    tx: Arc<watch::Sender<SignalState>>,
}

impl CompletionSignal {
    pub fn new(node: impl Into<NodeId>) -> Self {
        let (tx, _rx) = watch::channel(SignalState::Pending);
        Self {
            node: node.into(),
            tx: Arc::new(tx),
        }
    }

    /// Node this signal belongs to.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Transition `Pending -> Done(completion)` and release every waiter.
    pub fn arrive(&self, completion: Completion) -> Result<()> {
        let transitioned = self.tx.send_if_modified(|state| match state {
            SignalState::Pending => {
                *state = SignalState::Done(completion);
                true
            }
            SignalState::Done(_) => false,
        });

        if transitioned {
            Ok(())
        } else {
            Err(FlowdagError::DoubleArrival(self.node.clone()))
        }
    }

    pub fn is_done(&self) -> bool {
        self.completion().is_some()
    }

    /// Current completion without waiting.
    pub fn completion(&self) -> Option<Completion> {
        match *self.tx.borrow() {
            SignalState::Pending => None,
            SignalState::Done(c) => Some(c),
        }
    }

    /// Wait until the signal is done. Blocks forever if nobody arrives.
    pub async fn await_done(&self) -> Result<Completion> {
        let mut rx = self.tx.subscribe();
        let state = rx
            .wait_for(|s| matches!(s, SignalState::Done(_)))
            .await
            .map_err(|_| FlowdagError::SignalClosed(self.node.clone()))?;

        match *state {
            SignalState::Done(c) => Ok(c),
            SignalState::Pending => Err(FlowdagError::SignalClosed(self.node.clone())),
        }
    }

    /// Like [`await_done`](Self::await_done) but gives up at `deadline`.
    ///
    /// `waiter` is the node doing the waiting and ends up in the
    /// [`FlowdagError::Timeout`] error together with this signal's node.
    pub async fn await_done_until(&self, waiter: &str, deadline: Instant) -> Result<Completion> {
        let started = Instant::now();
        match tokio::time::timeout_at(deadline, self.await_done()).await {
            Ok(res) => res,
            Err(_) => Err(FlowdagError::Timeout {
                node: waiter.to_string(),
                prerequisite: self.node.clone(),
                after: started.elapsed(),
            }),
        }
    }
}
