//! Change coordination for in-flight membership changes
//!
//! At most one configuration change is ever in flight: the coordinator
//! tracks the log index the proposed configuration was appended at and
//! resolves the proposer exactly once when the log layer reports that the
//! entry committed or was discarded. Joint consensus is out of scope; every
//! change is a single-step switch to the new membership set.

use crate::common::{Error, Result};
use crate::membership::Configuration;
use std::sync::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// The pending record: the proposed entry's log index and the one-shot
/// channel that delivers the resolution to the proposer.
struct PendingChange {
    index: u64,
    tx: oneshot::Sender<Result<Configuration>>,
}

/// Tracks the single in-flight membership change
#[derive(Default)]
pub struct ChangeCoordinator {
    pending: Mutex<Option<PendingChange>>,
}

/// Waiter handle for a proposed change; resolves exactly once
#[derive(Debug)]
pub struct ChangeHandle {
    rx: oneshot::Receiver<Result<Configuration>>,
}

impl ChangeHandle {
    /// Wait for the proposed configuration to commit or be discarded.
    ///
    /// Resolves to the committed configuration, or to
    /// [`Error::ChangeAborted`] when the entry never commits. Dropping the
    /// handle abandons the wait; the coordinator clears its pending slot
    /// either way.
    pub async fn wait(self) -> Result<Configuration> {
        match self.rx.await {
            Ok(result) => result,
            // Coordinator dropped before resolving; nothing will commit.
            Err(_) => Err(Error::ChangeAborted("coordinator shut down".to_string())),
        }
    }
}

impl ChangeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending change at `index` and hand back the waiter.
    ///
    /// Fails with [`Error::ChangeInProgress`] while another change is
    /// pending, leaving that record untouched. Callers must not append the
    /// configuration entry unless this succeeds, or the entry would commit
    /// with nobody waiting on it.
    pub fn propose(&self, index: u64) -> Result<ChangeHandle> {
        let mut pending = self.pending.lock().unwrap();
        if let Some(existing) = pending.as_ref() {
            return Err(Error::ChangeInProgress(existing.index));
        }
        let (tx, rx) = oneshot::channel();
        *pending = Some(PendingChange { index, tx });
        debug!(index, "registered pending membership change");
        Ok(ChangeHandle { rx })
    }

    /// The entry at `index` committed: deliver the configuration to the
    /// waiter and clear the slot. A mismatched index is a stale or
    /// duplicate notification and is ignored.
    pub fn complete(&self, index: u64, configuration: Configuration) {
        self.resolve(index, Ok(configuration));
    }

    /// The entry at `index` was discarded before committing (overwritten by
    /// a competing leader's log, or this node stepped down). Same matching
    /// rule as [`complete`](Self::complete); the waiter receives
    /// [`Error::ChangeAborted`] carrying `reason`.
    pub fn abort(&self, index: u64, reason: &str) {
        self.resolve(index, Err(Error::ChangeAborted(reason.to_string())));
    }

    /// Is a change currently in flight?
    pub fn has_pending(&self) -> bool {
        self.pending.lock().unwrap().is_some()
    }

    /// Log index of the in-flight change, if any
    pub fn pending_index(&self) -> Option<u64> {
        self.pending.lock().unwrap().as_ref().map(|p| p.index)
    }

    fn resolve(&self, index: u64, result: Result<Configuration>) {
        let record = {
            let mut pending = self.pending.lock().unwrap();
            match pending.as_ref() {
                Some(record) if record.index == index => pending.take(),
                Some(record) => {
                    warn!(
                        index,
                        pending_index = record.index,
                        "ignoring stale change notification"
                    );
                    None
                }
                // Normal on followers: they apply committed configuration
                // entries they never proposed.
                None => {
                    debug!(index, "change notification with no pending change");
                    None
                }
            }
        };

        // send() never blocks; an abandoned handle just discards the result.
        if let Some(record) = record {
            if record.tx.send(result).is_err() {
                debug!(index, "waiter abandoned before resolution");
            }
        }
    }
}
