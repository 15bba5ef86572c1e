//! Replica-facing membership state
//!
//! `Membership` owns the last committed configuration and drives changes
//! through the log layer: derive the next configuration from a requested
//! delta, register the waiter, append the entry, then resolve the waiter
//! when the log layer reports commit or discard.

use crate::common::Result;
use crate::membership::{ChangeCoordinator, ChangeHandle, Configuration, MembershipChange};
use std::sync::Mutex;
use tracing::{info, warn};

/// The consumed log contract.
///
/// The entry appended for a configuration carries the configuration's own
/// index, so the index the next append will be assigned must be known up
/// front. Commit and discard are reported back through
/// [`Membership::commit`] and [`Membership::discard`].
pub trait ConfigurationLog: Send + Sync {
    /// Index the next appended entry will be assigned
    fn next_index(&self) -> u64;

    /// Append the configuration as a log entry at `configuration.index`.
    /// Fails with [`Error::NotLeader`](crate::Error::NotLeader) on a node that cannot append.
    fn append_configuration(&self, configuration: &Configuration) -> Result<()>;
}

/// Owns the active configuration and the change coordinator
pub struct Membership {
    /// Last committed configuration
    active: Mutex<Configuration>,

    coordinator: ChangeCoordinator,

    /// Serializes `change()` so derive/propose/append cannot interleave
    /// between competing proposers.
    change_lock: Mutex<()>,
}

impl Membership {
    /// Start from a committed configuration (bootstrap or snapshot restore)
    pub fn new(initial: Configuration) -> Self {
        Self {
            active: Mutex::new(initial),
            coordinator: ChangeCoordinator::new(),
            change_lock: Mutex::new(()),
        }
    }

    /// Snapshot of the last committed configuration.
    ///
    /// This is what quorum and vote-eligibility decisions read; the pending
    /// (proposed, uncommitted) configuration is never visible here.
    pub fn active(&self) -> Configuration {
        self.active.lock().unwrap().clone()
    }

    /// Is a membership change currently in flight?
    pub fn has_pending_change(&self) -> bool {
        self.coordinator.has_pending()
    }

    /// Propose a membership change.
    ///
    /// Derives the next configuration from the active one, registers the
    /// waiter, and appends the entry. Fails with
    /// [`Error::ChangeInProgress`](crate::Error::ChangeInProgress) while an earlier change is unresolved,
    /// and with the delta's validation error for an invalid change. On
    /// success the caller awaits the returned handle for the committed
    /// configuration or the discard reason.
    ///
    /// Must be called from the same context that owns the log's append
    /// path, so no other entry lands between [`ConfigurationLog::next_index`]
    /// and the append.
    pub fn change(
        &self,
        log: &dyn ConfigurationLog,
        change: &MembershipChange,
    ) -> Result<ChangeHandle> {
        let _serialize = self.change_lock.lock().unwrap();

        let index = log.next_index();
        let next = self.active().apply(index, change)?;
        let handle = self.coordinator.propose(index)?;

        if let Err(e) = log.append_configuration(&next) {
            // Nothing made it into the log; release the slot so the caller
            // can retry.
            self.coordinator.abort(index, "configuration entry was not appended");
            return Err(e);
        }

        info!(index, configuration = %next, "proposed membership change");
        Ok(handle)
    }

    /// OnCommit callback: the configuration entry at `configuration.index`
    /// committed. Adopts it as active and resolves the waiter, if any.
    ///
    /// Configurations adopted by one replica have strictly increasing
    /// indexes; a commit that does not advance the active index is ignored.
    pub fn commit(&self, configuration: Configuration) {
        let index = configuration.index;
        {
            let mut active = self.active.lock().unwrap();
            if index <= active.index {
                warn!(
                    index,
                    active_index = active.index,
                    "ignoring committed configuration that does not advance the active index"
                );
                return;
            }
            info!(index, configuration = %configuration, "adopting committed configuration");
            *active = configuration.clone();
        }
        self.coordinator.complete(index, configuration);
    }

    /// OnDiscard callback: the entry at `index` was overwritten or
    /// truncated before committing. Resolves the waiter, if any, with
    /// [`Error::ChangeAborted`](crate::Error::ChangeAborted).
    pub fn discard(&self, index: u64, reason: &str) {
        self.coordinator.abort(index, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn initial() -> Configuration {
        let members: HashMap<_, _> = [
            ("n1".to_string(), "a1".to_string()),
            ("n2".to_string(), "a2".to_string()),
        ]
        .into_iter()
        .collect();
        Configuration::new(0, members).unwrap()
    }

    #[test]
    fn test_active_is_a_snapshot() {
        let membership = Membership::new(initial());
        let mut snapshot = membership.active();
        snapshot.members.insert("n9".to_string(), "a9".to_string());
        assert!(!membership.active().members.contains_key("n9"));
    }

    #[test]
    fn test_commit_advances_active() {
        let membership = Membership::new(initial());
        let next = initial()
            .apply(
                3,
                &MembershipChange::AddNode {
                    id: "n3".to_string(),
                    address: "a3".to_string(),
                },
            )
            .unwrap();

        membership.commit(next.clone());
        assert_eq!(membership.active(), next);
    }

    #[test]
    fn test_commit_ignores_non_advancing_index() {
        let membership = Membership::new(initial());
        let newer = initial()
            .apply(5, &MembershipChange::RemoveNode { id: "n2".to_string() })
            .unwrap();
        membership.commit(newer.clone());

        // a replayed older commit must not roll the active configuration back
        let older = initial()
            .apply(
                2,
                &MembershipChange::AddNode {
                    id: "n4".to_string(),
                    address: "a4".to_string(),
                },
            )
            .unwrap();
        membership.commit(older);
        assert_eq!(membership.active(), newer);
    }

    #[test]
    fn test_discard_without_pending_is_noop() {
        let membership = Membership::new(initial());
        membership.discard(7, "leadership lost");
        assert!(!membership.has_pending_change());
    }
}
