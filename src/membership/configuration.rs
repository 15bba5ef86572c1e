//! Cluster membership configuration
//!
//! A `Configuration` is an immutable-per-version snapshot of the cluster:
//! who the members are, which of them vote, and the log index at which the
//! snapshot took effect. Changes never mutate an adopted configuration;
//! they derive a new one with a higher index.

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single membership change applied on top of the active configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    /// Add a node. It joins as a non-voter and is promoted separately once
    /// it has caught up with the log.
    AddNode { id: String, address: String },

    /// Remove a node entirely
    RemoveNode { id: String },

    /// Grant the node a vote in elections and commitment
    Promote { id: String },

    /// Revoke the node's vote; it keeps receiving log entries
    Demote { id: String },
}

/// Snapshot of cluster membership at a log index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// All members of the cluster (node ID → address)
    pub members: HashMap<String, String>,

    /// Voting status per node ID. Voters have their vote counted in
    /// elections and their match index considered when the leader advances
    /// the commit index; non-voters merely receive log entries. A node
    /// absent from this map is treated as a non-voter.
    pub is_voter: HashMap<String, bool>,

    /// The log index at which this configuration took effect
    pub index: u64,
}

impl Configuration {
    /// Create a configuration in which every member has voter status.
    ///
    /// An empty member map is rejected: a cluster with no members can never
    /// form a quorum, so the mistake is surfaced here rather than at
    /// election time.
    pub fn new(index: u64, members: HashMap<String, String>) -> Result<Self> {
        if members.is_empty() {
            return Err(Error::EmptyMembership);
        }
        let is_voter = members.keys().map(|id| (id.clone(), true)).collect();
        Ok(Self {
            members,
            is_voter,
            index,
        })
    }

    /// Voter status for a node; ids absent from the voter map are non-voters
    pub fn is_voter(&self, id: &str) -> bool {
        self.is_voter.get(id).copied().unwrap_or(false)
    }

    /// Number of voting members
    pub fn voter_count(&self) -> usize {
        self.members.keys().filter(|id| self.is_voter(id)).count()
    }

    /// Majority of voters needed to win an election or commit an entry
    pub fn quorum_size(&self) -> usize {
        self.voter_count() / 2 + 1
    }

    /// Derive the configuration that results from applying `change` on top
    /// of this one, effective at log index `index`.
    pub fn apply(&self, index: u64, change: &MembershipChange) -> Result<Self> {
        let mut next = self.clone();
        next.index = index;
        match change {
            MembershipChange::AddNode { id, address } => {
                if next.members.contains_key(id) {
                    return Err(Error::DuplicateMember(id.clone()));
                }
                next.members.insert(id.clone(), address.clone());
                next.is_voter.insert(id.clone(), false);
            }
            MembershipChange::RemoveNode { id } => {
                if next.members.remove(id).is_none() {
                    return Err(Error::UnknownMember(id.clone()));
                }
                next.is_voter.remove(id);
            }
            MembershipChange::Promote { id } => {
                if !next.members.contains_key(id) {
                    return Err(Error::UnknownMember(id.clone()));
                }
                next.is_voter.insert(id.clone(), true);
            }
            MembershipChange::Demote { id } => {
                if !next.members.contains_key(id) {
                    return Err(Error::UnknownMember(id.clone()));
                }
                next.is_voter.insert(id.clone(), false);
            }
        }
        Ok(next)
    }
}

impl fmt::Display for Configuration {
    /// Member ordering in the rendering is unspecified (map iteration)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{logIndex: {} members: ", self.index)?;
        let mut first = true;
        for (id, address) in &self.members {
            let role = if self.is_voter(id) { "voter" } else { "non-voter" };
            if !first {
                write!(f, ",")?;
            }
            write!(f, "({}, {}, {})", id, address, role)?;
            first = false;
        }
        write!(f, "}}")
    }
}
