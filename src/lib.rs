//! # clusterconf
//!
//! Cluster-membership configuration and change coordination for a
//! Raft-style replica:
//! - `Configuration`: immutable-per-version snapshot of cluster members,
//!   their voter status, and the log index at which it took effect
//! - Protobuf wire codec for log persistence and transfer between replicas
//! - `ChangeCoordinator`: tracks the single in-flight membership change and
//!   resolves its waiter exactly once on commit or discard
//! - `Membership`: replica-facing surface owning the active configuration
//!   and driving changes through the log layer
//!
//! Leader election, log replication, and snapshot transfer live outside
//! this crate; they are consumed through the [`ConfigurationLog`] trait and
//! the [`Membership::commit`] / [`Membership::discard`] callbacks.
//!
//! ## Architecture
//!
//! ```text
//! change request ──> Membership::change ──┬──> ChangeCoordinator::propose
//!                                         │          │
//!                                         │          └──> ChangeHandle (waiter)
//!                                         └──> ConfigurationLog::append_configuration
//!
//! log commit   ──> Membership::commit  ──> ChangeCoordinator::complete ──> waiter
//! log discard  ──> Membership::discard ──> ChangeCoordinator::abort ─────> waiter
//! ```

pub mod common;
pub mod membership;

// Re-export commonly used types
pub use common::{Error, NodeConfig, Result};
pub use membership::{
    ChangeCoordinator, ChangeHandle, Configuration, ConfigurationLog, Membership,
    MembershipChange,
};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
