//! Cluster membership: configuration snapshots, their wire codec, and
//! coordination of in-flight membership changes
//!
//! - `configuration`: the immutable-per-version membership snapshot
//! - `wire`: protobuf encoding persisted in log entries and snapshots
//! - `coordinator`: single-slot tracking of the proposed-but-uncommitted change
//! - `state`: the replica-facing surface owning the active configuration

pub mod configuration;
pub mod coordinator;
pub mod state;
pub mod wire;

pub use configuration::{Configuration, MembershipChange};
pub use coordinator::{ChangeCoordinator, ChangeHandle};
pub use state::{ConfigurationLog, Membership};
