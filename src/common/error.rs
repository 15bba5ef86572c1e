//! Error types for clusterconf

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Codec errors ===
    #[error("Malformed configuration: {0}")]
    MalformedConfiguration(String),

    // === Change coordination errors ===
    #[error("Membership change already in progress at index {0}")]
    ChangeInProgress(u64),

    #[error("Membership change aborted: {0}")]
    ChangeAborted(String),

    // === Membership validation errors ===
    #[error("Membership must contain at least one node")]
    EmptyMembership,

    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Duplicate member: {0}")]
    DuplicateMember(String),

    // === Log layer errors ===
    #[error("Not leader: current leader is {0}")]
    NotLeader(String),

    // === Bootstrap errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Is this a retryable error?
    ///
    /// Change-coordination failures clear once the coordinator returns to
    /// idle; the membership-change request can simply be resubmitted.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ChangeInProgress(_) | Error::ChangeAborted(_) | Error::NotLeader(_)
        )
    }
}

impl From<prost::DecodeError> for Error {
    fn from(e: prost::DecodeError) -> Self {
        Error::MalformedConfiguration(e.to_string())
    }
}

impl From<::config::ConfigError> for Error {
    fn from(e: ::config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
