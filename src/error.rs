//! Error taxonomy for the routing core.
//!
//! Routers speak `tonic::Status` internally; `CoreError` wraps that currency
//! at the boundary and makes the failure kind introspectable through
//! predicates, so callers branch on kind without matching on variants.

use tonic::{Code, Status};

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Failures raised by or surfaced through the routing core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Failed to establish a connection to a collaborator.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Transport-level error from tonic.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// gRPC status surfaced by a collaborator or a router.
    #[error("grpc error: {0}")]
    Grpc(Box<Status>),

    /// Invalid argument provided by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Sequence conflict between a command and the aggregate head.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// Failed to parse an RFC3339 timestamp.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl From<Status> for CoreError {
    fn from(status: Status) -> Self {
        CoreError::Grpc(Box::new(status))
    }
}

impl CoreError {
    /// Returns the error message.
    pub fn message(&self) -> String {
        match self {
            CoreError::Connection(msg) => msg.clone(),
            CoreError::Transport(e) => e.to_string(),
            CoreError::Grpc(s) => s.message().to_string(),
            CoreError::InvalidArgument(msg) => msg.clone(),
            CoreError::PreconditionFailed(msg) => msg.clone(),
            CoreError::InvalidTimestamp(msg) => msg.clone(),
        }
    }

    /// Returns the gRPC status code if this is a gRPC error.
    pub fn code(&self) -> Option<Code> {
        match self {
            CoreError::Grpc(s) => Some(s.code()),
            _ => None,
        }
    }

    /// Returns the underlying gRPC Status if this is a gRPC error.
    pub fn status(&self) -> Option<&Status> {
        match self {
            CoreError::Grpc(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self.code(), Some(Code::NotFound))
    }

    /// Returns true if this is a "precondition failed" error.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self.code(), Some(Code::FailedPrecondition))
            || matches!(self, CoreError::PreconditionFailed(_))
    }

    /// Returns true if this is an "invalid argument" error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.code(), Some(Code::InvalidArgument))
            || matches!(self, CoreError::InvalidArgument(_))
    }

    /// Returns true if this is a connection or transport error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, CoreError::Connection(_) | CoreError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates_from_native_variants() {
        assert!(CoreError::InvalidArgument("bad".into()).is_invalid_argument());
        assert!(CoreError::PreconditionFailed("stale".into()).is_precondition_failed());
        assert!(CoreError::Connection("refused".into()).is_connection_error());
    }

    #[test]
    fn test_predicates_from_status_codes() {
        let not_found = CoreError::from(Status::not_found("no such root"));
        assert!(not_found.is_not_found());
        assert!(!not_found.is_precondition_failed());

        let stale = CoreError::from(Status::failed_precondition("sequence mismatch"));
        assert!(stale.is_precondition_failed());
        assert!(!stale.is_invalid_argument());

        let bad = CoreError::from(Status::invalid_argument("unknown command"));
        assert!(bad.is_invalid_argument());
        assert!(!bad.is_connection_error());
    }

    #[test]
    fn test_predicates_are_exclusive_elsewhere() {
        let err = CoreError::InvalidTimestamp("not a timestamp".into());
        assert!(!err.is_not_found());
        assert!(!err.is_precondition_failed());
        assert!(!err.is_invalid_argument());
        assert!(!err.is_connection_error());
    }

    #[test]
    fn test_message_and_code() {
        let err = CoreError::from(Status::not_found("missing"));
        assert_eq!(err.message(), "missing");
        assert_eq!(err.code(), Some(Code::NotFound));
        assert!(err.status().is_some());

        let err = CoreError::InvalidArgument("oops".into());
        assert_eq!(err.message(), "oops");
        assert_eq!(err.code(), None);
        assert!(err.status().is_none());
    }
}
