//! Shared error type across gripline crates.

use std::fmt;

use thiserror::Error;

/// Stable error codes (used in logs, metrics labels and test vectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A producer broke the inspection result contract.
    ContractViolation,
    /// The inspection authority could not be consulted.
    InspectionUnavailable,
    /// The origin fetch failed.
    OriginFailed,
    /// The channel subsystem rejected a session handoff.
    HandoffFailed,
    /// Invalid configuration.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ContractViolation => "CONTRACT_VIOLATION",
            ErrorCode::InspectionUnavailable => "INSPECTION_UNAVAILABLE",
            ErrorCode::OriginFailed => "ORIGIN_FAILED",
            ErrorCode::HandoffFailed => "HANDOFF_FAILED",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Why an inspection result could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The inspection call did not complete in time.
    Timeout,
    /// The transport to the inspection authority failed.
    Transport(String),
    /// The inspection authority answered with something undecodable.
    Malformed(String),
    /// The inspection call was cancelled before it completed.
    Cancelled,
}

impl Unavailable {
    /// Short label for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Unavailable::Timeout => "timeout",
            Unavailable::Transport(_) => "transport",
            Unavailable::Malformed(_) => "malformed",
            Unavailable::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Timeout => f.write_str("timed out"),
            Unavailable::Transport(e) => write!(f, "transport: {e}"),
            Unavailable::Malformed(e) => write!(f, "malformed response: {e}"),
            Unavailable::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GriplineError>;

/// Unified error type used by core and gateway.
///
/// `Clone` so a single coalesced failure can be handed to every waiter.
#[derive(Debug, Clone, Error)]
pub enum GriplineError {
    #[error("contract violation: {0}")]
    ContractViolation(String),
    #[error("inspection unavailable: {0}")]
    InspectionUnavailable(Unavailable),
    #[error("origin failed: {0}")]
    Origin(String),
    #[error("handoff failed: {0}")]
    Handoff(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl GriplineError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            GriplineError::ContractViolation(_) => ErrorCode::ContractViolation,
            GriplineError::InspectionUnavailable(_) => ErrorCode::InspectionUnavailable,
            GriplineError::Origin(_) => ErrorCode::OriginFailed,
            GriplineError::Handoff(_) => ErrorCode::HandoffFailed,
            GriplineError::BadConfig(_) => ErrorCode::BadConfig,
            GriplineError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            GriplineError::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<Unavailable> for GriplineError {
    fn from(u: Unavailable) -> Self {
        GriplineError::InspectionUnavailable(u)
    }
}
