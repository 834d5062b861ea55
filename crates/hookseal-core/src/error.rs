//! Error types and result handling for webhook verification.
//!
//! Defines a coded error taxonomy so callers can map outcomes to transport
//! statuses without matching on message text. Client-attributable
//! authentication failures live in [`RejectionReason`]; everything the HTTP
//! layer can surface is a [`HooksealError`].

use thiserror::Error;

/// Result type alias using `HooksealError`.
pub type Result<T> = std::result::Result<T, HooksealError>;

/// Why a delivery was refused by the validator.
///
/// All variants are terminal: re-evaluating the same request yields the same
/// outcome, so none of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// Timestamp header absent or not a base-10 integer (E1001).
    #[error("[E1001] Malformed timestamp: request timestamp header missing or not an integer")]
    MalformedTimestamp,

    /// Timestamp older than the freshness window (E1002).
    #[error("[E1002] Stale request: signed {age_secs}s ago, outside the freshness window")]
    StaleRequest {
        /// Whole seconds elapsed since the signed timestamp
        age_secs: i64,
    },

    /// Signature header absent or empty (E1003).
    #[error("[E1003] Missing signature: signature header not present")]
    MissingSignature,

    /// Supplied signature differs from the recomputed one (E1004).
    #[error("[E1004] Signature mismatch: HMAC validation failed")]
    SignatureMismatch,
}

impl RejectionReason {
    /// Returns the error code for this rejection.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedTimestamp => "E1001",
            Self::StaleRequest { .. } => "E1002",
            Self::MissingSignature => "E1003",
            Self::SignatureMismatch => "E1004",
        }
    }

    /// Whether the rejection concerns request shape or age rather than
    /// proof of the secret.
    ///
    /// Timestamp problems are reported as bad requests, signature problems
    /// as authentication failures.
    pub fn is_timestamp_failure(&self) -> bool {
        matches!(self, Self::MalformedTimestamp | Self::StaleRequest { .. })
    }
}

/// Errors surfaced while receiving a webhook delivery.
#[derive(Debug, Error)]
pub enum HooksealError {
    /// The validator refused the delivery.
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    /// Payload exceeds the configured limit (E2001).
    #[error("[E2001] Payload too large: size {size_bytes} bytes exceeds {limit_bytes} byte limit")]
    PayloadTooLarge {
        /// Declared or observed payload size
        size_bytes: usize,
        /// Configured maximum
        limit_bytes: usize,
    },

    /// The request body could not be read (E2002).
    #[error("[E2002] Body read failed: {0}")]
    BodyRead(String),

    /// An authenticated body could not be decoded as an event (E2003).
    #[error("[E2003] Invalid payload: {0}")]
    InvalidPayload(String),

    /// A configuration value was rejected (E3001).
    #[error("[E3001] Invalid input: {0}")]
    InvalidInput(String),
}

impl HooksealError {
    /// Returns the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rejected(reason) => reason.code(),
            Self::PayloadTooLarge { .. } => "E2001",
            Self::BodyRead(_) => "E2002",
            Self::InvalidPayload(_) => "E2003",
            Self::InvalidInput(_) => "E3001",
        }
    }

    /// Whether this error is attributable to the sender rather than the
    /// receiving process.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::PayloadTooLarge { .. })
    }
}
