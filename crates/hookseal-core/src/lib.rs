//! Signature verification for inbound webhook deliveries.
//!
//! Proves that a request body was produced by the holder of a shared secret
//! and was signed recently. The [`signature`] module is the pure signing
//! primitive, [`validator`] applies it to a request's headers and body, and
//! [`time`] supplies the injectable clock the freshness check reads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod signature;
pub mod time;
pub mod validator;

pub use error::{HooksealError, RejectionReason, Result};
pub use signature::{canonical_message, compute_signature, SchemeVersion, Secret};
pub use time::{Clock, RealClock, TestClock};
pub use validator::{
    DeliveryValidator, VerifiedDelivery, FRESHNESS_WINDOW, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
