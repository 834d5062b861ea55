//! HTTP request handlers for the webhook receiver.
//!
//! Handlers are grouped by functionality:
//! - `webhook` - Signed delivery intake
//! - `health` - Health and liveness probes
//!
//! # Error Handling
//!
//! Failures are returned as `{"error": {"code", "message"}}` with the code
//! taken from the error taxonomy (E1001-E3001) and a status derived from it
//! by [`webhook::status_for`].

pub mod health;
pub mod webhook;

pub use health::{health_check, liveness_check};
pub use webhook::receive_webhook;
