//! Test infrastructure for signed webhook deliveries.
//!
//! Provides request fixtures with valid or deliberately broken signatures and
//! re-exports the controllable clock so tests pin "now" explicitly.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;

pub use fixtures::{asset_created_event, event_body, ping_event, DeliveryBuilder, TEST_SECRET};
pub use hookseal_core::{Clock, TestClock};

/// Fixed evaluation time used across suites, 2023-11-14T22:13:20Z.
pub const TEST_NOW: u64 = 1_700_000_000;

/// A test clock pinned to [`TEST_NOW`].
pub fn pinned_clock() -> TestClock {
    TestClock::at_unix_secs(TEST_NOW)
}
