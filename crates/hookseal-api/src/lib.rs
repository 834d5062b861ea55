//! HTTP receiver for Frame.io webhook deliveries.
//!
//! Every delivery is authenticated by [`hookseal_core::DeliveryValidator`]
//! before its body is decoded and handed to an [`EventHandler`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{sync::Arc, time::Duration};

use hookseal_core::{Clock, DeliveryValidator};

pub mod config;
pub mod events;
pub mod handlers;
pub mod server;

pub use config::Config;
pub use events::{Event, EventHandler, LoggingEventHandler, MulticastEventHandler, Resource};
pub use server::{create_router, start_server};

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Authenticates incoming deliveries
    pub validator: Arc<DeliveryValidator>,
    /// Receives decoded events
    pub events: Arc<dyn EventHandler>,
    /// Time source for health reporting
    pub clock: Arc<dyn Clock>,
    /// Largest accepted request body in bytes
    pub max_payload_bytes: usize,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl AppState {
    /// Creates state that logs every verified event.
    pub fn new(validator: DeliveryValidator, clock: Arc<dyn Clock>) -> Self {
        let defaults = Config::default();
        Self {
            validator: Arc::new(validator),
            events: Arc::new(LoggingEventHandler::new()),
            clock,
            max_payload_bytes: defaults.max_payload_bytes,
            request_timeout: defaults.request_timeout(),
        }
    }

    /// Creates state from loaded configuration.
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.to_validator(clock.clone()), clock)
            .with_max_payload_bytes(config.max_payload_bytes)
            .with_request_timeout(config.request_timeout())
    }

    /// Replaces the downstream event handler.
    #[must_use]
    pub fn with_event_handler(mut self, events: Arc<dyn EventHandler>) -> Self {
        self.events = events;
        self
    }

    /// Overrides the body size limit.
    #[must_use]
    pub fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = limit;
        self
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
