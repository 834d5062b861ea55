//! Decoded webhook events and the downstream dispatch seam.
//!
//! Only the envelope is decoded here. Handlers that act on specific event
//! names plug in through [`EventHandler`]; the service itself just logs.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Event payload delivered by Frame.io.
///
/// Missing string fields decode as empty, missing resources as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Event {
    /// Delivery-unique event identifier
    #[serde(default)]
    pub id: String,
    /// Event name, e.g. `asset.created`
    #[serde(default)]
    pub name: String,
    /// The affected resource
    #[serde(default)]
    pub resource: Option<Resource>,
    /// Team the webhook belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Resource>,
    /// Project the webhook belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Resource>,
    /// User who triggered the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Resource>,
}

/// Reference to a Frame.io resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Resource identifier
    #[serde(default)]
    pub id: String,
    /// Resource type, e.g. `asset`
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Receives events whose delivery has been authenticated.
///
/// Called after the response status is decided, so implementations should
/// log their own failures instead of propagating them.
#[async_trait]
pub trait EventHandler: Send + Sync + fmt::Debug {
    /// Handles one verified event.
    async fn handle_event(&self, event: &Event);
}

/// Default handler: records each event in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventHandler;

impl LoggingEventHandler {
    /// Creates a new logging handler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle_event(&self, event: &Event) {
        info!(
            event_id = %event.id,
            event_name = %event.name,
            resource_type = event.resource.as_ref().map_or("none", |r| r.kind.as_str()),
            "Webhook event received"
        );
    }
}

/// Forwards each event to every registered handler in order.
#[derive(Debug, Clone, Default)]
pub struct MulticastEventHandler {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl MulticastEventHandler {
    /// Creates a multicast handler with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether there are no subscribers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[async_trait]
impl EventHandler for MulticastEventHandler {
    async fn handle_event(&self, event: &Event) {
        for handler in &self.handlers {
            handler.handle_event(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.id.clone());
        }
    }

    #[test]
    fn decodes_full_envelope() {
        let json = r#"{
            "id": "evt-1",
            "name": "asset.created",
            "resource": {"id": "asset-1", "type": "asset"},
            "team": {"id": "team-1", "type": "team"},
            "extra": "ignored"
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt-1");
        assert_eq!(event.resource, Some(Resource { id: "asset-1".into(), kind: "asset".into() }));
        assert_eq!(event.team.unwrap().kind, "team");
        assert!(event.project.is_none());
        assert!(event.user.is_none());
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let event: Event = serde_json::from_str("{}").unwrap();
        assert_eq!(event, Event::default());
    }

    #[test]
    fn wrong_field_type_fails_to_decode() {
        assert!(serde_json::from_str::<Event>(r#"{"id": 123}"#).is_err());
        assert!(serde_json::from_str::<Event>("null").is_err());
    }

    #[test]
    fn serialization_omits_absent_context() {
        let event = Event { id: "e".into(), name: "ping".into(), ..Event::default() };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value, serde_json::json!({"id": "e", "name": "ping", "resource": null}));
    }

    #[tokio::test]
    async fn multicast_forwards_to_all_handlers() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let multicast = MulticastEventHandler::new()
            .with_handler(first.clone())
            .with_handler(second.clone())
            .with_handler(Arc::new(LoggingEventHandler::new()));

        let event = Event { id: "evt-9".into(), ..Event::default() };
        multicast.handle_event(&event).await;

        assert_eq!(multicast.len(), 3);
        assert_eq!(*first.seen.lock().unwrap(), vec!["evt-9".to_string()]);
        assert_eq!(*second.seen.lock().unwrap(), vec!["evt-9".to_string()]);
    }
}
