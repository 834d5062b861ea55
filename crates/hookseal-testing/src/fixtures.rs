//! Test data builders for signed webhook deliveries.
//!
//! [`DeliveryBuilder`] produces an HTTP request carrying the Frame.io
//! timestamp and signature headers, with knobs for every way a delivery can
//! go wrong: stale or future timestamps, forged signatures, missing headers,
//! tampered bodies.

use axum::body::Body;
use bytes::Bytes;
use hookseal_core::{
    compute_signature, SchemeVersion, Secret, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use http::{header::CONTENT_TYPE, HeaderMap, Method, Request};
use serde_json::{json, Value};

/// Secret used by fixtures unless overridden.
pub const TEST_SECRET: &str = "shh";

/// Minimal ping event as Frame.io sends it, newline-terminated.
pub fn ping_event() -> Bytes {
    event_body("123", "ping")
}

/// Encodes an event envelope with the given id and name.
pub fn event_body(id: &str, name: &str) -> Bytes {
    let mut encoded =
        serde_json::to_vec(&json!({ "id": id, "name": name })).expect("event JSON encodes");
    encoded.push(b'\n');
    Bytes::from(encoded)
}

/// Full event envelope including the affected resource and its context.
pub fn asset_created_event() -> Value {
    json!({
        "id": "evt-7f3e",
        "name": "asset.created",
        "resource": { "id": "asset-91", "type": "asset" },
        "team": { "id": "team-4", "type": "team" },
        "project": { "id": "project-12", "type": "project" },
        "user": { "id": "user-88", "type": "user" }
    })
}

/// Builder for signed webhook delivery requests.
#[derive(Debug, Clone)]
pub struct DeliveryBuilder {
    secret: Secret,
    scheme: SchemeVersion,
    timestamp: i64,
    body: Bytes,
    uri: String,
    signature: Option<String>,
    timestamp_header: Option<String>,
    include_timestamp: bool,
    include_signature: bool,
    signed_body: Option<Bytes>,
}

impl DeliveryBuilder {
    /// Creates a builder for a ping event signed at `timestamp`.
    pub fn new(timestamp: i64) -> Self {
        Self {
            secret: Secret::from(TEST_SECRET),
            scheme: SchemeVersion::V0,
            timestamp,
            body: ping_event(),
            uri: "/".to_string(),
            signature: None,
            timestamp_header: None,
            include_timestamp: true,
            include_signature: true,
            signed_body: None,
        }
    }

    /// Signs with a different secret.
    #[must_use]
    pub fn secret(mut self, secret: impl Into<Secret>) -> Self {
        self.secret = secret.into();
        self
    }

    /// Signs with a different scheme version.
    #[must_use]
    pub fn scheme(mut self, scheme: SchemeVersion) -> Self {
        self.scheme = scheme;
        self
    }

    /// Replaces the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Replaces the request body with serialized JSON.
    #[must_use]
    pub fn json_body(self, value: &Value) -> Self {
        self.body(serde_json::to_vec(value).expect("JSON values encode"))
    }

    /// Targets a different path.
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Sends this exact signature instead of computing one.
    #[must_use]
    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Sends this exact timestamp header text; the signature still covers
    /// the builder's numeric timestamp.
    #[must_use]
    pub fn raw_timestamp(mut self, value: impl Into<String>) -> Self {
        self.timestamp_header = Some(value.into());
        self
    }

    /// Computes the signature over a different body than the one sent.
    #[must_use]
    pub fn sign_body(mut self, body: impl Into<Bytes>) -> Self {
        self.signed_body = Some(body.into());
        self
    }

    /// Omits the timestamp header.
    #[must_use]
    pub fn without_timestamp(mut self) -> Self {
        self.include_timestamp = false;
        self
    }

    /// Omits the signature header.
    #[must_use]
    pub fn without_signature(mut self) -> Self {
        self.include_signature = false;
        self
    }

    /// The signature this builder will send.
    pub fn expected_signature(&self) -> String {
        self.signature.clone().unwrap_or_else(|| {
            let signed = self.signed_body.as_ref().unwrap_or(&self.body);
            compute_signature(&self.scheme, self.timestamp, &self.secret, signed)
        })
    }

    /// Headers and body without wrapping them in a request.
    pub fn into_parts(self) -> (HeaderMap, Bytes) {
        let (parts, body) = self.build_request().into_parts();
        (parts.headers, body)
    }

    /// Builds the POST request.
    pub fn build(self) -> Request<Body> {
        self.build_request().map(Body::from)
    }

    fn build_request(&self) -> Request<Bytes> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(&self.uri)
            .header(CONTENT_TYPE, "application/json");

        if self.include_timestamp {
            let value = self.timestamp_header.clone().unwrap_or_else(|| self.timestamp.to_string());
            builder = builder.header(TIMESTAMP_HEADER, value);
        }

        if self.include_signature {
            builder = builder.header(SIGNATURE_HEADER, self.expected_signature());
        }

        builder
            .body(self.body.clone())
            .expect("fixture builds a valid request")
    }
}
