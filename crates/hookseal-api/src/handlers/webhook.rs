//! Webhook receiver: authenticate, decode, dispatch.
//!
//! The body is buffered once. The validator checks freshness and the HMAC
//! signature over those exact bytes, and only then is the same buffer
//! decoded as an [`Event`].

use std::error::Error as _;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use hookseal_core::{HooksealError, RejectionReason};
use http_body_util::LengthLimitError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::{events::Event, AppState};

/// Response for an accepted delivery.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    /// Identifier of the received event
    pub event_id: String,
    /// Name of the received event
    pub event_name: String,
    /// Always `accepted`
    pub status: String,
}

/// Error response with code and message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details including code and message
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error code from the taxonomy (E1001-E3001)
    pub code: String,
    /// Human-readable error description
    pub message: String,
}

/// Receives a signed Frame.io webhook delivery.
///
/// # Errors
///
/// Returns appropriate HTTP status codes:
/// - 400: Timestamp missing, malformed or outside the freshness window
/// - 401: Signature missing or not matching
/// - 413: Payload exceeds the configured limit, whether declared by
///   `Content-Length` or found while reading
/// - 500: Body could not be read or decoded
///
/// The size limit is enforced before the delivery is validated, so an
/// oversized delivery gets 413 even when its timestamp is also bad.
#[instrument(
    name = "receive_webhook",
    skip(state, request),
    fields(
        method = %request.method(),
        uri = %request.uri(),
    )
)]
pub async fn receive_webhook(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let limit = state.max_payload_bytes;

    if let Some(declared) = declared_length(&parts.headers) {
        if declared > limit {
            warn!(payload_size = declared, limit, "Payload exceeds size limit");
            return create_error_response(&HooksealError::PayloadTooLarge {
                size_bytes: declared,
                limit_bytes: limit,
            });
        }
    }

    let body = match to_bytes(body, limit).await {
        Ok(body) => body,
        Err(e) if exceeds_limit(&e) => {
            warn!(limit, "Payload exceeds size limit while reading");
            return create_error_response(&HooksealError::PayloadTooLarge {
                size_bytes: limit.saturating_add(1),
                limit_bytes: limit,
            });
        },
        Err(e) => {
            error!(error = %e, "Failed to read request body");
            return create_error_response(&HooksealError::BodyRead(e.to_string()));
        },
    };

    debug!(
        headers = ?parts.headers.keys().map(|name| name.as_str()).collect::<Vec<_>>(),
        body_len = body.len(),
        "Webhook request received"
    );

    let delivery = match state.validator.validate(&parts.headers, body) {
        Ok(delivery) => delivery,
        Err(reason) => return create_error_response(&HooksealError::Rejected(reason)),
    };

    let event: Event = match serde_json::from_slice(delivery.body()) {
        Ok(event) => event,
        Err(e) => {
            error!(error = %e, "Verified body is not a valid event");
            return create_error_response(&HooksealError::InvalidPayload(e.to_string()));
        },
    };

    state.events.handle_event(&event).await;

    info!(event_id = %event.id, event_name = %event.name, "Webhook accepted");

    let response = WebhookResponse {
        event_id: event.id,
        event_name: event.name,
        status: "accepted".to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Maps an error to the status returned to the sender.
pub fn status_for(error: &HooksealError) -> StatusCode {
    match error {
        HooksealError::Rejected(
            RejectionReason::MalformedTimestamp | RejectionReason::StaleRequest { .. },
        ) => StatusCode::BAD_REQUEST,
        HooksealError::Rejected(
            RejectionReason::MissingSignature | RejectionReason::SignatureMismatch,
        ) => StatusCode::UNAUTHORIZED,
        HooksealError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        HooksealError::BodyRead(_)
        | HooksealError::InvalidPayload(_)
        | HooksealError::InvalidInput(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.parse().ok()
}

fn exceeds_limit(error: &axum::Error) -> bool {
    std::iter::successors(error.source(), |source| (*source).source())
        .any(|source| source.is::<LengthLimitError>())
}

fn create_error_response(error: &HooksealError) -> Response {
    let error_response = ErrorResponse {
        error: ErrorDetail { code: error.code().to_string(), message: error.to_string() },
    };

    (status_for(error), Json(error_response)).into_response()
}
