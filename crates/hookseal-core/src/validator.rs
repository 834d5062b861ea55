//! Delivery validation for inbound webhook requests.
//!
//! Each request walks the same fixed sequence: parse the signed timestamp,
//! enforce the freshness window, read the supplied signature, recompute the
//! expected one and compare. The first failing step ends evaluation with a
//! [`RejectionReason`]. Nothing is carried between requests.
//!
//! The raw body is an immutable [`Bytes`] buffer. The validator reads a view
//! of it and hands the same buffer back inside [`VerifiedDelivery`], so the
//! decoder downstream sees exactly the bytes that were authenticated.

use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use bytes::Bytes;
use http::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::{
    error::RejectionReason,
    signature::{compute_signature, signature_matches, supplied_scheme, SchemeVersion, Secret},
    time::Clock,
};

/// Header carrying the signing time in seconds since the epoch.
pub const TIMESTAMP_HEADER: &str = "x-frameio-request-timestamp";

/// Header carrying `<scheme>=<hex hmac>`.
pub const SIGNATURE_HEADER: &str = "x-frameio-signature";

/// Maximum age of a signed timestamp.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(5 * 60);

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// A delivery whose timestamp and signature both checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedDelivery {
    timestamp: i64,
    body: Bytes,
}

impl VerifiedDelivery {
    /// Signed timestamp, seconds since the epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The authenticated body, byte-identical to what was signed.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the delivery, returning the authenticated body.
    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// Verifies webhook deliveries against a shared secret.
///
/// Built once at startup from explicit configuration and shared across
/// request handlers. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct DeliveryValidator {
    secret: Secret,
    scheme: SchemeVersion,
    clock: Arc<dyn Clock>,
}

impl DeliveryValidator {
    /// Creates a validator for the `v0` scheme.
    pub fn new(secret: Secret, clock: Arc<dyn Clock>) -> Self {
        Self { secret, scheme: SchemeVersion::V0, clock }
    }

    /// Replaces the signing scheme version.
    #[must_use]
    pub fn with_scheme(mut self, scheme: SchemeVersion) -> Self {
        self.scheme = scheme;
        self
    }

    /// Scheme version signatures are computed with.
    pub fn scheme(&self) -> &SchemeVersion {
        &self.scheme
    }

    /// Whether a non-empty secret is configured.
    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Validates a delivery at the injected clock's current time.
    ///
    /// # Errors
    ///
    /// Returns the [`RejectionReason`] of the first failing check.
    pub fn validate(
        &self,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<VerifiedDelivery, RejectionReason> {
        self.validate_at(headers, body, self.clock.now_system())
    }

    /// Validates a delivery as if evaluated at `now`.
    ///
    /// # Errors
    ///
    /// Returns the [`RejectionReason`] of the first failing check.
    pub fn validate_at(
        &self,
        headers: &HeaderMap,
        body: Bytes,
        now: SystemTime,
    ) -> Result<VerifiedDelivery, RejectionReason> {
        let result = self.check(headers, &body, now);

        match result {
            Ok(timestamp) => {
                debug!(timestamp, body_len = body.len(), "Webhook delivery verified");
                Ok(VerifiedDelivery { timestamp, body })
            },
            Err(reason) => {
                warn!(code = reason.code(), reason = %reason, "Webhook delivery rejected");
                Err(reason)
            },
        }
    }

    fn check(
        &self,
        headers: &HeaderMap,
        body: &[u8],
        now: SystemTime,
    ) -> Result<i64, RejectionReason> {
        let timestamp = parse_timestamp(headers)?;

        // Future timestamps give a negative age and pass.
        let age_ns = age_nanos(now, timestamp);
        if age_ns > window_nanos() {
            let age_secs = i64::try_from(age_ns / NANOS_PER_SEC).unwrap_or(i64::MAX);
            return Err(RejectionReason::StaleRequest { age_secs });
        }

        let supplied = headers
            .get(SIGNATURE_HEADER)
            .map(HeaderValue::as_bytes)
            .filter(|value| !value.is_empty())
            .ok_or(RejectionReason::MissingSignature)?;

        let expected = compute_signature(&self.scheme, timestamp, &self.secret, body);

        if !signature_matches(supplied, expected.as_bytes()) {
            let supplied_tag = std::str::from_utf8(supplied).ok().and_then(supplied_scheme);
            debug!(
                expected_scheme = %self.scheme,
                supplied_scheme = supplied_tag.unwrap_or("none"),
                "Supplied signature does not match"
            );
            return Err(RejectionReason::SignatureMismatch);
        }

        Ok(timestamp)
    }
}

fn parse_timestamp(headers: &HeaderMap) -> Result<i64, RejectionReason> {
    headers
        .get(TIMESTAMP_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .ok_or(RejectionReason::MalformedTimestamp)
}

/// Nanoseconds between the signed timestamp and `now`, negative when the
/// timestamp lies in the future.
fn age_nanos(now: SystemTime, timestamp: i64) -> i128 {
    let now_ns = match now.duration_since(UNIX_EPOCH) {
        Ok(since) => i128::try_from(since.as_nanos()).unwrap_or(i128::MAX),
        Err(before) => -i128::try_from(before.duration().as_nanos()).unwrap_or(i128::MAX),
    };

    now_ns - i128::from(timestamp) * NANOS_PER_SEC
}

fn window_nanos() -> i128 {
    i128::try_from(FRESHNESS_WINDOW.as_nanos()).unwrap_or(i128::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TestClock;

    const NOW: u64 = 1_700_000_000;
    const BODY: &[u8] = br#"{"id":"123","name":"ping"}"#;

    fn validator(clock: &TestClock) -> DeliveryValidator {
        DeliveryValidator::new(Secret::from("shh"), Arc::new(clock.clone()))
    }

    fn signed_headers(timestamp: i64, body: &[u8]) -> HeaderMap {
        let signature =
            compute_signature(&SchemeVersion::V0, timestamp, &Secret::from("shh"), body);
        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, timestamp.to_string().parse().unwrap());
        headers.insert(SIGNATURE_HEADER, signature.parse().unwrap());
        headers
    }

    #[test]
    fn accepts_fresh_signed_delivery() {
        let clock = TestClock::at_unix_secs(NOW);
        let headers = signed_headers(NOW as i64, BODY);

        let delivery = validator(&clock).validate(&headers, Bytes::from_static(BODY)).unwrap();

        assert_eq!(delivery.timestamp(), NOW as i64);
        assert_eq!(delivery.body().as_ref(), BODY);
    }

    #[test]
    fn age_exactly_at_window_is_accepted() {
        let clock = TestClock::at_unix_secs(NOW);
        let timestamp = (NOW - FRESHNESS_WINDOW.as_secs()) as i64;

        let result = validator(&clock).validate(&signed_headers(timestamp, BODY), BODY.into());
        assert!(result.is_ok());
    }

    #[test]
    fn one_nanosecond_past_window_is_stale() {
        let clock = TestClock::at_unix_secs(NOW);
        clock.advance(Duration::from_nanos(1));
        let timestamp = (NOW - FRESHNESS_WINDOW.as_secs()) as i64;

        let result = validator(&clock).validate(&signed_headers(timestamp, BODY), BODY.into());
        assert_eq!(result, Err(RejectionReason::StaleRequest { age_secs: 300 }));
    }

    #[test]
    fn timestamp_checked_before_signature() {
        let clock = TestClock::at_unix_secs(NOW);
        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, "not-a-number".parse().unwrap());

        let result = validator(&clock).validate(&headers, BODY.into());
        assert_eq!(result, Err(RejectionReason::MalformedTimestamp));
    }

    #[test]
    fn empty_signature_header_counts_as_missing() {
        let clock = TestClock::at_unix_secs(NOW);
        let mut headers = signed_headers(NOW as i64, BODY);
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_static(""));

        let result = validator(&clock).validate(&headers, BODY.into());
        assert_eq!(result, Err(RejectionReason::MissingSignature));
    }

    #[test]
    fn non_ascii_signature_is_a_mismatch() {
        let clock = TestClock::at_unix_secs(NOW);
        let mut headers = signed_headers(NOW as i64, BODY);
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_bytes(b"v0=\xff\xfe").unwrap());

        let result = validator(&clock).validate(&headers, BODY.into());
        assert_eq!(result, Err(RejectionReason::SignatureMismatch));
    }

    #[test]
    fn explicit_evaluation_time_ignores_clock() {
        let clock = TestClock::at_unix_secs(0);
        let headers = signed_headers(NOW as i64, BODY);
        let now = UNIX_EPOCH + Duration::from_secs(NOW + 10);

        let result = validator(&clock).validate_at(&headers, BODY.into(), now);
        assert!(result.is_ok());
    }

    #[test]
    fn custom_scheme_signs_and_verifies() {
        let clock = TestClock::at_unix_secs(NOW);
        let scheme = SchemeVersion::new("v9").unwrap();
        let validator = validator(&clock).with_scheme(scheme.clone());

        let signature = compute_signature(&scheme, NOW as i64, &Secret::from("shh"), BODY);
        let mut headers = signed_headers(NOW as i64, BODY);
        headers.insert(SIGNATURE_HEADER, signature.parse().unwrap());

        assert!(validator.validate(&headers, BODY.into()).is_ok());
        assert_eq!(validator.scheme().as_str(), "v9");

        // A v0 signature does not satisfy a v9 validator.
        let v0_headers = signed_headers(NOW as i64, BODY);
        assert_eq!(
            validator.validate(&v0_headers, BODY.into()),
            Err(RejectionReason::SignatureMismatch)
        );
    }

    #[test]
    fn age_before_epoch_is_negative() {
        let now = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(age_nanos(now, 0), -10 * NANOS_PER_SEC);
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        let now = UNIX_EPOCH + Duration::from_secs(NOW);
        assert!(age_nanos(now, i64::MIN) > window_nanos());
        assert!(age_nanos(now, i64::MAX) < 0);
    }

    #[test]
    fn has_secret_reflects_configuration() {
        let clock: Arc<dyn Clock> = Arc::new(TestClock::new());
        assert!(DeliveryValidator::new(Secret::from("shh"), clock.clone()).has_secret());
        assert!(!DeliveryValidator::new(Secret::default(), clock).has_secret());
    }
}
