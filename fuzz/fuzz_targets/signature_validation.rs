//! Fuzz target for delivery validation.
//!
//! Arbitrary header bytes, bodies, secrets and evaluation times must never
//! panic the validator, and a correctly signed fresh delivery must always be
//! accepted with its body intact.

#![no_main]

use std::{
    sync::Arc,
    time::{Duration, UNIX_EPOCH},
};

use bytes::Bytes;
use hookseal_core::{
    compute_signature, DeliveryValidator, SchemeVersion, Secret, TestClock, FRESHNESS_WINDOW,
    SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use http::{HeaderMap, HeaderValue};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, arbitrary::Arbitrary)]
struct DeliveryInput {
    secret: Vec<u8>,
    body: Vec<u8>,
    timestamp_header: Vec<u8>,
    signature_header: Vec<u8>,
    now_secs: u32,
    age_secs: u16,
}

fuzz_target!(|input: DeliveryInput| {
    let validator =
        DeliveryValidator::new(Secret::from(input.secret.clone()), Arc::new(TestClock::new()));
    let now = UNIX_EPOCH + Duration::from_secs(u64::from(input.now_secs));
    let body = Bytes::from(input.body);

    // Raw header bytes: any outcome is fine as long as it is repeatable.
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_bytes(&input.timestamp_header) {
        headers.insert(TIMESTAMP_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_bytes(&input.signature_header) {
        headers.insert(SIGNATURE_HEADER, value);
    }
    let first = validator.validate_at(&headers, body.clone(), now);
    let second = validator.validate_at(&headers, body.clone(), now);
    assert_eq!(first, second);

    // Properly signed delivery within the window.
    let age = i64::from(input.age_secs) % (FRESHNESS_WINDOW.as_secs() as i64 + 1);
    let timestamp = i64::from(input.now_secs) - age;
    let secret = Secret::from(input.secret);
    let signature = compute_signature(&SchemeVersion::V0, timestamp, &secret, &body);

    let mut signed = HeaderMap::new();
    signed.insert(TIMESTAMP_HEADER, HeaderValue::from(timestamp));
    if let Ok(value) = HeaderValue::from_str(&signature) {
        signed.insert(SIGNATURE_HEADER, value);
    }

    let delivery =
        validator.validate_at(&signed, body.clone(), now).expect("fresh delivery verifies");
    assert_eq!(delivery.body(), &body);
});
