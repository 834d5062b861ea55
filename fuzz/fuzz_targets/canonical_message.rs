//! Fuzz target for canonical message construction and signing.

#![no_main]

use hookseal_core::{
    canonical_message, compute_signature, signature::supplied_scheme, SchemeVersion, Secret,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, arbitrary::Arbitrary)]
struct SigningInput {
    scheme: String,
    timestamp: i64,
    secret: Vec<u8>,
    body: Vec<u8>,
}

fuzz_target!(|input: SigningInput| {
    let Ok(scheme) = SchemeVersion::new(input.scheme) else {
        return;
    };

    let message = canonical_message(&scheme, input.timestamp, &input.body);
    let prefix = format!("{}:{}:", scheme.as_str(), input.timestamp);
    assert!(message.starts_with(prefix.as_bytes()));
    assert_eq!(&message[prefix.len()..], input.body.as_slice());

    let secret = Secret::from(input.secret);
    let signature = compute_signature(&scheme, input.timestamp, &secret, &input.body);
    assert_eq!(signature, compute_signature(&scheme, input.timestamp, &secret, &input.body));
    assert!(signature.starts_with(scheme.as_str()));
    assert_eq!(signature.len(), scheme.as_str().len() + 1 + 64);
    assert_eq!(supplied_scheme(&signature), Some(scheme.as_str()));
});
