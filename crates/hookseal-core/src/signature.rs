//! HMAC-SHA256 signature computation for webhook deliveries.
//!
//! A delivery is signed over the canonical message
//! `<scheme>:<timestamp>:<raw body>` and the signature travels as
//! `<scheme>=<lowercase hex digest>`. The scheme tag appears in both places so
//! future scheme revisions can be told apart and verified with the matching
//! computation.

use std::{borrow::Cow, fmt};

use bytes::Bytes;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{HooksealError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Separator between canonical message fields.
pub const CANONICAL_DELIMITER: &[u8] = b":";

/// Tag identifying the signing scheme revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemeVersion(Cow<'static, str>);

impl SchemeVersion {
    /// The only scheme Frame.io currently signs with.
    pub const V0: Self = Self(Cow::Borrowed("v0"));

    /// Creates a scheme version from an arbitrary tag.
    ///
    /// # Errors
    ///
    /// Returns `HooksealError::InvalidInput` if the tag is empty or contains
    /// `:` or `=`, which delimit the canonical message and the signature.
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(HooksealError::InvalidInput("scheme version must not be empty".into()));
        }
        if tag.contains([':', '=']) {
            return Err(HooksealError::InvalidInput(format!(
                "scheme version {tag:?} must not contain ':' or '='"
            )));
        }
        Ok(Self(Cow::Owned(tag)))
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SchemeVersion {
    fn default() -> Self {
        Self::V0
    }
}

impl fmt::Display for SchemeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared signing secret.
///
/// Opaque bytes used only as the HMAC key. `Debug` output is redacted so the
/// secret cannot leak through logs or panic messages.
#[derive(Clone, Default)]
pub struct Secret(Bytes);

impl Secret {
    /// Wraps raw secret bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Whether the secret is empty. An empty key still signs, but anyone can
    /// forge the result.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&"[REDACTED]").finish()
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(Bytes::from(value))
    }
}

impl From<Vec<u8>> for Secret {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::from(value))
    }
}

/// Fields of the canonical message in signing order.
fn canonical_parts<'a>(
    scheme: &'a SchemeVersion,
    timestamp: &'a str,
    raw_body: &'a [u8],
) -> [&'a [u8]; 5] {
    [
        scheme.as_str().as_bytes(),
        CANONICAL_DELIMITER,
        timestamp.as_bytes(),
        CANONICAL_DELIMITER,
        raw_body,
    ]
}

/// Builds the exact byte sequence that is MACed for a delivery.
pub fn canonical_message(scheme: &SchemeVersion, timestamp: i64, raw_body: &[u8]) -> Vec<u8> {
    let timestamp = timestamp.to_string();
    canonical_parts(scheme, &timestamp, raw_body).concat()
}

/// Computes the delivery signature `<scheme>=<hex hmac-sha256>`.
///
/// Pure function of its inputs. The timestamp is not range checked here;
/// freshness belongs to the validator.
///
/// # Example
///
/// ```
/// use hookseal_core::signature::{compute_signature, SchemeVersion, Secret};
///
/// let secret = Secret::from("shh");
/// let signature = compute_signature(&SchemeVersion::V0, 1_700_000_000, &secret, b"{}");
///
/// assert!(signature.starts_with("v0="));
/// assert_eq!(signature.len(), "v0=".len() + 64);
/// ```
pub fn compute_signature(
    scheme: &SchemeVersion,
    timestamp: i64,
    secret: &Secret,
    raw_body: &[u8],
) -> String {
    let timestamp = timestamp.to_string();

    let mut mac =
        HmacSha256::new_from_slice(secret.expose()).expect("HMAC can take key of any size");
    for part in canonical_parts(scheme, &timestamp, raw_body) {
        mac.update(part);
    }

    format!("{scheme}={}", hex::encode(mac.finalize().into_bytes()))
}

/// Exact byte equality between a supplied and an expected signature.
///
/// Evaluated in constant time for equal-length inputs; the outcome is the
/// same as plain string equality.
pub fn signature_matches(supplied: &[u8], expected: &[u8]) -> bool {
    bool::from(supplied.ct_eq(expected))
}

/// Returns the scheme prefix of a supplied signature, if it has one.
pub fn supplied_scheme(signature: &str) -> Option<&str> {
    signature.split_once('=').map(|(scheme, _)| scheme).filter(|scheme| !scheme.is_empty())
}
