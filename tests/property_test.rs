//! Property-based tests for the receiver's status contract.
//!
//! Randomised deliveries are pushed through the full router; the response
//! status must follow from the delivery's age and signature alone.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use hookseal_api::{create_router, AppState, Config};
use hookseal_testing::{pinned_clock, DeliveryBuilder, TEST_NOW, TEST_SECRET};
use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use tower::ServiceExt;

/// Creates property test configuration based on environment.
///
/// `PROPTEST_CASES` overrides the number of cases (default 32).
fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES").ok().and_then(|s| s.parse().ok()).unwrap_or(32);

    ProptestConfig::with_cases(cases)
}

fn service() -> Router {
    let config = Config { frameio_secret_key: TEST_SECRET.to_string(), ..Config::default() };
    create_router(AppState::from_config(&config, Arc::new(pinned_clock())))
}

fn status_of(request: Request<Body>) -> StatusCode {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime builds");

    runtime.block_on(async {
        service().oneshot(request).await.expect("request execution").status()
    })
}

fn now() -> i64 {
    i64::try_from(TEST_NOW).unwrap()
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Correctly signed deliveries pass exactly when no older than five minutes.
    #[test]
    fn status_follows_delivery_age(age_secs in -86_400i64..86_400) {
        let status = status_of(DeliveryBuilder::new(now() - age_secs).build());

        let expected = if age_secs > 300 { StatusCode::BAD_REQUEST } else { StatusCode::OK };
        prop_assert_eq!(status, expected);
    }

    /// Arbitrary signatures on fresh deliveries are unauthorized.
    #[test]
    fn guessed_signatures_are_unauthorized(guess in "v0=[0-9a-f]{0,64}") {
        let status = status_of(DeliveryBuilder::new(now()).signature(guess).build());

        prop_assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    /// Any correctly signed event envelope is accepted.
    #[test]
    fn signed_events_are_accepted(id in "[A-Za-z0-9-]{1,36}", name in "[a-z.]{1,24}") {
        let body = serde_json::json!({ "id": id, "name": name });
        let request = DeliveryBuilder::new(now()).json_body(&body).build();

        prop_assert_eq!(status_of(request), StatusCode::OK);
    }
}
