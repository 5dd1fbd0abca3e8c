//! Common test utilities and fixtures for integration tests
//!
//! Provides shared infrastructure for all integration tests:
//! - A fully wired router backed by mock collaborators
//! - Request builders and response helpers
//! - SSE body parsing

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use serde_json::Value;

use appmint_app::FeedbackState;
use appmint_codegen::mock::MockBackend;
use appmint_email::mock::MockEmailService;
use appmint_entitlements::{EntitlementLedger, EntitlementsState, TransactionRecorder};
use appmint_generations::{
    DeliveryConfig, DeliveryStreams, GenerationOrchestrator, GenerationsState,
};
use appmint_worldid::mock::MockIdentityVerifier;
use rust_decimal::Decimal;

/// The fixed one-time fee used by all tests (0.01 WLD)
pub fn fee() -> Decimal {
    Decimal::new(1, 2)
}

/// A well-formed transaction hash
pub const TX_HASH: &str = "0x4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

/// The operator mailbox feedback lands in
pub const OPERATOR_EMAIL: &str = "operator@appmint.app";

/// Test application wired with mock collaborators
pub struct TestApp {
    pub router: Router,
    pub ledger: Arc<EntitlementLedger>,
    pub backend: Arc<MockBackend>,
    pub verifier: Arc<MockIdentityVerifier>,
    pub email: MockEmailService,
}

impl TestApp {
    /// Create a test app with fast delivery pacing
    pub fn new() -> Self {
        Self::with_delivery(DeliveryConfig {
            chunk_size: 8,
            chunk_interval: Duration::from_millis(1),
        })
    }

    /// Create a test app with custom delivery pacing
    pub fn with_delivery(delivery: DeliveryConfig) -> Self {
        let ledger = Arc::new(EntitlementLedger::new());
        let backend = Arc::new(MockBackend::new());
        let verifier = Arc::new(MockIdentityVerifier::new());
        let email = MockEmailService::new();

        let recorder = Arc::new(TransactionRecorder::new(ledger.clone(), fee()));
        let orchestrator = Arc::new(GenerationOrchestrator::new(
            ledger.clone(),
            backend.clone(),
        ));
        let streams = DeliveryStreams::new(delivery);

        let entitlements_state = EntitlementsState {
            ledger: ledger.clone(),
            recorder,
            verifier: verifier.clone(),
            payment_wallet_address: "0x000000000000000000000000000000000000dead".to_string(),
        };

        let generations_state = GenerationsState {
            orchestrator,
            streams,
        };

        let feedback_state = FeedbackState {
            email: Arc::new(email.clone()),
            operator_email: OPERATOR_EMAIL.to_string(),
        };

        let router = Router::new()
            .route("/health", axum::routing::get(|| async { "OK" }))
            .merge(appmint_app::feedback_routes(feedback_state))
            .merge(appmint_entitlements::routes().with_state(entitlements_state))
            .merge(appmint_generations::routes().with_state(generations_state));

        Self {
            router,
            ledger,
            backend,
            verifier,
            email,
        }
    }
}

/// Helper: build a JSON request
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Helper: build a bodyless request
pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Helper: parse response body as JSON Value
pub async fn parse_body(response: axum::http::Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// One parsed SSE event: (event name, decoded data payload)
#[derive(Debug, Clone)]
pub struct SseEvent {
    pub name: String,
    pub data: Value,
}

/// Helper: read an SSE response to the end and parse its events.
///
/// The delivery stream closes itself after the terminal event, so reading
/// the body to completion terminates.
pub async fn read_sse_events(response: axum::http::Response<Body>) -> Vec<SseEvent> {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    text.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let mut name = String::new();
            let mut data = Value::Null;
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event: ") {
                    name = value.to_string();
                } else if let Some(value) = line.strip_prefix("data: ") {
                    data = serde_json::from_str(value).unwrap_or(Value::Null);
                }
            }
            SseEvent { name, data }
        })
        .collect()
}
