//! Entitlements domain integration tests (EI-01 through EI-10)

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use appmint_entitlements::Identity;

use crate::common::{empty_request, fee, json_request, parse_body, TestApp, TX_HASH};

fn generation_body(identity: Option<&str>) -> serde_json::Value {
    let mut body = json!({
        "description": "A to-do list app",
        "behavior": "tracks tasks",
        "style": "minimalist",
        "color": "blue",
        "category": "mini-world"
    });
    if let Some(identity) = identity {
        body["identity"] = json!(identity);
    }
    body
}

fn payment_body(identity: &str, hash: &str, amount: &str) -> serde_json::Value {
    json!({
        "identity": identity,
        "transaction_hash": hash,
        "amount": amount
    })
}

// EI-01: the full free-use / payment / unlock scenario
#[tokio::test]
async fn test_entitlement_lifecycle() {
    let app = TestApp::new();

    // first generation rides the free use
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/generations",
            generation_body(Some("u1")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let snapshot = app.ledger.snapshot(&Identity::new("u1").unwrap());
    assert_eq!(snapshot.usage_count, 1);
    assert!(!snapshot.has_paid);

    // second generation requires payment
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/generations",
            generation_body(Some("u1")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = parse_body(response).await;
    assert_eq!(body["error"]["code"], "PAYMENT_REQUIRED");

    // payment notification unlocks
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/payments/notifications",
            payment_body("u1", TX_HASH, "0.01"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["status"], "applied");
    assert!(app.ledger.snapshot(&Identity::new("u1").unwrap()).has_paid);

    // third generation succeeds
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/generations",
            generation_body(Some("u1")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // re-sent notification is absorbed
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/payments/notifications",
            payment_body("u1", TX_HASH, "0.01"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["status"], "already_applied");
}

// EI-02: a generation without identity is rejected up front
#[tokio::test]
async fn test_generation_requires_identity() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/generations",
            generation_body(None),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_body(response).await;
    assert_eq!(body["error"]["code"], "IDENTITY_REQUIRED");
    assert!(app.backend.generated_specs().is_empty());
}

// EI-03: identity verification hands back the nullifier as identity
#[tokio::test]
async fn test_identity_verification() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/identity/verify",
            json!({
                "nullifier_hash": "0xabc123",
                "merkle_root": "0xroot",
                "proof": "0xproof",
                "verification_level": "orb"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["identity"], "0xabc123");
    assert_eq!(app.verifier.recorded_proofs().len(), 1);
}

// EI-04: a rejected proof maps to 401
#[tokio::test]
async fn test_identity_verification_rejected() {
    let app = TestApp::new();
    app.verifier.reject_all("max_verifications_reached");

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/identity/verify",
            json!({
                "nullifier_hash": "0xabc123",
                "merkle_root": "0xroot",
                "proof": "0xproof",
                "verification_level": "orb"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_body(response).await;
    assert_eq!(body["error"]["code"], "IDENTITY_REQUIRED");
}

// EI-05: wrong amount is rejected and the ledger stays clean
#[tokio::test]
async fn test_payment_invalid_amount_rejected() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/payments/notifications",
            payment_body("u1", TX_HASH, "0.02"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let snapshot = app.ledger.snapshot(&Identity::new("u1").unwrap());
    assert!(!snapshot.has_paid);
    assert!(snapshot.applied_transaction_hashes.is_empty());
}

// EI-06: malformed transaction hashes never reach the recorder
#[tokio::test]
async fn test_payment_malformed_hash_rejected() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/payments/notifications",
            payment_body("u1", "0xnothex", "0.01"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// EI-07: entitlement snapshot endpoint reflects ledger state
#[tokio::test]
async fn test_entitlement_snapshot_endpoint() {
    let app = TestApp::new();

    // a never-seen identity reads as a zero-state record, authorized
    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/v1/entitlements/u1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["usage_count"], 0);
    assert_eq!(body["has_paid"], false);
    assert_eq!(body["authorization"]["decision"], "allowed");

    // consume the free use
    app.ledger.record_usage(&Identity::new("u1").unwrap());

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/v1/entitlements/u1"))
        .await
        .unwrap();
    let body = parse_body(response).await;
    assert_eq!(body["usage_count"], 1);
    assert_eq!(body["authorization"]["decision"], "denied");
    assert_eq!(body["authorization"]["reason"], "needs_payment");
}

// EI-08: payment terms surface the wallet and fee
#[tokio::test]
async fn test_payment_terms() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/v1/payments/terms"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(
        body["wallet_address"],
        "0x000000000000000000000000000000000000dead"
    );
    assert_eq!(body["fee_wld"], fee().to_string());
}

// EI-09: a failed generation costs nothing (no-penalty)
#[tokio::test]
async fn test_failed_generation_preserves_entitlement() {
    let app = TestApp::new();
    app.backend
        .set_outcome(appmint_codegen::mock::MockOutcome::Fail);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/generations",
            generation_body(Some("u1")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = parse_body(response).await;
    assert_eq!(body["error"]["code"], "GENERATION_FAILED");

    let snapshot = app.ledger.snapshot(&Identity::new("u1").unwrap());
    assert_eq!(snapshot.usage_count, 0);

    // the free use survives the failure
    app.backend
        .set_outcome(appmint_codegen::mock::MockOutcome::Succeed);
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/generations",
            generation_body(Some("u1")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

// EI-10: paid app specs are gated on a paid account
#[tokio::test]
async fn test_paid_app_gate() {
    let app = TestApp::new();

    let mut body = generation_body(Some("u1"));
    body["pricing"] = serde_json::json!("paid");

    let response = app
        .router
        .clone()
        .oneshot(json_request(Method::POST, "/v1/generations", body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    app.ledger
        .apply_payment(&Identity::new("u1").unwrap(), TX_HASH);

    let response = app
        .router
        .clone()
        .oneshot(json_request(Method::POST, "/v1/generations", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}
