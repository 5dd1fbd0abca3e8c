//! Route definitions for Entitlements domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{entitlements, identity, payments};
use super::middleware::EntitlementsState;

/// Create all Entitlements domain API routes
pub fn routes() -> Router<EntitlementsState> {
    Router::new()
        .route("/v1/identity/verify", post(identity::verify_identity))
        .route(
            "/v1/payments/notifications",
            post(payments::notify_payment),
        )
        .route("/v1/payments/terms", get(payments::payment_terms))
        .route(
            "/v1/entitlements/{identity}",
            get(entitlements::get_entitlement),
        )
}
