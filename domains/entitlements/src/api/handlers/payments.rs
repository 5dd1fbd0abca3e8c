//! Payment notification API handlers

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use appmint_common::{Error, Result, ValidatedJson};

use crate::api::middleware::EntitlementsState;
use crate::domain::entities::{Identity, TransactionNotification};
use crate::domain::recorder::RecordOutcome;

/// Inbound notification from the payment rail
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentNotificationRequest {
    #[validate(length(min = 1, max = 256))]
    pub identity: String,
    #[validate(length(min = 1, max = 128))]
    pub transaction_hash: String,
    pub amount: Decimal,
}

/// Result reported back to the rail
#[derive(Debug, Serialize)]
pub struct PaymentNotificationResponse {
    pub status: &'static str,
}

/// Payment terms surfaced to callers
#[derive(Debug, Serialize)]
pub struct PaymentTermsResponse {
    pub wallet_address: String,
    pub fee_wld: Decimal,
}

/// Record a payment completion.
///
/// Duplicates are absorbed and acknowledged exactly like the first
/// delivery; only amount mismatches produce an error response.
pub async fn notify_payment(
    State(state): State<EntitlementsState>,
    ValidatedJson(req): ValidatedJson<PaymentNotificationRequest>,
) -> Result<Json<PaymentNotificationResponse>> {
    let identity = Identity::new(req.identity)?;
    let notification =
        TransactionNotification::new(identity, req.transaction_hash, req.amount)?;

    match state.recorder.record(&notification) {
        RecordOutcome::Applied => Ok(Json(PaymentNotificationResponse { status: "applied" })),
        RecordOutcome::AlreadyApplied => Ok(Json(PaymentNotificationResponse {
            status: "already_applied",
        })),
        RecordOutcome::Rejected(reason) => Err(Error::Validation(reason.to_string())),
    }
}

/// Report the fixed fee and receiving wallet so callers know how to pay
pub async fn payment_terms(
    State(state): State<EntitlementsState>,
) -> Json<PaymentTermsResponse> {
    Json(PaymentTermsResponse {
        wallet_address: state.payment_wallet_address.clone(),
        fee_wld: state.recorder.expected_fee(),
    })
}
