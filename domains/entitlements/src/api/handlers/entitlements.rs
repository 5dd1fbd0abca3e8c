//! Entitlement snapshot API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use appmint_common::Result;

use crate::api::middleware::EntitlementsState;
use crate::domain::entities::{AuthorizationDecision, EntitlementRecord, Identity};

/// Entitlement snapshot response DTO
#[derive(Debug, Serialize)]
pub struct EntitlementResponse {
    #[serde(flatten)]
    pub record: EntitlementRecord,
    pub authorization: AuthorizationDecision,
}

/// Read-only view of one identity's usage and payment state.
///
/// Looking up a never-seen identity reports its zero-state record rather
/// than a 404, mirroring how the ledger treats first contact.
pub async fn get_entitlement(
    State(state): State<EntitlementsState>,
    Path(identity): Path<String>,
) -> Result<Json<EntitlementResponse>> {
    let identity = Identity::new(identity)?;

    let record = state.ledger.snapshot(&identity);
    let authorization = state.ledger.is_authorized(&identity);

    Ok(Json(EntitlementResponse {
        record,
        authorization,
    }))
}
