//! Identity verification API handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use appmint_common::{Error, Result, ValidatedJson};
use appmint_worldid::{IdentityProof, VerifierError};

use crate::api::middleware::EntitlementsState;

/// Request carrying a World ID proof
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyIdentityRequest {
    #[validate(length(min = 1, max = 256))]
    pub nullifier_hash: String,
    #[validate(length(min = 1, max = 256))]
    pub merkle_root: String,
    #[validate(length(min = 1))]
    pub proof: String,
    #[validate(length(min = 1, max = 32))]
    pub verification_level: String,
}

/// Response carrying the stable identity the proof attests to
#[derive(Debug, Serialize)]
pub struct VerifyIdentityResponse {
    pub identity: String,
    pub verification_level: String,
}

/// Verify a proof of personhood and hand back the caller's identity.
///
/// The identity is stable per real user, so re-verifying yields the same
/// token; callers attach it to every subsequent generation request.
pub async fn verify_identity(
    State(state): State<EntitlementsState>,
    ValidatedJson(req): ValidatedJson<VerifyIdentityRequest>,
) -> Result<Json<VerifyIdentityResponse>> {
    let proof = IdentityProof {
        nullifier_hash: req.nullifier_hash,
        merkle_root: req.merkle_root,
        proof: req.proof,
        verification_level: req.verification_level,
    };

    let verified = state.verifier.verify(proof).await.map_err(|e| match e {
        VerifierError::Rejected(reason) => {
            Error::IdentityRequired(format!("verification failed: {}", reason))
        }
        other => {
            tracing::error!(error = %other, "Identity verifier unavailable");
            Error::Internal("Identity verifier unavailable".to_string())
        }
    })?;

    tracing::info!(identity = %verified.identity, "Identity verified");

    Ok(Json(VerifyIdentityResponse {
        identity: verified.identity,
        verification_level: verified.verification_level,
    }))
}
