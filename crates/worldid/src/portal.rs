//! World ID Developer Portal Implementation
//!
//! Calls the portal verify endpoint (`/api/v2/verify/{app_id}`) using the
//! reqwest HTTP client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{IdentityProof, IdentityVerifier, VerifiedIdentity, VerifierConfig, VerifierError};

/// Portal verify request body
#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    nullifier_hash: &'a str,
    merkle_root: &'a str,
    proof: &'a str,
    verification_level: &'a str,
    action: &'a str,
}

/// Portal verify success body
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    nullifier_hash: Option<String>,
}

/// Portal error body
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    code: String,
    detail: Option<String>,
}

/// Identity verifier backed by the World ID Developer Portal
pub struct PortalVerifier {
    client: Client,
    config: VerifierConfig,
}

impl PortalVerifier {
    /// Create a new portal verifier
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for PortalVerifier {
    async fn verify(&self, proof: IdentityProof) -> Result<VerifiedIdentity, VerifierError> {
        let url = format!(
            "{}/api/v2/verify/{}",
            self.config.base_url, self.config.app_id
        );

        let body = VerifyRequest {
            nullifier_hash: &proof.nullifier_hash,
            merkle_root: &proof.merkle_root,
            proof: &proof.proof,
            verification_level: &proof.verification_level,
            action: &self.config.action,
        };

        tracing::debug!(action = %self.config.action, "Sending World ID verify request");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| VerifierError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            // The portal reports rejected proofs with a structured error code
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(VerifierError::Rejected(format!(
                    "{}: {}",
                    error_response.code,
                    error_response.detail.unwrap_or_default()
                )));
            }

            return Err(VerifierError::Response(format!(
                "Portal returned {}: {}",
                status, error_body
            )));
        }

        let api_response: VerifyResponse = response
            .json()
            .await
            .map_err(|e| VerifierError::Response(format!("Failed to parse response: {}", e)))?;

        if !api_response.success {
            return Err(VerifierError::Rejected(
                "portal reported unsuccessful verification".to_string(),
            ));
        }

        // The portal echoes the nullifier hash; fall back to the proof's own
        // when the field is absent
        let identity = api_response
            .nullifier_hash
            .unwrap_or(proof.nullifier_hash);

        Ok(VerifiedIdentity {
            identity,
            verification_level: proof.verification_level,
        })
    }
}
