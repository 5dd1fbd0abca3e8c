//! Appmint Identity Verification Service
//!
//! Provides proof-of-personhood verification with support for:
//! - World ID Developer Portal integration for production
//! - Mock verifier for testing and development
//! - Configurable app id, action, and portal base URL

pub mod mock;
pub mod portal;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("Verifier configuration error: {0}")]
    Configuration(String),

    #[error("Verifier request error: {0}")]
    Request(String),

    #[error("Verifier response error: {0}")]
    Response(String),

    #[error("Proof rejected: {0}")]
    Rejected(String),
}

/// A zero-knowledge proof presented by a caller.
///
/// Mirrors the payload the World ID widget hands to the client; the
/// verifier forwards it to the portal untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProof {
    pub nullifier_hash: String,
    pub merkle_root: String,
    pub proof: String,
    pub verification_level: String,
}

/// A successfully verified identity.
///
/// `identity` is the proof's nullifier hash: stable per real-world user
/// for a given action, which makes it usable as an opaque ledger key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub identity: String,
    pub verification_level: String,
}

/// Verifier service configuration.
#[derive(Clone)]
pub struct VerifierConfig {
    /// Verifier provider (worldid, mock)
    pub provider: String,
    /// App id registered with the World ID Developer Portal
    pub app_id: String,
    /// Action the proof must be scoped to
    pub action: String,
    /// Base URL for the Developer Portal API
    pub base_url: String,
}

impl std::fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("provider", &self.provider)
            .field("app_id", &self.app_id)
            .field("action", &self.action)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl VerifierConfig {
    /// Create verifier config from environment variables.
    pub fn from_env() -> Result<Self, VerifierError> {
        let provider = std::env::var("WORLD_ID_PROVIDER").unwrap_or_else(|_| "mock".to_string());

        let app_id = std::env::var("WORLD_ID_APP_ID").unwrap_or_else(|_| {
            if provider == "mock" {
                "app_mock".to_string()
            } else {
                String::new()
            }
        });

        let action =
            std::env::var("WORLD_ID_ACTION").unwrap_or_else(|_| "generate-app".to_string());

        let base_url = std::env::var("WORLD_ID_BASE_URL")
            .unwrap_or_else(|_| "https://developer.worldcoin.org".to_string());

        if provider != "mock" && app_id.is_empty() {
            return Err(VerifierError::Configuration(
                "WORLD_ID_APP_ID is required for the worldid provider".to_string(),
            ));
        }

        Ok(Self {
            provider,
            app_id,
            action,
            base_url,
        })
    }
}

/// Identity verifier trait for different implementations.
///
/// A successful result is trusted as evidence of a unique real user;
/// proofs are never re-verified downstream.
#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a proof, returning the stable identity it attests to.
    async fn verify(&self, proof: IdentityProof) -> Result<VerifiedIdentity, VerifierError>;
}

/// Factory for creating IdentityVerifier implementations.
pub struct IdentityVerifierFactory;

impl IdentityVerifierFactory {
    /// Create an IdentityVerifier based on configuration.
    pub fn create(config: VerifierConfig) -> Result<Box<dyn IdentityVerifier>, VerifierError> {
        match config.provider.as_str() {
            "worldid" => {
                tracing::info!("Creating World ID portal verifier");
                if config.app_id.is_empty() {
                    return Err(VerifierError::Configuration(
                        "WORLD_ID_APP_ID is required for the worldid provider".to_string(),
                    ));
                }
                Ok(Box::new(portal::PortalVerifier::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock identity verifier");
                Ok(Box::new(mock::MockIdentityVerifier::new()))
            }
            provider => Err(VerifierError::Configuration(format!(
                "Unknown verifier provider: {}. Supported providers: worldid, mock",
                provider
            ))),
        }
    }
}
