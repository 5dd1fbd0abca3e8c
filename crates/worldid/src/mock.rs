//! Mock Identity Verifier Implementation
//!
//! Minimal mock used by `IdentityVerifierFactory` when provider is `"mock"`.
//! Accepts any structurally complete proof and echoes its nullifier hash as
//! the identity, so tests control exactly which identity a proof maps to.

use std::sync::{Arc, Mutex};

use crate::{IdentityProof, IdentityVerifier, VerifiedIdentity, VerifierError};

/// Mock identity verifier for testing
#[derive(Debug, Clone, Default)]
pub struct MockIdentityVerifier {
    /// Proofs seen by this verifier, for test assertions
    recorded: Arc<Mutex<Vec<IdentityProof>>>,
    /// When set, every proof is rejected with this reason
    reject_with: Arc<Mutex<Option<String>>>,
}

impl MockIdentityVerifier {
    /// Create a new mock verifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the verifier reject all subsequent proofs
    pub fn reject_all(&self, reason: &str) {
        *self.reject_with.lock().unwrap() = Some(reason.to_string());
    }

    /// Restore the accept-everything behavior
    pub fn accept_all(&self) {
        *self.reject_with.lock().unwrap() = None;
    }

    /// Proofs this verifier has seen
    pub fn recorded_proofs(&self) -> Vec<IdentityProof> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for MockIdentityVerifier {
    async fn verify(&self, proof: IdentityProof) -> Result<VerifiedIdentity, VerifierError> {
        tracing::info!("Mock verifier processing proof");

        if let Some(reason) = self.reject_with.lock().unwrap().clone() {
            return Err(VerifierError::Rejected(reason));
        }

        if proof.nullifier_hash.is_empty() {
            return Err(VerifierError::Rejected(
                "proof is missing a nullifier hash".to_string(),
            ));
        }

        self.recorded.lock().unwrap().push(proof.clone());

        Ok(VerifiedIdentity {
            identity: proof.nullifier_hash,
            verification_level: proof.verification_level,
        })
    }
}
