//! Generation orchestrator
//!
//! Gates, invokes, and attributes a single generation request. The ledger
//! lease is claimed before the backend call and committed only after it
//! succeeds, so a failed generation never consumes the caller's free use
//! or entitlement.

use std::sync::Arc;

use appmint_codegen::{AppPricing, AppSpec, GeneratedApp, GenerationBackend};
use appmint_common::{Error, Result};
use appmint_entitlements::{EntitlementLedger, Identity};

/// Coordinates the ledger and the external generation backend
pub struct GenerationOrchestrator {
    ledger: Arc<EntitlementLedger>,
    backend: Arc<dyn GenerationBackend>,
}

impl GenerationOrchestrator {
    pub fn new(ledger: Arc<EntitlementLedger>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self { ledger, backend }
    }

    /// Run one gated generation.
    ///
    /// Same-identity requests race only on the ledger's atomic free-use
    /// reservation; requests for different identities proceed in parallel,
    /// and no ledger lock is held across the backend call.
    pub async fn generate(
        &self,
        identity: Option<&str>,
        spec: &AppSpec,
    ) -> Result<GeneratedApp> {
        let identity = match identity {
            Some(token) if !token.trim().is_empty() => Identity::new(token)?,
            _ => {
                return Err(Error::IdentityRequired(
                    "verify your identity before generating".to_string(),
                ))
            }
        };

        let lease = self.ledger.reserve_use(&identity)?;

        // Paid apps are reserved for paid accounts, free use or not
        if spec.pricing == AppPricing::Paid && !self.ledger.snapshot(&identity).has_paid {
            return Err(Error::PaymentRequired(
                "only paid users can create paid apps".to_string(),
            ));
        }

        let app = match self.backend.generate(spec).await {
            Ok(app) => app,
            Err(e) => {
                // lease drops here, releasing any free-use reservation
                tracing::warn!(identity = %identity, error = %e, "Generation failed");
                return Err(Error::GenerationFailed(e.to_string()));
            }
        };

        lease.commit();
        tracing::info!(
            identity = %identity,
            model = %app.model,
            output_tokens = app.output_tokens,
            "Generation succeeded"
        );

        Ok(app)
    }
}
