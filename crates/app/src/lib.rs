//! Appmint application composition root
//!
//! Composes all domain routers into a single application.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, Router};
use serde::Deserialize;
use validator::Validate;

use appmint_codegen::{CodegenConfig, CodegenFactory};
use appmint_common::{Config, ValidatedJson};
use appmint_email::{EmailConfig, EmailService, EmailServiceFactory};
use appmint_entitlements::{EntitlementLedger, EntitlementsState, TransactionRecorder};
use appmint_generations::{
    DeliveryConfig, DeliveryStreams, GenerationOrchestrator, GenerationsState,
};
use appmint_worldid::{IdentityVerifierFactory, VerifierConfig};

/// State for the feedback relay, the only route owned by the app crate
#[derive(Clone)]
pub struct FeedbackState {
    pub email: Arc<dyn EmailService>,
    pub operator_email: String,
}

/// Create the main application router with all routes and middleware
pub async fn create_app(config: Config) -> Result<Router, anyhow::Error> {
    // External collaborators, each behind its trait seam
    let verifier = IdentityVerifierFactory::create(VerifierConfig::from_env()?)?;
    let backend = CodegenFactory::create(CodegenConfig::from_env()?)?;
    let email = EmailServiceFactory::create(EmailConfig::from_env()?).await?;

    // Core: ledger, recorder, orchestrator, delivery
    let ledger = Arc::new(EntitlementLedger::new());
    let recorder = Arc::new(TransactionRecorder::new(
        ledger.clone(),
        config.one_time_fee_wld,
    ));
    let orchestrator = Arc::new(GenerationOrchestrator::new(
        ledger.clone(),
        Arc::from(backend),
    ));
    let streams = DeliveryStreams::new(DeliveryConfig {
        chunk_size: config.delivery_chunk_size,
        chunk_interval: Duration::from_millis(config.delivery_chunk_interval_ms),
    });

    let entitlements_state = EntitlementsState {
        ledger,
        recorder,
        verifier: Arc::from(verifier),
        payment_wallet_address: config.payment_wallet_address.clone(),
    };

    let generations_state = GenerationsState {
        orchestrator,
        streams,
    };

    let feedback_state = FeedbackState {
        email: Arc::from(email),
        operator_email: config.feedback_email.clone(),
    };

    // Build router — compose domain routers with shared infrastructure routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Appmint API v0.0.1-SNAPSHOT" }),
        )
        .merge(feedback_routes(feedback_state))
        .merge(appmint_entitlements::routes().with_state(entitlements_state))
        .merge(appmint_generations::routes().with_state(generations_state));

    Ok(app)
}

/// Routes for the feedback relay
pub fn feedback_routes(state: FeedbackState) -> Router {
    Router::new()
        .route("/v1/feedback", axum::routing::post(send_feedback))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Feedback submission payload
#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(length(min = 1, max = 256))]
    pub identity: String,
    #[validate(length(min = 1, max = 5000))]
    pub feedback: String,
}

/// Relay user feedback to the operator mailbox.
///
/// Downstream of the core: a delivery hiccup here never affects
/// entitlement or generation state.
async fn send_feedback(
    State(state): State<FeedbackState>,
    ValidatedJson(req): ValidatedJson<FeedbackRequest>,
) -> StatusCode {
    match state
        .email
        .send_feedback(&state.operator_email, &req.identity, &req.feedback)
        .await
    {
        Ok(receipt) => {
            tracing::info!(message_id = %receipt.message_id, "Feedback relayed");
            StatusCode::ACCEPTED
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to relay feedback");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
