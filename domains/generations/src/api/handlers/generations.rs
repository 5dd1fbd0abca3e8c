//! Generation API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use appmint_codegen::{AppCategory, AppPricing, AppSpec};
use appmint_common::{Error, Result, ValidatedJson};

use crate::api::middleware::GenerationsState;
use crate::domain::delivery::DeliveryEvent;

/// Request for creating a generation.
///
/// `identity` is the token handed out by identity verification; requests
/// without one are rejected before any entitlement check.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGenerationRequest {
    pub identity: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub behavior: String,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub style: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub color: String,
    pub category: AppCategory,
    #[serde(default)]
    pub pricing: AppPricing,
}

/// Generation response DTO
#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub session_id: Uuid,
    pub model: String,
    pub output_tokens: i32,
    pub stop_reason: String,
}

/// Cancel response DTO
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub status: &'static str,
}

/// Create a generation.
///
/// On success the artifact is handed to a delivery session; the caller
/// consumes it chunk by chunk from the events endpoint.
pub async fn create_generation(
    State(state): State<GenerationsState>,
    ValidatedJson(req): ValidatedJson<CreateGenerationRequest>,
) -> Result<(StatusCode, Json<GenerationResponse>)> {
    let spec = AppSpec {
        description: req.description,
        behavior: req.behavior,
        style: req.style,
        color: req.color,
        category: req.category,
        pricing: req.pricing,
    };

    let app = state
        .orchestrator
        .generate(req.identity.as_deref(), &spec)
        .await?;

    let session_id = state.streams.start(app.code);

    Ok((
        StatusCode::CREATED,
        Json(GenerationResponse {
            session_id,
            model: app.model,
            output_tokens: app.output_tokens,
            stop_reason: app.stop_reason,
        }),
    ))
}

/// Stream a delivery session's events (SSE).
///
/// A session's stream can be claimed once; chunks arrive in order and the
/// stream closes after the terminal event.
pub async fn get_delivery_events(
    State(state): State<GenerationsState>,
    Path(session_id): Path<Uuid>,
) -> Result<
    Sse<impl futures_core::Stream<Item = std::result::Result<Event, std::convert::Infallible>>>,
> {
    let Some(mut events) = state.streams.subscribe(session_id) else {
        if state.streams.contains(session_id) {
            return Err(Error::Conflict(
                "Delivery session is already being consumed".to_string(),
            ));
        }
        return Err(Error::NotFound("Delivery session not found".to_string()));
    };

    let stream = async_stream::stream! {
        while let Some(event) = events.recv().await {
            let data = serde_json::to_string(&event)
                .unwrap_or_else(|_| "{}".to_string());

            let mut sse_event = Event::default().event(event.name()).data(data);
            if let DeliveryEvent::Chunk { index, .. } = &event {
                sse_event = sse_event.id(format!("{}:{}", session_id, index));
            }

            yield Ok(sse_event);

            if event.is_terminal() {
                break;
            }
        }
    };

    Ok(Sse::new(stream))
}

/// Cancel a delivery session.
///
/// Cancelling is not an error path: the session ends with a `cancelled`
/// terminal event on its stream.
pub async fn cancel_delivery(
    State(state): State<GenerationsState>,
    Path(session_id): Path<Uuid>,
) -> Result<(StatusCode, Json<CancelResponse>)> {
    if !state.streams.cancel(session_id) {
        return Err(Error::NotFound("Delivery session not found".to_string()));
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(CancelResponse {
            status: "cancelling",
        }),
    ))
}
