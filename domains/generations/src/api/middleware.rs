//! Generations domain state

use std::sync::Arc;

use crate::domain::delivery::DeliveryStreams;
use crate::domain::orchestrator::GenerationOrchestrator;

/// Application state for the Generations domain
#[derive(Clone)]
pub struct GenerationsState {
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub streams: DeliveryStreams,
}
