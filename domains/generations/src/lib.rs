//! Generations domain: gated app generation and ordered chunk delivery

pub mod api;
pub mod domain;

// Re-export domain types at the crate root for convenience
pub use domain::delivery::{DeliveryConfig, DeliveryEvent, DeliveryStreams};
pub use domain::orchestrator::GenerationOrchestrator;

// Re-export API types
pub use api::routes;
pub use api::GenerationsState;
