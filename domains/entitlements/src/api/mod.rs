//! API layer for the Entitlements domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::EntitlementsState;
pub use routes::routes;
