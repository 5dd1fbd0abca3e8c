//! Entitlements domain: usage ledger, payment recording, identity verification

pub mod api;
pub mod domain;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    AuthorizationDecision, DenyReason, EntitlementRecord, Identity, PaymentOutcome,
    TransactionNotification,
};
pub use domain::ledger::{EntitlementLedger, UsageLease};
pub use domain::policy::{OneTimeUnlock, PaymentPolicy};
pub use domain::recorder::{RecordOutcome, RejectionReason, TransactionRecorder};

// Re-export API types
pub use api::routes;
pub use api::EntitlementsState;
