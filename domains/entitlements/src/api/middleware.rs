//! Entitlements domain state

use std::sync::Arc;

use appmint_worldid::IdentityVerifier;

use crate::domain::ledger::EntitlementLedger;
use crate::domain::recorder::TransactionRecorder;

/// Application state for the Entitlements domain
#[derive(Clone)]
pub struct EntitlementsState {
    pub ledger: Arc<EntitlementLedger>,
    pub recorder: Arc<TransactionRecorder>,
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Wallet address surfaced to callers so they know where to pay
    pub payment_wallet_address: String,
}
