//! In-memory entitlement ledger
//!
//! Single authority for "may this identity generate right now" and the
//! only mutator of usage/payment state. State is partitioned per identity:
//! the outer map lock is held just long enough to clone the per-record
//! handle, and the per-record lock is never held across an await, so
//! operations for different identities never block each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;

use appmint_common::{Error, Result};

use crate::domain::entities::{
    AuthorizationDecision, DenyReason, EntitlementRecord, Identity, PaymentOutcome,
};
use crate::domain::policy::{OneTimeUnlock, PaymentPolicy};

/// Mutable per-identity state behind the record lock
#[derive(Debug)]
struct RecordState {
    usage_count: u64,
    has_paid: bool,
    applied_transaction_hashes: std::collections::BTreeSet<String>,
    /// The single free use is currently held by an in-flight generation
    free_use_reserved: bool,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl RecordState {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            usage_count: 0,
            has_paid: false,
            applied_transaction_hashes: Default::default(),
            free_use_reserved: false,
            created_at: now,
            updated_at: now,
        }
    }
}

type SharedRecord = Arc<Mutex<RecordState>>;

/// Per-user ledger of usage counts and payment status
pub struct EntitlementLedger {
    records: RwLock<HashMap<Identity, SharedRecord>>,
    policy: Box<dyn PaymentPolicy>,
}

impl EntitlementLedger {
    /// Create a ledger with the default pay-once policy
    pub fn new() -> Self {
        Self::with_policy(Box::new(OneTimeUnlock))
    }

    /// Create a ledger with a custom payment-cycle policy
    pub fn with_policy(policy: Box<dyn PaymentPolicy>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            policy,
        }
    }

    /// Get or transparently create the record for an identity.
    ///
    /// A never-seen identity gets a zero-state record, which makes its
    /// first authorization query succeed (the free use).
    fn record(&self, identity: &Identity) -> SharedRecord {
        if let Some(record) = self.records.read().unwrap().get(identity) {
            return record.clone();
        }

        let mut records = self.records.write().unwrap();
        records
            .entry(identity.clone())
            .or_insert_with(|| Arc::new(Mutex::new(RecordState::new())))
            .clone()
    }

    /// Whether the identity may generate right now.
    pub fn is_authorized(&self, identity: &Identity) -> AuthorizationDecision {
        let record = self.record(identity);
        let state = record.lock().unwrap();

        let free_use_available = state.usage_count == 0 && !state.free_use_reserved;
        if free_use_available || self.policy.covers(state.usage_count, state.has_paid) {
            AuthorizationDecision::Allowed
        } else {
            AuthorizationDecision::Denied {
                reason: DenyReason::NeedsPayment,
            }
        }
    }

    /// Atomically authorize and claim the right to one generation.
    ///
    /// When authorization rides on the single free use, that use is marked
    /// reserved so a concurrent request for the same identity is denied
    /// instead of double-spending it. The returned lease must be committed
    /// after a successful generation; dropping it uncommitted releases the
    /// reservation without consuming anything.
    pub fn reserve_use(&self, identity: &Identity) -> Result<UsageLease> {
        let record = self.record(identity);
        let mut state = record.lock().unwrap();

        if self.policy.covers(state.usage_count, state.has_paid) {
            drop(state);
            return Ok(UsageLease {
                record,
                identity: identity.clone(),
                reserved_free: false,
                committed: false,
            });
        }

        if state.usage_count == 0 && !state.free_use_reserved {
            state.free_use_reserved = true;
            drop(state);
            return Ok(UsageLease {
                record,
                identity: identity.clone(),
                reserved_free: true,
                committed: false,
            });
        }

        Err(Error::PaymentRequired(format!(
            "free use exhausted for identity {}",
            identity
        )))
    }

    /// Attribute one successful generation to the identity.
    ///
    /// Callers must invoke this exactly once per successful generation;
    /// the orchestrator does so through `UsageLease::commit`.
    pub fn record_usage(&self, identity: &Identity) {
        let record = self.record(identity);
        let mut state = record.lock().unwrap();
        state.usage_count += 1;
        state.updated_at = Utc::now();
    }

    /// Idempotently apply a payment transaction.
    ///
    /// A hash already present in the applied set is never re-applied; the
    /// record is left untouched and `AlreadyApplied` is returned.
    pub fn apply_payment(&self, identity: &Identity, transaction_hash: &str) -> PaymentOutcome {
        let record = self.record(identity);
        let mut state = record.lock().unwrap();

        if state.applied_transaction_hashes.contains(transaction_hash) {
            return PaymentOutcome::AlreadyApplied;
        }

        state
            .applied_transaction_hashes
            .insert(transaction_hash.to_string());
        state.has_paid = true;
        state.updated_at = Utc::now();

        PaymentOutcome::Applied
    }

    /// Read-only copy of the identity's record, for diagnostics and tests.
    pub fn snapshot(&self, identity: &Identity) -> EntitlementRecord {
        let record = self.record(identity);
        let state = record.lock().unwrap();

        EntitlementRecord {
            identity: identity.clone(),
            usage_count: state.usage_count,
            has_paid: state.has_paid,
            applied_transaction_hashes: state.applied_transaction_hashes.clone(),
            created_at: state.created_at,
            updated_at: state.updated_at,
        }
    }
}

impl Default for EntitlementLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII claim on one authorized generation.
///
/// `commit` attributes the usage; dropping the lease without committing
/// releases any free-use reservation so a failed generation costs nothing.
pub struct UsageLease {
    record: SharedRecord,
    identity: Identity,
    reserved_free: bool,
    committed: bool,
}

impl UsageLease {
    /// The identity this lease was issued for
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Attribute the generation this lease authorized.
    pub fn commit(mut self) {
        {
            let mut state = self.record.lock().unwrap();
            if self.reserved_free {
                state.free_use_reserved = false;
            }
            state.usage_count += 1;
            state.updated_at = Utc::now();
        }
        self.committed = true;
    }
}

impl Drop for UsageLease {
    fn drop(&mut self) {
        if !self.committed && self.reserved_free {
            let mut state = self.record.lock().unwrap();
            state.free_use_reserved = false;
        }
    }
}
