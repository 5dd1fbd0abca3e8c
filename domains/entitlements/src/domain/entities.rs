//! Entities for the Entitlements domain

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use appmint_common::{Error, Result};

/// Maximum accepted length for an identity token
const MAX_IDENTITY_LEN: usize = 256;

static TRANSACTION_HASH_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("valid regex"));

/// Opaque stable token representing one verified real-world user.
///
/// Produced by the external identity verifier (the World ID nullifier
/// hash in production); looked up, never re-derived, by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Create an identity from a raw token with validation
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();

        if token.trim().is_empty() {
            return Err(Error::Validation("Identity must not be empty".to_string()));
        }

        if token.len() > MAX_IDENTITY_LEN {
            return Err(Error::Validation(format!(
                "Identity must be ≤{} characters",
                MAX_IDENTITY_LEN
            )));
        }

        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Per-identity usage and payment state, as seen through `snapshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementRecord {
    pub identity: Identity,
    pub usage_count: u64,
    pub has_paid: bool,
    pub applied_transaction_hashes: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of an authorization query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AuthorizationDecision {
    Allowed,
    Denied { reason: DenyReason },
}

impl AuthorizationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Why an authorization query was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    NeedsPayment,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NeedsPayment => write!(f, "needs_payment"),
        }
    }
}

/// Outcome of applying a transaction hash to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Applied,
    AlreadyApplied,
}

/// A payment completion reported by the external payment rail.
///
/// Not trusted to arrive exactly once, or in any particular order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionNotification {
    pub identity: Identity,
    pub transaction_hash: String,
    pub amount: Decimal,
}

impl TransactionNotification {
    /// Create a notification with validation
    pub fn new(identity: Identity, transaction_hash: String, amount: Decimal) -> Result<Self> {
        let notification = Self {
            identity,
            transaction_hash,
            amount,
        };
        notification.validate()?;
        Ok(notification)
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if !TRANSACTION_HASH_REGEX.is_match(&self.transaction_hash) {
            return Err(Error::Validation(
                "Transaction hash must be 0x-prefixed 32-byte hex".to_string(),
            ));
        }

        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(
                "Transaction amount must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
