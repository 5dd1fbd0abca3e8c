//! Transaction recorder
//!
//! Translates untrusted, possibly duplicated payment notifications into
//! at-most-once ledger mutations. Amount validation happens here; hash
//! idempotence is the ledger's job.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::entities::{PaymentOutcome, TransactionNotification};
use crate::domain::ledger::EntitlementLedger;

/// Why a notification was rejected without touching the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    InvalidAmount { expected: Decimal, actual: Decimal },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAmount { expected, actual } => {
                write!(f, "invalid amount: expected {}, got {}", expected, actual)
            }
        }
    }
}

/// Outcome of recording one payment notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    Applied,
    AlreadyApplied,
    Rejected(RejectionReason),
}

/// Applies payment notifications from the external rail to the ledger
pub struct TransactionRecorder {
    ledger: Arc<EntitlementLedger>,
    expected_fee: Decimal,
}

impl TransactionRecorder {
    /// Create a recorder that accepts exactly `expected_fee` per payment
    pub fn new(ledger: Arc<EntitlementLedger>, expected_fee: Decimal) -> Self {
        Self {
            ledger,
            expected_fee,
        }
    }

    /// The fixed one-time fee this recorder accepts
    pub fn expected_fee(&self) -> Decimal {
        self.expected_fee
    }

    /// Record one notification.
    ///
    /// Safe to call any number of times with the same notification: the
    /// first call applies it, every later call reports `AlreadyApplied`.
    /// Amount mismatches are discarded without mutating the ledger.
    pub fn record(&self, notification: &TransactionNotification) -> RecordOutcome {
        if notification.amount != self.expected_fee {
            tracing::warn!(
                identity = %notification.identity,
                transaction_hash = %notification.transaction_hash,
                amount = %notification.amount,
                expected = %self.expected_fee,
                "Discarding payment notification with unexpected amount"
            );
            return RecordOutcome::Rejected(RejectionReason::InvalidAmount {
                expected: self.expected_fee,
                actual: notification.amount,
            });
        }

        match self
            .ledger
            .apply_payment(&notification.identity, &notification.transaction_hash)
        {
            PaymentOutcome::Applied => {
                tracing::info!(
                    identity = %notification.identity,
                    transaction_hash = %notification.transaction_hash,
                    "Payment applied"
                );
                RecordOutcome::Applied
            }
            PaymentOutcome::AlreadyApplied => {
                tracing::debug!(
                    identity = %notification.identity,
                    transaction_hash = %notification.transaction_hash,
                    "Duplicate payment notification absorbed"
                );
                RecordOutcome::AlreadyApplied
            }
        }
    }
}
