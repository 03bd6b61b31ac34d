use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated account snapshot handed over by the identity subsystem.
///
/// The pipeline reads the two flags as preconditions; the credit balance is
/// always re-read through the [`CreditLedger`](crate::domain::ports::CreditLedger)
/// port rather than trusted from this snapshot.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub credits: u64,
    pub is_blocked: bool,
    pub is_verified: bool,
}

/// A destination address in the normalized national format.
///
/// Only the recipient validator constructs these, so holding one is proof the
/// number already passed the format check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Msisdn(String);

impl Msisdn {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Msisdn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

/// Persisted audit row for one attempted message.
///
/// Created once per valid recipient at send time. Immutable thereafter except
/// for `status`, which is set exactly once from the provider outcome and
/// never retried. Never deleted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: Option<String>,
    pub to: Msisdn,
    pub message: String,
    pub account_id: String,
    pub status: DeliveryStatus,
    pub sender_id: String,
    pub created_at: DateTime<Utc>,
}

impl DeliveryRecord {
    pub fn new(
        to: Msisdn,
        message: impl Into<String>,
        account_id: impl Into<String>,
        sender_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            to,
            message: message.into(),
            account_id: account_id.into(),
            status: DeliveryStatus::Pending,
            sender_id: sender_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Status transitions exactly once, from the provider outcome.
    pub fn with_status(mut self, status: DeliveryStatus) -> Self {
        self.status = status;
        self
    }
}

/// Normalized provider outcome. Every gateway failure shape (non-confirmation
/// response, transport error, timeout) folds into `Failed` at the client
/// boundary, so the orchestrator never inspects transport-level error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Failed { reason: String },
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }

    pub fn status(&self) -> DeliveryStatus {
        match self {
            Self::Sent => DeliveryStatus::Sent,
            Self::Failed { .. } => DeliveryStatus::Failed,
        }
    }
}

/// One recipient rejected by the validator, with its 1-based position in the
/// submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidRecipient {
    pub index: usize,
    pub number: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Invalid,
    Sent,
    Failed,
}

/// Final per-recipient result, one entry per submitted recipient.
#[derive(Debug, Clone, Serialize)]
pub struct RecipientOutcome {
    pub index: usize,
    pub number: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl RecipientOutcome {
    pub(crate) fn from_invalid(invalid: &InvalidRecipient) -> Self {
        Self {
            index: invalid.index,
            number: invalid.number.clone(),
            status: OutcomeStatus::Invalid,
            reason: Some(invalid.reason.clone()),
            record_id: None,
        }
    }
}

/// Per-invocation aggregate for a bulk send. Constructed fresh per call,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub total_attempted: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub sent_count: usize,
    pub failed_count: usize,
    pub credits_deducted: u64,
    pub credits_remaining: u64,
    pub outcomes: Vec<RecipientOutcome>,
}

/// Response for the single-send path.
#[derive(Debug, Clone, Serialize)]
pub struct SingleReport {
    pub accepted: bool,
    pub record_id: String,
    pub final_status: DeliveryStatus,
    pub credits_remaining: u64,
}
