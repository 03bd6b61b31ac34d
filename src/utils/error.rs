use crate::domain::model::{BatchReport, InvalidRecipient};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    // Input errors: rejected before any external side effect.
    #[error("message body is required")]
    EmptyMessage,

    #[error("no recipients provided")]
    EmptyBatch,

    #[error("uploaded file has no recognized recipient column (found: {columns:?})")]
    UnsupportedFormat { columns: Vec<String> },

    #[error("batch too large: {actual} recipients (max {max})")]
    BatchTooLarge { max: usize, actual: usize },

    #[error("no valid recipients in batch ({} rejected)", .invalid.len())]
    NoValidRecipients { invalid: Vec<InvalidRecipient> },

    #[error("invalid phone number format: {number}")]
    InvalidRecipient { number: String },

    // Precondition errors: rejected before any send, no partial state created.
    #[error("account is blocked")]
    AccountBlocked,

    #[error("account is not verified")]
    AccountUnverified,

    #[error("insufficient credits: need {need}, have {have} (short {shortage})")]
    InsufficientCredits { have: u64, need: u64, shortage: u64 },

    // Reconciliation errors: the commit-time guard caught a race the
    // optimistic sufficiency check missed.
    #[error("credit decrement would drive balance below zero: need {need}, have {have}")]
    InsufficientAtCommit { have: u64, need: u64 },

    // Batch-level form of the same failure. Per-recipient work already
    // happened by commit time, so the breakdown rides along for the caller.
    #[error("batch debit refused, balance below zero: need {need}, have {have}")]
    ReconciliationFailed {
        have: u64,
        need: u64,
        report: Box<BatchReport>,
    },

    #[error("delivery store error: {message}")]
    Store { message: String },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration value for {field}: {value:?} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, DispatchError>;
