use crate::config::toml_config::DispatchConfig;
use crate::core::{extractor, validator};
use crate::domain::model::{
    Account, BatchReport, DeliveryRecord, InvalidRecipient, Msisdn, OutcomeStatus,
    RecipientOutcome, SendOutcome, SingleReport,
};
use crate::domain::ports::{CreditLedger, DeliveryStore, SmsGateway};
use crate::utils::error::{DispatchError, Result};
use std::path::PathBuf;

/// Where a batch's raw recipients come from.
#[derive(Debug, Clone)]
pub enum BatchSource {
    /// Comma-separated addresses typed by the caller.
    Manual(String),
    /// Path to an uploaded CSV artifact. Deleted after extraction.
    Upload(PathBuf),
}

/// Coordinates the credit ledger and the delivery gateway per recipient and
/// assembles the final report.
///
/// Recipients are processed sequentially: the aggregate debit is sized to the
/// count of actual successes, so every outcome must be known before the
/// single commit in step 7.
pub struct Dispatcher<G, S, L> {
    gateway: G,
    store: S,
    ledger: L,
    sender_id: String,
    max_recipients: usize,
}

impl<G: SmsGateway, S: DeliveryStore, L: CreditLedger> Dispatcher<G, S, L> {
    pub fn new(gateway: G, store: S, ledger: L, config: &DispatchConfig) -> Self {
        Self {
            gateway,
            store,
            ledger,
            sender_id: config.gateway.sender_id.clone(),
            max_recipients: config.batch.max_recipients,
        }
    }

    /// Sends one message to one recipient.
    ///
    /// Same machine as [`send_batch`](Self::send_batch) collapsed to a single
    /// element: sufficiency is checked against a fixed need of 1 and the
    /// decrement is applied only when the provider reports `sent`.
    pub async fn send_single(
        &self,
        account: &Account,
        recipient: &str,
        message: &str,
    ) -> Result<SingleReport> {
        self.check_preconditions(account, message)?;

        let to = validator::validate(recipient).map_err(|_| DispatchError::InvalidRecipient {
            number: recipient.trim().to_string(),
        })?;

        let have = self.ledger.balance(&account.id).await?;
        if have < 1 {
            return Err(DispatchError::InsufficientCredits {
                have,
                need: 1,
                shortage: 1 - have,
            });
        }

        let outcome = self.gateway.send(&to, message).await;
        let record = DeliveryRecord::new(to.clone(), message, &account.id, &self.sender_id)
            .with_status(outcome.status());
        let record_id = self.store.save(record).await?;

        let credits_remaining = if outcome.is_sent() {
            self.ledger.try_decrement(&account.id, 1).await?
        } else {
            have
        };

        tracing::info!(
            account = %account.id,
            recipient = %to,
            status = ?outcome.status(),
            "single send complete"
        );

        Ok(SingleReport {
            accepted: outcome.is_sent(),
            record_id,
            final_status: outcome.status(),
            credits_remaining,
        })
    }

    /// Runs one bulk dispatch: extract, validate, check credits, send
    /// sequentially, reconcile the debit against actual successes.
    pub async fn send_batch(
        &self,
        account: &Account,
        source: BatchSource,
        message: &str,
    ) -> Result<BatchReport> {
        self.check_preconditions(account, message)?;

        // Step 1: extract the raw batch. Fails batch-wide.
        let raw = match &source {
            BatchSource::Manual(numbers) => extractor::from_manual(numbers)?,
            BatchSource::Upload(path) => extractor::from_upload(path)?,
        };
        if raw.len() > self.max_recipients {
            return Err(DispatchError::BatchTooLarge {
                max: self.max_recipients,
                actual: raw.len(),
            });
        }

        // Step 2: validate independently, preserving submission order.
        let mut valid: Vec<(usize, Msisdn)> = Vec::new();
        let mut invalid: Vec<InvalidRecipient> = Vec::new();
        for (position, number) in raw.iter().enumerate() {
            match validator::validate(number) {
                Ok(msisdn) => valid.push((position + 1, msisdn)),
                Err(reason) => invalid.push(InvalidRecipient {
                    index: position + 1,
                    number: number.clone(),
                    reason: reason.to_string(),
                }),
            }
        }

        // Step 3: nothing to send. No provider call, no credit touched.
        if valid.is_empty() {
            return Err(DispatchError::NoValidRecipients { invalid });
        }

        // Step 4: optimistic sufficiency check against the valid count only.
        let need = valid.len() as u64;
        let have = self.ledger.balance(&account.id).await?;
        if have < need {
            return Err(DispatchError::InsufficientCredits {
                have,
                need,
                shortage: need - have,
            });
        }

        tracing::info!(
            account = %account.id,
            total = raw.len(),
            valid = valid.len(),
            invalid = invalid.len(),
            "dispatching batch"
        );

        // Step 5: sequential send loop. One recipient failing never aborts
        // the rest of the loop.
        let mut outcomes: Vec<RecipientOutcome> =
            invalid.iter().map(RecipientOutcome::from_invalid).collect();
        let mut sent_count = 0usize;
        let mut failed_count = 0usize;

        for (index, to) in &valid {
            let outcome = self.gateway.send(to, message).await;
            let record = DeliveryRecord::new(to.clone(), message, &account.id, &self.sender_id)
                .with_status(outcome.status());

            let entry = match self.store.save(record).await {
                Ok(record_id) => match outcome {
                    SendOutcome::Sent => {
                        sent_count += 1;
                        RecipientOutcome {
                            index: *index,
                            number: to.as_str().to_string(),
                            status: OutcomeStatus::Sent,
                            reason: None,
                            record_id: Some(record_id),
                        }
                    }
                    SendOutcome::Failed { reason } => {
                        failed_count += 1;
                        RecipientOutcome {
                            index: *index,
                            number: to.as_str().to_string(),
                            status: OutcomeStatus::Failed,
                            reason: Some(reason),
                            record_id: Some(record_id),
                        }
                    }
                },
                // A store failure is isolated like a provider failure. The
                // recipient is not counted as sent, so it is never charged.
                Err(err) => {
                    tracing::error!(recipient = %to, "delivery record not persisted: {err}");
                    failed_count += 1;
                    RecipientOutcome {
                        index: *index,
                        number: to.as_str().to_string(),
                        status: OutcomeStatus::Failed,
                        reason: Some(format!("record not persisted: {err}")),
                        record_id: None,
                    }
                }
            };
            outcomes.push(entry);
        }

        outcomes.sort_by_key(|outcome| outcome.index);

        // Steps 6-7: single commit sized to actual successes. The ledger's
        // guard catches concurrent batches the step-4 check missed; when it
        // does, the per-recipient work already happened, so the breakdown is
        // returned with the error rather than discarded.
        let credits_deducted = sent_count as u64;
        let credits_remaining = match self
            .ledger
            .try_decrement(&account.id, credits_deducted)
            .await
        {
            Ok(remaining) => remaining,
            Err(DispatchError::InsufficientAtCommit { have, need }) => {
                return Err(DispatchError::ReconciliationFailed {
                    have,
                    need,
                    report: Box::new(BatchReport {
                        total_attempted: raw.len(),
                        valid_count: valid.len(),
                        invalid_count: invalid.len(),
                        sent_count,
                        failed_count,
                        credits_deducted: 0,
                        credits_remaining: have,
                        outcomes,
                    }),
                });
            }
            Err(err) => return Err(err),
        };

        tracing::info!(
            account = %account.id,
            sent = sent_count,
            failed = failed_count,
            invalid = invalid.len(),
            deducted = credits_deducted,
            "batch complete"
        );

        Ok(BatchReport {
            total_attempted: raw.len(),
            valid_count: valid.len(),
            invalid_count: invalid.len(),
            sent_count,
            failed_count,
            credits_deducted,
            credits_remaining,
            outcomes,
        })
    }

    /// Delivery history for one account, newest first.
    pub async fn history(&self, account_id: &str) -> Result<Vec<DeliveryRecord>> {
        self.store.find_by_account(account_id).await
    }

    fn check_preconditions(&self, account: &Account, message: &str) -> Result<()> {
        if account.is_blocked {
            return Err(DispatchError::AccountBlocked);
        }
        if !account.is_verified {
            return Err(DispatchError::AccountUnverified);
        }
        if message.trim().is_empty() {
            return Err(DispatchError::EmptyMessage);
        }
        Ok(())
    }
}
