use crate::domain::model::DeliveryRecord;
use crate::domain::ports::{CreditLedger, DeliveryStore};
use crate::utils::error::{DispatchError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory delivery store used by the CLI driver and tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    records: Vec<DeliveryRecord>,
    next_id: u64,
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn save(&self, mut record: DeliveryRecord) -> Result<String> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = format!("rec-{}", inner.next_id);
        record.id = Some(id.clone());
        inner.records.push(record);
        Ok(id)
    }

    async fn find_by_account(&self, account_id: &str) -> Result<Vec<DeliveryRecord>> {
        let inner = self.inner.lock().await;
        let mut records: Vec<DeliveryRecord> = inner
            .records
            .iter()
            .filter(|record| record.account_id == account_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

/// In-memory credit ledger.
///
/// The decrement checks its guard under the lock, so concurrent batches
/// against the same account can never drive a balance below zero.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    balances: Arc<Mutex<HashMap<String, u64>>>,
}

impl MemoryLedger {
    pub fn with_balance(account_id: &str, credits: u64) -> Self {
        let mut balances = HashMap::new();
        balances.insert(account_id.to_string(), credits);
        Self {
            balances: Arc::new(Mutex::new(balances)),
        }
    }

    pub async fn set_balance(&self, account_id: &str, credits: u64) {
        self.balances
            .lock()
            .await
            .insert(account_id.to_string(), credits);
    }
}

#[async_trait]
impl CreditLedger for MemoryLedger {
    async fn balance(&self, account_id: &str) -> Result<u64> {
        Ok(self
            .balances
            .lock()
            .await
            .get(account_id)
            .copied()
            .unwrap_or(0))
    }

    async fn try_decrement(&self, account_id: &str, amount: u64) -> Result<u64> {
        let mut balances = self.balances.lock().await;
        let have = balances.get(account_id).copied().unwrap_or(0);
        if amount == 0 {
            return Ok(have);
        }
        if have < amount {
            return Err(DispatchError::InsufficientAtCommit { have, need: amount });
        }
        let remaining = have - amount;
        balances.insert(account_id.to_string(), remaining);
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validator;
    use crate::domain::model::{DeliveryRecord, DeliveryStatus};

    #[tokio::test]
    async fn save_assigns_ids_and_history_is_newest_first() {
        let store = MemoryStore::default();

        let first = DeliveryRecord::new(
            validator::validate("94771111111").unwrap(),
            "hello",
            "acct-1",
            "TestSender",
        )
        .with_status(DeliveryStatus::Sent);
        let mut second = DeliveryRecord::new(
            validator::validate("94772222222").unwrap(),
            "hello",
            "acct-1",
            "TestSender",
        )
        .with_status(DeliveryStatus::Failed);
        second.created_at = first.created_at + chrono::Duration::seconds(1);

        let id1 = store.save(first).await.unwrap();
        let id2 = store.save(second).await.unwrap();
        assert_ne!(id1, id2);

        let history = store.find_by_account("acct-1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].to.as_str(), "94772222222");
        assert!(store.find_by_account("acct-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn decrement_applies_guard_at_commit() {
        let ledger = MemoryLedger::default();
        ledger.set_balance("acct-1", 5).await;

        assert_eq!(ledger.try_decrement("acct-1", 3).await.unwrap(), 2);

        let err = ledger.try_decrement("acct-1", 3).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InsufficientAtCommit { have: 2, need: 3 }
        ));
        // Nothing was applied by the failed decrement.
        assert_eq!(ledger.balance("acct-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn zero_decrement_is_a_noop() {
        let ledger = MemoryLedger::default();
        ledger.set_balance("acct-1", 5).await;
        assert_eq!(ledger.try_decrement("acct-1", 0).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn unknown_account_has_zero_balance() {
        let ledger = MemoryLedger::default();
        assert_eq!(ledger.balance("nobody").await.unwrap(), 0);
        assert!(ledger.try_decrement("nobody", 1).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_decrements_never_go_negative() {
        let ledger = MemoryLedger::default();
        ledger.set_balance("acct-1", 5).await;

        // Two batches each trying to commit 3 successes against 5 credits:
        // exactly one must fail at commit.
        let mut handles = Vec::new();
        for _ in 0..2 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.try_decrement("acct-1", 3).await
            }));
        }

        let results: Vec<_> = futures_join(handles).await;
        let ok = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok, 1);
        assert_eq!(ledger.balance("acct-1").await.unwrap(), 2);
    }

    async fn futures_join(
        handles: Vec<tokio::task::JoinHandle<Result<u64>>>,
    ) -> Vec<Result<u64>> {
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    }
}
